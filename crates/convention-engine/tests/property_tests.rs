//! Property-based tests for the extraction engine

use convention_engine::{
    extract_fields, extract_participants, map_to_attestation_fields_at, ConventionPatterns,
};
use proptest::prelude::*;
use shared_pdf::FormFields;
use shared_types::fields::*;
use shared_types::FieldMap;

fn name() -> impl Strategy<Value = String> {
    "[A-Z][a-z]{2,10} [A-Z][a-z]{2,10}"
}

fn patterns() -> ConventionPatterns {
    ConventionPatterns::from_json(
        r#"{
            "fields": {
                "provider_name": {
                    "patterns": ["Organisme\\s*:\\s*(?P<value>[^\\n]+)"],
                    "labels": ["Prestataire"]
                }
            }
        }"#,
    )
    .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// A pattern hit in the text beats labels and form fields
    #[test]
    fn pattern_has_priority(
        from_pattern in name(),
        from_label in name(),
        from_form in name(),
    ) {
        let text = format!("Prestataire : {from_label}\nOrganisme : {from_pattern}\n");
        let form_fields: FormFields = vec![("Prestataire", from_form.as_str())].into_iter().collect();

        let fields = extract_fields(&text, &patterns(), Some(&form_fields));
        prop_assert_eq!(fields[PROVIDER_NAME].as_deref(), Some(from_pattern.as_str()));
    }

    /// Labels beat form fields when no pattern matches
    #[test]
    fn label_beats_form_field(from_label in name(), from_form in name()) {
        let text = format!("Prestataire : {from_label}\n");
        let form_fields: FormFields = vec![("Prestataire", from_form.as_str())].into_iter().collect();

        let fields = extract_fields(&text, &patterns(), Some(&form_fields));
        prop_assert_eq!(fields[PROVIDER_NAME].as_deref(), Some(from_label.as_str()));
    }

    /// Every participant found has at least two words and at most 60 characters
    #[test]
    fn participants_are_bounded(names in prop::collection::vec("[A-Za-z]{1,40}( [A-Za-z]{1,40}){0,2}", 0..8)) {
        let text = format!("Article 3 – Participants\n• {}\nArticle 4", names.join(", "));
        for participant in extract_participants(&text) {
            prop_assert!(participant.split_whitespace().count() >= 2);
            prop_assert!(participant.chars().count() <= 60);
        }
    }

    /// The mapper never leaves the checkbox or signature date empty
    #[test]
    fn mapper_is_total(
        keys in prop::collection::vec(prop::sample::select(vec![
            PROVIDER_NAME, BENEFICIARY_NAME, COMPANY_NAME, DATE_START, DATE_END, DURATION,
        ]), 0..6),
        value in "[A-Za-z0-9/ ]{1,20}",
    ) {
        let fields: FieldMap = keys.iter().map(|k| (k.to_string(), value.clone())).collect();
        let today = chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let mapped = map_to_attestation_fields_at(&fields, today);

        prop_assert_eq!(mapped.checkbox_action_training.as_str(), "X");
        prop_assert!(!mapped.signature_date.is_empty());
        if fields.contains_key(DATE_END) {
            prop_assert_eq!(&mapped.signature_date, &value);
        } else {
            prop_assert_eq!(mapped.signature_date.as_str(), "01/06/2024");
        }
    }
}
