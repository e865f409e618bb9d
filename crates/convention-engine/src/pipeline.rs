//! End-to-end convention extraction
//!
//! Read -> generic extraction -> fixed-pattern fallback -> participants ->
//! required-field check. Both entry points also exist at text level
//! (`*_from_sources`) for callers that already hold the document content.

use shared_pdf::{read_document, FormFields};
use shared_types::fields::{is_resolved, resolved, BENEFICIARY_NAME};
use shared_types::{ConventionData, ExtractedFields, FieldMap};

use crate::config::ConventionPatterns;
use crate::error::ExtractionError;
use crate::extractor::extract_fields;
use crate::fixed::{extract_client_contact, extract_fixed_fields};
use crate::participants::extract_participants;

/// Fields and participants of one convention
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConventionExtraction {
    /// Non-empty values only
    pub fields: FieldMap,
    /// In order of appearance, possibly empty
    pub participants: Vec<String>,
}

/// Extract the configured fields of a convention PDF.
///
/// The fixed-pattern fallback only runs when a required field is still
/// missing after the generic pass.
pub fn extract_convention_fields(
    pdf_bytes: &[u8],
    patterns: &ConventionPatterns,
) -> Result<FieldMap, ExtractionError> {
    let content = read_document(pdf_bytes)?;
    extract_convention_fields_from_sources(&content.text, &content.form_fields, patterns)
}

pub fn extract_convention_fields_from_sources(
    text: &str,
    form_fields: &FormFields,
    patterns: &ConventionPatterns,
) -> Result<FieldMap, ExtractionError> {
    ensure_not_empty(text, form_fields)?;

    let mut fields = extract_fields(text, patterns, Some(form_fields));

    if !missing_required(&fields, patterns).is_empty() {
        tracing::info!("Required fields missing after generic pass, applying fixed patterns");
        overwrite(&mut fields, extract_fixed_fields(text));
    }

    check_required(&fields, patterns)?;
    Ok(resolved(&fields))
}

/// Extract fields and participants of a convention PDF.
///
/// The fixed-pattern fallback always runs and its findings take precedence.
/// The beneficiary is the first participant, or the client's signatory when
/// no participant is listed.
pub fn extract_convention_data(
    pdf_bytes: &[u8],
    patterns: &ConventionPatterns,
) -> Result<ConventionExtraction, ExtractionError> {
    let content = read_document(pdf_bytes)?;
    extract_convention_data_from_sources(&content.text, &content.form_fields, patterns)
}

pub fn extract_convention_data_from_sources(
    text: &str,
    form_fields: &FormFields,
    patterns: &ConventionPatterns,
) -> Result<ConventionExtraction, ExtractionError> {
    ensure_not_empty(text, form_fields)?;

    let mut fields = extract_fields(text, patterns, Some(form_fields));
    overwrite(&mut fields, extract_fixed_fields(text));

    let participants = extract_participants(text);
    if let Some(first) = participants.first() {
        fields.insert(BENEFICIARY_NAME.to_string(), Some(first.clone()));
    } else if let Some(contact) = extract_client_contact(text) {
        fields.insert(BENEFICIARY_NAME.to_string(), Some(contact));
    }

    check_required(&fields, patterns)?;

    let fields = resolved(&fields);
    tracing::info!(
        fields = fields.len(),
        participants = participants.len(),
        "Convention extracted"
    );
    Ok(ConventionExtraction {
        fields,
        participants,
    })
}

/// Validate the business schema of an extraction.
///
/// When no beneficiary was resolved, the first participant stands in.
pub fn validate_convention(
    extraction: &ConventionExtraction,
) -> Result<ConventionData, ExtractionError> {
    let mut fields = extraction.fields.clone();
    if !fields.contains_key(BENEFICIARY_NAME) {
        if let Some(first) = extraction.participants.first() {
            fields.insert(BENEFICIARY_NAME.to_string(), first.clone());
        }
    }
    Ok(ConventionData::from_fields(&fields)?)
}

fn ensure_not_empty(text: &str, form_fields: &FormFields) -> Result<(), ExtractionError> {
    if text.trim().is_empty() && form_fields.is_empty() {
        tracing::warn!("No text or form fields in document");
        return Err(ExtractionError::Empty);
    }
    Ok(())
}

fn overwrite(fields: &mut ExtractedFields, fixed: FieldMap) {
    for (key, value) in fixed {
        fields.insert(key, Some(value));
    }
}

fn missing_required(fields: &ExtractedFields, patterns: &ConventionPatterns) -> Vec<String> {
    patterns
        .required()
        .iter()
        .filter(|id| !is_resolved(fields, id))
        .cloned()
        .collect()
}

fn check_required(
    fields: &ExtractedFields,
    patterns: &ConventionPatterns,
) -> Result<(), ExtractionError> {
    let missing = missing_required(fields, patterns);
    if missing.is_empty() {
        Ok(())
    } else {
        tracing::info!(missing = ?missing, "Required fields missing");
        Err(ExtractionError::MissingRequiredFields(missing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use shared_types::fields::*;

    fn sample_patterns() -> ConventionPatterns {
        ConventionPatterns::from_json(
            r#"{
                "required": ["provider_name", "beneficiary_name", "date_start", "date_end", "duration", "action_title"],
                "fields": {
                    "provider_name": {
                        "labels": ["Entre", "Prestataire :"],
                        "patterns": ["Entre\\s+(?P<value>.+?)\\s+Ci-après"]
                    },
                    "beneficiary_name": {
                        "labels": ["Client :", "Stagiaire :"],
                        "patterns": ["Client\\s*:\\s*(?P<value>.+)"]
                    }
                }
            }"#,
        )
        .unwrap()
    }

    const TEXT: &str = "
    Convention
    Entre Organisme Test Ci-après
    Client : Stagiaire Test
    formation intitulée : Formation Python
    Dates de formation : 01/01/2024 au 05/01/2024
    Durée de la formation : 35 heures
    ";

    #[test]
    fn test_fields_with_fallback() {
        let fields =
            extract_convention_fields_from_sources(TEXT, &FormFields::new(), &sample_patterns())
                .unwrap();
        assert_eq!(fields[PROVIDER_NAME], "Organisme Test");
        assert_eq!(fields[BENEFICIARY_NAME], "Stagiaire Test");
        assert_eq!(fields[ACTION_TITLE], "Formation Python");
        assert_eq!(fields[DATE_START], "01/01/2024");
        assert_eq!(fields[DATE_END], "05/01/2024");
        assert_eq!(fields[DURATION], "35");
    }

    #[test]
    fn test_fallback_skipped_when_required_present() {
        let patterns = ConventionPatterns::from_json(
            r#"{
                "required": ["provider_name"],
                "fields": {"provider_name": {"patterns": ["Entre\\s+(?P<value>.+?)\\s+Ci-après"]}}
            }"#,
        )
        .unwrap();
        let fields =
            extract_convention_fields_from_sources(TEXT, &FormFields::new(), &patterns).unwrap();
        assert_eq!(fields.len(), 1);
        assert!(!fields.contains_key(DURATION));
    }

    #[test]
    fn test_missing_required_named_in_config_order() {
        let text = "Entre Organisme Test Ci-après\nClient : Stagiaire Test";
        let err = extract_convention_fields_from_sources(text, &FormFields::new(), &sample_patterns())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required fields: date_start, date_end, duration, action_title"
        );
        match err {
            ExtractionError::MissingRequiredFields(missing) => {
                assert_eq!(missing, vec![DATE_START, DATE_END, DURATION, ACTION_TITLE]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_sources() {
        let err = extract_convention_fields_from_sources("  \n ", &FormFields::new(), &sample_patterns())
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Empty));

        let err = extract_convention_data_from_sources("", &FormFields::new(), &sample_patterns())
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Empty));
    }

    #[test]
    fn test_form_fields_alone_are_enough_to_start() {
        let form_fields: FormFields = vec![("Client : nom", "Paul Henri")].into_iter().collect();
        let err = extract_convention_fields_from_sources("", &form_fields, &sample_patterns())
            .unwrap_err();
        // Not empty: extraction ran and reports what is still missing
        match err {
            ExtractionError::MissingRequiredFields(missing) => {
                assert!(!missing.contains(&BENEFICIARY_NAME.to_string()));
                assert!(missing.contains(&PROVIDER_NAME.to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_data_uses_first_participant() {
        let text = format!(
            "{TEXT}\nArticle 3 – Participants\n• Anne Fave, Marc Leroy\nArticle 4 – Prix"
        );
        let extraction =
            extract_convention_data_from_sources(&text, &FormFields::new(), &sample_patterns())
                .unwrap();
        assert_eq!(extraction.participants, vec!["Anne Fave", "Marc Leroy"]);
        assert_eq!(extraction.fields[BENEFICIARY_NAME], "Anne Fave");
    }

    #[test]
    fn test_data_falls_back_to_client_contact() {
        let text = format!("{TEXT}\nPour le Client : Nom : Claire Martin\n");
        let extraction =
            extract_convention_data_from_sources(&text, &FormFields::new(), &sample_patterns())
                .unwrap();
        assert!(extraction.participants.is_empty());
        assert_eq!(extraction.fields[BENEFICIARY_NAME], "Claire Martin");
    }

    #[test]
    fn test_data_fixed_values_override_generic() {
        let text = format!("{TEXT}\nCi-après désigné « Formation Plus »\n");
        let extraction =
            extract_convention_data_from_sources(&text, &FormFields::new(), &sample_patterns())
                .unwrap();
        assert_eq!(extraction.fields[PROVIDER_NAME], "Formation Plus");
    }

    #[test]
    fn test_idempotent() {
        let patterns = sample_patterns();
        let first =
            extract_convention_data_from_sources(TEXT, &FormFields::new(), &patterns).unwrap();
        let second =
            extract_convention_data_from_sources(TEXT, &FormFields::new(), &patterns).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_validate_convention() {
        let extraction =
            extract_convention_data_from_sources(TEXT, &FormFields::new(), &sample_patterns())
                .unwrap();
        let data = validate_convention(&extraction).unwrap();
        assert_eq!(data.provider_name, "Organisme Test");
        assert_eq!(data.duration, "35");
    }

    #[test]
    fn test_validate_convention_reports_bad_dates() {
        let mut fields = FieldMap::new();
        for (key, value) in [
            (PROVIDER_NAME, "Acme"),
            (DATE_START, "2024-01-01"),
            (DATE_END, "05/01/2024"),
            (DURATION, "35"),
            (ACTION_TITLE, "Excel"),
        ] {
            fields.insert(key.to_string(), value.to_string());
        }
        let extraction = ConventionExtraction {
            fields,
            participants: vec!["Anne Fave".to_string()],
        };

        let err = validate_convention(&extraction).unwrap_err();
        match err {
            ExtractionError::Validation(errors) => assert_eq!(errors.fields(), vec![DATE_START]),
            other => panic!("unexpected error: {other}"),
        }
    }
}
