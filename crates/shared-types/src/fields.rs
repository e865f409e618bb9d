//! Field vocabulary shared by the extraction engine and the renderers

use std::collections::BTreeMap;

/// Resolved field values keyed by field identifier. Only non-empty values.
pub type FieldMap = BTreeMap<String, String>;

/// Per-document working map: every configured field, resolved or not.
pub type ExtractedFields = BTreeMap<String, Option<String>>;

pub const PROVIDER_NAME: &str = "provider_name";
pub const BENEFICIARY_NAME: &str = "beneficiary_name";
pub const COMPANY_NAME: &str = "company_name";
pub const SIGNATORY_NAME: &str = "signatory_name";
pub const ACTION_TITLE: &str = "action_title";
pub const DATE_START: &str = "date_start";
pub const DATE_END: &str = "date_end";
pub const DURATION: &str = "duration";
pub const LOCATION: &str = "location";
pub const SIGNATURE_DATE: &str = "signature_date";
pub const CHECKBOX_ACTION_TRAINING: &str = "checkbox_action_training";

/// Drop unresolved and blank entries
pub fn resolved(fields: &ExtractedFields) -> FieldMap {
    fields
        .iter()
        .filter_map(|(key, value)| match value {
            Some(v) if !v.is_empty() => Some((key.clone(), v.clone())),
            _ => None,
        })
        .collect()
}

/// True when the field holds a non-empty value
pub fn is_resolved(fields: &ExtractedFields, field_id: &str) -> bool {
    matches!(fields.get(field_id), Some(Some(v)) if !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolved_skips_empty_and_absent() {
        let mut fields = ExtractedFields::new();
        fields.insert(PROVIDER_NAME.to_string(), Some("Formation Plus".to_string()));
        fields.insert(DURATION.to_string(), Some(String::new()));
        fields.insert(LOCATION.to_string(), None);

        let map = resolved(&fields);
        assert_eq!(map.len(), 1);
        assert_eq!(map[PROVIDER_NAME], "Formation Plus");
    }

    #[test]
    fn test_is_resolved() {
        let mut fields = ExtractedFields::new();
        fields.insert(DATE_END.to_string(), Some("05/01/2024".to_string()));
        fields.insert(DATE_START.to_string(), Some(String::new()));

        assert!(is_resolved(&fields, DATE_END));
        assert!(!is_resolved(&fields, DATE_START));
        assert!(!is_resolved(&fields, LOCATION));
    }
}
