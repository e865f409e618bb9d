use serde::{Deserialize, Serialize};

use crate::fields::*;

/// Value written into the training-action checkbox of every attestation
pub const CHECKED: &str = "X";

/// Field set consumed by the attestation renderer, one per beneficiary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttestationFields {
    pub signatory_name: String,
    pub provider_name: String,
    pub beneficiary_name: String,
    pub company_name: String,
    pub action_title: String,
    pub checkbox_action_training: String,
    pub date_start: String,
    pub date_end: String,
    pub duration: String,
    pub location: String,
    pub signature_date: String,
}

impl AttestationFields {
    /// Look up a value by its layout field identifier
    pub fn get(&self, field_id: &str) -> Option<&str> {
        let value = match field_id {
            SIGNATORY_NAME => &self.signatory_name,
            PROVIDER_NAME => &self.provider_name,
            BENEFICIARY_NAME => &self.beneficiary_name,
            COMPANY_NAME => &self.company_name,
            ACTION_TITLE => &self.action_title,
            CHECKBOX_ACTION_TRAINING => &self.checkbox_action_training,
            DATE_START => &self.date_start,
            DATE_END => &self.date_end,
            DURATION => &self.duration,
            LOCATION => &self.location,
            SIGNATURE_DATE => &self.signature_date,
            _ => return None,
        };
        Some(value.as_str())
    }

    pub fn to_map(&self) -> FieldMap {
        [
            (SIGNATORY_NAME, &self.signatory_name),
            (PROVIDER_NAME, &self.provider_name),
            (BENEFICIARY_NAME, &self.beneficiary_name),
            (COMPANY_NAME, &self.company_name),
            (ACTION_TITLE, &self.action_title),
            (CHECKBOX_ACTION_TRAINING, &self.checkbox_action_training),
            (DATE_START, &self.date_start),
            (DATE_END, &self.date_end),
            (DURATION, &self.duration),
            (LOCATION, &self.location),
            (SIGNATURE_DATE, &self.signature_date),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AttestationFields {
        AttestationFields {
            signatory_name: "Jean Dupont".to_string(),
            provider_name: "Formation Plus".to_string(),
            beneficiary_name: "Martin Durand".to_string(),
            company_name: "Société Exemple".to_string(),
            action_title: "Formation Python".to_string(),
            checkbox_action_training: CHECKED.to_string(),
            date_start: "01/01/2024".to_string(),
            date_end: "05/01/2024".to_string(),
            duration: "35".to_string(),
            location: "Paris".to_string(),
            signature_date: "06/01/2024".to_string(),
        }
    }

    #[test]
    fn test_get_known_and_unknown_fields() {
        let fields = sample();
        assert_eq!(fields.get(BENEFICIARY_NAME), Some("Martin Durand"));
        assert_eq!(fields.get(CHECKBOX_ACTION_TRAINING), Some("X"));
        assert_eq!(fields.get("logo"), None);
    }

    #[test]
    fn test_to_map_has_full_vocabulary() {
        let map = sample().to_map();
        assert_eq!(map.len(), 11);
        assert_eq!(map[SIGNATURE_DATE], "06/01/2024");
    }

    #[test]
    fn test_serializes_with_field_identifiers() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["company_name"], "Société Exemple");
        assert_eq!(json["checkbox_action_training"], "X");
    }
}
