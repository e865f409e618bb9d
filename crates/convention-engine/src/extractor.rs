//! Generic field extraction driven by [`ConventionPatterns`]

use lazy_static::lazy_static;
use regex::Regex;
use shared_pdf::FormFields;
use shared_types::ExtractedFields;

use crate::config::{ConventionPatterns, FieldSpec};
use crate::normalize::normalize_lines;
use crate::strategies::{default_strategies, ExtractionStrategy, Sources};

lazy_static! {
    static ref QUALITY_CLAUSE: Regex = Regex::new(r"(?i)\s+en\s+qualit[eé]\s+de.*$").unwrap();
}

/// Runs the strategy cascade for every configured field
pub struct FieldExtractor {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl FieldExtractor {
    pub fn new() -> Self {
        Self {
            strategies: default_strategies(),
        }
    }

    /// Use a custom strategy order
    pub fn with_strategies(strategies: Vec<Box<dyn ExtractionStrategy>>) -> Self {
        Self { strategies }
    }

    /// Extract every configured field. Unresolved fields are present as `None`.
    pub fn extract(
        &self,
        text: &str,
        patterns: &ConventionPatterns,
        form_fields: Option<&FormFields>,
    ) -> ExtractedFields {
        let lines = normalize_lines(text);
        let sources = Sources {
            text,
            lines: &lines,
            form_fields,
        };

        patterns
            .fields()
            .iter()
            .map(|spec| (spec.id.clone(), self.extract_field(spec, &sources)))
            .collect()
    }

    fn extract_field(&self, spec: &FieldSpec, sources: &Sources<'_>) -> Option<String> {
        for strategy in &self.strategies {
            match strategy.extract(spec, sources) {
                Some(raw) => {
                    let cleaned = clean_value(&raw);
                    if cleaned.is_empty() {
                        tracing::debug!(
                            field = %spec.id,
                            strategy = strategy.name(),
                            "Value empty after cleanup"
                        );
                        return None;
                    }
                    tracing::debug!(field = %spec.id, strategy = strategy.name(), "Field found");
                    return Some(cleaned);
                }
                None => {
                    tracing::debug!(field = %spec.id, strategy = strategy.name(), "No match");
                }
            }
        }
        None
    }
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract with the default strategy order
pub fn extract_fields(
    text: &str,
    patterns: &ConventionPatterns,
    form_fields: Option<&FormFields>,
) -> ExtractedFields {
    FieldExtractor::new().extract(text, patterns, form_fields)
}

/// Trim, drop a trailing "en qualité de ..." clause, strip stray punctuation
pub fn clean_value(value: &str) -> String {
    let trimmed = value.trim();
    let without_clause = QUALITY_CLAUSE.replace(trimmed, "");
    without_clause
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, '.' | ';' | ':'))
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use shared_types::fields::{is_resolved, BENEFICIARY_NAME, PROVIDER_NAME};

    fn sample_patterns() -> ConventionPatterns {
        ConventionPatterns::from_json(
            r#"{
                "required": ["provider_name", "beneficiary_name"],
                "fields": {
                    "provider_name": {
                        "labels": ["Entre", "Prestataire :"],
                        "patterns": ["Entre\\s+(?P<value>.+?)\\s+Ci-après"]
                    },
                    "beneficiary_name": {
                        "labels": ["Client :", "Stagiaire :"]
                    }
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_extract_fields_from_text() {
        let text = "
    CONVENTION DE FORMATION
    Entre l'organisme Formation Cool
    Ci-après désigné \"Prestataire\"

    Et :
    Client : Super Client SAS
    ";
        let fields = extract_fields(text, &sample_patterns(), None);
        assert_eq!(
            fields[PROVIDER_NAME].as_deref(),
            Some("l'organisme Formation Cool")
        );
        assert_eq!(fields[BENEFICIARY_NAME].as_deref(), Some("Super Client SAS"));
    }

    #[test]
    fn test_pattern_beats_label_and_form_field() {
        let text = "Prestataire : Label Value\nEntre Pattern Value Ci-après";
        let form_fields: FormFields = vec![("Prestataire", "Form Value")].into_iter().collect();
        let fields = extract_fields(text, &sample_patterns(), Some(&form_fields));
        assert_eq!(fields[PROVIDER_NAME].as_deref(), Some("Pattern Value"));
    }

    #[test]
    fn test_form_field_used_when_text_has_nothing() {
        let form_fields: FormFields = vec![("Stagiaire : nom", "Jeanne Martin")]
            .into_iter()
            .collect();
        let fields = extract_fields("", &sample_patterns(), Some(&form_fields));
        assert_eq!(fields[BENEFICIARY_NAME].as_deref(), Some("Jeanne Martin"));
    }

    #[test]
    fn test_unresolved_fields_are_none() {
        let fields = extract_fields("Rien ici", &sample_patterns(), None);
        assert_eq!(fields.len(), 2);
        assert!(!is_resolved(&fields, PROVIDER_NAME));
        assert!(!is_resolved(&fields, BENEFICIARY_NAME));
    }

    #[test]
    fn test_clean_value_strips_quality_clause() {
        assert_eq!(clean_value("Jean Dupont en qualité de Gérant"), "Jean Dupont");
        assert_eq!(clean_value("Jean Dupont EN QUALITE DE gérant."), "Jean Dupont");
        assert_eq!(clean_value("  Acme SAS ;: "), "Acme SAS");
        assert_eq!(clean_value(" ..; "), "");
        assert_eq!(clean_value("Acme\t."), "Acme");
        assert_eq!(clean_value("Acme SAS .\u{a0};"), "Acme SAS");
    }

    #[test]
    fn test_custom_strategy_order() {
        let extractor = FieldExtractor::with_strategies(vec![Box::new(
            crate::strategies::LabelStrategy,
        )]);
        let text = "Prestataire : Label Value\nEntre Pattern Value Ci-après";
        let fields = extractor.extract(text, &sample_patterns(), None);
        assert_eq!(fields[PROVIDER_NAME].as_deref(), Some("Label Value"));
    }
}
