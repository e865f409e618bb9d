//! Field extraction strategies
//!
//! Each strategy looks at one field's rules and either finds a raw value or
//! reports nothing. The extractor tries them in priority order and stops at
//! the first hit.

use shared_pdf::FormFields;

use crate::config::FieldSpec;

/// What a strategy can look at for one document
#[derive(Debug, Clone, Copy)]
pub struct Sources<'a> {
    /// Raw text as extracted
    pub text: &'a str,
    /// Normalised lines of the same text
    pub lines: &'a [String],
    /// Form fields, when the document was read with them
    pub form_fields: Option<&'a FormFields>,
}

/// One way of locating a field value
pub trait ExtractionStrategy: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Raw (uncleaned) value, or `None` when this strategy finds nothing
    fn extract(&self, spec: &FieldSpec, sources: &Sources<'_>) -> Option<String>;
}

/// Regex patterns against the raw text.
///
/// The first pattern that matches decides. Its `value` group is preferred,
/// then its first group. A pattern without a capture group, or with an
/// empty capture, yields nothing.
pub struct PatternStrategy;

impl ExtractionStrategy for PatternStrategy {
    fn name(&self) -> &'static str {
        "pattern"
    }

    fn extract(&self, spec: &FieldSpec, sources: &Sources<'_>) -> Option<String> {
        let caps = spec
            .patterns
            .iter()
            .find_map(|re| re.captures(sources.text))?;

        let value = caps
            .name("value")
            .filter(|m| !m.as_str().is_empty())
            .or_else(|| caps.get(1))?
            .as_str();

        non_blank(value)
    }
}

/// Label proximity over normalised lines.
///
/// A line containing a label yields the text after its first `:` or `-`, or
/// the next line when nothing follows the separator.
pub struct LabelStrategy;

impl ExtractionStrategy for LabelStrategy {
    fn name(&self) -> &'static str {
        "label"
    }

    fn extract(&self, spec: &FieldSpec, sources: &Sources<'_>) -> Option<String> {
        if spec.labels.is_empty() {
            return None;
        }
        let labels: Vec<String> = spec.labels.iter().map(|l| l.to_lowercase()).collect();
        find_after_label(sources.lines, &labels)
    }
}

fn find_after_label(lines: &[String], labels: &[String]) -> Option<String> {
    for (index, line) in lines.iter().enumerate() {
        let lower = line.to_lowercase();
        for label in labels {
            if !lower.contains(label.as_str()) {
                continue;
            }

            if let Some(pos) = line.find(|c: char| c == ':' || c == '-') {
                let tail = line[pos + 1..].trim();
                if !tail.is_empty() {
                    return Some(tail.to_string());
                }
            }

            if let Some(next) = lines.get(index + 1) {
                return Some(next.trim().to_string());
            }
        }
    }
    None
}

/// Form-field names matched by label, then by pattern
pub struct FormFieldStrategy;

impl ExtractionStrategy for FormFieldStrategy {
    fn name(&self) -> &'static str {
        "form_field"
    }

    fn extract(&self, spec: &FieldSpec, sources: &Sources<'_>) -> Option<String> {
        let form_fields = sources.form_fields?;

        let labels: Vec<String> = spec.labels.iter().map(|l| l.to_lowercase()).collect();
        for (name, value) in form_fields.iter() {
            let name_lower = name.to_lowercase();
            if labels.iter().any(|label| name_lower.contains(label.as_str())) {
                if let Some(value) = non_blank(value) {
                    return Some(value);
                }
            }
        }

        for (name, value) in form_fields.iter() {
            if spec.patterns.iter().any(|re| re.is_match(name)) {
                if let Some(value) = non_blank(value) {
                    return Some(value);
                }
            }
        }

        None
    }
}

/// Default priority order
pub fn default_strategies() -> Vec<Box<dyn ExtractionStrategy>> {
    vec![
        Box::new(PatternStrategy),
        Box::new(LabelStrategy),
        Box::new(FormFieldStrategy),
    ]
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
