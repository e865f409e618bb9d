//! Interactive form (AcroForm) field values
//!
//! Fields are collected from the catalog's `/AcroForm /Fields` tree. Terminal
//! fields are named by their fully qualified name (`parent.child`). Widgets
//! without a `/T` entry belong to their parent field and are not named on
//! their own.

use lopdf::{Dictionary, Document, Object};

use crate::encoding::decode_pdf_string;
use crate::error::PdfError;

/// Guard against reference cycles in malformed field trees
const MAX_FIELD_DEPTH: usize = 32;

/// Field name to value, in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    entries: Vec<(String, String)>,
}

impl FormFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value. A name seen again keeps its position and takes the new value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries ordered by field name
    pub fn sorted(&self) -> Vec<(&str, &str)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for FormFields {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut fields = FormFields::new();
        for (name, value) in iter {
            fields.insert(name, value);
        }
        fields
    }
}

/// Read every filled form field of a loaded document.
///
/// Documents without an interactive form yield an empty set.
pub fn read_form_fields(doc: &Document) -> FormFields {
    let mut fields = FormFields::new();

    let Some(roots) = acroform_fields(doc) else {
        return fields;
    };

    for root in roots {
        collect_field(doc, root, None, 0, &mut fields);
    }

    tracing::debug!(count = fields.len(), "Read form fields");
    fields
}

/// Parse raw bytes and read their form fields
pub fn read_form_fields_from_bytes(pdf_bytes: &[u8]) -> Result<FormFields, PdfError> {
    let doc =
        Document::load_mem(pdf_bytes).map_err(|e| PdfError::InvalidPdf(e.to_string()))?;
    Ok(read_form_fields(&doc))
}

fn acroform_fields(doc: &Document) -> Option<Vec<&Object>> {
    let catalog = doc.catalog().ok()?;
    let acroform = resolve(doc, catalog.get(b"AcroForm").ok()?)?.as_dict().ok()?;
    let fields = resolve(doc, acroform.get(b"Fields").ok()?)?.as_array().ok()?;
    Some(fields.iter().collect())
}

fn collect_field(
    doc: &Document,
    obj: &Object,
    parent_name: Option<&str>,
    depth: usize,
    fields: &mut FormFields,
) {
    if depth > MAX_FIELD_DEPTH {
        tracing::warn!("Form field tree too deep, stopping descent");
        return;
    }

    let Some(dict) = resolve(doc, obj).and_then(|o| o.as_dict().ok()) else {
        return;
    };

    let partial_name = dict
        .get(b"T")
        .ok()
        .and_then(|t| resolve(doc, t))
        .and_then(|t| match t {
            Object::String(bytes, _) => Some(decode_pdf_string(bytes)),
            _ => None,
        });

    let full_name = match (parent_name, partial_name) {
        (Some(parent), Some(partial)) => Some(format!("{}.{}", parent, partial)),
        (None, Some(partial)) => Some(partial),
        (_, None) => None,
    };

    if let Ok(Object::Array(kids)) = dict.get(b"Kids").map(|k| resolve(doc, k).unwrap_or(k)) {
        let next_parent = full_name.as_deref().or(parent_name);
        for kid in kids {
            collect_field(doc, kid, next_parent, depth + 1, fields);
        }
    }

    let Some(name) = full_name else {
        return;
    };

    if let Some(value) = field_value(doc, dict) {
        fields.insert(name, value);
    }
}

/// Current value, or the default value when the current one is absent or blank
fn field_value(doc: &Document, dict: &Dictionary) -> Option<String> {
    entry_value(doc, dict, b"V").or_else(|| entry_value(doc, dict, b"DV"))
}

fn entry_value(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<String> {
    let raw = dict.get(key).ok()?;
    let value = object_to_string(doc, raw, 0)?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn object_to_string(doc: &Document, obj: &Object, depth: usize) -> Option<String> {
    if depth > MAX_FIELD_DEPTH {
        return None;
    }
    match obj {
        Object::String(bytes, _) => Some(decode_pdf_string(bytes)),
        Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
        Object::Integer(i) => Some(i.to_string()),
        Object::Real(r) => Some(r.to_string()),
        Object::Boolean(b) => Some(b.to_string()),
        Object::Array(items) => {
            let parts: Vec<String> = items
                .iter()
                .filter_map(|item| object_to_string(doc, item, depth + 1))
                .collect();
            Some(parts.join(", "))
        }
        Object::Reference(id) => {
            let target = doc.get_object(*id).ok()?;
            object_to_string(doc, target, depth + 1)
        }
        _ => None,
    }
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}
