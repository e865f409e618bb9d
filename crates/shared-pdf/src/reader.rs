//! One-shot document reader
//!
//! Both readers run on the same bytes. A document whose text layer cannot be
//! extracted is still usable when it carries form fields, so text failures
//! degrade to an empty string instead of aborting.

use lopdf::Document;

use crate::error::PdfError;
use crate::form_fields::{read_form_fields, FormFields};
use crate::text::extract_text;

/// Everything the extractor reads from a PDF
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentContent {
    /// Visual text, pages joined in order. Empty when unreadable.
    pub text: String,
    pub form_fields: FormFields,
}

impl DocumentContent {
    /// Neither text nor form values were found
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty() && self.form_fields.is_empty()
    }
}

/// Read text and form fields from raw PDF bytes
pub fn read_document(pdf_bytes: &[u8]) -> Result<DocumentContent, PdfError> {
    let doc = Document::load_mem(pdf_bytes).map_err(|e| PdfError::InvalidPdf(e.to_string()))?;
    let form_fields = read_form_fields(&doc);

    let text = match extract_text(pdf_bytes) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(error = %e, "Text extraction failed, continuing with form fields only");
            String::new()
        }
    };

    tracing::debug!(
        text_len = text.len(),
        form_fields = form_fields.len(),
        "Read document"
    );

    Ok(DocumentContent { text, form_fields })
}
