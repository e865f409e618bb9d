//! Visual text extraction
//!
//! Pages are concatenated in reading order. Scanned documents yield little or
//! no text; that is not an error here, the caller decides whether the form
//! fields are enough.

use pdf_extract::extract_text_from_mem;

use crate::error::PdfError;

/// Extract the text layer of every page
pub fn extract_text(pdf_bytes: &[u8]) -> Result<String, PdfError> {
    extract_text_from_mem(pdf_bytes).map_err(|e| {
        let message = e.to_string();
        let lower = message.to_lowercase();
        if lower.contains("invalid") || lower.contains("malformed") || lower.contains("header") {
            PdfError::InvalidPdf(message)
        } else {
            PdfError::TextExtraction(message)
        }
    })
}
