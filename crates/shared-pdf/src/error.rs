use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("Invalid PDF: {0}")]
    InvalidPdf(String),

    #[error("Text extraction failed: {0}")]
    TextExtraction(String),
}
