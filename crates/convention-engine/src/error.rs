use std::path::PathBuf;

use shared_pdf::PdfError;
use shared_types::ValidationErrors;
use thiserror::Error;

/// Pattern configuration could not be loaded
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid pattern configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid pattern for field {field}: {pattern}")]
    InvalidPattern {
        field: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// A convention could not be turned into a complete field set
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Invalid PDF: {0}")]
    InvalidPdf(String),

    #[error("Aucun texte ou champ de formulaire detecte dans le PDF.")]
    Empty,

    #[error("Missing required fields: {}", .0.join(", "))]
    MissingRequiredFields(Vec<String>),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),
}

impl From<PdfError> for ExtractionError {
    fn from(err: PdfError) -> Self {
        ExtractionError::InvalidPdf(err.to_string())
    }
}
