//! Error types for the attestation server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use convention_engine::{ConfigError, ExtractionError};
use document_render::RenderError;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Extraction(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ServerError::InvalidRequest(_) => "INVALID_REQUEST",
            ServerError::Extraction(ExtractionError::InvalidPdf(_)) => "INVALID_PDF",
            ServerError::Extraction(ExtractionError::Empty) => "EMPTY_DOCUMENT",
            ServerError::Extraction(ExtractionError::MissingRequiredFields(_)) => "MISSING_FIELDS",
            ServerError::Extraction(ExtractionError::Validation(_)) => "VALIDATION_ERROR",
            _ => "INTERNAL_ERROR",
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            ServerError::Extraction(ExtractionError::MissingRequiredFields(fields)) => {
                Some(serde_json::json!(fields))
            }
            ServerError::Extraction(ExtractionError::Validation(errors)) => {
                serde_json::to_value(&errors.errors).ok()
            }
            _ => None,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::warn!(code = self.code(), "Request rejected: {}", self);
        }

        let body = ErrorResponse {
            success: false,
            error: self.to_string(),
            code: self.code(),
            details: self.details(),
        };

        (status, Json(body)).into_response()
    }
}
