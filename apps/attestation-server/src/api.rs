//! API handlers for the attestation server

use axum::{
    extract::{Multipart, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::error::ServerError;
use crate::service::{GeneratedDocument, ZIP_MEDIA_TYPE};
use crate::training::{TrainingRequest, BUNDLE_FILENAME};
use crate::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Handler: GET /health
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "attestation-server",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Handler: POST /generate
///
/// Multipart field `file` holds the convention PDF. Answers with one
/// attestation PDF, or a ZIP when the convention lists several participants.
pub async fn handle_generate(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, ServerError> {
    let mut upload = None;
    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        if !filename.to_lowercase().ends_with(".pdf") {
            return Err(ServerError::InvalidRequest(
                "Le fichier doit etre un PDF.".to_string(),
            ));
        }
        let bytes = field.bytes().await.map_err(bad_multipart)?;
        upload = Some((filename, bytes));
        break;
    }

    let Some((filename, bytes)) = upload else {
        return Err(ServerError::InvalidRequest("Missing file upload.".to_string()));
    };
    info!(filename = %filename, size = bytes.len(), "Convention received");

    let service = state.attestations.clone();
    let document = tokio::task::spawn_blocking(move || service.process_pdf(&bytes))
        .await
        .map_err(|e| ServerError::Internal(format!("Generation task failed: {}", e)))??;

    Ok(attachment(document))
}

/// Handler: POST /api/documents
///
/// Multipart field `data` holds the session as JSON. Answers with the
/// presence sheets, questionnaires and attestations of every participant.
pub async fn handle_documents(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, ServerError> {
    let mut payload = None;
    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        if field.name() == Some("data") {
            payload = Some(field.text().await.map_err(bad_multipart)?);
            break;
        }
    }

    let Some(payload) = payload else {
        return Err(ServerError::InvalidRequest("Missing data payload.".to_string()));
    };
    let request: TrainingRequest = serde_json::from_str(&payload)
        .map_err(|_| ServerError::InvalidRequest("Invalid JSON payload.".to_string()))?;
    let session = request.into_session(&state.settings)?;
    info!(
        participants = session.participants.len(),
        dates = session.dates.len(),
        "Training bundle requested"
    );

    let service = state.bundles.clone();
    let bytes = tokio::task::spawn_blocking(move || service.build(&session))
        .await
        .map_err(|e| ServerError::Internal(format!("Bundle task failed: {}", e)))??;

    Ok(attachment(GeneratedDocument {
        bytes,
        filename: BUNDLE_FILENAME.to_string(),
        media_type: ZIP_MEDIA_TYPE,
    }))
}

fn bad_multipart(err: axum::extract::multipart::MultipartError) -> ServerError {
    ServerError::InvalidRequest(format!("Invalid multipart body: {}", err))
}

fn attachment(document: GeneratedDocument) -> Response {
    let disposition = content_disposition(&document.filename);
    let mut response = document.bytes.into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(document.media_type),
    );
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    response
}

/// `attachment` disposition with an ASCII fallback name and, when needed,
/// the UTF-8 name percent-encoded
fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if fallback == filename {
        return format!("attachment; filename=\"{}\"", filename);
    }

    let encoded: String = filename
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{:02X}", b),
        })
        .collect();
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback, encoded
    )
}
