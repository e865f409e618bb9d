//! Attestation server
//!
//! HTTP surface over the convention extractor and the document renderers:
//!
//! - `POST /generate`: convention PDF in, attestation PDF (or ZIP) out
//! - `POST /api/documents`: session details in, presence sheets,
//!   questionnaires and attestations out as one ZIP
//! - `GET /health`

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use convention_engine::ConventionPatterns;
use document_render::AttestationLayout;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod service;
pub mod settings;
pub mod training;

pub use error::ServerError;
pub use service::{AttestationService, GeneratedDocument};
pub use settings::Settings;
pub use training::{TrainingBundleService, TrainingRequest};

/// Largest accepted upload
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub attestations: AttestationService,
    pub bundles: TrainingBundleService,
}

impl AppState {
    /// Load pattern and layout configuration named by `settings`
    pub fn load(settings: Settings) -> Result<Self, ServerError> {
        let patterns = settings.load_patterns()?;
        let layout = settings.load_layout()?;
        tracing::info!(
            patterns = %settings.convention_patterns_file.display(),
            template = %layout.template_pdf.display(),
            "Configuration loaded"
        );
        Ok(Self::from_parts(settings, patterns, layout))
    }

    pub fn from_parts(
        settings: Settings,
        patterns: ConventionPatterns,
        layout: AttestationLayout,
    ) -> Self {
        if !layout.template_pdf.exists() {
            tracing::warn!(
                template = %layout.template_pdf.display(),
                "Attestation template not found, generation requests will fail"
            );
        }
        let layout = Arc::new(layout);
        Self {
            settings: Arc::new(settings),
            attestations: AttestationService::new(Arc::new(patterns), layout.clone()),
            bundles: TrainingBundleService::new(layout),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(api::handle_health))
        .route("/generate", post(api::handle_generate))
        .route("/api/documents", post(api::handle_documents))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
