//! Output documents for a training action
//!
//! The attestation is drawn over a template PDF; the presence sheet and the
//! satisfaction questionnaire are generated from scratch. Everything renders
//! to bytes so callers decide where documents end up.

pub mod attestation;
pub mod bundle;
pub mod canvas;
pub mod error;
pub mod filenames;
pub mod fonts;
pub mod layout;
pub mod presence;
pub mod questionnaire;

pub use attestation::render_attestation;
pub use bundle::ZipBundle;
pub use error::RenderError;
pub use filenames::{
    attestation_filename, presence_filename, questionnaire_filename, sanitize_filename,
    unique_filename, DEFAULT_BENEFICIARY,
};
pub use layout::{AttestationLayout, FieldKind, LayoutField};
pub use presence::{render_presence_sheet, PresenceSheet};
pub use questionnaire::{render_questionnaire, split_full_name, QuestionnaireData};
