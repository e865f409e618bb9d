pub mod attestation;
pub mod convention;
pub mod fields;

pub use attestation::AttestationFields;
pub use convention::{ConventionData, FieldError, ValidationErrors};
pub use fields::{ExtractedFields, FieldMap};
