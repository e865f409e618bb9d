//! Training convention field extraction
//!
//! Turns the text layer and form fields of a convention PDF into a validated
//! field map plus the list of participants, and maps it to the attestation
//! vocabulary.

pub mod config;
pub mod error;
pub mod extractor;
pub mod fixed;
pub mod mapper;
pub mod normalize;
pub mod participants;
pub mod pipeline;
pub mod strategies;

pub use config::{ConventionPatterns, FieldRules, FieldSpec, PatternConfig};
pub use error::{ConfigError, ExtractionError};
pub use extractor::{clean_value, extract_fields, FieldExtractor};
pub use fixed::{extract_client_contact, extract_fixed_fields, format_date};
pub use mapper::{map_to_attestation_fields, map_to_attestation_fields_at};
pub use normalize::normalize_lines;
pub use participants::extract_participants;
pub use pipeline::{
    extract_convention_data, extract_convention_data_from_sources, extract_convention_fields,
    extract_convention_fields_from_sources, validate_convention, ConventionExtraction,
};
pub use strategies::{ExtractionStrategy, FormFieldStrategy, LabelStrategy, PatternStrategy};
