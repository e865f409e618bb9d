//! Shared PDF handling utilities
//!
//! This crate provides the read side used by the convention extractor
//! (visual text and interactive form fields) plus the coordinate and string
//! encoding helpers the renderers need.

pub mod coords;
pub mod encoding;
pub mod error;
pub mod form_fields;
#[cfg(any(test, feature = "fixtures"))]
pub mod fixture;
pub mod reader;
pub mod text;

pub use coords::{image_to_page, page_media_box, BoundingBox};
pub use encoding::{decode_pdf_string, encode_win_ansi};
pub use error::PdfError;
pub use form_fields::{read_form_fields, read_form_fields_from_bytes, FormFields};
pub use reader::{read_document, DocumentContent};
pub use text::extract_text;
