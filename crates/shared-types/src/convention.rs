//! Validated convention schema
//!
//! Built from the merged field map once both extraction passes ran. Every
//! field problem is collected so callers can report them all at once.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fields::*;

/// Date format used by conventions and attestations
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Business fields of a training convention
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConventionData {
    pub provider_name: String,
    pub beneficiary_name: String,
    /// DD/MM/YYYY
    pub date_start: String,
    /// DD/MM/YYYY
    pub date_end: String,
    pub duration: String,
    pub action_title: String,

    pub company_name: Option<String>,
    pub signatory_name: Option<String>,
    pub location: Option<String>,
}

/// A single field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// All field-level failures of one validation run, in field order
#[derive(Error, Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[error("{}", join_errors(.errors))]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Field identifiers that failed, in order
    pub fn fields(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.field.as_str()).collect()
    }
}

fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ConventionData {
    /// Build and validate from a merged field map
    pub fn from_fields(fields: &FieldMap) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let provider_name = required(fields, PROVIDER_NAME, &mut errors);
        let beneficiary_name = required(fields, BENEFICIARY_NAME, &mut errors);
        let date_start = required_date(fields, DATE_START, &mut errors);
        let date_end = required_date(fields, DATE_END, &mut errors);
        let duration = required(fields, DURATION, &mut errors);
        let action_title = required(fields, ACTION_TITLE, &mut errors);

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Self {
            provider_name,
            beneficiary_name,
            date_start,
            date_end,
            duration,
            action_title,
            company_name: fields.get(COMPANY_NAME).cloned(),
            signatory_name: fields.get(SIGNATORY_NAME).cloned(),
            location: fields.get(LOCATION).cloned(),
        })
    }
}

/// Parse a DD/MM/YYYY date
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

fn required(fields: &FieldMap, field: &str, errors: &mut ValidationErrors) -> String {
    match fields.get(field) {
        None => {
            errors.push(field, "Field required");
            String::new()
        }
        Some(value) if value.trim().is_empty() => {
            errors.push(field, "Field must not be empty");
            String::new()
        }
        Some(value) => value.clone(),
    }
}

fn required_date(fields: &FieldMap, field: &str, errors: &mut ValidationErrors) -> String {
    let value = required(fields, field, errors);
    if !value.is_empty() && parse_date(&value).is_none() {
        errors.push(field, "Date format must be DD/MM/YYYY");
    }
    value
}
