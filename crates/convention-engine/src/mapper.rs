//! Field map to attestation field set

use chrono::{Local, NaiveDate};
use shared_types::attestation::CHECKED;
use shared_types::convention::DATE_FORMAT;
use shared_types::fields::*;
use shared_types::{AttestationFields, FieldMap};

/// Map extracted fields to the attestation vocabulary, using today's date
/// as the signature-date default.
pub fn map_to_attestation_fields(fields: &FieldMap) -> AttestationFields {
    map_to_attestation_fields_at(fields, Local::now().date_naive())
}

/// Same as [`map_to_attestation_fields`] with an explicit "today".
///
/// Missing fields become empty strings. The signature date is the end date,
/// or `today` when there is none.
pub fn map_to_attestation_fields_at(fields: &FieldMap, today: NaiveDate) -> AttestationFields {
    let get = |key: &str| fields.get(key).cloned().unwrap_or_default();

    let signature_date = fields
        .get(DATE_END)
        .filter(|d| !d.is_empty())
        .cloned()
        .unwrap_or_else(|| today.format(DATE_FORMAT).to_string());

    AttestationFields {
        signatory_name: get(SIGNATORY_NAME),
        provider_name: get(PROVIDER_NAME),
        beneficiary_name: get(BENEFICIARY_NAME),
        company_name: get(COMPANY_NAME),
        action_title: get(ACTION_TITLE),
        checkbox_action_training: CHECKED.to_string(),
        date_start: get(DATE_START),
        date_end: get(DATE_END),
        duration: get(DURATION),
        location: get(LOCATION),
        signature_date,
    }
}
