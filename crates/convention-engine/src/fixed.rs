//! Fixed-pattern fallback for the standard convention layout
//!
//! These rules know the wording of the usual convention template and fill
//! what the configurable extractor missed. Provider and company are searched
//! only in the header (the text before "Article 1"); every other rule scans
//! the whole document. Each rule is independent and a miss leaves the field
//! out of the result.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use shared_types::convention::DATE_FORMAT;
use shared_types::fields::*;
use shared_types::FieldMap;

lazy_static! {
    static ref PROVIDER: Regex =
        Regex::new(r#"(?i)Ci-apr[eè]s d[ée]sign[ée] [«"]([^»"]+)[»"]"#).unwrap();
    static ref COMPANY: Regex = Regex::new(r"(?i)\bEt\s*:\s*([^,\n]+)").unwrap();
    static ref SIGNATORY: Regex =
        Regex::new(r"(?i)Pour\s+le\s+Prestataire\s*:\s*(?:Nom\s*:\s*)?([^\n]+)").unwrap();
    static ref ACTION_TITLE_RULE: Regex =
        Regex::new(r"(?i)formation\s+intitul[ée]e\s*:\s*([^\n]+)").unwrap();
    static ref DURATION_RULE: Regex =
        Regex::new(r"(?i)Dur[eé]e\s+de\s+la\s+formation\s*:\s*([^\n\.]+)").unwrap();
    static ref DURATION_SOIT: Regex = Regex::new(r"(?i)\s+soit\s+").unwrap();
    static ref DURATION_PER_PERSON: Regex =
        Regex::new(r"(?i)\s+de\s+formation\s+par\s+personne.*$").unwrap();
    static ref FIRST_NUMBER: Regex = Regex::new(r"(\d+[.,]?\d*)").unwrap();
    static ref DATES: Regex = Regex::new(
        r"(?i)Dates?\s+de\s+formation\s*:\s*(\d{2}/\d{2}/\d{4})\s+au\s+(\d{2}/\d{2}/\d{4})"
    )
    .unwrap();
    static ref LOCATION_RULE: Regex =
        Regex::new(r"(?i)Lieu\s+de\s+la\s+formation\s*:\s*([^\n\.]+)").unwrap();
    static ref SIGNATURE: Regex = Regex::new(
        r"(?i)Fait\s+en\s+\d+\s+exemplaires?,\s+à\s+([^,\n]+),\s+le\s+(\d{4}-\d{2}-\d{2})"
    )
    .unwrap();
    static ref CLIENT_CONTACT: Regex =
        Regex::new(r"(?i)Pour\s+le\s+Client\s*:\s*(?:Nom\s*:\s*)?([^\n]+)").unwrap();
}

const HEADER_END_MARKER: &str = "Article 1";

/// Apply every fixed rule. Only non-empty values are returned.
pub fn extract_fixed_fields(text: &str) -> FieldMap {
    let normalized = text.replace("\r\n", "\n");
    let header = normalized
        .split_once(HEADER_END_MARKER)
        .map_or(normalized.as_str(), |(head, _)| head);

    let mut fields = FieldMap::new();

    if let Some(provider) = first_group(&PROVIDER, header) {
        insert(&mut fields, PROVIDER_NAME, provider);
    }

    if let Some(company) = first_group(&COMPANY, header) {
        insert(&mut fields, COMPANY_NAME, company);
    }

    if let Some(signatory) = first_group(&SIGNATORY, &normalized) {
        insert(&mut fields, SIGNATORY_NAME, signatory);
    }

    if let Some(title) = first_group(&ACTION_TITLE_RULE, &normalized) {
        insert(&mut fields, ACTION_TITLE, title);
    }

    if let Some(duration) = first_group(&DURATION_RULE, &normalized) {
        insert(&mut fields, DURATION, &parse_duration(duration));
    }

    if let Some(caps) = DATES.captures(&normalized) {
        insert(&mut fields, DATE_START, &caps[1]);
        insert(&mut fields, DATE_END, &caps[2]);
    }

    if let Some(location) = first_group(&LOCATION_RULE, &normalized) {
        insert(&mut fields, LOCATION, location);
    }

    // The signature block names the place more reliably than the location line
    if let Some(caps) = SIGNATURE.captures(&normalized) {
        insert(&mut fields, LOCATION, &caps[1]);
        insert(&mut fields, SIGNATURE_DATE, &format_date(&caps[2]));
    }

    tracing::debug!(found = fields.len(), "Fixed-pattern pass complete");
    fields
}

/// Name of the client's signatory ("Pour le Client : ..."), if present
pub fn extract_client_contact(text: &str) -> Option<String> {
    let normalized = text.replace("\r\n", "\n");
    first_group(&CLIENT_CONTACT, &normalized)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Reformat `YYYY-MM-DD` or `DD/MM/YYYY` as `DD/MM/YYYY`. Anything else is returned unchanged.
pub fn format_date(value: &str) -> String {
    ["%Y-%m-%d", DATE_FORMAT]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .map(|date| date.format(DATE_FORMAT).to_string())
        .unwrap_or_else(|| value.to_string())
}

/// Reduce a duration clause to its first number, when it has one.
///
/// "14 heures soit 2 jours" gives "14"; "2 jours soit 14 heures" gives "2".
fn parse_duration(raw: &str) -> String {
    let raw = raw.trim();
    let before_soit = DURATION_SOIT.split(raw).next().unwrap_or(raw).trim();
    let cleaned = DURATION_PER_PERSON.replace(before_soit, "");
    let cleaned = cleaned.trim();

    match FIRST_NUMBER.captures(cleaned) {
        Some(caps) => caps[1].replace(',', "."),
        None => cleaned.to_string(),
    }
}

fn first_group<'t>(re: &Regex, text: &'t str) -> Option<&'t str> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn insert(fields: &mut FieldMap, key: &str, value: &str) {
    let value = value.trim();
    if !value.is_empty() {
        fields.insert(key.to_string(), value.to_string());
    }
}
