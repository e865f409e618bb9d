//! Training document bundle: presence sheet, questionnaire and attestation
//! for every participant of a session, archived together.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDate;
use convention_engine::map_to_attestation_fields;
use document_render::{
    attestation_filename, presence_filename, questionnaire_filename, render_attestation,
    render_presence_sheet, render_questionnaire, split_full_name, AttestationLayout,
    PresenceSheet, QuestionnaireData, ZipBundle,
};
use serde::Deserialize;
use shared_types::convention::DATE_FORMAT;
use shared_types::fields::*;
use shared_types::FieldMap;

use crate::error::ServerError;
use crate::settings::Settings;

pub const BUNDLE_FILENAME: &str = "documents_formation.zip";

const PRESENCE_FOLDER: &str = "feuilles_presence";
const QUESTIONNAIRE_FOLDER: &str = "questionnaires_satisfaction";
const ATTESTATION_FOLDER: &str = "attestations_formation";

const INPUT_DATE_FORMATS: [&str; 3] = [DATE_FORMAT, "%d-%m-%Y", "%Y-%m-%d"];

/// Form payload. Participants and dates are comma or newline separated.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrainingRequest {
    pub company: Option<String>,
    pub training: Option<String>,
    pub duration: Option<String>,
    pub location: Option<String>,
    pub dates: Option<String>,
    pub participants: Option<String>,
    pub provider: Option<String>,
    pub signatory: Option<String>,
}

/// Validated session details
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingSession {
    pub company: String,
    pub training: String,
    pub duration: String,
    pub location: String,
    pub dates: Vec<String>,
    pub participants: Vec<String>,
    pub provider: String,
    pub signatory: String,
}

impl TrainingSession {
    /// First and last session dates, empty when none are known
    pub fn date_bounds(&self) -> (String, String) {
        match (self.dates.first(), self.dates.last()) {
            (Some(first), Some(last)) => (first.clone(), last.clone()),
            _ => (String::new(), String::new()),
        }
    }
}

/// Split on commas and newlines, dropping blank entries
pub fn extract_lines(value: &str) -> Vec<String> {
    value
        .split(|c: char| c == ',' || c == '\n' || c == '\r')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_input_date(value: &str) -> Option<NaiveDate> {
    INPUT_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value.trim(), format).ok())
}

/// Rewrite recognised dates as DD/MM/YYYY, keep anything else verbatim
pub fn normalize_dates(dates: &[String]) -> Vec<String> {
    dates
        .iter()
        .map(|raw| match parse_input_date(raw) {
            Some(date) => date.format(DATE_FORMAT).to_string(),
            None => raw.trim().to_string(),
        })
        .collect()
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

impl TrainingRequest {
    /// Check required fields and apply defaults
    pub fn into_session(self, settings: &Settings) -> Result<TrainingSession, ServerError> {
        let participants = extract_lines(self.participants.as_deref().unwrap_or_default());
        let raw_dates = non_blank(&self.dates);

        let (Some(company), Some(training), Some(duration), Some(location), Some(raw_dates)) = (
            non_blank(&self.company),
            non_blank(&self.training),
            non_blank(&self.duration),
            non_blank(&self.location),
            raw_dates,
        ) else {
            return Err(missing_fields());
        };
        if participants.is_empty() {
            return Err(missing_fields());
        }

        let mut seen = BTreeSet::new();
        let participants = participants
            .into_iter()
            .filter(|p| {
                let fresh = seen.insert(p.clone());
                if !fresh {
                    tracing::warn!(participant = %p, "Duplicate participant ignored");
                }
                fresh
            })
            .collect();

        Ok(TrainingSession {
            company,
            training,
            duration,
            location,
            dates: normalize_dates(&extract_lines(&raw_dates)),
            participants,
            provider: non_blank(&self.provider)
                .unwrap_or_else(|| settings.default_provider.clone()),
            signatory: non_blank(&self.signatory)
                .unwrap_or_else(|| settings.default_signatory.clone()),
        })
    }
}

fn missing_fields() -> ServerError {
    ServerError::InvalidRequest("Missing required fields.".to_string())
}

#[derive(Clone)]
pub struct TrainingBundleService {
    layout: Arc<AttestationLayout>,
}

impl TrainingBundleService {
    pub fn new(layout: Arc<AttestationLayout>) -> Self {
        Self { layout }
    }

    /// Render every participant's documents into one archive
    pub fn build(&self, session: &TrainingSession) -> Result<Vec<u8>, ServerError> {
        let template = self.layout.read_template()?;
        let (date_start, date_end) = session.date_bounds();
        let mut bundle = ZipBundle::new();

        for participant in &session.participants {
            let presence = render_presence_sheet(&PresenceSheet::new(
                &session.company,
                participant,
                &session.duration,
                &session.location,
                &session.training,
                session.dates.clone(),
            ))?;
            bundle.add_unique(
                &format!("{PRESENCE_FOLDER}/{}", presence_filename(participant)),
                &presence,
            )?;

            let (first_name, last_name) = split_full_name(participant);
            let questionnaire_name = questionnaire_filename(
                if last_name.is_empty() { &first_name } else { &last_name },
                &session.training,
            );
            let questionnaire = render_questionnaire(&QuestionnaireData {
                participant_last_name: last_name,
                participant_first_name: first_name,
                company: session.company.clone(),
                training_program: session.training.clone(),
                training_center: session.location.clone(),
                start_date: date_start.clone(),
                end_date: date_end.clone(),
            })?;
            bundle.add_unique(
                &format!("{QUESTIONNAIRE_FOLDER}/{questionnaire_name}"),
                &questionnaire,
            )?;

            let fields = session_fields(session, participant, &date_start, &date_end);
            let attestation =
                render_attestation(&map_to_attestation_fields(&fields), &self.layout, &template)?;
            bundle.add_unique(
                &format!("{ATTESTATION_FOLDER}/{}", attestation_filename(participant)),
                &attestation,
            )?;
        }

        tracing::info!(
            participants = session.participants.len(),
            files = bundle.len(),
            "Training bundle built"
        );
        Ok(bundle.finish()?)
    }
}

fn session_fields(
    session: &TrainingSession,
    participant: &str,
    date_start: &str,
    date_end: &str,
) -> FieldMap {
    [
        (SIGNATORY_NAME, session.signatory.as_str()),
        (PROVIDER_NAME, session.provider.as_str()),
        (BENEFICIARY_NAME, participant),
        (COMPANY_NAME, session.company.as_str()),
        (ACTION_TITLE, session.training.as_str()),
        (DATE_START, date_start),
        (DATE_END, date_end),
        (DURATION, session.duration.as_str()),
        (LOCATION, session.location.as_str()),
    ]
    .into_iter()
    .filter(|(_, value)| !value.is_empty())
    .map(|(key, value)| (key.to_string(), value.to_string()))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn request() -> TrainingRequest {
        TrainingRequest {
            company: Some("Société Exemple".into()),
            training: Some("Elixir avancé".into()),
            duration: Some("21 heures".into()),
            location: Some("Lyon".into()),
            dates: Some("2025-06-02, 03-06-2025\n04/06/2025".into()),
            participants: Some("Claire Petit\nPaul Henri, Claire Petit".into()),
            provider: None,
            signatory: Some("  ".into()),
        }
    }

    #[test]
    fn test_extract_lines() {
        assert_eq!(
            extract_lines(" a, b\r\n\n c ,"),
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
        assert!(extract_lines("  ,\n").is_empty());
    }

    #[test]
    fn test_normalize_dates() {
        let dates = normalize_dates(&[
            "2025-06-02".to_string(),
            "03-06-2025".to_string(),
            " 04/06/2025 ".to_string(),
            "semaine 23".to_string(),
        ]);
        assert_eq!(dates, vec!["02/06/2025", "03/06/2025", "04/06/2025", "semaine 23"]);
    }

    #[test]
    fn test_into_session_applies_defaults() {
        let session = request().into_session(&Settings::default()).unwrap();
        assert_eq!(session.participants, vec!["Claire Petit", "Paul Henri"]);
        assert_eq!(session.dates, vec!["02/06/2025", "03/06/2025", "04/06/2025"]);
        assert_eq!(session.provider, crate::settings::DEFAULT_PROVIDER);
        assert_eq!(session.signatory, crate::settings::DEFAULT_SIGNATORY);
        assert_eq!(
            session.date_bounds(),
            ("02/06/2025".to_string(), "04/06/2025".to_string())
        );
    }

    #[test]
    fn test_missing_fields_rejected() {
        for strip in 0..6 {
            let mut req = request();
            match strip {
                0 => req.company = None,
                1 => req.training = Some(" ".into()),
                2 => req.duration = None,
                3 => req.location = None,
                4 => req.dates = None,
                _ => req.participants = Some(" , ".into()),
            }
            let err = req.into_session(&Settings::default()).unwrap_err();
            assert!(matches!(err, ServerError::InvalidRequest(_)), "case {strip}");
        }
    }

    #[test]
    fn test_session_fields_skip_blank_dates() {
        let mut session = request().into_session(&Settings::default()).unwrap();
        session.dates.clear();
        let (start, end) = session.date_bounds();
        let fields = session_fields(&session, "Paul Henri", &start, &end);
        assert!(!fields.contains_key(DATE_START));
        assert_eq!(fields[BENEFICIARY_NAME], "Paul Henri");
    }

    proptest! {
        #[test]
        fn iso_dates_normalise_to_french_format(y in 1990i32..2100, m in 1u32..=12, d in 1u32..=28) {
            let iso = format!("{y:04}-{m:02}-{d:02}");
            let normalised = normalize_dates(&[iso]);
            prop_assert_eq!(&normalised[0], &format!("{d:02}/{m:02}/{y:04}"));
        }
    }
}
