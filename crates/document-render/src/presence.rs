//! Presence sheet (feuille de présence)

use serde::{Deserialize, Serialize};

use crate::canvas::{Align, Canvas, Cell, RowStyle, CM};
use crate::error::RenderError;
use crate::fonts::Font;

pub const DEFAULT_ORGANISATION: &str = "Laurent-Serre-Développement";

const TITLE: &str = "FEUILLE DE PRESENCE";
const FULL_DAY_NOTE: &str = "*En cas de journée complète de formation, penser à remplir 2 lignes, \
     une pour le matin et une pour l'après-midi";

const HEADER: [&str; 5] = [
    "Date",
    "Durée (h)",
    "Horaires",
    "Signature Stagiaire",
    "Signature Formateur",
];
const COLUMNS_CM: [f64; 5] = [3.0, 2.0, 3.0, 4.5, 4.5];

pub const MORNING: &str = "9h-13h00";
pub const AFTERNOON: &str = "14h-18h00";
const HALF_DAY: &str = "4h";

/// Rows printed when no dates are known
pub const BLANK_ROWS: usize = 16;

const HEADER_GRAY: f64 = 0.8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceSheet {
    pub organisation: String,
    pub company: String,
    pub participant: String,
    pub duration: String,
    pub location: String,
    pub training: String,
    #[serde(default)]
    pub dates: Vec<String>,
}

impl PresenceSheet {
    pub fn new(
        company: impl Into<String>,
        participant: impl Into<String>,
        duration: impl Into<String>,
        location: impl Into<String>,
        training: impl Into<String>,
        dates: Vec<String>,
    ) -> Self {
        Self {
            organisation: DEFAULT_ORGANISATION.to_string(),
            company: company.into(),
            participant: participant.into(),
            duration: duration.into(),
            location: location.into(),
            training: training.into(),
            dates,
        }
    }

    /// Table body: one morning and one afternoon row per date
    pub fn rows(&self) -> Vec<[&str; 3]> {
        if self.dates.is_empty() {
            return (0..BLANK_ROWS)
                .map(|i| {
                    let slot = if i % 2 == 0 { MORNING } else { AFTERNOON };
                    ["", HALF_DAY, slot]
                })
                .collect();
        }
        self.dates
            .iter()
            .flat_map(|date| {
                [
                    [date.as_str(), HALF_DAY, MORNING],
                    [date.as_str(), HALF_DAY, AFTERNOON],
                ]
            })
            .collect()
    }
}

pub fn render_presence_sheet(sheet: &PresenceSheet) -> Result<Vec<u8>, RenderError> {
    let mut canvas = Canvas::a4(2.0 * CM);

    canvas.line(Font::Bold, 20.0, Align::Left, &sheet.organisation, 24.0);
    canvas.space(0.5 * CM);
    canvas.line(Font::Bold, 15.0, Align::Left, TITLE, 18.0);
    canvas.space(1.0 * CM);

    let info_widths = [4.0 * CM, 12.0 * CM];
    let info_style = RowStyle {
        grid: None,
        ..RowStyle::default()
    };
    for (label, value) in [
        ("SOCIETE", &sheet.company),
        ("ACADEMICIEN", &sheet.participant),
        ("DUREE", &sheet.duration),
        ("LIEU", &sheet.location),
        ("FORMATION", &sheet.training),
    ] {
        canvas.table_row(&info_widths, &[Cell::bold(label), Cell::regular(value)], info_style);
    }
    canvas.space(1.0 * CM);

    canvas.paragraph(Font::Italic, 10.0, FULL_DAY_NOTE);
    canvas.space(0.5 * CM);

    let widths = COLUMNS_CM.map(|w| w * CM);
    let header_style = RowStyle {
        height: 1.5 * CM,
        align: Align::Center,
        fill: Some(HEADER_GRAY),
        grid: Some(1.0),
        ..RowStyle::default()
    };
    let body_style = RowStyle {
        fill: None,
        ..header_style
    };
    let header = HEADER.map(Cell::bold);

    canvas.table_row(&widths, &header, header_style);
    for row in sheet.rows() {
        if canvas.ensure_space(body_style.height) {
            canvas.table_row(&widths, &header, header_style);
        }
        let cells = row.map(Cell::regular);
        canvas.table_row(&widths, &cells, body_style);
    }

    tracing::debug!(
        participant = %sheet.participant,
        pages = canvas.page_count(),
        "Rendered presence sheet"
    );
    canvas.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::Document;
    use pretty_assertions::assert_eq;

    fn sheet(dates: &[&str]) -> PresenceSheet {
        PresenceSheet::new(
            "Société Exemple",
            "Martin Durand",
            "14 heures",
            "Paris",
            "Formation Python",
            dates.iter().map(|d| d.to_string()).collect(),
        )
    }

    #[test]
    fn test_two_rows_per_date() {
        let sheet = sheet(&["18/12/2025", "19/12/2025"]);
        assert_eq!(
            sheet.rows(),
            vec![
                ["18/12/2025", "4h", MORNING],
                ["18/12/2025", "4h", AFTERNOON],
                ["19/12/2025", "4h", MORNING],
                ["19/12/2025", "4h", AFTERNOON],
            ]
        );
    }

    #[test]
    fn test_blank_rows_alternate_slots() {
        let sheet = sheet(&[]);
        let rows = sheet.rows();
        assert_eq!(rows.len(), BLANK_ROWS);
        assert_eq!(rows[0], ["", "4h", MORNING]);
        assert_eq!(rows[1], ["", "4h", AFTERNOON]);
        assert_eq!(rows[15], ["", "4h", AFTERNOON]);
    }

    #[test]
    fn test_renders_labels_and_values() {
        let bytes = render_presence_sheet(&sheet(&["18/12/2025"])).unwrap();
        let text = shared_pdf::extract_text(&bytes).unwrap();
        for expected in [
            DEFAULT_ORGANISATION,
            TITLE,
            "ACADEMICIEN",
            "Martin Durand",
            "Signature Stagiaire",
            "18/12/2025",
            MORNING,
            AFTERNOON,
        ] {
            assert!(text.contains(expected), "missing {expected:?}");
        }
    }

    #[test]
    fn test_long_table_repeats_header() {
        let dates: Vec<String> = (1..=12).map(|d| format!("{d:02}/03/2025")).collect();
        let refs: Vec<&str> = dates.iter().map(String::as_str).collect();
        let bytes = render_presence_sheet(&sheet(&refs)).unwrap();

        let doc = Document::load_mem(&bytes).unwrap();
        assert!(doc.get_pages().len() > 1);

        let text = shared_pdf::extract_text(&bytes).unwrap();
        assert!(text.matches("Signature Formateur").count() > 1);
    }
}
