//! Satisfaction questionnaire

use serde::{Deserialize, Serialize};

use crate::canvas::{Align, Canvas, Cell, RowStyle, CM};
use crate::error::RenderError;
use crate::fonts::Font;

pub const RATING_OPTIONS: [&str; 4] = ["++", "+", "-", "--"];

const COMMENT_PROMPT: &str = "Avez-vous des commentaires à faire sur ces points ?";

/// A rated section: heading, optional prompt and the items to rate
struct Section {
    title: &'static str,
    prompt: &'static str,
    items: &'static [&'static str],
}

const SECTIONS: [Section; 3] = [
    Section {
        title: "1ère partie : l'organisation de la formation",
        prompt: "Votre avis sur le déroulement de la formation ?",
        items: &[
            "Accueil",
            "Respect des horaires",
            "Durée",
            "Logistique, prestations techniques",
        ],
    },
    Section {
        title: "2ème partie : le formateur",
        prompt: "Chez le formateur, comment évaluez-vous ?",
        items: &[
            "La maîtrise du contenu",
            "La qualité de l'écoute",
            "La clarté du message",
        ],
    },
    Section {
        title: "3ème partie : l'animation",
        prompt: "Votre avis sur l'animation de la formation ?",
        items: &[
            "Les supports",
            "Les échanges",
            "La méthode pédagogique",
            "La durée et le rythme",
        ],
    },
];

const OBJECTIVES_TITLE: &str = "4ème partie : les objectifs de la formation";
const OBJECTIVES_PROMPT: &str = "Selon vous, quels étaient les objectifs de la formation ?";
const OBJECTIVES_ITEMS: &[&str] = &["Adhériez-vous à cet objectif ?", "Vous semble-t-il atteint ?"];

const EXPECTATIONS: [&str; 4] = ["Tout à fait", "En grande partie", "A peu près", "Pas du tout"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionnaireData {
    pub participant_last_name: String,
    pub participant_first_name: String,
    pub company: String,
    pub training_program: String,
    pub training_center: String,
    pub start_date: String,
    pub end_date: String,
}

/// Split a full name into (first names, last name).
///
/// The last token is the last name. A single token is treated as a last name.
pub fn split_full_name(full_name: &str) -> (String, String) {
    let tokens: Vec<&str> = full_name.split_whitespace().collect();
    match tokens.as_slice() {
        [] => (String::new(), String::new()),
        [only] => (String::new(), only.to_string()),
        [first @ .., last] => (first.join(" "), last.to_string()),
    }
}

pub fn render_questionnaire(data: &QuestionnaireData) -> Result<Vec<u8>, RenderError> {
    let mut canvas = Canvas::a4(1.8 * CM);

    canvas.line(
        Font::Bold,
        18.0,
        Align::Center,
        "Questionnaire de satisfaction",
        22.0,
    );
    canvas.space(0.5 * CM);
    information_table(&mut canvas, data);
    canvas.space(0.4 * CM);

    for section in &SECTIONS {
        section_title(&mut canvas, section.title);
        canvas.line(Font::Bold, 12.0, Align::Left, section.prompt, 16.0);
        rating_table(&mut canvas, section.items);
        comment_area(&mut canvas);
    }

    section_title(&mut canvas, OBJECTIVES_TITLE);
    canvas.paragraph(Font::Regular, 10.0, OBJECTIVES_PROMPT);
    canvas.boxed_area(3.5 * CM);
    canvas.space(0.3 * CM);
    rating_table(&mut canvas, OBJECTIVES_ITEMS);
    comment_area(&mut canvas);

    section_title(&mut canvas, "Conclusion");
    canvas.paragraph(
        Font::Regular,
        10.0,
        "La formation a-t-elle répondu à vos attentes ?",
    );
    for option in EXPECTATIONS {
        canvas.line(Font::Regular, 10.0, Align::Left, &format!("[ ] {option}"), 16.0);
    }
    canvas.space(0.3 * CM);
    canvas.paragraph(Font::Regular, 10.0, "Note de la formation (sur 10)");
    canvas.boxed_area(1.5 * CM);
    canvas.space(0.3 * CM);
    canvas.paragraph(Font::Regular, 10.0, "Vos suggestions sont les bienvenues :");
    canvas.boxed_area(3.5 * CM);
    canvas.space(0.5 * CM);
    canvas.paragraph(
        Font::Regular,
        10.0,
        "Merci d'avoir répondu à ce questionnaire !",
    );

    tracing::debug!(
        participant = %data.participant_last_name,
        pages = canvas.page_count(),
        "Rendered questionnaire"
    );
    canvas.finish()
}

fn information_table(canvas: &mut Canvas, data: &QuestionnaireData) {
    let last_name = data.participant_last_name.to_uppercase();
    let rows = [
        ("Nom :", last_name.as_str()),
        ("Prénom :", data.participant_first_name.as_str()),
        ("Société :", data.company.as_str()),
        ("Parcours de formation :", data.training_program.as_str()),
        ("Centre d'entraînement :", data.training_center.as_str()),
        ("Date de début :", data.start_date.as_str()),
        ("Date de fin :", data.end_date.as_str()),
    ];
    let widths = [4.5 * CM, 11.0 * CM];
    let style = RowStyle {
        height: 0.7 * CM,
        grid: None,
        ..RowStyle::default()
    };
    for (index, (label, value)) in rows.into_iter().enumerate() {
        let font = if index == 0 { Font::Bold } else { Font::Regular };
        canvas.table_row(
            &widths,
            &[Cell { text: label, font }, Cell { text: value, font }],
            style,
        );
    }
}

fn section_title(canvas: &mut Canvas, title: &str) {
    canvas.space(0.2 * CM);
    canvas.ensure_space(3.0 * CM);
    canvas.line(Font::Bold, 14.0, Align::Left, title, 20.0);
}

/// Items down the left, one empty column per rating option
fn rating_table(canvas: &mut Canvas, items: &[&str]) {
    let mut widths = vec![7.0 * CM];
    widths.extend(RATING_OPTIONS.iter().map(|_| 2.5 * CM));

    let header_style = RowStyle {
        height: 0.9 * CM,
        align: Align::Center,
        fill: Some(0.937),
        fill_from: 1,
        ..RowStyle::default()
    };
    let item_style = RowStyle {
        height: 1.1 * CM,
        ..RowStyle::default()
    };

    canvas.ensure_space(header_style.height + item_style.height * items.len() as f64);
    let mut header = vec![Cell::bold("")];
    header.extend(RATING_OPTIONS.iter().map(|option| Cell::bold(option)));
    canvas.table_row(&widths, &header, header_style);

    for item in items {
        canvas.table_row(&widths, &[Cell::regular(item)], item_style);
    }
}

fn comment_area(canvas: &mut Canvas) {
    canvas.space(0.3 * CM);
    canvas.paragraph(Font::Regular, 10.0, COMMENT_PROMPT);
    canvas.boxed_area(3.0 * CM);
    canvas.space(0.5 * CM);
}
