//! Output file names

use std::collections::BTreeSet;

use unicode_normalization::UnicodeNormalization;

pub const DEFAULT_BENEFICIARY: &str = "beneficiaire";

const MAX_STEM_CHARS: usize = 60;

/// Keep letters, digits, `-` and `_`. Everything else becomes a single `_`.
pub fn sanitize_filename(value: &str, fallback: &str) -> String {
    let mut cleaned = String::with_capacity(value.len());
    for c in value.trim().chars() {
        let c = if c.is_alphanumeric() || c == '-' || c == '_' {
            c
        } else {
            '_'
        };
        if c == '_' && cleaned.ends_with('_') {
            continue;
        }
        cleaned.push(c);
    }

    let cleaned = cleaned.trim_matches('_');
    let stem = if cleaned.is_empty() { fallback } else { cleaned };
    stem.chars().take(MAX_STEM_CHARS).collect()
}

pub fn attestation_filename(beneficiary: &str) -> String {
    format!(
        "attestation_{}.pdf",
        sanitize_filename(beneficiary, DEFAULT_BENEFICIARY)
    )
}

pub fn presence_filename(participant: &str) -> String {
    format!(
        "Feuille_de_presence_{}.pdf",
        sanitize_filename(participant, DEFAULT_BENEFICIARY)
    )
}

/// `Questionnaire_<participant>_<program>.pdf` folded to lowercase ASCII
pub fn questionnaire_filename(participant: &str, program: &str) -> String {
    let participant = if participant.is_empty() {
        "participant"
    } else {
        participant
    };
    let program = if program.is_empty() { "formation" } else { program };

    let folded: String = format!("{participant}_{program}")
        .nfkd()
        .filter(char::is_ascii)
        .collect::<String>()
        .to_lowercase();

    let mut stem = String::with_capacity(folded.len());
    for c in folded.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            stem.push(c);
        } else if !stem.ends_with('_') {
            stem.push('_');
        }
    }
    let stem = stem.trim_matches('_');
    let stem = if stem.is_empty() { "questionnaire" } else { stem };
    format!("Questionnaire_{stem}.pdf")
}

/// `path` itself when free, else the first of `stem_2.ext`, `stem_3.ext`...
/// not in `taken`
pub fn unique_filename(path: &str, taken: &BTreeSet<String>) -> String {
    let mut candidate = path.to_string();
    let mut counter = 1;
    while taken.contains(&candidate) {
        counter += 1;
        candidate = numbered(path, counter);
    }
    candidate
}

fn numbered(path: &str, counter: usize) -> String {
    let (dir, file) = match path.rfind('/') {
        Some(slash) => path.split_at(slash + 1),
        None => ("", path),
    };
    match file.rfind('.') {
        Some(dot) if dot > 0 => format!("{dir}{}_{counter}{}", &file[..dot], &file[dot..]),
        _ => format!("{dir}{file}_{counter}"),
    }
}
