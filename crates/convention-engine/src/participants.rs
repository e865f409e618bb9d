//! Participant list from the "Article 3 – Participants" section

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref PARTICIPANTS_SECTION: Regex =
        Regex::new(r"(?is)Article\s+3\s+[–-]\s+Participants(.*?)(Article\s+4|$)").unwrap();
    static ref NAME_SEPARATOR: Regex = Regex::new(r"(?i),|;|\s+et\s+").unwrap();
}

const BULLET: char = '•';
const MAX_NAME_CHARS: usize = 60;

/// Names listed in the participants section, in order of appearance.
///
/// Only bullet lines (or lines repeating "Participants") are read. A
/// candidate needs at least two words and at most 60 characters. Duplicates
/// are kept.
pub fn extract_participants(text: &str) -> Vec<String> {
    let normalized = text.replace("\r\n", "\n");
    let Some(caps) = PARTICIPANTS_SECTION.captures(&normalized) else {
        return Vec::new();
    };
    let block = caps.get(1).map_or("", |m| m.as_str());

    let mut names = Vec::new();
    for line in block.lines() {
        let has_bullet = line.contains(BULLET);
        if !has_bullet && !line.contains("Participants") {
            continue;
        }

        let content = match line.split_once(BULLET) {
            Some((_, after)) => after,
            None => line,
        };
        let content = content.trim_matches(|c: char| matches!(c, ' ' | '.' | ';' | ':'));
        if content.is_empty() {
            continue;
        }

        for part in NAME_SEPARATOR.split(content) {
            let candidate = part.trim();
            if candidate.split_whitespace().count() >= 2
                && candidate.chars().count() <= MAX_NAME_CHARS
            {
                names.push(candidate.to_string());
            }
        }
    }

    tracing::debug!(count = names.len(), "Extracted participants");
    names
}
