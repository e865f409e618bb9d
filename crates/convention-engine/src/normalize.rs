//! Text normalisation for line-oriented matching

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}

/// Split text into whitespace-collapsed, trimmed, non-empty lines.
///
/// Line order is preserved.
pub fn normalize_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| WHITESPACE_RUN.replace_all(line, " ").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_collapses_and_drops_blank_lines() {
        let text = "  CONVENTION   DE\tFORMATION \n\n   \nClient :   Super  Client\r\n";
        assert_eq!(
            normalize_lines(text),
            vec!["CONVENTION DE FORMATION", "Client : Super Client"]
        );
    }

    #[test]
    fn test_empty_text() {
        assert!(normalize_lines("").is_empty());
        assert!(normalize_lines("\n \n\t\n").is_empty());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn lines_are_clean(text in "[a-zA-Z :\t\n]{0,200}") {
            for line in normalize_lines(&text) {
                prop_assert!(!line.is_empty());
                prop_assert_eq!(line.trim(), line.as_str());
                prop_assert!(!line.contains("  "));
                prop_assert!(!line.contains('\t'));
            }
        }

        #[test]
        fn order_is_preserved(words in prop::collection::vec("[a-z]{1,8}", 1..20)) {
            let text = words.join("\n\n");
            prop_assert_eq!(normalize_lines(&text), words);
        }
    }
}
