// src/services/query.rs

//! Search query construction from keyword lists.
//!
//! Channels usually carry a ready-made query string, but a keyword list plus
//! a combining logic can be formatted into one. Multi-word phrases and
//! keywords containing operator characters are quoted so they match as exact
//! phrases.

/// How to combine multiple keywords into one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordLogic {
    And,
    Or,
}

impl KeywordLogic {
    /// Parse a logic name. Unknown values fall back to OR with a warning.
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "AND" => KeywordLogic::And,
            "OR" => KeywordLogic::Or,
            other => {
                log::warn!("Unknown keyword logic '{}'. Defaulting to OR.", other);
                KeywordLogic::Or
            }
        }
    }
}

const SPECIAL_CHARS: &[char] = &[
    '#', '@', '$', ':', '(', ')', '[', ']', '{', '}', '"', '\'',
];

/// Build a search query from keywords and combining logic.
pub fn build_query(keywords: &[String], logic: KeywordLogic) -> String {
    if keywords.is_empty() {
        return String::new();
    }

    let formatted: Vec<String> = keywords
        .iter()
        .map(|k| {
            if k.contains(' ') || k.contains(SPECIAL_CHARS) {
                format!("\"{}\"", k)
            } else {
                k.clone()
            }
        })
        .collect();

    let separator = match logic {
        KeywordLogic::And => " ",
        KeywordLogic::Or => " OR ",
    };
    formatted.join(separator)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keywords(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_keywords_yield_empty_query() {
        assert_eq!(build_query(&[], KeywordLogic::Or), "");
    }

    #[test]
    fn or_logic_joins_with_or() {
        assert_eq!(
            build_query(&keywords(&["rust", "tokio"]), KeywordLogic::Or),
            "rust OR tokio"
        );
    }

    #[test]
    fn and_logic_joins_with_space() {
        assert_eq!(
            build_query(&keywords(&["rust", "tokio"]), KeywordLogic::And),
            "rust tokio"
        );
    }

    #[test]
    fn phrases_and_operator_characters_are_quoted() {
        assert_eq!(
            build_query(&keywords(&["machine learning", "#ai", "plain"]), KeywordLogic::Or),
            "\"machine learning\" OR \"#ai\" OR plain"
        );
    }

    #[test]
    fn parse_is_case_insensitive_and_defaults_to_or() {
        assert_eq!(KeywordLogic::parse("and"), KeywordLogic::And);
        assert_eq!(KeywordLogic::parse("OR"), KeywordLogic::Or);
        assert_eq!(KeywordLogic::parse("XOR"), KeywordLogic::Or);
    }
}
