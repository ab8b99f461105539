//! Line tokenizer
//!
//! Classifies raw text lines. Never fails on content: anything that is not
//! blank, a comment or a section header becomes a key/value line.

use std::io::{self, BufRead};

/// One physical line of an INI file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Blank,
    Comment(String),
    SectionHeader(String),
    Value { key: String, value: String },
}

impl Line {
    pub fn classify(raw: &str) -> Self {
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Line::Blank;
        }

        if trimmed.len() >= 2 && trimmed.starts_with('[') && trimmed.ends_with(']') {
            return Line::SectionHeader(trimmed[1..trimmed.len() - 1].trim().to_string());
        }

        if trimmed.starts_with('#') || trimmed.starts_with(';') {
            return Line::Comment(trimmed.to_string());
        }

        // Only the key is trimmed; the value is kept exactly as written.
        match raw.trim_start().split_once('=') {
            Some((key, value)) => Line::Value {
                key: key.trim().to_string(),
                value: value.to_string(),
            },
            None => Line::Value {
                key: trimmed.to_string(),
                value: String::new(),
            },
        }
    }
}

/// Lazily tokenize every line of a reader.
///
/// Single pass; a UTF-8 byte order mark on the first line is dropped.
pub fn tokenize<R: BufRead>(reader: R) -> impl Iterator<Item = io::Result<Line>> {
    let mut first = true;
    reader.lines().map(move |line| {
        line.map(|raw| {
            let text = if std::mem::take(&mut first) {
                raw.strip_prefix('\u{feff}').unwrap_or(&raw)
            } else {
                &raw
            };
            Line::classify(text)
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(key: &str, value: &str) -> Line {
        Line::Value {
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn test_classify_kinds() {
        assert_eq!(Line::classify("   "), Line::Blank);
        assert_eq!(Line::classify("; note"), Line::Comment("; note".into()));
        assert_eq!(Line::classify("# note"), Line::Comment("# note".into()));
        assert_eq!(
            Line::classify(" [ServerSettings] "),
            Line::SectionHeader("ServerSettings".into())
        );
        assert_eq!(Line::classify("MaxPlayers=70"), value("MaxPlayers", "70"));
    }

    #[test]
    fn test_value_splits_on_first_equals() {
        assert_eq!(
            Line::classify("DinoClassDamageMultipliers=(ClassName=\"Rex_C\",Multiplier=2.0)"),
            value("DinoClassDamageMultipliers", "(ClassName=\"Rex_C\",Multiplier=2.0)")
        );
    }

    #[test]
    fn test_value_whitespace_is_kept() {
        assert_eq!(Line::classify("  Message =  Hello  "), value("Message", "  Hello  "));
        assert_eq!(Line::classify("Port="), value("Port", ""));
    }

    #[test]
    fn test_malformed_lines_degrade_to_values() {
        assert_eq!(Line::classify("NoEqualsHere"), value("NoEqualsHere", ""));
        assert_eq!(Line::classify("[Unclosed"), value("[Unclosed", ""));
        assert_eq!(Line::classify("=orphan"), value("", "orphan"));
    }

    #[test]
    fn test_tokenize_reader() {
        let text = "\u{feff}[SessionSettings]\nSessionName=My Ark\n\n; trailing\n";
        let lines: Vec<Line> = tokenize(text.as_bytes()).collect::<io::Result<_>>().unwrap();
        assert_eq!(
            lines,
            vec![
                Line::SectionHeader("SessionSettings".into()),
                value("SessionName", "My Ark"),
                Line::Blank,
                Line::Comment("; trailing".into()),
            ]
        );
    }
}
