//! In-memory INI document
//!
//! A document is an ordered list of sections; a section is an ordered list
//! of key/value entries. Duplicate keys are kept, in file order, because the
//! server uses them for repeated aggregate values and flat lists.

use crate::tokenizer::{tokenize, Line};
use std::collections::HashMap;
use std::io::{self, BufRead};

/// A raw key/value pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: String,
    pub value: String,
}

impl Entry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Split a `key=value` string on its first `=`
    pub fn parse(line: &str) -> Self {
        match line.split_once('=') {
            Some((key, value)) => Self::new(key.trim(), value),
            None => Self::new(line.trim(), ""),
        }
    }

    pub fn to_line(&self) -> String {
        format!("{}={}", self.key, self.value)
    }
}

/// True if `entry_key` is `key` itself or an indexed form `key[i]`
pub fn is_collection_key(entry_key: &str, key: &str) -> bool {
    if entry_key.eq_ignore_ascii_case(key) {
        return true;
    }
    match (entry_key.get(..key.len()), entry_key.get(key.len()..)) {
        (Some(head), Some(tail)) => head.eq_ignore_ascii_case(key) && tail.starts_with('['),
        _ => false,
    }
}

/// A named section with an occurrence index per key
#[derive(Debug, Clone, Default)]
pub struct Section {
    name: String,
    entries: Vec<Entry>,
    /// Lower-cased key -> positions in `entries`, in file order
    index: HashMap<String, Vec<usize>>,
}

impl Section {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every occurrence of `key`, in file order
    pub fn occurrences<'a>(&'a self, key: &str) -> impl Iterator<Item = &'a Entry> + 'a {
        self.index
            .get(&key.to_ascii_lowercase())
            .into_iter()
            .flatten()
            .map(move |&position| &self.entries[position])
    }

    pub fn first(&self, key: &str) -> Option<&str> {
        self.occurrences(key).next().map(|entry| entry.value.as_str())
    }

    pub fn push(&mut self, entry: Entry) {
        self.index
            .entry(entry.key.to_ascii_lowercase())
            .or_default()
            .push(self.entries.len());
        self.entries.push(entry);
    }

    /// Replace the first occurrence of `key`, or append it
    pub fn set(&mut self, key: &str, value: &str) {
        let first = self
            .index
            .get(&key.to_ascii_lowercase())
            .and_then(|positions| positions.first().copied());

        match first {
            Some(position) => self.entries[position].value = value.to_string(),
            None => self.push(Entry::new(key, value)),
        }
    }

    /// Remove every entry matching the predicate, returning how many went
    pub fn remove_where(&mut self, mut predicate: impl FnMut(&Entry) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| !predicate(entry));
        let removed = before - self.entries.len();
        if removed > 0 {
            self.reindex();
        }
        removed
    }

    /// Remove all occurrences of `key`
    pub fn remove(&mut self, key: &str) -> usize {
        self.remove_where(|entry| entry.key.eq_ignore_ascii_case(key))
    }

    /// Remove `key` together with any `key[i]` entries
    pub fn remove_collection(&mut self, key: &str) -> usize {
        self.remove_where(|entry| is_collection_key(&entry.key, key))
    }

    pub fn replace_entries(&mut self, entries: Vec<Entry>) {
        self.entries = entries;
        self.reindex();
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (position, entry) in self.entries.iter().enumerate() {
            self.index
                .entry(entry.key.to_ascii_lowercase())
                .or_default()
                .push(position);
        }
    }
}

/// A whole INI file
#[derive(Debug, Clone, Default)]
pub struct IniDocument {
    /// Entries that appear before the first header live in a section named ""
    sections: Vec<Section>,
}

impl IniDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse document text
    pub fn parse(text: &str) -> Self {
        Self::from_lines(text.lines().map(Line::classify))
    }

    /// Read and parse a document from a reader
    pub fn from_reader<R: BufRead>(reader: R) -> io::Result<Self> {
        let lines = tokenize(reader).collect::<io::Result<Vec<Line>>>()?;
        Ok(Self::from_lines(lines))
    }

    fn from_lines(lines: impl IntoIterator<Item = Line>) -> Self {
        let mut document = Self::new();
        let mut current: Option<usize> = None;

        for line in lines {
            match line {
                Line::Blank | Line::Comment(_) => {}
                Line::SectionHeader(name) => {
                    // Repeated headers fold into the first section of that name.
                    current = Some(document.ensure_section(&name));
                }
                Line::Value { key, value } => {
                    let position = match current {
                        Some(position) => position,
                        None => {
                            let position = document.ensure_section("");
                            current = Some(position);
                            position
                        }
                    };
                    document.sections[position].push(Entry { key, value });
                }
            }
        }

        document
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections
            .iter()
            .find(|section| section.name.eq_ignore_ascii_case(name))
    }

    pub fn section_mut(&mut self, name: &str) -> Option<&mut Section> {
        self.sections
            .iter_mut()
            .find(|section| section.name.eq_ignore_ascii_case(name))
    }

    /// Position of the named section, appending an empty one if absent
    fn ensure_section(&mut self, name: &str) -> usize {
        match self
            .sections
            .iter()
            .position(|section| section.name.eq_ignore_ascii_case(name))
        {
            Some(position) => position,
            None => {
                self.sections.push(Section::new(name));
                self.sections.len() - 1
            }
        }
    }

    pub fn section_or_insert(&mut self, name: &str) -> &mut Section {
        let position = self.ensure_section(name);
        &mut self.sections[position]
    }

    /// Names of all named sections, in file order
    pub fn section_names(&self) -> Vec<String> {
        self.sections
            .iter()
            .filter(|section| !section.name.is_empty())
            .map(|section| section.name.clone())
            .collect()
    }

    /// Every entry of a section as `key=value` strings; empty if absent
    pub fn read_section(&self, name: &str) -> Vec<String> {
        self.section(name)
            .map(|section| section.entries.iter().map(Entry::to_line).collect())
            .unwrap_or_default()
    }

    /// Replace a section's entries, keeping its position if it exists
    pub fn write_section<S: AsRef<str>>(&mut self, name: &str, values: &[S]) {
        let entries = values.iter().map(|line| Entry::parse(line.as_ref())).collect();
        self.section_or_insert(name).replace_entries(entries);
    }

    /// First value of `key`, or an empty string
    pub fn read_value(&self, section: &str, key: &str) -> String {
        self.section(section)
            .and_then(|section| section.first(key))
            .unwrap_or_default()
            .to_string()
    }

    /// Set `key`, or delete every occurrence when `value` is `None`
    pub fn write_key(&mut self, section: &str, key: &str, value: Option<&str>) {
        match value {
            Some(value) => self.section_or_insert(section).set(key, value),
            None => {
                if let Some(section) = self.section_mut(section) {
                    section.remove(key);
                }
            }
        }
    }

    /// Render the document back to text
    pub fn render(&self) -> String {
        let mut out = String::new();

        for section in &self.sections {
            if section.name.is_empty() && section.entries.is_empty() {
                continue;
            }
            if !out.is_empty() {
                out.push('\n');
            }
            if !section.name.is_empty() {
                out.push('[');
                out.push_str(&section.name);
                out.push_str("]\n");
            }
            for entry in &section.entries {
                out.push_str(&entry.key);
                out.push('=');
                out.push_str(&entry.value);
                out.push('\n');
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[ServerSettings]
DifficultyOffset=0.2
PerLevelStatsMultiplier_Player[0]=1.5
PerLevelStatsMultiplier_Player[7]=2

; comment
[/script/shootergame.shootergamemode]
OverridePlayerLevelEngramPoints=5
OverridePlayerLevelEngramPoints=7
bDisableStructurePlacementCollision=True
"#;

    #[test]
    fn test_parse_keeps_duplicates_in_order() {
        let doc = IniDocument::parse(SAMPLE);
        assert_eq!(
            doc.read_section("/Script/ShooterGame.ShooterGameMode"),
            vec![
                "OverridePlayerLevelEngramPoints=5",
                "OverridePlayerLevelEngramPoints=7",
                "bDisableStructurePlacementCollision=True",
            ]
        );
        let section = doc.section("/script/shootergame.shootergamemode").unwrap();
        let values: Vec<&str> = section
            .occurrences("overrideplayerlevelengrampoints")
            .map(|e| e.value.as_str())
            .collect();
        assert_eq!(values, vec!["5", "7"]);
    }

    #[test]
    fn test_missing_section_reads_empty() {
        let doc = IniDocument::parse(SAMPLE);
        assert!(doc.read_section("MessageOfTheDay").is_empty());
        assert_eq!(doc.read_value("MessageOfTheDay", "Message"), "");
        assert_eq!(doc.read_value("ServerSettings", "Missing"), "");
        assert_eq!(doc.read_value("serversettings", "difficultyoffset"), "0.2");
    }

    #[test]
    fn test_write_section_keeps_position() {
        let mut doc = IniDocument::parse(SAMPLE);
        doc.write_section("ServerSettings", &["A=1", "B=2"]);
        assert_eq!(doc.section_names()[0], "ServerSettings");
        assert_eq!(doc.read_section("ServerSettings"), vec!["A=1", "B=2"]);

        doc.write_section("Custom", &["X=(a=1,b=2)"]);
        assert_eq!(doc.section_names().last().unwrap(), "Custom");
        assert_eq!(doc.read_value("Custom", "X"), "(a=1,b=2)");
    }

    #[test]
    fn test_write_key_replaces_first_or_appends() {
        let mut doc = IniDocument::parse(SAMPLE);
        doc.write_key(
            "/script/shootergame.shootergamemode",
            "OverridePlayerLevelEngramPoints",
            Some("9"),
        );
        assert_eq!(
            doc.read_section("/script/shootergame.shootergamemode")[..2],
            ["OverridePlayerLevelEngramPoints=9", "OverridePlayerLevelEngramPoints=7"]
        );

        doc.write_key("SessionSettings", "SessionName", Some("Island"));
        assert_eq!(doc.read_value("SessionSettings", "SessionName"), "Island");
    }

    #[test]
    fn test_write_key_none_deletes_all() {
        let mut doc = IniDocument::parse(SAMPLE);
        doc.write_key(
            "/script/shootergame.shootergamemode",
            "OverridePlayerLevelEngramPoints",
            None,
        );
        assert_eq!(
            doc.read_section("/script/shootergame.shootergamemode"),
            vec!["bDisableStructurePlacementCollision=True"]
        );
        // Deleting from a missing section is a no-op.
        doc.write_key("Nowhere", "Key", None);
        assert!(doc.section("Nowhere").is_none());
    }

    #[test]
    fn test_remove_collection_matches_indexed_keys_only() {
        let mut doc = IniDocument::parse(SAMPLE);
        doc.section_or_insert("ServerSettings")
            .push(Entry::new("PerLevelStatsMultiplier_PlayerExtra", "1"));
        let removed = doc
            .section_mut("ServerSettings")
            .unwrap()
            .remove_collection("PerLevelStatsMultiplier_Player");
        assert_eq!(removed, 2);
        assert_eq!(
            doc.read_section("ServerSettings"),
            vec!["DifficultyOffset=0.2", "PerLevelStatsMultiplier_PlayerExtra=1"]
        );
    }

    #[test]
    fn test_collection_key_matching() {
        assert!(is_collection_key("Key", "key"));
        assert!(is_collection_key("Key[3]", "Key"));
        assert!(!is_collection_key("KeyOther", "Key"));
        assert!(!is_collection_key("Ke", "Key"));
    }

    #[test]
    fn test_render_round_trip() {
        let doc = IniDocument::parse(SAMPLE);
        let rendered = doc.render();
        assert!(rendered.starts_with("[ServerSettings]\nDifficultyOffset=0.2\n"));
        let reparsed = IniDocument::parse(&rendered);
        for name in doc.section_names() {
            assert_eq!(reparsed.read_section(&name), doc.read_section(&name));
        }
    }

    #[test]
    fn test_leading_entries_and_repeated_headers() {
        let doc = IniDocument::parse("Orphan=1\n[A]\nx=1\n[B]\ny=2\n[a]\nz=3\n");
        assert_eq!(doc.section_names(), vec!["A", "B"]);
        assert_eq!(doc.read_section("A"), vec!["x=1", "z=3"]);
        assert_eq!(doc.read_section(""), vec!["Orphan=1"]);
        assert!(doc.render().starts_with("Orphan=1\n\n[A]\n"));
    }
}
