//! Passthrough for sections the settings model does not know about
//!
//! Any section whose name is not in the known section table is carried as
//! opaque `key=value` lines and written back verbatim, in the same order.

use crate::error::Result;
use asm_core::{IniFile, IniSection};
use asm_ini::{Entry, IniSession};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct CustomSection {
    pub file: IniFile,
    pub name: String,
    pub entries: Vec<Entry>,
}

impl CustomSection {
    pub fn new(file: IniFile, name: impl Into<String>) -> Self {
        Self {
            file,
            name: name.into(),
            entries: Vec::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.key.eq_ignore_ascii_case(key))
            .map(|entry| entry.value.as_str())
    }

    /// Replace the first `key`, or append it
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self
            .entries
            .iter_mut()
            .find(|entry| entry.key.eq_ignore_ascii_case(key))
        {
            Some(entry) => entry.value = value,
            None => self.entries.push(Entry::new(key, value)),
        }
    }

    fn lines(&self) -> Vec<String> {
        self.entries.iter().map(Entry::to_line).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomSections {
    sections: Vec<CustomSection>,
}

impl CustomSections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect every unknown section of `files`, in file order
    pub fn load(session: &IniSession, files: &[IniFile]) -> Result<Self> {
        let mut sections = Vec::new();
        for &file in files {
            for name in session.section_names(file)? {
                // Entries ahead of the first header are not a section.
                if name.is_empty() || IniSection::from_name(file, &name).is_some() {
                    continue;
                }
                let entries = session
                    .read_section(file, &name)?
                    .iter()
                    .map(|line| Entry::parse(line))
                    .collect();
                sections.push(CustomSection {
                    file,
                    name,
                    entries,
                });
            }
        }
        debug!("Loaded {} custom section(s)", sections.len());
        Ok(Self { sections })
    }

    pub fn save(&self, session: &IniSession) -> Result<()> {
        for section in &self.sections {
            session.write_section(section.file, &section.name, &section.lines())?;
        }
        Ok(())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CustomSection> {
        self.sections.iter()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn get(&self, file: IniFile, name: &str) -> Option<&CustomSection> {
        self.sections
            .iter()
            .find(|section| section.file == file && section.name.eq_ignore_ascii_case(name))
    }

    /// The named section, created empty if missing
    pub fn get_or_insert(&mut self, file: IniFile, name: &str) -> &mut CustomSection {
        let position = self
            .sections
            .iter()
            .position(|section| section.file == file && section.name.eq_ignore_ascii_case(name));
        match position {
            Some(position) => &mut self.sections[position],
            None => {
                self.sections.push(CustomSection::new(file, name));
                let last = self.sections.len() - 1;
                &mut self.sections[last]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use asm_ini::IniLayout;
    use std::fs;

    const GUS: &str = "[ServerSettings]\nMaxPlayers=70\n\n[MyMod]\nZeta=1\nAlpha=(A=1,B=2)\nBanner=  Welcome home  \nZeta=2\n\n[/Script/Engine.GameSession]\nMaxPlayers=70\n";

    #[tokio::test]
    async fn test_unknown_sections_pass_through() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("GameUserSettings.ini"), GUS).unwrap();

        let session = IniSession::new(IniLayout::new(temp_dir.path()));
        let custom = CustomSections::load(&session, &IniFile::ALL).unwrap();
        assert_eq!(custom.len(), 1);
        let section = custom.get(IniFile::GameUserSettings, "mymod").unwrap();
        assert_eq!(section.get("zeta"), Some("1"));

        let output_dir = tempfile::tempdir().unwrap();
        let fresh = IniSession::new(IniLayout::new(output_dir.path()));
        custom.save(&fresh).unwrap();
        fresh.flush().await.unwrap();

        let written = fs::read_to_string(output_dir.path().join("GameUserSettings.ini")).unwrap();
        assert_eq!(
            written,
            "[MyMod]\nZeta=1\nAlpha=(A=1,B=2)\nBanner=  Welcome home  \nZeta=2\n"
        );
    }

    #[test]
    fn test_get_or_insert() {
        let mut custom = CustomSections::new();
        custom
            .get_or_insert(IniFile::Game, "Extra")
            .set("Key", "1");
        custom.get_or_insert(IniFile::Game, "EXTRA").set("key", "2");
        assert_eq!(custom.len(), 1);
        assert_eq!(custom.get(IniFile::Game, "extra").unwrap().get("Key"), Some("2"));
        assert!(custom.get(IniFile::GameUserSettings, "Extra").is_none());
    }
}
