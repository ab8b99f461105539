//! Core type definitions

use std::fmt;

/// One of the two INI files read by a server instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IniFile {
    /// Server and session settings
    GameUserSettings,
    /// Game-mode settings
    Game,
}

impl IniFile {
    pub const ALL: [IniFile; 2] = [IniFile::GameUserSettings, IniFile::Game];

    pub fn file_name(&self) -> &'static str {
        match self {
            Self::GameUserSettings => "GameUserSettings.ini",
            Self::Game => "Game.ini",
        }
    }
}

impl fmt::Display for IniFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// Sections the settings model binds properties to.
///
/// A value's location is a (file, section) pair; every known section lives
/// in exactly one file. Anything not listed here is a custom section and is
/// carried through load/save untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IniSection {
    ServerSettings,
    SessionSettings,
    GameSession,
    MessageOfTheDay,
    MultiHome,
    ShooterGameUserSettings,
    ScalabilityGroups,
    ShooterGameMode,
}

impl IniSection {
    pub const ALL: [IniSection; 8] = [
        IniSection::ServerSettings,
        IniSection::SessionSettings,
        IniSection::GameSession,
        IniSection::MessageOfTheDay,
        IniSection::MultiHome,
        IniSection::ShooterGameUserSettings,
        IniSection::ScalabilityGroups,
        IniSection::ShooterGameMode,
    ];

    /// Section header as written in the file
    pub fn name(&self) -> &'static str {
        match self {
            Self::ServerSettings => "ServerSettings",
            Self::SessionSettings => "SessionSettings",
            Self::GameSession => "/Script/Engine.GameSession",
            Self::MessageOfTheDay => "MessageOfTheDay",
            Self::MultiHome => "MultiHome",
            Self::ShooterGameUserSettings => "/Script/ShooterGame.ShooterGameUserSettings",
            Self::ScalabilityGroups => "ScalabilityGroups",
            Self::ShooterGameMode => "/script/shootergame.shootergamemode",
        }
    }

    pub fn file(&self) -> IniFile {
        match self {
            Self::ShooterGameMode => IniFile::Game,
            _ => IniFile::GameUserSettings,
        }
    }

    /// Look up a known section by header name (case-insensitive)
    pub fn from_name(file: IniFile, name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|section| section.file() == file && section.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for IniSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_lookup_ignores_case() {
        assert_eq!(
            IniSection::from_name(IniFile::Game, "/Script/ShooterGame.ShooterGameMode"),
            Some(IniSection::ShooterGameMode)
        );
        assert_eq!(
            IniSection::from_name(IniFile::GameUserSettings, "serversettings"),
            Some(IniSection::ServerSettings)
        );
    }

    #[test]
    fn test_section_lookup_respects_file() {
        assert_eq!(IniSection::from_name(IniFile::Game, "ServerSettings"), None);
        assert_eq!(IniSection::from_name(IniFile::GameUserSettings, "Custom"), None);
    }
}
