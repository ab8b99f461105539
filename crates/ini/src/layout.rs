//! Where a server instance keeps its INI files

use asm_core::IniFile;
use std::path::{Path, PathBuf};

/// Relative path from a server install directory to its config directory
pub const SERVER_CONFIG_SUBDIR: &str = "ShooterGame/Saved/Config/WindowsServer";

/// File layout for one server instance.
///
/// Passed explicitly into the session so tests can point it anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IniLayout {
    /// Directory containing both INI files
    pub config_dir: PathBuf,
    /// File name override for `GameUserSettings.ini`
    pub game_user_settings_name: String,
    /// File name override for `Game.ini`
    pub game_name: String,
}

impl IniLayout {
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            game_user_settings_name: IniFile::GameUserSettings.file_name().to_string(),
            game_name: IniFile::Game.file_name().to_string(),
        }
    }

    /// Layout for a server installed at `install_dir`
    pub fn for_install_dir(install_dir: &Path) -> Self {
        Self::new(install_dir.join(SERVER_CONFIG_SUBDIR))
    }

    pub fn path(&self, file: IniFile) -> PathBuf {
        let name = match file {
            IniFile::GameUserSettings => &self.game_user_settings_name,
            IniFile::Game => &self.game_name,
        };
        self.config_dir.join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_dir_layout() {
        let layout = IniLayout::for_install_dir(Path::new("/srv/ark"));
        assert_eq!(
            layout.path(IniFile::Game),
            PathBuf::from("/srv/ark/ShooterGame/Saved/Config/WindowsServer/Game.ini")
        );
        assert_eq!(
            layout.path(IniFile::GameUserSettings).file_name().unwrap(),
            "GameUserSettings.ini"
        );
    }
}
