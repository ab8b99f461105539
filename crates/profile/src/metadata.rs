//! Profile metadata file
//!
//! Settings that never reach the server's INI files (where the server is
//! installed, which map it runs, how it is launched) live in a JSON file
//! next to the profile.

use crate::error::{ProfileError, Result};
use asm_ini::IniLayout;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProfileMetadata {
    pub profile_name: String,
    /// Server install root; the INI files live under it
    pub install_directory: PathBuf,
    pub server_map: String,
    pub server_ip: String,
    /// Extra command line arguments for the server process
    pub additional_args: String,
    pub auto_restart: bool,
    pub enable_backups: bool,
    pub backup_directory: Option<PathBuf>,
}

impl Default for ProfileMetadata {
    fn default() -> Self {
        Self {
            profile_name: "Default".into(),
            install_directory: PathBuf::new(),
            server_map: "TheIsland".into(),
            server_ip: String::new(),
            additional_args: String::new(),
            auto_restart: false,
            enable_backups: true,
            backup_directory: None,
        }
    }
}

impl ProfileMetadata {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| ProfileError::MetadataRead {
            path: path.to_path_buf(),
            source,
        })?;
        let metadata = serde_json::from_str(&content).map_err(|source| ProfileError::MetadataFormat {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded profile metadata from {:?}", path);
        Ok(metadata)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self).map_err(|source| ProfileError::MetadataFormat {
            path: path.to_path_buf(),
            source,
        })?;
        let write = |path: &Path| -> std::io::Result<()> {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, content.as_bytes())
        };
        write(path).map_err(|source| ProfileError::MetadataWrite {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Saved profile metadata to {:?}", path);
        Ok(())
    }

    /// Where this profile's INI files live
    pub fn layout(&self) -> IniLayout {
        IniLayout::for_install_dir(&self.install_directory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("profiles/island.json");

        let metadata = ProfileMetadata {
            profile_name: "Island".into(),
            install_directory: temp_dir.path().join("server"),
            ..Default::default()
        };
        metadata.save(&path).unwrap();
        assert_eq!(ProfileMetadata::load(&path).unwrap(), metadata);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("partial.json");
        fs::write(&path, r#"{ "profileName": "Partial" }"#).unwrap();

        let metadata = ProfileMetadata::load(&path).unwrap();
        assert_eq!(metadata.profile_name, "Partial");
        assert_eq!(metadata.server_map, "TheIsland");
    }

    #[test]
    fn test_bad_json_is_reported() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            ProfileMetadata::load(&path),
            Err(ProfileError::MetadataFormat { .. })
        ));
    }

    #[test]
    fn test_layout_points_at_server_config() {
        let metadata = ProfileMetadata {
            install_directory: PathBuf::from("/srv/ark"),
            ..Default::default()
        };
        assert!(metadata
            .layout()
            .config_dir
            .ends_with("ShooterGame/Saved/Config/WindowsServer"));
    }
}
