//! Profile errors

use asm_core::AsmError;
use asm_ini::IniError;
use asm_settings::SettingsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Ini(#[from] IniError),

    #[error("Failed to read profile metadata {path:?}: {source}")]
    MetadataRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write profile metadata {path:?}: {source}")]
    MetadataWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid profile metadata {path:?}: {source}")]
    MetadataFormat {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl From<ProfileError> for AsmError {
    fn from(err: ProfileError) -> Self {
        AsmError::Profile(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ProfileError>;
