//! Error types for the INI store

use asm_core::AsmError;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum IniError {
    /// File exists but could not be read
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// File could not be written during flush
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A flush task panicked or was cancelled
    #[error("Flush task failed: {0}")]
    Flush(String),
}

impl From<IniError> for AsmError {
    fn from(err: IniError) -> Self {
        AsmError::Ini(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, IniError>;
