//! Core error types for ASM

#[derive(thiserror::Error, Debug)]
pub enum AsmError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid {expected} value: {value:?}")]
    InvalidScalar { value: String, expected: &'static str },

    #[error("INI error: {0}")]
    Ini(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Profile error: {0}")]
    Profile(String),
}

pub type Result<T> = std::result::Result<T, AsmError>;
