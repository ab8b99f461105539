//! Error types for the settings codec and binding layer

use asm_core::AsmError;
use asm_ini::IniError;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// Aggregate value text does not follow the paren/comma grammar
    #[error("Malformed value for {key}: {reason} (at offset {offset})")]
    MalformedAggregate {
        key: String,
        reason: String,
        offset: usize,
    },

    /// A scalar could not be converted to the field's type
    #[error("Invalid {expected} for {key}: {value:?}")]
    InvalidScalar {
        key: String,
        value: String,
        expected: &'static str,
    },

    /// A field held a list/record where a scalar was expected, or vice versa
    #[error("Field {key} expected {expected}")]
    UnexpectedShape { key: String, expected: &'static str },

    /// A binding declares a flag that has no meaning for its property type
    #[error("Unsupported {kind} property for key {key} in section {section}")]
    UnsupportedProperty {
        kind: &'static str,
        key: String,
        section: String,
    },

    #[error(transparent)]
    Ini(#[from] IniError),

    #[error(transparent)]
    Core(AsmError),
}

impl SettingsError {
    /// Attach a key to a core scalar parse failure
    pub fn scalar(key: &str, err: AsmError) -> Self {
        match err {
            AsmError::InvalidScalar { value, expected } => SettingsError::InvalidScalar {
                key: key.to_string(),
                value,
                expected,
            },
            other => SettingsError::Core(other),
        }
    }
}

impl From<SettingsError> for AsmError {
    fn from(err: SettingsError) -> Self {
        AsmError::Settings(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SettingsError>;
