//! Error types for Tempo

use thiserror::Error;

/// The main error type for Tempo operations
#[derive(Debug, Error)]
pub enum TempoError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("The {0} object was used after being disposed")]
    Disposed(&'static str),

    #[error("Platform error: {0}")]
    Platform(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("Hook error: {0}")]
    Hook(String),
}

/// Result type alias for Tempo operations
pub type Result<T> = std::result::Result<T, TempoError>;

impl From<toml::de::Error> for TempoError {
    fn from(err: toml::de::Error) -> Self {
        TempoError::TomlParse(err.to_string())
    }
}
