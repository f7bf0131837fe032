//! Error types for the piano view

use thiserror::Error;

/// Result type alias for piano view operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the piano view and its demo host
#[derive(Debug, Error)]
pub enum Error {
    /// Key count outside the supported range
    #[error(
        "numberOfKeys must be between {min} and {max} (both inclusive). Actual numberOfKeys: {actual}"
    )]
    InvalidNumberOfKeys {
        actual: usize,
        min: usize,
        max: usize,
    },

    /// Black key scale outside the supported range
    #[error("{name} must be between {min} and {max} (both inclusive). Actual {name}: {actual}")]
    InvalidScale {
        name: &'static str,
        actual: f32,
        min: f32,
        max: f32,
    },

    /// Unparseable color string
    #[error("Invalid color: {0:?}")]
    InvalidColor(String),

    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}
