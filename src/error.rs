//! Error types for afet.

use thiserror::Error;

/// Result type for afet operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for afet operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Invalid input provided (length mismatch, empty input, out-of-range
    /// probability, too few thresholds, unknown group).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Labels or predictions outside the binary {0, 1} domain.
    #[error("Unsupported label: {0}")]
    UnsupportedLabel(String),

    /// Configuration could not be parsed or failed validation.
    #[error("Config error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Create an unsupported label error.
    pub fn unsupported_label(msg: impl Into<String>) -> Self {
        Error::UnsupportedLabel(msg.into())
    }

    /// Create a config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }
}
