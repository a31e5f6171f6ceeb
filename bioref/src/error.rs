//! Error types for bioref.

use thiserror::Error;

/// Result type for bioref operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for bioref operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Document model or semantic store error.
    #[error(transparent)]
    Core(#[from] bioref_core::Error),

    /// Configuration could not be built.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Lexicon or rule table could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
