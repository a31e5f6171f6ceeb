//! Error types for bioref-core.

use thiserror::Error;

/// Result type for bioref-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for bioref-core operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A span does not fit the document text or is inverted.
    #[error("Invalid span [{start}, {end}): {reason}")]
    InvalidSpan {
        /// Start offset
        start: usize,
        /// End offset
        end: usize,
        /// What is wrong with it
        reason: String,
    },

    /// Textual unit handle not present in the document.
    #[error("Unknown textual unit: {0}")]
    UnknownUnit(usize),

    /// Semantic item handle not present (or already removed).
    #[error("Unknown semantic item: {0}")]
    UnknownItem(String),

    /// Upstream data contract violation (self-loop, malformed relation, ...).
    #[error("Structural invariant violated: {0}")]
    Structural(String),
}

impl Error {
    /// Create an invalid input error.
    #[must_use]
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an invalid span error.
    #[must_use]
    pub fn invalid_span(start: usize, end: usize, reason: impl Into<String>) -> Self {
        Self::InvalidSpan {
            start,
            end,
            reason: reason.into(),
        }
    }

    /// Create an unknown item error.
    #[must_use]
    pub fn unknown_item(id: impl std::fmt::Display) -> Self {
        Self::UnknownItem(id.to_string())
    }

    /// Create a structural invariant error.
    #[must_use]
    pub fn structural(msg: impl Into<String>) -> Self {
        Self::Structural(msg.into())
    }
}
