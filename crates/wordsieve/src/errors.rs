//! # Error Types

use std::fmt::Display;

/// Errors from wordsieve operations.
#[derive(Debug, thiserror::Error)]
pub enum WordsieveError {
    /// A record in one of the input formats could not be parsed.
    #[error("malformed input ({location}): {message}")]
    MalformedInput {
        /// Where the record was found; usually `path:line` or `path#record`.
        location: String,

        /// What was wrong with it.
        message: String,
    },

    /// No token in the frequency list has embedding coverage.
    #[error("insufficient coverage: {requested} tokens requested, none have embeddings")]
    InsufficientCoverage {
        /// The requested selection size.
        requested: usize,
    },

    /// A configuration value failed validation.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Error from an external component.
    #[error("{0}")]
    External(String),
}

impl WordsieveError {
    /// Build a [`WordsieveError::MalformedInput`].
    pub fn malformed<L: Display, M: Display>(
        location: L,
        message: M,
    ) -> Self {
        Self::MalformedInput {
            location: location.to_string(),
            message: message.to_string(),
        }
    }

    /// Is this a [`WordsieveError::MalformedInput`]?
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedInput { .. })
    }
}

/// Result type for wordsieve operations.
pub type WSResult<T> = core::result::Result<T, WordsieveError>;
