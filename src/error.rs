//! Error types for sectionrank.

use std::io;
use thiserror::Error;

/// Result type alias for sectionrank operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while segmenting, scoring and extracting.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading block files, lexicons or configuration.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A document's text block sequence is malformed.
    ///
    /// Isolated to the failing document; the batch continues without it.
    #[error("Invalid input for document '{document_id}': {message}")]
    Input {
        /// Document the blocks belong to
        document_id: String,
        /// What was wrong with the blocks
        message: String,
    },

    /// The engine configuration is invalid.
    ///
    /// Raised before any document is processed.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The rich tokenizer backend could not be loaded.
    ///
    /// Never fatal: the rule tokenizer is used instead.
    #[error("Tokenizer model unavailable: {0}")]
    ModelUnavailable(String),

    /// The batch timeout elapsed before the document was segmented.
    #[error("Document '{document_id}' was not segmented within {elapsed_ms} ms")]
    Timeout {
        /// Document that did not finish
        document_id: String,
        /// Elapsed batch time in milliseconds
        elapsed_ms: u64,
    },

    /// Error during report rendering.
    #[error("Rendering error: {0}")]
    Render(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Build an [`Error::Input`] for a document.
    pub fn input(document_id: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Input {
            document_id: document_id.into(),
            message: message.into(),
        }
    }

    /// Build an [`Error::Configuration`].
    pub fn config(message: impl Into<String>) -> Self {
        Error::Configuration(message.into())
    }
}
