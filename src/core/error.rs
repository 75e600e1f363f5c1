//! Defines the custom error types for the `core` module.

use thiserror::Error;

/// The primary error type for the `core` module.
///
/// Every variant is fatal to a single replacement invocation. Failures that
/// concern only one document are reported through `BatchResult::failures`
/// instead and never surface here.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The search term was empty. Nothing has been read or written.
    #[error("Search term must not be empty")]
    EmptySearchTerm,

    /// The search pattern could not be compiled. Nothing has been read or written.
    #[error(transparent)]
    InvalidPattern(#[from] InvalidPatternError),

    /// The document listing itself failed, so no batch could be formed.
    #[error("Failed to list documents: {0}")]
    Store(#[from] StoreError),
}

/// A syntactically invalid search pattern, carrying the regex engine's diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct InvalidPatternError {
    pub message: String,
}

impl From<regex::Error> for InvalidPatternError {
    fn from(err: regex::Error) -> Self {
        Self {
            message: err.to_string(),
        }
    }
}

/// Errors raised by a `DocumentStore` for a single operation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Represents an I/O error, typically from file system operations.
    #[error("I/O error for path {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Document is not valid UTF-8: {0}")]
    InvalidUtf8(String),

    /// The document is a link whose target lies outside the vault.
    #[error("Document resolves outside the vault: {0}")]
    OutsideVault(String),

    /// Represents an error that occurred when a blocking Tokio task was joined.
    #[error("Task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl StoreError {
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
