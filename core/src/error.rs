//! Error types for the search engine.

use crate::DocId;
use thiserror::Error;

/// Errors surfaced by engine operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// Bad document id, control characters in text, or malformed query syntax.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The operation addressed a document that is not in the store.
    #[error("document {0} not found")]
    NotFound(DocId),

    /// A dedicated worker pool could not be built.
    #[error("thread pool error: {0}")]
    ThreadPool(String),
}

impl SearchError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        SearchError::InvalidInput(msg.into())
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, SearchError>;
