//! Search index error types.
//!
//! This module defines the unified error type for all search index operations,
//! including both low-level backend errors and high-level application errors.

use thiserror::Error;

/// Unified errors from search index operations.
///
/// Used by the `SearchIndexProvider` trait, the index manager and the place store.
/// Transport failures are reported as `ConnectionError`; non-2xx responses the caller
/// did not expect are reported as `UnexpectedStatus` so the retry policy can decide
/// whether the status is transient.
#[derive(Debug, Clone, Error)]
pub enum SearchIndexError {
    /// Validation error (e.g., missing required fields, out of range coordinates).
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Failed to reach the search index backend.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The backend answered with a status the caller did not expect.
    #[error("Unexpected status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// Failed to delete or create the search index.
    #[error("Index setup error: {0}")]
    IndexSetupError(String),

    /// Bulk write request failed as a whole.
    #[error("Bulk index error: {0}")]
    BulkIndexError(String),

    /// Failed to decode a search response.
    #[error("Query error: {0}")]
    QueryError(String),

    /// Failed to serialize data for the search index backend.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl SearchIndexError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create an unexpected status error.
    pub fn unexpected_status(status: u16, body: impl Into<String>) -> Self {
        Self::UnexpectedStatus {
            status,
            body: body.into(),
        }
    }

    /// Create an index setup error.
    pub fn index_setup(msg: impl Into<String>) -> Self {
        Self::IndexSetupError(msg.into())
    }

    /// Create a bulk index error.
    pub fn bulk_index(msg: impl Into<String>) -> Self {
        Self::BulkIndexError(msg.into())
    }

    /// Create a query error.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::QueryError(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }

    /// Whether retrying the same request may succeed.
    ///
    /// Transport failures are always transient; a status is transient only if it
    /// is listed in `retry_on_status`.
    pub fn is_transient(&self, retry_on_status: &[u16]) -> bool {
        match self {
            Self::ConnectionError(_) => true,
            Self::UnexpectedStatus { status, .. } => retry_on_status.contains(status),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RETRY_ON: [u16; 4] = [502, 503, 504, 429];

    #[test]
    fn test_connection_errors_are_transient() {
        assert!(SearchIndexError::connection("refused").is_transient(&RETRY_ON));
    }

    #[test]
    fn test_status_transience_follows_list() {
        assert!(SearchIndexError::unexpected_status(503, "").is_transient(&RETRY_ON));
        assert!(SearchIndexError::unexpected_status(429, "").is_transient(&RETRY_ON));
        assert!(!SearchIndexError::unexpected_status(400, "").is_transient(&RETRY_ON));
        assert!(!SearchIndexError::unexpected_status(503, "").is_transient(&[]));
    }

    #[test]
    fn test_other_errors_are_permanent() {
        assert!(!SearchIndexError::query("bad json").is_transient(&RETRY_ON));
        assert!(!SearchIndexError::index_setup("exists").is_transient(&RETRY_ON));
    }
}
