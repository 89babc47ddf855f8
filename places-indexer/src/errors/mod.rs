//! Error types for the places indexer ingest.

use std::fmt;
use std::time::Duration;

use places_indexer_repository::SearchIndexError;
use thiserror::Error;

use crate::loader::BulkIndexerStats;

/// A batch write that failed as a whole after the retry budget was spent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlushFailure {
    /// The worker that owned the batch.
    pub worker: usize,
    /// Number of documents in the batch; all of them were reported as failed.
    pub documents: usize,
    /// The last transport error.
    pub reason: String,
}

impl fmt::Display for FlushFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "worker {} failed to flush {} documents: {}",
            self.worker, self.documents, self.reason
        )
    }
}

/// Why a single document was not indexed. Sibling documents are unaffected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BulkItemError {
    /// The engine rejected the document.
    #[error("rejected with status {status}: {error_type}: {reason}")]
    Rejected {
        status: u16,
        error_type: String,
        reason: String,
    },

    /// The whole batch could not be written.
    #[error("batch write failed: {0}")]
    Transport(String),

    /// The engine answered without an entry for this document.
    #[error("no response entry for document")]
    MissingResponse,
}

/// Errors that can occur in the places indexer ingest.
#[derive(Error, Debug)]
pub enum IngestError {
    /// A single input row is malformed. The row is skipped.
    #[error("Validation error on line {line}: {message}")]
    ValidationError { line: u64, message: String },

    /// An item was submitted after the bulk indexer started closing.
    #[error("Submission error: {0}")]
    SubmissionError(String),

    /// One or more batches could not be written. Already flushed results are kept in `stats`.
    #[error(
        "{} flush(es) failed; {} documents indexed, {} failed",
        .failures.len(), .stats.num_flushed, .stats.num_failed
    )]
    FlushError {
        failures: Vec<FlushFailure>,
        stats: BulkIndexerStats,
    },

    /// Closing did not finish within the requested time.
    #[error("Bulk indexer did not close within {0:?}")]
    CloseTimeout(Duration),

    /// A flush worker panicked.
    #[error("Flush worker panicked: {0}")]
    WorkerPanicked(String),

    /// Invalid bulk indexer configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error reading the input file.
    #[error("Reader error: {0}")]
    ReaderError(String),

    /// Error from the search engine repository.
    #[error(transparent)]
    Repository(#[from] SearchIndexError),
}

impl IngestError {
    /// Create a validation error for a data line.
    pub fn validation(line: u64, msg: impl Into<String>) -> Self {
        Self::ValidationError {
            line,
            message: msg.into(),
        }
    }

    /// Create a submission error.
    pub fn submission(msg: impl Into<String>) -> Self {
        Self::SubmissionError(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Create a reader error.
    pub fn reader(msg: impl Into<String>) -> Self {
        Self::ReaderError(msg.into())
    }
}

impl From<csv::Error> for IngestError {
    fn from(err: csv::Error) -> Self {
        Self::ReaderError(err.to_string())
    }
}
