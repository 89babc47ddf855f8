//! # Places Indexer
//!
//! Bulk loader for geo-tagged places: reads a tab-separated file and indexes
//! every row into OpenSearch.
//!
//! ## Architecture
//!
//! The indexer follows the Processor-Loader pattern:
//!
//! 1. **Processor**: Validates raw rows and turns them into documents
//! 2. **Loader**: Batches documents and writes them with concurrent flush workers
//! 3. **Orchestrator**: Reads the file and drives one producer task per row
//!
//! ## Modules
//!
//! - [`config`]: Configuration and dependency initialization
//! - [`processor`]: Transforms rows into documents
//! - [`loader`]: The bulk indexer
//! - [`orchestrator`]: Coordinates the load
//! - [`errors`]: Error types for the indexer

pub mod config;
pub mod errors;
pub mod loader;
pub mod orchestrator;
pub mod processor;

pub use config::{Dependencies, LoaderSettings};
pub use errors::{BulkItemError, IngestError};
pub use loader::{BulkIndexer, BulkIndexerConfig, BulkIndexerItem, BulkIndexerStats};
pub use orchestrator::{LoadSummary, Orchestrator};

use places_indexer_repository::SearchIndexError;
use thiserror::Error;

/// Errors that can occur during indexer initialization or execution.
#[derive(Error, Debug)]
pub enum IndexingError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Ingest error.
    #[error("Ingest error: {0}")]
    IngestError(#[from] IngestError),

    /// The engine could not be reached or the index could not be prepared.
    #[error("Startup error: {0}")]
    Startup(#[from] SearchIndexError),
}

impl IndexingError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
