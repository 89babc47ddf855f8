//! Search index provider trait definition.
//!
//! This module defines the abstract interface for the engine operations the
//! places indexer consumes, allowing for different backend implementations
//! (OpenSearch, Elasticsearch, in-memory mocks, etc.).

use async_trait::async_trait;
use places_indexer_shared::{SearchBody, SearchResponse};
use serde_json::Value;

use crate::errors::SearchIndexError;
use crate::types::{BulkItemResponse, BulkOperation};

/// Abstracts the underlying search engine.
///
/// Implementations are shared read-only between all bulk workers and query
/// callers, so every method takes `&self`.
///
/// Transport failures must be reported as `SearchIndexError::ConnectionError`
/// and unexpected HTTP statuses as `SearchIndexError::UnexpectedStatus` so that
/// callers can tell transient failures from permanent ones.
#[async_trait]
pub trait SearchIndexProvider: Send + Sync {
    /// Delete an index. A missing index is not an error.
    async fn delete_index(&self, index: &str) -> Result<(), SearchIndexError>;

    /// Create an index with the given settings/mappings document.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the index was created
    /// * `Err(SearchIndexError)` - If the engine refused or could not be reached
    async fn create_index(&self, index: &str, schema: &Value) -> Result<(), SearchIndexError>;

    /// Send one bulk write and return the engine's per-item outcomes, in request order.
    ///
    /// A rejected document is reported in its `BulkItemResponse`, never as an `Err`.
    /// `Err` means the request as a whole failed. Implementations make a single
    /// attempt; retrying is up to the caller.
    async fn bulk_index(
        &self,
        index: &str,
        operations: &[BulkOperation],
    ) -> Result<Vec<BulkItemResponse>, SearchIndexError>;

    /// Run a search and decode the response envelope.
    async fn search(&self, index: &str, body: &SearchBody)
        -> Result<SearchResponse, SearchIndexError>;
}
