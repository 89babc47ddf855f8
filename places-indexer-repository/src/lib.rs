//! # Places Indexer Repository
//!
//! This crate provides traits and implementations for interacting with the
//! search engine. It includes definitions for errors, interfaces, the retry
//! policy, the index manager, the place store, and a concrete implementation
//! for OpenSearch.

pub mod config;
pub mod errors;
pub mod index_manager;
pub mod interfaces;
pub mod opensearch;
pub mod retry;
pub mod store;
pub mod types;

pub use config::ConnectionConfig;
pub use errors::SearchIndexError;
pub use index_manager::setup_index;
pub use interfaces::{PlaceStore, SearchIndexProvider};
pub use opensearch::{connect, default_place_schema, OpenSearchProvider};
pub use retry::RetryPolicy;
pub use store::SearchPlaceStore;
pub use types::{BulkErrorCause, BulkItemResponse, BulkOperation};
