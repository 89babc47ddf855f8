//! OpenSearch implementation of the search index provider.
//!
//! This module provides a concrete implementation of `SearchIndexProvider`
//! using OpenSearch as the backend, and the connector that establishes it.

mod connector;
mod index_config;
mod provider;

pub use connector::connect;
pub use index_config::{default_place_schema, INDEX_NAME};
pub use provider::OpenSearchProvider;
