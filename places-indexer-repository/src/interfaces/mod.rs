//! Interface definitions for the search index provider and the place store.
//!
//! This module defines the abstract traits that allow for dependency injection
//! and swappable backend implementations.

mod place_store;
mod search_index_provider;

pub use place_store::PlaceStore;
pub use search_index_provider::SearchIndexProvider;
