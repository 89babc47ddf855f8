//! # Places Indexer Shared
//!
//! This crate defines shared data structures and types used across the places indexer ecosystem.
//! It includes the place document model, the typed search query builder and the decoded
//! search responses returned by the search engine.

pub mod types;

pub use types::place_document::{GeoPoint, PlaceDocument};
pub use types::search_query::{PlaceQuery, SearchBody};
pub use types::search_result::{PlacePage, SearchHit, SearchResponse};
