//! This module defines the core data structures and types used across the places indexer.
//! It re-exports specific types like `PlaceDocument` and `PlaceQuery`.

pub mod place_document;
pub mod search_query;
pub mod search_result;

pub use place_document::{GeoPoint, PlaceDocument};
pub use search_query::{PlaceQuery, SearchBody};
pub use search_result::{PlacePage, SearchHit, SearchResponse};
