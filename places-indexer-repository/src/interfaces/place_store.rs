//! Place store trait definition.

use async_trait::async_trait;
use places_indexer_shared::{GeoPoint, PlaceDocument, PlacePage};

use crate::errors::SearchIndexError;

/// Read side of the places index, as consumed by the HTTP layer.
#[async_trait]
pub trait PlaceStore: Send + Sync {
    /// One page of places in engine order, plus the exact size of the corpus.
    ///
    /// `limit = 0` returns an empty page with a valid `total`.
    async fn get_places(&self, limit: usize, offset: usize) -> Result<PlacePage, SearchIndexError>;

    /// Up to `limit` places ordered by non-decreasing arc distance from `origin`.
    /// Places without a location are never returned.
    async fn get_nearest(
        &self,
        limit: usize,
        origin: GeoPoint,
    ) -> Result<Vec<PlaceDocument>, SearchIndexError>;
}
