//! Engine-backed implementation of the place store.
//!
//! Queries are built with the typed `PlaceQuery` builder and decoded into
//! `PlaceDocument`s in the order the engine returned them.

use std::sync::Arc;

use async_trait::async_trait;
use places_indexer_shared::{GeoPoint, PlaceDocument, PlacePage, PlaceQuery, SearchHit};
use tracing::{debug, instrument};

use crate::errors::SearchIndexError;
use crate::interfaces::{PlaceStore, SearchIndexProvider};

/// Place store reading from one index through a `SearchIndexProvider`.
#[derive(Clone)]
pub struct SearchPlaceStore {
    provider: Arc<dyn SearchIndexProvider>,
    index: String,
}

impl SearchPlaceStore {
    /// Create a store for `index`.
    pub fn new(provider: Arc<dyn SearchIndexProvider>, index: impl Into<String>) -> Self {
        Self {
            provider,
            index: index.into(),
        }
    }

    /// The index this store reads from.
    pub fn index(&self) -> &str {
        &self.index
    }
}

fn decode_hit(hit: SearchHit) -> Result<Option<PlaceDocument>, SearchIndexError> {
    let id = hit.id.clone();
    hit.into_place().map_err(|e| {
        SearchIndexError::query(format!("failed to decode document '{}': {}", id, e))
    })
}

#[async_trait]
impl PlaceStore for SearchPlaceStore {
    #[instrument(skip(self))]
    async fn get_places(&self, limit: usize, offset: usize) -> Result<PlacePage, SearchIndexError> {
        let body = PlaceQuery::match_all(offset, limit).to_body();
        let response = self.provider.search(&self.index, &body).await?;
        let total = response.total();

        let places = response
            .hits
            .hits
            .into_iter()
            .map(|hit| {
                let id = hit.id.clone();
                decode_hit(hit)?.ok_or_else(|| {
                    SearchIndexError::query(format!("document '{}' has no location", id))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(count = places.len(), total, "Fetched places page");
        Ok(PlacePage { places, total })
    }

    #[instrument(skip(self))]
    async fn get_nearest(
        &self,
        limit: usize,
        origin: GeoPoint,
    ) -> Result<Vec<PlaceDocument>, SearchIndexError> {
        if !origin.is_valid() {
            return Err(SearchIndexError::validation(format!(
                "invalid origin lat={} lon={}",
                origin.latitude, origin.longitude
            )));
        }

        let body = PlaceQuery::geo_nearest(origin, limit).to_body();
        let response = self.provider.search(&self.index, &body).await?;

        let mut places = Vec::with_capacity(response.len().min(limit));
        for hit in response.hits.hits {
            if let Some(place) = decode_hit(hit)? {
                places.push(place);
            }
        }
        places.truncate(limit);

        debug!(count = places.len(), "Fetched nearest places");
        Ok(places)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use places_indexer_shared::types::search_query::{QueryClause, SortClause};
    use places_indexer_shared::{SearchBody, SearchResponse};
    use serde_json::{json, Value};
    use std::sync::Mutex;

    use crate::types::{BulkItemResponse, BulkOperation};

    /// Mock engine that answers searches over a fixed list of (id, source) pairs.
    struct MockSearchProvider {
        documents: Vec<(String, Value)>,
        last_body: Mutex<Option<SearchBody>>,
        raw_response: Option<Value>,
    }

    impl MockSearchProvider {
        fn new(documents: Vec<(String, Value)>) -> Self {
            Self {
                documents,
                last_body: Mutex::new(None),
                raw_response: None,
            }
        }

        fn with_raw_response(response: Value) -> Self {
            Self {
                raw_response: Some(response),
                ..Self::new(Vec::new())
            }
        }

        fn location_of(source: &Value) -> Option<GeoPoint> {
            serde_json::from_value(source.get("location")?.clone()).ok()
        }
    }

    #[async_trait]
    impl SearchIndexProvider for MockSearchProvider {
        async fn delete_index(&self, _index: &str) -> Result<(), SearchIndexError> {
            Ok(())
        }

        async fn create_index(&self, _index: &str, _schema: &Value) -> Result<(), SearchIndexError> {
            Ok(())
        }

        async fn bulk_index(
            &self,
            _index: &str,
            _operations: &[BulkOperation],
        ) -> Result<Vec<BulkItemResponse>, SearchIndexError> {
            Ok(Vec::new())
        }

        async fn search(
            &self,
            _index: &str,
            body: &SearchBody,
        ) -> Result<SearchResponse, SearchIndexError> {
            *self.last_body.lock().unwrap() = Some(body.clone());

            if let Some(raw) = &self.raw_response {
                return serde_json::from_value(raw.clone())
                    .map_err(|e| SearchIndexError::query(e.to_string()));
            }

            let mut hits: Vec<(f64, &(String, Value))> = match (&body.query, body.sort.first()) {
                (QueryClause::Exists(_), Some(SortClause::GeoDistance(sort))) => self
                    .documents
                    .iter()
                    .filter_map(|doc| {
                        Self::location_of(&doc.1).map(|loc| (sort.location.distance_km(&loc), doc))
                    })
                    .collect(),
                _ => self.documents.iter().map(|doc| (0.0, doc)).collect(),
            };
            hits.sort_by(|a, b| a.0.total_cmp(&b.0));

            let from = body.from.unwrap_or(0);
            let page: Vec<Value> = hits
                .into_iter()
                .skip(from)
                .take(body.size)
                .map(|(distance, (id, source))| json!({ "_id": id, "_source": source, "sort": [distance] }))
                .collect();

            let mut response = json!({ "hits": { "hits": page } });
            if body.track_total_hits == Some(true) {
                response["hits"]["total"] = json!({ "value": self.documents.len(), "relation": "eq" });
            }
            serde_json::from_value(response).map_err(|e| SearchIndexError::query(e.to_string()))
        }
    }

    fn place(id: &str, lon: f64, lat: f64) -> (String, Value) {
        (
            id.to_string(),
            json!({
                "name": format!("Place {id}"),
                "address": "Somewhere",
                "phone": "555-0000",
                "location": { "lon": lon, "lat": lat }
            }),
        )
    }

    fn corpus(n: usize) -> Vec<(String, Value)> {
        (0..n)
            .map(|i| place(&i.to_string(), -122.0 + i as f64 * 0.01, 37.0))
            .collect()
    }

    fn store(provider: MockSearchProvider) -> (SearchPlaceStore, Arc<MockSearchProvider>) {
        let provider = Arc::new(provider);
        (SearchPlaceStore::new(provider.clone(), "places"), provider)
    }

    #[tokio::test]
    async fn test_get_places_paginates_and_counts() {
        let (store, provider) = store(MockSearchProvider::new(corpus(25)));

        let page = store.get_places(10, 20).await.unwrap();

        assert_eq!(page.total, 25);
        assert_eq!(page.places.len(), 5);
        assert_eq!(page.places[0].id, "20");

        let body = provider.last_body.lock().unwrap().clone().unwrap();
        assert_eq!(body.from, Some(20));
        assert_eq!(body.size, 10);
    }

    #[tokio::test]
    async fn test_get_places_zero_limit_returns_total() {
        let (store, _) = store(MockSearchProvider::new(corpus(7)));

        let page = store.get_places(0, 0).await.unwrap();

        assert!(page.places.is_empty());
        assert_eq!(page.total, 7);
    }

    #[tokio::test]
    async fn test_get_nearest_orders_by_distance_and_skips_unlocated() {
        let mut documents = vec![
            place("far", -120.0, 37.7),
            place("near", -122.41, 37.7),
            place("exact", -122.4, 37.7),
        ];
        documents.push((
            "nowhere".to_string(),
            json!({ "name": "No location", "address": "", "phone": "" }),
        ));
        let (store, _) = store(MockSearchProvider::new(documents));

        let origin = GeoPoint::new(-122.4, 37.7);
        let places = store.get_nearest(3, origin).await.unwrap();

        let ids: Vec<&str> = places.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["exact", "near", "far"]);

        let distances: Vec<f64> = places.iter().map(|p| origin.distance_km(&p.location)).collect();
        assert!(distances.windows(2).all(|w| w[0] <= w[1]));
    }

    #[tokio::test]
    async fn test_get_nearest_filters_documents_without_location_in_response() {
        let (store, _) = store(MockSearchProvider::with_raw_response(json!({
            "hits": { "hits": [
                { "_id": "a", "_source": { "name": "A" } },
                { "_id": "b", "_source": { "name": "B", "address": "", "phone": "",
                    "location": { "lon": 1.0, "lat": 1.0 } } }
            ] }
        })));

        let places = store.get_nearest(3, GeoPoint::new(1.0, 1.0)).await.unwrap();

        assert_eq!(places.len(), 1);
        assert_eq!(places[0].id, "b");
    }

    #[tokio::test]
    async fn test_get_nearest_rejects_invalid_origin() {
        let (store, _) = store(MockSearchProvider::new(corpus(3)));

        let result = store.get_nearest(3, GeoPoint::new(0.0, 123.0)).await;

        assert!(matches!(result, Err(SearchIndexError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_undecodable_hit_is_query_error() {
        let (store, _) = store(MockSearchProvider::with_raw_response(json!({
            "hits": { "total": { "value": 1 }, "hits": [
                { "_id": "x", "_source": { "name": "X", "location": "somewhere" } }
            ] }
        })));

        let result = store.get_places(10, 0).await;

        assert!(matches!(result, Err(SearchIndexError::QueryError(_))));
    }
}
