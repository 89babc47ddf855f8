//! Router tests for the places API.
//!
//! The router runs against an in-memory `PlaceStore`; requests go through
//! `tower::ServiceExt::oneshot`.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use places_api::{create_app, AppState};
use places_indexer_repository::{PlaceStore, SearchIndexError};
use places_indexer_shared::{GeoPoint, PlaceDocument, PlacePage};

/// Store over a fixed list of places; records the last call.
struct MockStore {
    places: Vec<PlaceDocument>,
    fail: bool,
    last_call: Mutex<Option<String>>,
}

impl MockStore {
    fn with_places(n: usize) -> Self {
        Self {
            places: (0..n)
                .map(|i| {
                    PlaceDocument::new(
                        i.to_string(),
                        format!("Place {i}"),
                        "Main St",
                        "555-0000",
                        GeoPoint::new(-122.4 + i as f64 * 0.01, 37.7),
                    )
                })
                .collect(),
            fail: false,
            last_call: Mutex::new(None),
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::with_places(0)
        }
    }
}

#[async_trait]
impl PlaceStore for MockStore {
    async fn get_places(&self, limit: usize, offset: usize) -> Result<PlacePage, SearchIndexError> {
        *self.last_call.lock().unwrap() = Some(format!("places limit={limit} offset={offset}"));
        if self.fail {
            return Err(SearchIndexError::connection("engine unreachable"));
        }
        Ok(PlacePage {
            places: self.places.iter().skip(offset).take(limit).cloned().collect(),
            total: self.places.len() as u64,
        })
    }

    async fn get_nearest(
        &self,
        limit: usize,
        origin: GeoPoint,
    ) -> Result<Vec<PlaceDocument>, SearchIndexError> {
        *self.last_call.lock().unwrap() = Some(format!(
            "nearest limit={limit} lat={} lon={}",
            origin.latitude, origin.longitude
        ));
        if self.fail {
            return Err(SearchIndexError::query("bad response"));
        }
        let mut places = self.places.clone();
        places.sort_by(|a, b| {
            origin
                .distance_km(&a.location)
                .total_cmp(&origin.distance_km(&b.location))
        });
        places.truncate(limit);
        Ok(places)
    }
}

fn app(store: Arc<MockStore>) -> Router {
    create_app(AppState {
        store,
        page_size: 10,
        recommend_limit: 3,
    })
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_health() {
    let (status, _) = get(app(Arc::new(MockStore::with_places(0))), "/health").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_first_page() {
    let store = Arc::new(MockStore::with_places(25));

    let (status, body) = get(app(store.clone()), "/api/places?page=1").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["places"].as_array().unwrap().len(), 10);
    assert_eq!(body["places"][0]["id"], "0");
    assert_eq!(body["places"][0]["name"], "Place 0");
    assert_eq!(body["prev_page"], 0);
    assert_eq!(body["next_page"], 2);
    assert_eq!(body["last_page"], 3);
    assert_eq!(
        store.last_call.lock().unwrap().as_deref(),
        Some("places limit=10 offset=0")
    );
}

#[tokio::test]
async fn test_last_partial_page() {
    let store = Arc::new(MockStore::with_places(25));

    let (status, body) = get(app(store.clone()), "/api/places?page=3").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["places"].as_array().unwrap().len(), 5);
    assert_eq!(body["places"][0]["id"], "20");
    assert_eq!(
        store.last_call.lock().unwrap().as_deref(),
        Some("places limit=10 offset=20")
    );
}

#[tokio::test]
async fn test_invalid_pages_are_bad_requests() {
    for uri in [
        "/api/places",
        "/api/places?page=foo",
        "/api/places?page=0",
        "/api/places?page=-1",
    ] {
        let store = Arc::new(MockStore::with_places(5));
        let (status, body) = get(app(store.clone()), uri).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["status"], "error");
        assert!(store.last_call.lock().unwrap().is_none());
    }
}

#[tokio::test]
async fn test_highest_page_number_returns_empty_page() {
    let store = Arc::new(MockStore::with_places(3));
    let app = create_app(AppState {
        store: store.clone(),
        page_size: 1,
        recommend_limit: 3,
    });

    let (status, body) = get(app, &format!("/api/places?page={}", u64::MAX)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["places"].as_array().unwrap().len(), 0);
    assert_eq!(body["next_page"], u64::MAX);
    assert_eq!(body["last_page"], 3);
}

#[tokio::test]
async fn test_recommend_returns_nearest_three() {
    let store = Arc::new(MockStore::with_places(10));

    let (status, body) = get(app(store.clone()), "/api/recommend?lat=37.7&lon=-122.35").await;

    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids.len(), 3);
    assert_eq!(ids[0], "5");
    assert_eq!(
        store.last_call.lock().unwrap().as_deref(),
        Some("nearest limit=3 lat=37.7 lon=-122.35")
    );
}

#[tokio::test]
async fn test_recommend_rejects_bad_coordinates() {
    for uri in [
        "/api/recommend?lat=abc&lon=-122.4",
        "/api/recommend?lat=37.7",
        "/api/recommend?lat=91&lon=0",
        "/api/recommend?lat=0&lon=inf",
    ] {
        let store = Arc::new(MockStore::with_places(3));
        let (status, body) = get(app(store.clone()), uri).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["status"], "error");
        assert!(store.last_call.lock().unwrap().is_none());
    }
}

#[tokio::test]
async fn test_backend_failures_are_server_errors() {
    let (status, body) = get(app(Arc::new(MockStore::failing())), "/api/places?page=1").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], "error");
    assert!(body["message"].as_str().unwrap().contains("engine unreachable"));

    let (status, _) = get(
        app(Arc::new(MockStore::failing())),
        "/api/recommend?lat=37.7&lon=-122.4",
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}
