// App state for Axum server
use std::sync::Arc;

use places_indexer_repository::PlaceStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PlaceStore>,
    pub page_size: usize,
    pub recommend_limit: usize,
}
