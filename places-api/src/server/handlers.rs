// HTTP request handlers
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use places_indexer_shared::GeoPoint;
use tracing::debug;

use crate::errors::ApiError;
use crate::models::{PageParams, PlaceResponse, PlacesPage, RecommendParams};
use crate::server::state::AppState;

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "Places API is running")
}

/// `GET /api/places?page=N` - one page of places, 1-based
pub async fn list_places(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<PlacesPage>, ApiError> {
    let page = parse_page(params.page.as_deref())?;

    let offset = (page - 1)
        .checked_mul(state.page_size as u64)
        .and_then(|offset| usize::try_from(offset).ok())
        .ok_or_else(|| ApiError::bad_request(format!("Page {} is out of range.", page)))?;

    let result = state.store.get_places(state.page_size, offset).await?;
    debug!(page, count = result.places.len(), total = result.total, "Listed places");

    Ok(Json(PlacesPage::new(
        result.places,
        page,
        result.total,
        state.page_size,
    )))
}

/// `GET /api/recommend?lat=&lon=` - the places closest to a point
pub async fn recommend(
    State(state): State<AppState>,
    Query(params): Query<RecommendParams>,
) -> Result<Json<Vec<PlaceResponse>>, ApiError> {
    let latitude = parse_coordinate("lat", params.lat.as_deref())?;
    let longitude = parse_coordinate("lon", params.lon.as_deref())?;

    let origin = GeoPoint::new(longitude, latitude);
    if !origin.is_valid() {
        return Err(ApiError::bad_request(format!(
            "Coordinates out of range: lat={}, lon={}.",
            latitude, longitude
        )));
    }

    let places = state
        .store
        .get_nearest(state.recommend_limit, origin)
        .await?;
    debug!(latitude, longitude, count = places.len(), "Recommended places");

    Ok(Json(places.into_iter().map(PlaceResponse::from).collect()))
}

fn parse_page(raw: Option<&str>) -> Result<u64, ApiError> {
    let raw = raw.ok_or_else(|| ApiError::bad_request("Missing 'page' value."))?;
    match raw.trim().parse::<u64>() {
        Ok(page) if page >= 1 => Ok(page),
        _ => Err(ApiError::bad_request(format!(
            "Invalid 'page' value: '{}'.",
            raw
        ))),
    }
}

fn parse_coordinate(name: &str, raw: Option<&str>) -> Result<f64, ApiError> {
    let raw = raw.ok_or_else(|| ApiError::bad_request(format!("Missing '{}' value.", name)))?;
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ApiError::bad_request(format!(
            "Invalid '{}' value: '{}'.",
            name, raw
        ))),
    }
}
