//! Settings for the API server.

use std::env;
use std::fmt::Display;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::str::FromStr;

use axum::http::{header, HeaderValue, Method};
use places_indexer_repository::config::DEFAULT_OPENSEARCH_URL;
use places_indexer_repository::opensearch::INDEX_NAME;
use places_indexer_repository::retry::DEFAULT_MAX_RETRIES;
use places_indexer_repository::{ConnectionConfig, RetryPolicy};
use tower_http::cors::CorsLayer;
use tracing::warn;

/// Default listen address.
pub const DEFAULT_SERVER_ADDR: SocketAddr =
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 8888));

/// Places per page of `GET /api/places`.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Places returned by `GET /api/recommend`.
pub const DEFAULT_RECOMMEND_LIMIT: usize = 3;

/// Origins allowed by CORS for local front-end development.
const ALLOWED_ORIGINS: [&str; 4] = [
    "http://localhost:3000",
    "http://localhost:5173",
    "http://127.0.0.1:3000",
    "http://127.0.0.1:5173",
];

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub connection: ConnectionConfig,
    pub index: String,
    pub addr: SocketAddr,
    pub page_size: usize,
    pub recommend_limit: usize,
}

impl ApiSettings {
    /// Read the settings from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `OPENSEARCH_URLS`: Comma separated engine addresses (default: http://localhost:9200)
    /// - `OPENSEARCH_MAX_RETRIES`: Retries for connecting and queries (default: 5)
    /// - `PLACES_INDEX`: Index to query (default: "places")
    /// - `SERVER_ADDR`: Listen address (default: 0.0.0.0:8888)
    /// - `PLACES_PAGE_SIZE`: Places per listing page (default: 10)
    /// - `RECOMMEND_LIMIT`: Places per recommendation (default: 3)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the settings from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let addresses =
            lookup("OPENSEARCH_URLS").unwrap_or_else(|| DEFAULT_OPENSEARCH_URL.to_string());
        let retry = RetryPolicy::default()
            .with_max_retries(parse_or(&lookup, "OPENSEARCH_MAX_RETRIES", DEFAULT_MAX_RETRIES));

        Self {
            connection: ConnectionConfig::from_address_list(&addresses).with_retry(retry),
            index: lookup("PLACES_INDEX").unwrap_or_else(|| INDEX_NAME.to_string()),
            addr: parse_or(&lookup, "SERVER_ADDR", DEFAULT_SERVER_ADDR),
            page_size: parse_or(&lookup, "PLACES_PAGE_SIZE", DEFAULT_PAGE_SIZE).max(1),
            recommend_limit: parse_or(&lookup, "RECOMMEND_LIMIT", DEFAULT_RECOMMEND_LIMIT),
        }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Display,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().parse() {
        Ok(value) => value,
        Err(e) => {
            warn!(key, value = %raw, error = %e, "Invalid value, using the default");
            default
        }
    }
}

/// Create CORS layer for localhost development
pub fn create_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(ALLOWED_ORIGINS.map(HeaderValue::from_static))
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}
