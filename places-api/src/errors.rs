//! Error type for the HTTP handlers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use places_indexer_repository::SearchIndexError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Errors returned by the handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request parameters are invalid.
    #[error("{0}")]
    BadRequest(String),

    /// The search backend failed.
    #[error("Search backend error: {0}")]
    Backend(SearchIndexError),
}

impl ApiError {
    /// Create a bad request error.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Backend(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<SearchIndexError> for ApiError {
    fn from(err: SearchIndexError) -> Self {
        match err {
            SearchIndexError::ValidationError(msg) => Self::BadRequest(msg),
            other => Self::Backend(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let Self::Backend(e) = &self {
            error!(error = %e, "Request failed");
        }

        (
            status,
            Json(json!({
                "status": "error",
                "message": self.to_string()
            })),
        )
            .into_response()
    }
}
