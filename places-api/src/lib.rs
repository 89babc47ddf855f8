//! # Places API
//!
//! HTTP API over the places index: paginated listing and nearest-place
//! recommendations.
//!
//! ## Modules
//!
//! - [`config`]: Settings read from the environment, CORS
//! - [`errors`]: Error type rendered as JSON responses
//! - [`models`]: Request parameters and response bodies
//! - [`server`]: Router, handlers and server loop

pub mod config;
pub mod errors;
pub mod models;
pub mod server;

pub use config::ApiSettings;
pub use errors::ApiError;
pub use server::{create_app, run_server, state::AppState};
