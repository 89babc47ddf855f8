//! Places API Main Entry Point
//!
//! Serves the places index over HTTP.

use std::env;
use std::sync::Arc;

use places_api::{create_app, run_server, ApiSettings, AppState};
use places_indexer_repository::{connect, SearchPlaceStore};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("places_api=info,places_indexer_repository=info"));

    let json = env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(false).compact())
            .init();
    }

    info!(
        service_name = "places-api",
        service_version = env!("CARGO_PKG_VERSION"),
        json,
        "Tracing initialized"
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize environment and logging
    dotenv::dotenv().ok();
    init_tracing();

    let settings = ApiSettings::from_env();
    info!(
        addresses = ?settings.connection.addresses,
        index = %settings.index,
        "Starting places API"
    );

    let provider = match connect(&settings.connection).await {
        Ok(provider) => provider,
        Err(e) => {
            error!(error = %e, "Failed to connect to OpenSearch");
            return Err(e.into());
        }
    };

    let state = AppState {
        store: Arc::new(SearchPlaceStore::new(Arc::new(provider), settings.index)),
        page_size: settings.page_size,
        recommend_limit: settings.recommend_limit,
    };

    let app = create_app(state);
    run_server(app, settings.addr).await
}
