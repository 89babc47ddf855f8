//! Places Indexer Main Entry Point
//!
//! Loads the places file into the search index. The first command line
//! argument, when given, replaces `PLACES_DATA_PATH`.

use dotenv::dotenv;
use places_indexer::{Dependencies, IndexingError, LoaderSettings};
use std::env;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging.
fn init_tracing() -> Result<(), IndexingError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("places_indexer=info,places_indexer_repository=info")
    });

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
            .try_init()
            .map_err(|e| IndexingError::config(format!("failed to initialize tracing: {}", e)))?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true).pretty())
            .try_init()
            .map_err(|e| IndexingError::config(format!("failed to initialize tracing: {}", e)))?;
    }

    info!(
        service_name = "places-indexer",
        service_version = env!("CARGO_PKG_VERSION"),
        json,
        "Tracing initialized"
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), IndexingError> {
    // Load environment variables from .env file
    dotenv().ok();

    init_tracing()?;

    let mut settings = LoaderSettings::from_env();
    if let Some(path) = env::args().nth(1) {
        settings = settings.with_data_path(path);
    }

    info!("Starting places indexer");

    let deps = match Dependencies::new(settings).await {
        Ok(deps) => {
            info!("Dependencies initialized successfully");
            deps
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            return Err(e);
        }
    };

    match deps.orchestrator.run(&deps.data_path).await {
        Ok(summary) => {
            println!(
                "Successfully indexed {}/{} places",
                summary.successful(),
                summary.documents()
            );
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Places indexer failed");
            Err(e.into())
        }
    }
}
