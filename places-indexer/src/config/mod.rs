//! Configuration and dependency initialization for the places indexer.

mod dependencies;

pub use dependencies::{load_schema, Dependencies};

use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use places_indexer_repository::config::DEFAULT_OPENSEARCH_URL;
use places_indexer_repository::opensearch::INDEX_NAME;
use places_indexer_repository::retry::{DEFAULT_BASE_DELAY, DEFAULT_MAX_RETRIES};
use places_indexer_repository::{ConnectionConfig, RetryPolicy};
use tracing::warn;

use crate::loader::{
    BulkIndexerConfig, DEFAULT_FLUSH_BYTES, DEFAULT_FLUSH_INTERVAL, DEFAULT_NUM_WORKERS,
    DEFAULT_QUEUE_CAPACITY,
};

/// Default path of the index mapping.
pub const DEFAULT_SCHEMA_PATH: &str = "configs/schema.json";

/// Default path of the input file.
pub const DEFAULT_DATA_PATH: &str = "../materials/data.csv";

/// Settings for one load run.
#[derive(Debug, Clone)]
pub struct LoaderSettings {
    pub connection: ConnectionConfig,
    pub index: String,
    pub schema_path: PathBuf,
    pub data_path: PathBuf,
    pub bulk: BulkIndexerConfig,
    pub close_timeout: Option<Duration>,
}

impl LoaderSettings {
    /// Read the settings from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `OPENSEARCH_URLS`: Comma separated engine addresses (default: http://localhost:9200)
    /// - `OPENSEARCH_MAX_RETRIES`: Retries for connecting and engine requests (default: 5)
    /// - `OPENSEARCH_RETRY_BASE_MS`: First backoff delay in milliseconds (default: 500)
    /// - `PLACES_INDEX`: Target index (default: "places")
    /// - `PLACES_SCHEMA_PATH`: Index mapping file (default: configs/schema.json)
    /// - `PLACES_DATA_PATH`: Input file (default: ../materials/data.csv)
    /// - `BULK_WORKERS`: Flush workers (default: 8)
    /// - `BULK_FLUSH_BYTES`: Buffered bytes that trigger a flush (default: 5 MiB)
    /// - `BULK_FLUSH_INTERVAL_SECS`: Maximum age of a buffered batch (default: 30)
    /// - `BULK_QUEUE_CAPACITY`: Items queued per worker before producers wait (default: 1000)
    /// - `BULK_MAX_RETRIES`: Retries for a failed bulk request (default: 5)
    /// - `BULK_CLOSE_TIMEOUT_SECS`: Limit for the final flush (default: none)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the settings from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let addresses =
            lookup("OPENSEARCH_URLS").unwrap_or_else(|| DEFAULT_OPENSEARCH_URL.to_string());
        let base_delay = Duration::from_millis(parse_or(
            &lookup,
            "OPENSEARCH_RETRY_BASE_MS",
            DEFAULT_BASE_DELAY.as_millis() as u64,
        ));
        let retry = RetryPolicy::default()
            .with_base_delay(base_delay)
            .with_max_retries(parse_or(&lookup, "OPENSEARCH_MAX_RETRIES", DEFAULT_MAX_RETRIES));

        let index = lookup("PLACES_INDEX").unwrap_or_else(|| INDEX_NAME.to_string());

        let bulk = BulkIndexerConfig {
            index: index.clone(),
            num_workers: parse_or(&lookup, "BULK_WORKERS", DEFAULT_NUM_WORKERS),
            flush_bytes: parse_or(&lookup, "BULK_FLUSH_BYTES", DEFAULT_FLUSH_BYTES),
            flush_interval: Duration::from_secs(parse_or(
                &lookup,
                "BULK_FLUSH_INTERVAL_SECS",
                DEFAULT_FLUSH_INTERVAL.as_secs(),
            )),
            queue_capacity: parse_or(&lookup, "BULK_QUEUE_CAPACITY", DEFAULT_QUEUE_CAPACITY),
            retry: RetryPolicy::default()
                .with_base_delay(base_delay)
                .with_max_retries(parse_or(&lookup, "BULK_MAX_RETRIES", DEFAULT_MAX_RETRIES)),
        };

        let close_timeout = lookup("BULK_CLOSE_TIMEOUT_SECS")
            .and_then(|raw| parse_value::<u64>("BULK_CLOSE_TIMEOUT_SECS", &raw))
            .map(Duration::from_secs);

        Self {
            connection: ConnectionConfig::from_address_list(&addresses).with_retry(retry),
            index,
            schema_path: lookup("PLACES_SCHEMA_PATH")
                .unwrap_or_else(|| DEFAULT_SCHEMA_PATH.to_string())
                .into(),
            data_path: lookup("PLACES_DATA_PATH")
                .unwrap_or_else(|| DEFAULT_DATA_PATH.to_string())
                .into(),
            bulk,
            close_timeout,
        }
    }

    /// Use `path` as the input file.
    pub fn with_data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_path = path.into();
        self
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Display,
{
    lookup(key)
        .and_then(|raw| parse_value(key, &raw))
        .unwrap_or(default)
}

fn parse_value<T>(key: &str, raw: &str) -> Option<T>
where
    T: FromStr,
    T::Err: Display,
{
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, value = raw, error = %e, "Invalid value, using the default");
            None
        }
    }
}
