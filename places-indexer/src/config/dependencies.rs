//! Dependency initialization and wiring for the places indexer.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use places_indexer_repository::{
    connect, default_place_schema, setup_index, SearchIndexProvider,
};
use serde_json::Value;
use tracing::{info, warn};

use super::LoaderSettings;
use crate::loader::BulkIndexer;
use crate::orchestrator::{Orchestrator, OrchestratorConfig};
use crate::processor::RecordProcessor;
use crate::IndexingError;

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The configured orchestrator ready to run.
    pub orchestrator: Orchestrator,
    /// The file to load.
    pub data_path: PathBuf,
}

impl Dependencies {
    /// Connect to the engine, recreate the index and start the bulk indexer.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(IndexingError)` - If the engine is unreachable, the schema is
    ///   invalid or the index cannot be recreated
    pub async fn new(settings: LoaderSettings) -> Result<Self, IndexingError> {
        info!(
            addresses = ?settings.connection.addresses,
            index = %settings.index,
            schema_path = %settings.schema_path.display(),
            data_path = %settings.data_path.display(),
            "Initializing dependencies"
        );

        let schema = load_schema(&settings.schema_path)?;

        let provider = connect(&settings.connection).await?;
        info!(url = %provider.url(), "OpenSearch connection established");

        setup_index(&provider, &settings.index, &schema).await?;

        let provider: Arc<dyn SearchIndexProvider> = Arc::new(provider);
        let indexer = BulkIndexer::new(provider, settings.bulk)?;

        let orchestrator = Orchestrator::with_config(
            RecordProcessor::new(),
            indexer,
            OrchestratorConfig {
                close_timeout: settings.close_timeout,
                ..OrchestratorConfig::default()
            },
        );

        Ok(Self {
            orchestrator,
            data_path: settings.data_path,
        })
    }
}

/// Read the index mapping at `path`.
///
/// A missing file falls back to the built-in place mapping; a file that is not
/// valid JSON is a configuration error.
pub fn load_schema(path: &Path) -> Result<Value, IndexingError> {
    match fs::read_to_string(path) {
        Ok(raw) => serde_json::from_str(&raw).map_err(|e| {
            IndexingError::config(format!("invalid schema file {}: {}", path.display(), e))
        }),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!(path = %path.display(), "Schema file not found, using the default place mapping");
            Ok(default_place_schema())
        }
        Err(e) => Err(IndexingError::config(format!(
            "failed to read schema file {}: {}",
            path.display(),
            e
        ))),
    }
}
