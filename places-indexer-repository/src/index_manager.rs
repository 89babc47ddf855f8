//! Destructive (re)creation of the target index.

use serde_json::Value;
use tracing::{info, instrument};

use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;

/// Drop `index` if it exists and create it again with `schema`.
///
/// Safe to call repeatedly: on success the index is always fresh, empty and
/// built from `schema`. Any failure, including a refused creation, is returned
/// as `IndexSetupError` so the caller can stop before ingesting into a missing
/// or mismatched index.
#[instrument(skip(provider, schema))]
pub async fn setup_index(
    provider: &dyn SearchIndexProvider,
    index: &str,
    schema: &Value,
) -> Result<(), SearchIndexError> {
    provider.delete_index(index).await.map_err(|e| {
        SearchIndexError::index_setup(format!("failed to delete index '{}': {}", index, e))
    })?;

    provider.create_index(index, schema).await.map_err(|e| {
        SearchIndexError::index_setup(format!("failed to create index '{}': {}", index, e))
    })?;

    info!(index = %index, "Index is ready");
    Ok(())
}
