//! Retry-aware connection to the search engine.

use tracing::{info, instrument, warn};

use crate::config::ConnectionConfig;
use crate::errors::SearchIndexError;
use crate::opensearch::provider::OpenSearchProvider;

/// Connect to the first reachable address in `config`.
///
/// One attempt pings every candidate address in order. Failed attempts are
/// retried with the configured backoff; once the retries are exhausted the
/// last failure is returned as a `ConnectionError`.
///
/// # Returns
///
/// * `Ok(OpenSearchProvider)` - A provider bound to the first address that answered
/// * `Err(SearchIndexError)` - If no address is configured, an address is not a valid
///   URL, or no address answered within the retry budget
#[instrument(skip(config), fields(addresses = ?config.addresses))]
pub async fn connect(config: &ConnectionConfig) -> Result<OpenSearchProvider, SearchIndexError> {
    if config.addresses.is_empty() {
        return Err(SearchIndexError::connection(
            "no search engine address configured",
        ));
    }

    let mut candidates = config
        .addresses
        .iter()
        .map(|address| OpenSearchProvider::new(address, config.retry.clone()))
        .collect::<Result<Vec<_>, _>>()?;

    let candidate_refs = &candidates;
    let selected = config
        .retry
        .retry("connect", move || async move {
            let mut last_error = None;
            for (position, provider) in candidate_refs.iter().enumerate() {
                match provider.ping().await {
                    Ok(()) => return Ok(position),
                    Err(e) => {
                        warn!(url = %provider.url(), error = %e, "Search engine address unreachable");
                        last_error = Some(e);
                    }
                }
            }
            Err(last_error
                .unwrap_or_else(|| SearchIndexError::connection("no address reachable")))
        })
        .await
        .map_err(|e| {
            SearchIndexError::connection(format!(
                "giving up after {} retries: {}",
                config.retry.max_retries, e
            ))
        })?;

    let provider = candidates.swap_remove(selected);
    info!(url = %provider.url(), "Connected to search engine");
    Ok(provider)
}
