//! OpenSearch provider implementation.
//!
//! This module provides the concrete implementation of `SearchIndexProvider`
//! using the OpenSearch Rust crate.

use async_trait::async_trait;
use opensearch::{
    http::{
        response::Response,
        transport::{SingleNodeConnectionPool, TransportBuilder},
    },
    indices::{IndicesCreateParts, IndicesDeleteParts},
    BulkParts, OpenSearch, SearchParts,
};
use places_indexer_shared::{SearchBody, SearchResponse};
use serde_json::Value;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::retry::RetryPolicy;
use crate::types::{BulkItemResponse, BulkOperation, BulkResponseBody};

/// OpenSearch provider implementation.
///
/// Admin and search requests are retried with the provider's `RetryPolicy`.
/// Bulk writes make a single attempt so the bulk indexer controls its own
/// retry budget.
///
/// # Example
///
/// ```ignore
/// use places_indexer_repository::{OpenSearchProvider, RetryPolicy, SearchIndexProvider};
///
/// let provider = OpenSearchProvider::new("http://localhost:9200", RetryPolicy::default())?;
/// provider.ping().await?;
/// provider.delete_index("places").await?;
/// ```
pub struct OpenSearchProvider {
    client: OpenSearch,
    url: Url,
    retry: RetryPolicy,
}

impl OpenSearchProvider {
    /// Create a new OpenSearch provider for the specified URL.
    ///
    /// No request is made; use [`OpenSearchProvider::ping`] or
    /// [`crate::opensearch::connect`] to check reachability.
    ///
    /// # Arguments
    ///
    /// * `url` - The OpenSearch server URL (e.g., "http://localhost:9200")
    /// * `retry` - Retry policy for admin and search requests
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchProvider)` - A new provider instance
    /// * `Err(SearchIndexError)` - If the URL is invalid or the transport cannot be built
    pub fn new(url: &str, retry: RetryPolicy) -> Result<Self, SearchIndexError> {
        let parsed_url = Url::parse(url)
            .map_err(|e| SearchIndexError::connection(format!("invalid URL '{}': {}", url, e)))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url.clone());
        let transport = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .build()
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        debug!(url = %parsed_url, "Created OpenSearch provider");

        Ok(Self {
            client,
            url: parsed_url,
            retry,
        })
    }

    /// The address this provider talks to.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The retry policy applied to admin and search requests.
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Check that the node answers. Single attempt.
    pub async fn ping(&self) -> Result<(), SearchIndexError> {
        let response = self.client.ping().send().await.map_err(transport_error)?;
        expect_success(response, "ping").await.map(|_| ())
    }

    /// Build the NDJSON body of a bulk request: an action line then the source, per operation.
    fn bulk_body(operations: &[BulkOperation]) -> Vec<String> {
        operations
            .iter()
            .flat_map(|op| [op.action_line(), op.source.clone()])
            .collect()
    }
}

/// Map a transport level failure. These are always candidates for a retry.
fn transport_error(err: opensearch::Error) -> SearchIndexError {
    SearchIndexError::connection(err.to_string())
}

/// Turn a non-2xx response into `UnexpectedStatus`, keeping the body for diagnostics.
async fn expect_success(response: Response, operation: &str) -> Result<Response, SearchIndexError> {
    let status = response.status_code();
    if status.is_success() {
        return Ok(response);
    }

    let error_body = response.text().await.unwrap_or_default();
    error!(operation, status = %status, body = %error_body, "Search engine request failed");
    Err(SearchIndexError::unexpected_status(
        status.as_u16(),
        error_body,
    ))
}

#[async_trait]
impl SearchIndexProvider for OpenSearchProvider {
    /// Delete an index, ignoring a missing one.
    async fn delete_index(&self, index: &str) -> Result<(), SearchIndexError> {
        let client = &self.client;

        self.retry
            .retry("delete_index", move || async move {
                let response = client
                    .indices()
                    .delete(IndicesDeleteParts::Index(&[index]))
                    .ignore_unavailable(true)
                    .send()
                    .await
                    .map_err(transport_error)?;

                // 404 is acceptable - the index may not exist yet
                if response.status_code().as_u16() == 404 {
                    return Ok(());
                }
                expect_success(response, "delete_index").await.map(|_| ())
            })
            .await?;

        info!(index = %index, "Deleted index");
        Ok(())
    }

    /// Create an index, sending the schema verbatim.
    async fn create_index(&self, index: &str, schema: &Value) -> Result<(), SearchIndexError> {
        let client = &self.client;

        self.retry
            .retry("create_index", move || async move {
                let response = client
                    .indices()
                    .create(IndicesCreateParts::Index(index))
                    .body(schema)
                    .send()
                    .await
                    .map_err(transport_error)?;

                expect_success(response, "create_index").await.map(|_| ())
            })
            .await?;

        info!(index = %index, "Created index");
        Ok(())
    }

    async fn bulk_index(
        &self,
        index: &str,
        operations: &[BulkOperation],
    ) -> Result<Vec<BulkItemResponse>, SearchIndexError> {
        if operations.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .client
            .bulk(BulkParts::Index(index))
            .body(Self::bulk_body(operations))
            .send()
            .await
            .map_err(transport_error)?;

        let response = expect_success(response, "bulk").await?;
        let parsed: BulkResponseBody = response.json().await.map_err(|e| {
            SearchIndexError::bulk_index(format!("failed to decode bulk response: {}", e))
        })?;

        if parsed.items.len() != operations.len() {
            warn!(
                sent = operations.len(),
                received = parsed.items.len(),
                "Bulk response item count does not match the request"
            );
        }

        debug!(
            index = %index,
            count = operations.len(),
            errors = parsed.errors,
            "Bulk request completed"
        );

        Ok(parsed.items.into_iter().map(|item| item.index).collect())
    }

    async fn search(
        &self,
        index: &str,
        body: &SearchBody,
    ) -> Result<SearchResponse, SearchIndexError> {
        let client = &self.client;

        self.retry
            .retry("search", move || async move {
                let response = client
                    .search(SearchParts::Index(&[index]))
                    .body(body)
                    .send()
                    .await
                    .map_err(transport_error)?;

                let response = expect_success(response, "search").await?;
                response.json::<SearchResponse>().await.map_err(|e| {
                    SearchIndexError::query(format!("failed to decode search response: {}", e))
                })
            })
            .await
    }
}
