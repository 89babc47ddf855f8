//! Connection configuration for the search engine.

use crate::retry::RetryPolicy;

/// Default OpenSearch address.
pub const DEFAULT_OPENSEARCH_URL: &str = "http://localhost:9200";

/// Where the search engine lives and how hard to try reaching it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Candidate endpoint addresses, tried in order.
    pub addresses: Vec<String>,
    /// Retry policy for connecting and for every request made afterwards.
    pub retry: RetryPolicy,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            addresses: vec![DEFAULT_OPENSEARCH_URL.to_string()],
            retry: RetryPolicy::default(),
        }
    }
}

impl ConnectionConfig {
    /// Create a config for the given addresses with the default retry policy.
    pub fn new<I, S>(addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            addresses: addresses.into_iter().map(Into::into).collect(),
            retry: RetryPolicy::default(),
        }
    }

    /// Parse a comma separated address list, ignoring blank entries.
    ///
    /// # Example
    ///
    /// ```
    /// use places_indexer_repository::ConnectionConfig;
    ///
    /// let config = ConnectionConfig::from_address_list("http://a:9200, http://b:9200,");
    /// assert_eq!(config.addresses, vec!["http://a:9200", "http://b:9200"]);
    /// ```
    pub fn from_address_list(list: &str) -> Self {
        Self::new(
            list.split(',')
                .map(str::trim)
                .filter(|address| !address.is_empty()),
        )
    }

    /// Replace the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}
