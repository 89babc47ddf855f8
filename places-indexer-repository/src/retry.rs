//! Retry policy for requests against the search engine.
//!
//! Every retry cycle starts from a fresh exponential backoff sequence, so a
//! request that fails after a long quiet period does not inherit the delays of
//! an earlier cycle.

use std::future::Future;
use std::time::Duration;

use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::RetryIf;
use tracing::warn;

use crate::errors::SearchIndexError;

/// Status codes retried by default: gateway errors and throttling.
pub const DEFAULT_RETRY_ON_STATUS: [u16; 4] = [502, 503, 504, 429];

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: usize = 5;

/// Default first backoff delay.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(500);

/// Default cap on a single backoff delay.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(30);

/// How transient engine failures are retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt. `0` disables retrying.
    pub max_retries: usize,
    /// HTTP statuses treated as transient.
    pub retry_on_status: Vec<u16>,
    /// First delay of the exponential sequence; each following delay doubles.
    pub base_delay: Duration,
    /// Upper bound for a single delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            retry_on_status: DEFAULT_RETRY_ON_STATUS.to_vec(),
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

impl RetryPolicy {
    /// A policy that gives up after the first failure.
    pub fn no_retries() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Set the number of retries.
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the first backoff delay.
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Set the upper bound for a single delay.
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// A fresh backoff sequence: `base, 2*base, 4*base, ...` capped at `max_delay`,
    /// jittered, and at most `max_retries` long.
    pub fn backoff(&self) -> impl Iterator<Item = Duration> {
        // ExponentialBackoff yields `factor * 2^n` ms for n = 1, 2, ...
        let factor = (self.base_delay.as_millis() as u64 / 2).max(1);

        ExponentialBackoff::from_millis(2)
            .factor(factor)
            .max_delay(self.max_delay)
            .map(jitter)
            .take(self.max_retries)
    }

    /// Whether `error` is worth another attempt under this policy.
    pub fn should_retry(&self, error: &SearchIndexError) -> bool {
        error.is_transient(&self.retry_on_status)
    }

    /// Run `action`, retrying transient failures with backoff.
    ///
    /// Returns the last error once the retries are exhausted or as soon as a
    /// non-transient error is seen.
    pub async fn retry<T, A, Fut>(&self, operation: &str, action: A) -> Result<T, SearchIndexError>
    where
        A: FnMut() -> Fut,
        Fut: Future<Output = Result<T, SearchIndexError>>,
    {
        let mut attempt = 0usize;

        RetryIf::start(self.backoff(), action, |error: &SearchIndexError| {
            attempt += 1;
            let retry = attempt <= self.max_retries && self.should_retry(error);
            if retry {
                warn!(
                    operation,
                    attempt,
                    max_retries = self.max_retries,
                    error = %error,
                    "Transient search engine error, backing off"
                );
            }
            retry
        })
        .await
    }
}
