//! Loader module for the places indexer ingest.
//!
//! The [`BulkIndexer`] accepts documents from any number of concurrent
//! producers and writes them to the search index in batches.
//!
//! ## Flow
//!
//! 1. `add` hands an item to one of `num_workers` flush workers, round-robin.
//!    Each worker has a bounded queue, so `add` waits when the queue is full.
//! 2. A worker flushes its buffer when it reaches `flush_bytes`, when
//!    `flush_interval` elapses with items buffered, or when the indexer closes.
//! 3. A flush is one bulk request. Transient failures are retried with
//!    backoff; per-document outcomes go to the item's callbacks and counters.
//! 4. `close` stops intake, drains every queue and reports the totals.

mod item;
mod stats;
mod worker;

pub use item::{BulkIndexerItem, FailureCallback, SuccessCallback};
pub use stats::{BulkIndexerCounters, BulkIndexerStats};

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use places_indexer_repository::opensearch::INDEX_NAME;
use places_indexer_repository::{RetryPolicy, SearchIndexProvider};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info, instrument};

use crate::errors::{FlushFailure, IngestError};
use worker::FlushWorker;

/// Default number of flush workers.
pub const DEFAULT_NUM_WORKERS: usize = 8;

/// Default buffered size that triggers a flush: 5 MiB.
pub const DEFAULT_FLUSH_BYTES: usize = 5 * 1024 * 1024;

/// Default time after which a non-empty buffer is flushed.
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(30);

/// Default queue capacity per worker.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1000;

/// Configuration for the bulk indexer.
#[derive(Debug, Clone)]
pub struct BulkIndexerConfig {
    /// Target index.
    pub index: String,
    /// Number of flush workers, each with its own buffer.
    pub num_workers: usize,
    /// Buffered bytes that trigger a flush.
    pub flush_bytes: usize,
    /// Maximum time a non-empty buffer waits before it is flushed.
    pub flush_interval: Duration,
    /// Items each worker queues before `add` waits.
    pub queue_capacity: usize,
    /// Retry policy for failed bulk requests.
    pub retry: RetryPolicy,
}

impl Default for BulkIndexerConfig {
    fn default() -> Self {
        Self {
            index: INDEX_NAME.to_string(),
            num_workers: DEFAULT_NUM_WORKERS,
            flush_bytes: DEFAULT_FLUSH_BYTES,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            retry: RetryPolicy::default(),
        }
    }
}

impl BulkIndexerConfig {
    /// Create a default configuration targeting `index`.
    pub fn new(index: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<(), IngestError> {
        if self.index.is_empty() {
            return Err(IngestError::config("index name must not be empty"));
        }
        if self.num_workers == 0 {
            return Err(IngestError::config("num_workers must be at least 1"));
        }
        if self.flush_bytes == 0 {
            return Err(IngestError::config("flush_bytes must be at least 1"));
        }
        if self.flush_interval.is_zero() {
            return Err(IngestError::config("flush_interval must be greater than zero"));
        }
        if self.queue_capacity == 0 {
            return Err(IngestError::config("queue_capacity must be at least 1"));
        }
        Ok(())
    }
}

/// Concurrent, batching writer into the search index.
///
/// Shared by reference (usually behind an `Arc`) between producers. Counters
/// belong to the instance; read them with [`BulkIndexer::stats`].
pub struct BulkIndexer {
    senders: RwLock<Vec<mpsc::Sender<BulkIndexerItem>>>,
    next_worker: AtomicUsize,
    closed: AtomicBool,
    workers: Mutex<WorkerSet>,
    counters: Arc<BulkIndexerCounters>,
}

impl BulkIndexer {
    /// Start the flush workers. Must be called from within a tokio runtime.
    pub fn new(
        provider: Arc<dyn SearchIndexProvider>,
        config: BulkIndexerConfig,
    ) -> Result<Self, IngestError> {
        config.validate()?;

        let counters = Arc::new(BulkIndexerCounters::default());
        let mut senders = Vec::with_capacity(config.num_workers);
        let mut workers = Vec::with_capacity(config.num_workers);

        for id in 0..config.num_workers {
            let (sender, receiver) = mpsc::channel(config.queue_capacity);
            let worker = FlushWorker {
                id,
                index: config.index.clone(),
                provider: Arc::clone(&provider),
                receiver,
                counters: Arc::clone(&counters),
                flush_bytes: config.flush_bytes,
                flush_interval: config.flush_interval,
                retry: config.retry.clone(),
            };
            senders.push(sender);
            workers.push(tokio::spawn(worker.run()));
        }

        info!(
            index = %config.index,
            num_workers = config.num_workers,
            flush_bytes = config.flush_bytes,
            flush_interval_secs = config.flush_interval.as_secs_f64(),
            "Bulk indexer started"
        );

        Ok(Self {
            senders: RwLock::new(senders),
            next_worker: AtomicUsize::new(0),
            closed: AtomicBool::new(false),
            workers: Mutex::new(WorkerSet::new(workers)),
            counters,
        })
    }

    /// Submit one item.
    ///
    /// Waits while the chosen worker's queue is full. Fails with
    /// `SubmissionError` once `close` has begun; the item is then dropped
    /// without invoking its callbacks.
    pub async fn add(&self, item: BulkIndexerItem) -> Result<(), IngestError> {
        let sender = self.next_sender()?;

        let permit = sender
            .reserve()
            .await
            .map_err(|_| IngestError::submission("bulk indexer is closed"))?;

        self.counters.num_added.fetch_add(1, Ordering::SeqCst);
        permit.send(item);
        Ok(())
    }

    fn next_sender(&self) -> Result<mpsc::Sender<BulkIndexerItem>, IngestError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(IngestError::submission("bulk indexer is closed"));
        }

        let senders = self.senders.read().unwrap_or_else(PoisonError::into_inner);
        if senders.is_empty() {
            return Err(IngestError::submission("bulk indexer is closed"));
        }

        let slot = self.next_worker.fetch_add(1, Ordering::Relaxed) % senders.len();
        Ok(senders[slot].clone())
    }

    /// Current counters.
    pub fn stats(&self) -> BulkIndexerStats {
        self.counters.snapshot()
    }

    /// Stop accepting items, flush everything queued and wait for the workers.
    ///
    /// Adds that are already waiting for queue space still complete. When any
    /// batch write failed after retries the error carries the final stats, so
    /// the results of the successful flushes are kept.
    ///
    /// After a `CloseTimeout` the workers keep running and a later `close`
    /// waits for them again. Once every worker has finished, further calls
    /// return the same outcome.
    #[instrument(skip(self))]
    pub async fn close(&self, timeout: Option<Duration>) -> Result<BulkIndexerStats, IngestError> {
        self.closed.store(true, Ordering::SeqCst);
        self.senders
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();

        let mut workers = self.workers.lock().await;
        let was_running = !workers.is_finished();

        match timeout {
            Some(limit) => tokio::time::timeout(limit, workers.join())
                .await
                .map_err(|_| IngestError::CloseTimeout(limit))?,
            None => workers.join().await,
        }

        let stats = self.stats();
        if was_running {
            info!(
                added = stats.num_added,
                flushed = stats.num_flushed,
                failed = stats.num_failed,
                requests = stats.num_requests,
                "Bulk indexer closed"
            );
        }

        workers.outcome(stats)
    }
}

/// Flush worker handles plus what the finished ones reported.
struct WorkerSet {
    handles: Vec<JoinHandle<Vec<FlushFailure>>>,
    failures: Vec<FlushFailure>,
    panicked: Option<String>,
}

impl WorkerSet {
    fn new(handles: Vec<JoinHandle<Vec<FlushFailure>>>) -> Self {
        Self {
            handles,
            failures: Vec::new(),
            panicked: None,
        }
    }

    fn is_finished(&self) -> bool {
        self.handles.is_empty()
    }

    /// Wait for every remaining worker. A handle is removed only once it has
    /// completed, so cancelling this future loses nothing.
    async fn join(&mut self) {
        while let Some(handle) = self.handles.last_mut() {
            let result = handle.await;
            self.handles.pop();
            match result {
                Ok(mut worker_failures) => self.failures.append(&mut worker_failures),
                Err(e) => {
                    error!(error = %e, "Flush worker did not finish");
                    self.panicked.get_or_insert_with(|| e.to_string());
                }
            }
        }
    }

    fn outcome(&self, stats: BulkIndexerStats) -> Result<BulkIndexerStats, IngestError> {
        if let Some(reason) = &self.panicked {
            return Err(IngestError::WorkerPanicked(reason.clone()));
        }
        if self.failures.is_empty() {
            Ok(stats)
        } else {
            Err(IngestError::FlushError {
                failures: self.failures.clone(),
                stats,
            })
        }
    }
}
