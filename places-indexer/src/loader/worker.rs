//! Flush worker: owns one batch buffer and writes it to the engine.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use places_indexer_repository::{BulkOperation, RetryPolicy, SearchIndexProvider};
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, instrument};

use super::item::{BulkIndexerItem, ItemCallbacks};
use super::stats::BulkIndexerCounters;
use crate::errors::{BulkItemError, FlushFailure};

pub(crate) struct FlushWorker {
    pub(crate) id: usize,
    pub(crate) index: String,
    pub(crate) provider: Arc<dyn SearchIndexProvider>,
    pub(crate) receiver: mpsc::Receiver<BulkIndexerItem>,
    pub(crate) counters: Arc<BulkIndexerCounters>,
    pub(crate) flush_bytes: usize,
    pub(crate) flush_interval: Duration,
    pub(crate) retry: RetryPolicy,
}

impl FlushWorker {
    /// Serve the queue until every sender is gone, then flush what is left.
    ///
    /// Returns the batch writes that failed after retries.
    pub(crate) async fn run(self) -> Vec<FlushFailure> {
        let FlushWorker {
            id,
            index,
            provider,
            mut receiver,
            counters,
            flush_bytes,
            flush_interval,
            retry,
        } = self;

        let mut batch = Batch {
            worker: id,
            index,
            provider,
            counters,
            retry,
            items: Vec::new(),
            bytes: 0,
            failures: Vec::new(),
        };

        let mut ticker = interval_at(Instant::now() + flush_interval, flush_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                item = receiver.recv() => match item {
                    Some(item) => {
                        batch.push(item);
                        if batch.bytes >= flush_bytes {
                            batch.flush().await;
                            ticker.reset();
                        }
                    }
                    None => {
                        batch.flush().await;
                        break;
                    }
                },
                _ = ticker.tick() => {
                    batch.flush().await;
                }
            }
        }

        debug!(worker = id, "Flush worker stopped");
        batch.failures
    }
}

struct Batch {
    worker: usize,
    index: String,
    provider: Arc<dyn SearchIndexProvider>,
    counters: Arc<BulkIndexerCounters>,
    retry: RetryPolicy,
    items: Vec<BulkIndexerItem>,
    bytes: usize,
    failures: Vec<FlushFailure>,
}

impl Batch {
    fn push(&mut self, item: BulkIndexerItem) {
        self.bytes += item.size();
        self.items.push(item);
    }

    #[instrument(skip(self), fields(worker = self.worker, count = self.items.len(), bytes = self.bytes))]
    async fn flush(&mut self) {
        if self.items.is_empty() {
            return;
        }

        let items = std::mem::take(&mut self.items);
        self.bytes = 0;

        let (operations, callbacks): (Vec<BulkOperation>, Vec<ItemCallbacks>) =
            items.into_iter().map(BulkIndexerItem::into_parts).unzip();

        let provider = &self.provider;
        let counters = &self.counters;
        let index = self.index.as_str();
        let batch = operations.as_slice();

        let result = self
            .retry
            .retry("bulk_index", move || async move {
                counters.num_requests.fetch_add(1, Ordering::SeqCst);
                provider.bulk_index(index, batch).await
            })
            .await;

        match result {
            Ok(responses) => {
                let mut responses = responses.into_iter();
                let mut succeeded = 0usize;

                for callbacks in callbacks {
                    match responses.next() {
                        Some(response) if response.is_success() => {
                            succeeded += 1;
                            self.counters.num_flushed.fetch_add(1, Ordering::SeqCst);
                            callbacks.succeed(&response);
                        }
                        Some(response) => {
                            self.counters.num_failed.fetch_add(1, Ordering::SeqCst);
                            callbacks.fail(&BulkItemError::from(&response));
                        }
                        None => {
                            self.counters.num_failed.fetch_add(1, Ordering::SeqCst);
                            callbacks.fail(&BulkItemError::MissingResponse);
                        }
                    }
                }

                debug!(
                    succeeded,
                    failed = operations.len() - succeeded,
                    "Flushed batch"
                );
            }
            Err(e) => {
                let reason = e.to_string();
                error!(
                    documents = operations.len(),
                    error = %e,
                    "Bulk write failed after retries"
                );

                let failure = BulkItemError::Transport(reason.clone());
                for callbacks in callbacks {
                    self.counters.num_failed.fetch_add(1, Ordering::SeqCst);
                    callbacks.fail(&failure);
                }

                self.failures.push(FlushFailure {
                    worker: self.worker,
                    documents: operations.len(),
                    reason,
                });
            }
        }
    }
}
