//! Counters shared by the bulk indexer and its flush workers.

use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters, updated by producers and flush workers without locking.
#[derive(Debug, Default)]
pub struct BulkIndexerCounters {
    pub(crate) num_added: AtomicU64,
    pub(crate) num_flushed: AtomicU64,
    pub(crate) num_failed: AtomicU64,
    pub(crate) num_requests: AtomicU64,
}

impl BulkIndexerCounters {
    pub fn snapshot(&self) -> BulkIndexerStats {
        BulkIndexerStats {
            num_added: self.num_added.load(Ordering::SeqCst),
            num_flushed: self.num_flushed.load(Ordering::SeqCst),
            num_failed: self.num_failed.load(Ordering::SeqCst),
            num_requests: self.num_requests.load(Ordering::SeqCst),
        }
    }
}

/// Point-in-time view of the bulk indexer counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulkIndexerStats {
    /// Items accepted by `add`.
    pub num_added: u64,
    /// Items the engine indexed successfully.
    pub num_flushed: u64,
    /// Items that were rejected or lost to a failed batch write.
    pub num_failed: u64,
    /// Bulk requests sent, retries included.
    pub num_requests: u64,
}

impl BulkIndexerStats {
    /// Items accepted but not yet resolved either way.
    pub fn num_pending(&self) -> u64 {
        self.num_added
            .saturating_sub(self.num_flushed + self.num_failed)
    }
}
