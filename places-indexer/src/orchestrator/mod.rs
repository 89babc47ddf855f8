//! Orchestrator module for the places indexer ingest.
//!
//! Reads the input file, turns every row into a document on its own task and
//! feeds the documents to the bulk indexer.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use csv::{ReaderBuilder, StringRecord};
use tokio::task::JoinSet;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{error, info, instrument, warn};

use crate::errors::IngestError;
use crate::loader::{BulkIndexer, BulkIndexerItem, BulkIndexerStats};
use crate::processor::RecordProcessor;

/// Configuration for the orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// How long `close` may take once every row is submitted. `None` waits forever.
    pub close_timeout: Option<Duration>,
    /// How often load progress is logged.
    pub progress_interval: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            close_timeout: None,
            progress_interval: Duration::from_secs(10),
        }
    }
}

/// Outcome of one load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Data rows read from the input, header excluded.
    pub rows: u64,
    /// Rows skipped because they could not be read or validated.
    pub invalid_rows: u64,
    /// Valid documents that could not be handed to the bulk indexer.
    pub unsubmitted: u64,
    /// Batch writes that failed after retries.
    pub flush_failures: usize,
    /// Final bulk indexer counters.
    pub stats: BulkIndexerStats,
}

impl LoadSummary {
    /// Documents the engine indexed.
    pub fn successful(&self) -> u64 {
        self.stats.num_flushed
    }

    /// Valid documents built from the input.
    pub fn documents(&self) -> u64 {
        self.rows.saturating_sub(self.invalid_rows)
    }
}

/// Orchestrator that coordinates the ingest components.
pub struct Orchestrator {
    processor: RecordProcessor,
    indexer: Arc<BulkIndexer>,
    config: OrchestratorConfig,
}

impl Orchestrator {
    /// Create a new orchestrator with the given components.
    pub fn new(processor: RecordProcessor, indexer: BulkIndexer) -> Self {
        Self::with_config(processor, indexer, OrchestratorConfig::default())
    }

    /// Create a new orchestrator with custom configuration.
    pub fn with_config(
        processor: RecordProcessor,
        indexer: BulkIndexer,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            processor,
            indexer: Arc::new(indexer),
            config,
        }
    }

    /// Load the tab-separated file at `path`.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub async fn run(self, path: &Path) -> Result<LoadSummary, IngestError> {
        let file = File::open(path).map_err(|e| {
            IngestError::reader(format!("failed to open {}: {}", path.display(), e))
        })?;
        self.load(file).await
    }

    /// Load tab-separated rows from `input`, then close the bulk indexer.
    ///
    /// Bad rows and failed documents are logged and counted; they never stop
    /// the load. Only an unreadable input or a failure to close is an error.
    pub async fn load<R>(self, input: R) -> Result<LoadSummary, IngestError>
    where
        R: Read + Send + 'static,
    {
        let (rows, unreadable) = tokio::task::spawn_blocking(move || read_rows(input))
            .await
            .map_err(|e| IngestError::reader(format!("reader task failed: {}", e)))??;

        let mut summary = LoadSummary {
            rows: rows.len() as u64 + unreadable,
            invalid_rows: unreadable,
            ..LoadSummary::default()
        };
        info!(rows = summary.rows, "Read input rows");

        let mut producers = JoinSet::new();
        for (line, record) in rows {
            let indexer = Arc::clone(&self.indexer);
            let processor = self.processor;

            producers.spawn(async move {
                let document = processor.process_record(line, &record)?;
                let document_id = document.id.clone();
                let item = BulkIndexerItem::from_document(&document)?.on_failure(move |e| {
                    error!(document_id = %document_id, line, error = %e, "Failed to index place");
                });
                indexer.add(item).await
            });
        }

        let mut submitted = 0u64;
        let mut progress = interval_at(
            Instant::now() + self.config.progress_interval,
            self.config.progress_interval,
        );
        progress.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                joined = producers.join_next() => match joined {
                    Some(Ok(Ok(()))) => submitted += 1,
                    Some(Ok(Err(IngestError::ValidationError { line, message }))) => {
                        warn!(line, reason = %message, "Skipping invalid row");
                        summary.invalid_rows += 1;
                    }
                    Some(Ok(Err(e))) => {
                        error!(error = %e, "Failed to submit place");
                        summary.unsubmitted += 1;
                    }
                    Some(Err(e)) => {
                        error!(error = %e, "Producer task failed");
                        summary.unsubmitted += 1;
                    }
                    None => break,
                },
                _ = progress.tick() => {
                    let stats = self.indexer.stats();
                    info!(
                        submitted,
                        indexed = stats.num_flushed,
                        failed = stats.num_failed,
                        "Load progress"
                    );
                }
            }
        }

        summary.stats = match self.indexer.close(self.config.close_timeout).await {
            Ok(stats) => stats,
            Err(IngestError::FlushError { failures, stats }) => {
                for failure in &failures {
                    error!(
                        worker = failure.worker,
                        documents = failure.documents,
                        reason = %failure.reason,
                        "Batch was not indexed"
                    );
                }
                summary.flush_failures = failures.len();
                stats
            }
            Err(e) => return Err(e),
        };

        info!(
            rows = summary.rows,
            invalid = summary.invalid_rows,
            indexed = summary.successful(),
            failed = summary.stats.num_failed,
            "Load finished"
        );
        Ok(summary)
    }
}

/// Read every data row with its 1-based line number.
///
/// Returns the rows and the number of rows that could not be decoded.
fn read_rows<R: Read>(input: R) -> Result<(Vec<(u64, StringRecord)>, u64), IngestError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .from_reader(input);

    let mut rows = Vec::new();
    let mut unreadable = 0u64;

    for (n, result) in reader.records().enumerate() {
        match result {
            Ok(record) => {
                let line = record
                    .position()
                    .map(|p| p.line())
                    .unwrap_or(n as u64 + 2);
                rows.push((line, record));
            }
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                warn!(error = %e, "Skipping unreadable row");
                unreadable += 1;
            }
        }
    }

    Ok((rows, unreadable))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_rows_skips_header_and_keeps_quotes() {
        let input = "id\tname\taddress\tphone\tlon\tlat\n\
                     1\tCafe \"X\"\t123 Main\t555-1234\t-122.4\t37.7\n\
                     2\tShort row\n";

        let (rows, unreadable) = read_rows(input.as_bytes()).unwrap();

        assert_eq!(unreadable, 0);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].0, 2);
        assert_eq!(rows[0].1.get(1), Some("Cafe \"X\""));
        assert_eq!(rows[1].0, 3);
        assert_eq!(rows[1].1.len(), 2);
    }

    #[test]
    fn test_read_rows_counts_undecodable_rows() {
        let mut input = b"id\tname\taddress\tphone\tlon\tlat\n".to_vec();
        input.extend_from_slice(b"1\t\xff\xfe\t\t\t0\t0\n");
        input.extend_from_slice(b"2\tok\t\t\t0\t0\n");

        let (rows, unreadable) = read_rows(input.as_slice()).unwrap();

        assert_eq!(unreadable, 1);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].1.get(0), Some("2"));
    }

    #[test]
    fn test_summary_counts() {
        let summary = LoadSummary {
            rows: 10,
            invalid_rows: 3,
            stats: BulkIndexerStats {
                num_added: 7,
                num_flushed: 6,
                num_failed: 1,
                num_requests: 1,
            },
            ..LoadSummary::default()
        };

        assert_eq!(summary.documents(), 7);
        assert_eq!(summary.successful(), 6);
    }
}
