//! Processor module for the places indexer ingest.
//!
//! Transforms raw input rows into place documents.

mod record_processor;

pub use record_processor::{RecordProcessor, RECORD_FIELDS};
