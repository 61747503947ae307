//! Long-running pipeline entry points.
//!
//! - `IngestionLoop`: scrape every source, deliver unseen postings, sleep

mod ingest;

pub use ingest::{CycleReport, IngestionLoop, SourceReport};
