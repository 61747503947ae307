// src/models/mod.rs

//! Domain models for the job watcher.
//!
//! This module contains the data structures shared by the scraping services,
//! the storage layer and the ingestion pipeline.

mod config;
mod posting;
mod profile;

// Re-export all public types
pub use config::{
    BotConfig, Config, IngestConfig, LoggingConfig, NotifyConfig, RenderBackend, RenderConfig,
    StorageConfig, TOKEN_ENV,
};
pub use posting::{PostingRecord, SeenEntry};
pub use profile::{DateFormat, DateRule, LinkSource, SiteProfile};
