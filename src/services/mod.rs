//! Service layer for the job watcher.
//!
//! This module contains the business logic for:
//! - Page rendering (`Renderer`)
//! - Listing/detail extraction (`extract`)
//! - Per-site scraping (`SourceAdapter`, `ListingScraper`)
//! - Subscriber fan-out (`Notifier`, `Transport`)

mod adapter;
pub mod extract;
mod notifier;
pub mod render;

pub use adapter::{ListingScraper, ScrapeLimits, SourceAdapter, build_adapters};
pub use notifier::{DeliveryReport, Notifier, Transport};
pub use render::Renderer;

#[cfg(test)]
pub(crate) use adapter::tests as adapter_tests;
#[cfg(test)]
pub(crate) use notifier::tests as notifier_tests;
