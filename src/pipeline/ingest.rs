// src/pipeline/ingest.rs

//! Periodic ingestion: scrape, deduplicate, deliver.

use std::fmt;
use std::time::Duration;

use crate::models::IngestConfig;
use crate::services::{Notifier, SourceAdapter};
use crate::storage::IdentityStore;

/// Result of one adapter within a cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceReport {
    pub name: String,
    pub total: usize,
    pub new: usize,
    /// Set when the adapter failed and was skipped this cycle.
    pub error: Option<String>,
}

impl fmt::Display for SourceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error {
            Some(e) => write!(f, "{}: failed ({})", self.name, e),
            None => write!(f, "{}: {} total, {} new", self.name, self.total, self.new),
        }
    }
}

/// Result of one full pass over all adapters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub sources: Vec<SourceReport>,
}

impl CycleReport {
    pub fn total_count(&self) -> usize {
        self.sources.iter().map(|s| s.total).sum()
    }

    pub fn new_count(&self) -> usize {
        self.sources.iter().map(|s| s.new).sum()
    }

    pub fn failed(&self) -> usize {
        self.sources.iter().filter(|s| s.error.is_some()).count()
    }
}

/// Drives every adapter in order, forever.
pub struct IngestionLoop {
    adapters: Vec<Box<dyn SourceAdapter>>,
    identity: IdentityStore,
    notifier: Notifier,
    interval: Duration,
    delivery_delay: Duration,
}

impl IngestionLoop {
    pub fn new(
        adapters: Vec<Box<dyn SourceAdapter>>,
        identity: IdentityStore,
        notifier: Notifier,
        config: &IngestConfig,
    ) -> Self {
        Self {
            adapters,
            identity,
            notifier,
            interval: Duration::from_secs(config.interval_secs),
            delivery_delay: Duration::from_millis(config.delivery_delay_ms),
        }
    }

    /// Override the pause between deliveries.
    pub fn with_delivery_delay(mut self, delay: Duration) -> Self {
        self.delivery_delay = delay;
        self
    }

    /// Run one pass over all adapters.
    pub async fn run_cycle(&self) -> CycleReport {
        let mut report = CycleReport::default();

        for adapter in &self.adapters {
            let source = self.run_adapter(adapter.as_ref()).await;
            if source.error.is_some() {
                log::error!("{}", source);
            } else {
                log::info!("{}", source);
            }
            report.sources.push(source);
        }

        report
    }

    async fn run_adapter(&self, adapter: &dyn SourceAdapter) -> SourceReport {
        let mut report = SourceReport {
            name: adapter.name().to_string(),
            ..Default::default()
        };

        let records = match adapter.run().await {
            Ok(records) => records,
            Err(e) => {
                report.error = Some(e.to_string());
                return report;
            }
        };
        report.total = records.len();

        for record in &records {
            match self.identity.seen_posting(record) {
                Ok(true) => continue,
                Ok(false) => {}
                Err(e) => {
                    log::error!("Failed to check posting '{}': {}", record.title, e);
                    continue;
                }
            }

            let delivery = self.notifier.deliver(record).await;
            log::debug!(
                "Delivered '{}' to {} subscribers ({} failed)",
                record.title,
                delivery.delivered,
                delivery.failed
            );
            report.new += 1;

            if !self.delivery_delay.is_zero() {
                tokio::time::sleep(self.delivery_delay).await;
            }
        }

        report
    }

    /// Scan, then sleep for the interval. Never returns.
    pub async fn run_forever(&self) {
        log::info!(
            "Ingestion loop started: {} sources, every {}s",
            self.adapters.len(),
            self.interval.as_secs()
        );

        loop {
            let report = self.run_cycle().await;
            log::info!(
                "Cycle done: {} total, {} new, {} failed sources",
                report.total_count(),
                report.new_count(),
                report.failed()
            );
            tokio::time::sleep(self.interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::error::{AppError, Result};
    use crate::models::{NotifyConfig, PostingRecord};
    use crate::services::adapter_tests::{FakeRenderer, test_profile};
    use crate::services::notifier_tests::RecordingTransport;
    use crate::services::{ListingScraper, ScrapeLimits};
    use crate::storage::Database;

    /// Emits the same records on every run.
    struct FixedAdapter {
        name: String,
        records: Vec<PostingRecord>,
    }

    impl FixedAdapter {
        fn new(name: &str, descriptions: &[&str]) -> Self {
            let records = descriptions
                .iter()
                .enumerate()
                .map(|(i, description)| PostingRecord {
                    title: format!("Job {i}"),
                    link: format!("https://{name}/jobs/{i}"),
                    description: description.to_string(),
                    source: name.to_string(),
                    published: String::new(),
                })
                .collect();
            Self {
                name: name.to_string(),
                records,
            }
        }
    }

    #[async_trait]
    impl SourceAdapter for FixedAdapter {
        fn name(&self) -> &str {
            &self.name
        }

        async fn run(&self) -> Result<Vec<PostingRecord>> {
            Ok(self.records.clone())
        }
    }

    struct BrokenAdapter;

    #[async_trait]
    impl SourceAdapter for BrokenAdapter {
        fn name(&self) -> &str {
            "broken"
        }

        async fn run(&self) -> Result<Vec<PostingRecord>> {
            Err(AppError::adapter("broken", "browser crashed"))
        }
    }

    fn ingestion(
        adapters: Vec<Box<dyn SourceAdapter>>,
        subscribers: &[i64],
    ) -> (IngestionLoop, Arc<RecordingTransport>) {
        let db = Database::open_in_memory().unwrap();
        let registry = db.subscribers();
        for id in subscribers {
            registry.add(*id).unwrap();
        }

        let transport = Arc::new(RecordingTransport::default());
        let notifier = Notifier::new(registry, transport.clone(), NotifyConfig::default());
        let ingest = IngestionLoop::new(adapters, db.identity(), notifier, &IngestConfig::default())
            .with_delivery_delay(Duration::ZERO);
        (ingest, transport)
    }

    #[tokio::test]
    async fn test_new_records_then_rerun_reports_zero_new() {
        let adapter = FixedAdapter::new("work.ua", &["one", "two", "three"]);
        let (ingest, transport) = ingestion(vec![Box::new(adapter)], &[10]);

        let first = ingest.run_cycle().await;
        assert_eq!(first.sources[0].to_string(), "work.ua: 3 total, 3 new");
        assert_eq!(transport.sent().len(), 3);

        let second = ingest.run_cycle().await;
        assert_eq!(second.sources[0].to_string(), "work.ua: 3 total, 0 new");
        assert_eq!(transport.sent().len(), 3);
    }

    #[tokio::test]
    async fn test_duplicate_descriptions_in_one_run_deliver_once() {
        let adapter = FixedAdapter::new("dou.ua", &["Remote Python", "remote   python", "Go"]);
        let (ingest, transport) = ingestion(vec![Box::new(adapter)], &[1, 2]);

        let report = ingest.run_cycle().await;

        assert_eq!(report.sources[0].new, 2);
        assert_eq!(transport.sent().len(), 4);
    }

    #[tokio::test]
    async fn test_failing_adapter_does_not_stop_others() {
        let adapters: Vec<Box<dyn SourceAdapter>> = vec![
            Box::new(BrokenAdapter),
            Box::new(FixedAdapter::new("djinni.co", &["rust"])),
        ];
        let (ingest, transport) = ingestion(adapters, &[5]);

        let report = ingest.run_cycle().await;

        assert_eq!(report.failed(), 1);
        assert!(report.sources[0].error.as_deref().unwrap().contains("browser crashed"));
        assert_eq!(report.sources[1].to_string(), "djinni.co: 1 total, 1 new");
        assert_eq!(transport.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_adapters_run_in_configured_order() {
        let adapters: Vec<Box<dyn SourceAdapter>> = vec![
            Box::new(FixedAdapter::new("olx.ua", &["a"])),
            Box::new(FixedAdapter::new("robota.ua", &["b"])),
        ];
        let (ingest, _) = ingestion(adapters, &[]);

        let report = ingest.run_cycle().await;

        let names: Vec<_> = report.sources.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["olx.ua", "robota.ua"]);
        assert_eq!(report.total_count(), 2);
        assert_eq!(report.new_count(), 2);
    }

    #[tokio::test]
    async fn test_replayed_scrape_delivers_each_posting_once() {
        let renderer = FakeRenderer::default()
            .page(
                "https://jobs.example/list?page=1",
                "<ul><li class='job'><a href='/job/1'>Rust dev</a></li>\
                 <li class='job'><a href='/job/2'>Rust developer</a></li>\
                 <li class='job'><a href='/job/3'>QA</a></li></ul>",
            )
            .page("https://jobs.example/job/1", "<div class='desc'>Rust, Tokio</div>")
            .page("https://jobs.example/job/2", "<div class='desc'>rust,   tokio</div>")
            .page("https://jobs.example/job/3", "<div class='desc'>Manual testing</div>");
        let scraper = ListingScraper::new(
            test_profile(),
            Arc::new(renderer),
            ScrapeLimits {
                max_records: 20,
                max_pages: 10,
            },
        );
        let (ingest, transport) = ingestion(vec![Box::new(scraper)], &[1]);

        let first = ingest.run_cycle().await;
        let second = ingest.run_cycle().await;

        assert_eq!(first.sources[0].to_string(), "example: 3 total, 2 new");
        assert_eq!(second.sources[0].to_string(), "example: 3 total, 0 new");

        let sent = transport.sent();
        assert_eq!(sent.len(), 2);
        assert!(sent[0].1.contains("<b>Rust dev</b>"));
        assert!(sent[1].1.contains("<b>QA</b>"));
    }

    #[tokio::test]
    async fn test_identity_store_error_skips_records() {
        let db = Database::open_in_memory().unwrap();
        db.subscribers().add(3).unwrap();
        let transport = Arc::new(RecordingTransport::default());
        let notifier = Notifier::new(db.subscribers(), transport.clone(), NotifyConfig::default());
        let adapter = FixedAdapter::new("work.ua", &["one", "two"]);
        let ingest = IngestionLoop::new(
            vec![Box::new(adapter)],
            db.identity(),
            notifier,
            &IngestConfig::default(),
        )
        .with_delivery_delay(Duration::ZERO);

        db.lock().execute_batch("DROP TABLE seen_jobs").unwrap();
        let report = ingest.run_cycle().await;

        assert_eq!(report.sources[0].to_string(), "work.ua: 2 total, 0 new");
        assert!(report.sources[0].error.is_none());
        assert!(transport.sent().is_empty());
    }
}
