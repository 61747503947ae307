// src/services/adapter.rs

//! Source adapters.
//!
//! Every job board goes through the same walk: render listing page, extract
//! entries, render each detail page, follow the next-page link. Only the
//! `SiteProfile` differs between sources.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Local, NaiveDateTime};

use crate::error::Result;
use crate::models::{IngestConfig, PostingRecord, SiteProfile};
use crate::services::extract::{self, DetailPage};
use crate::services::render::Renderer;

/// A source of job postings.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Source identifier used in logs and on every record.
    fn name(&self) -> &str;

    /// Produce this cycle's postings. Bounded by the adapter's limits.
    async fn run(&self) -> Result<Vec<PostingRecord>>;
}

/// Per-run bounds for a scraper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrapeLimits {
    /// Stop after this many postings
    pub max_records: usize,
    /// Stop after this many listing pages
    pub max_pages: usize,
}

impl From<&IngestConfig> for ScrapeLimits {
    fn from(config: &IngestConfig) -> Self {
        Self {
            max_records: config.max_records,
            max_pages: config.max_pages,
        }
    }
}

/// Paginating scraper for one `SiteProfile`.
pub struct ListingScraper {
    profile: SiteProfile,
    renderer: Arc<dyn Renderer>,
    limits: ScrapeLimits,
    fixed_now: Option<NaiveDateTime>,
}

impl ListingScraper {
    pub fn new(profile: SiteProfile, renderer: Arc<dyn Renderer>, limits: ScrapeLimits) -> Self {
        Self {
            profile,
            renderer,
            limits,
            fixed_now: None,
        }
    }

    /// Anchor relative dates on a fixed instant instead of the local clock.
    pub fn with_fixed_now(mut self, now: NaiveDateTime) -> Self {
        self.fixed_now = Some(now);
        self
    }

    /// Render and parse a detail page, degrading to an empty description.
    async fn fetch_detail(&self, link: &str, now: NaiveDateTime) -> DetailPage {
        let wait = Duration::from_millis(self.profile.detail_wait_ms);
        let rendered = self
            .renderer
            .render(link, &self.profile.description_selector, wait)
            .await;

        match rendered {
            Ok(Some(html)) => extract::parse_detail(&self.profile, &html, now).unwrap_or_else(|e| {
                log::warn!("{}: failed to parse detail page {}: {}", self.profile.name, link, e);
                DetailPage::default()
            }),
            Ok(None) => {
                log::warn!("{}: description not found at {}", self.profile.name, link);
                DetailPage::default()
            }
            Err(e) => {
                log::warn!("{}: failed to open {}: {}", self.profile.name, link, e);
                DetailPage::default()
            }
        }
    }
}

/// Build one scraper per enabled profile, in configured order.
pub fn build_adapters(
    profiles: Vec<SiteProfile>,
    renderer: Arc<dyn Renderer>,
    limits: ScrapeLimits,
) -> Vec<Box<dyn SourceAdapter>> {
    profiles
        .into_iter()
        .map(|profile| {
            Box::new(ListingScraper::new(profile, Arc::clone(&renderer), limits))
                as Box<dyn SourceAdapter>
        })
        .collect()
}

#[async_trait]
impl SourceAdapter for ListingScraper {
    fn name(&self) -> &str {
        &self.profile.name
    }

    async fn run(&self) -> Result<Vec<PostingRecord>> {
        let now = self.fixed_now.unwrap_or_else(|| Local::now().naive_local());
        let listing_wait = Duration::from_millis(self.profile.listing_wait_ms);

        log::info!("Scraping {}", self.profile.name);

        let mut records = Vec::new();
        let mut url = self.profile.start_url.clone();

        for page_no in 1..=self.limits.max_pages {
            let Some(html) = self
                .renderer
                .render(&url, &self.profile.listing_selector, listing_wait)
                .await?
            else {
                log::warn!(
                    "{}: no postings found on page {} ({}), stopping",
                    self.profile.name,
                    page_no,
                    url
                );
                break;
            };

            let listing = extract::parse_listing(&self.profile, &html, &url, now)?;
            log::debug!(
                "{}: page {} has {} postings",
                self.profile.name,
                page_no,
                listing.entries.len()
            );

            for entry in listing.entries {
                let detail = self.fetch_detail(&entry.link, now).await;
                let published = if entry.published.is_empty() {
                    detail.published
                } else {
                    entry.published
                };

                records.push(PostingRecord {
                    title: entry.title,
                    link: entry.link,
                    description: detail.description,
                    source: self.profile.name.clone(),
                    published,
                });

                if records.len() >= self.limits.max_records {
                    log::info!(
                        "{}: reached the limit of {} postings",
                        self.profile.name,
                        self.limits.max_records
                    );
                    return Ok(records);
                }
            }

            match listing.next_url {
                Some(next) if next != url => url = next,
                _ => break,
            }
        }

        log::info!("{}: scraped {} postings", self.profile.name, records.len());
        Ok(records)
    }
}
