// src/models/profile.rs

//! Per-site scraping profile.
//!
//! A profile carries everything that differs between job boards: the search
//! URL, the CSS selectors and the date convention. The pagination driver in
//! `services::adapter` is shared by every profile.

use serde::{Deserialize, Serialize};

/// Where and how a source exposes the posting date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DateRule {
    /// The source shows no usable date.
    None,

    /// Read from an element inside the listing entry.
    Listing {
        selector: String,
        /// Attribute to read; element text when absent
        #[serde(default, skip_serializing_if = "Option::is_none")]
        attr: Option<String>,
        format: DateFormat,
    },

    /// Read from an element on the detail page.
    Detail { selector: String, format: DateFormat },
}

/// Source-specific date conventions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DateFormat {
    /// `2024-01-10 12:30:00`
    IsoDateTime,
    /// `2 дні`, `5 годин`, ...
    RelativeAgo,
    /// `Сьогодні о 12:30`, `Вчора о 09:15`, `5 січня 2024 р.`
    TodayYesterdayOrDate,
    /// `12 січня`
    DayMonth,
    /// Second whitespace-separated token, taken verbatim
    SecondToken,
}

/// Where the detail-page link lives inside a listing entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LinkSource {
    /// The `href` of the title element
    #[default]
    Title,
    /// The `href` of the entry element itself
    Entry,
}

/// Scraping profile for a single job board.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SiteProfile {
    /// Source identifier, also used as `PostingRecord::source`
    pub name: String,

    /// Search URL with the site's own filters baked in
    pub start_url: String,

    /// Selector for each posting in the listing
    pub listing_selector: String,

    /// Selector for the title element within a listing entry
    pub title_selector: String,

    #[serde(default)]
    pub link_source: LinkSource,

    /// Selector for the description container on the detail page
    pub description_selector: String,

    #[serde(default = "default_next_page_selector")]
    pub next_page_selector: String,

    #[serde(default = "default_date_rule")]
    pub date: DateRule,

    /// Bounded wait for the listing container, in milliseconds
    #[serde(default = "default_listing_wait")]
    pub listing_wait_ms: u64,

    /// Bounded wait for the description container, in milliseconds
    #[serde(default = "default_detail_wait")]
    pub detail_wait_ms: u64,
}

fn default_next_page_selector() -> String {
    "a[aria-label='Наступна сторінка']".to_string()
}

fn default_date_rule() -> DateRule {
    DateRule::None
}

fn default_listing_wait() -> u64 {
    8_000
}

fn default_detail_wait() -> u64 {
    8_000
}

impl SiteProfile {
    /// Collect every selector the profile uses, for validation.
    pub fn selectors(&self) -> Vec<&str> {
        let mut selectors = vec![
            self.listing_selector.as_str(),
            self.title_selector.as_str(),
            self.description_selector.as_str(),
            self.next_page_selector.as_str(),
        ];
        match &self.date {
            DateRule::None => {}
            DateRule::Listing { selector, .. } | DateRule::Detail { selector, .. } => {
                selectors.push(selector.as_str())
            }
        }
        selectors
    }
}
