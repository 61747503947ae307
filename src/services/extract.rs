// src/services/extract.rs

//! Listing and detail page extraction driven by a `SiteProfile`.
//!
//! These functions are synchronous and own no parsed DOM beyond their own
//! scope, so the async scraper never holds a document across an await.

use chrono::NaiveDateTime;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{DateRule, LinkSource, SiteProfile};
use crate::utils::dates::parse_date;
use crate::utils::resolve_url;
use crate::utils::text::{element_text, inline_text};

/// One posting as seen on a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub title: String,
    pub link: String,
    /// Empty when the date lives on the detail page or is unparseable
    pub published: String,
}

/// A parsed listing page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPage {
    pub entries: Vec<ListingEntry>,
    pub next_url: Option<String>,
}

/// A parsed detail page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailPage {
    pub description: String,
    pub published: String,
}

/// Parse a listing page into entries and the next-page URL.
pub fn parse_listing(
    profile: &SiteProfile,
    html: &str,
    page_url: &str,
    now: NaiveDateTime,
) -> Result<ListingPage> {
    let base_url = Url::parse(page_url)?;
    let document = Html::parse_document(html);

    let listing_sel = parse_selector(&profile.listing_selector)?;
    let title_sel = parse_selector(&profile.title_selector)?;
    let next_sel = parse_selector(&profile.next_page_selector)?;
    let date_sel = match &profile.date {
        DateRule::Listing { selector, .. } => Some(parse_selector(selector)?),
        _ => None,
    };

    let mut entries = Vec::new();
    for row in document.select(&listing_sel) {
        if let Some(entry) =
            parse_listing_entry(profile, &row, &title_sel, date_sel.as_ref(), &base_url, now)
        {
            entries.push(entry);
        }
    }

    let next_url = document
        .select(&next_sel)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .map(|href| resolve_url(&base_url, href));

    Ok(ListingPage { entries, next_url })
}

/// Parse a detail page into its description and, if the profile says so, its date.
pub fn parse_detail(profile: &SiteProfile, html: &str, now: NaiveDateTime) -> Result<DetailPage> {
    let document = Html::parse_document(html);
    let desc_sel = parse_selector(&profile.description_selector)?;

    let description = document
        .select(&desc_sel)
        .next()
        .map(|el| element_text(&el))
        .unwrap_or_default();

    let published = match &profile.date {
        DateRule::Detail { selector, format } => {
            let date_sel = parse_selector(selector)?;
            document
                .select(&date_sel)
                .next()
                .map(|el| parse_date(&inline_text(&el), *format, now))
                .unwrap_or_default()
        }
        _ => String::new(),
    };

    Ok(DetailPage {
        description,
        published,
    })
}

fn parse_listing_entry(
    profile: &SiteProfile,
    row: &ElementRef,
    title_sel: &Selector,
    date_sel: Option<&Selector>,
    base_url: &Url,
    now: NaiveDateTime,
) -> Option<ListingEntry> {
    let title_elem = row.select(title_sel).next()?;
    let title = inline_text(&title_elem);
    if title.is_empty() {
        return None;
    }

    let href = match profile.link_source {
        LinkSource::Title => title_elem.value().attr("href"),
        LinkSource::Entry => row.value().attr("href"),
    }
    .map(str::trim)
    .filter(|href| !href.is_empty())?;

    let published = match (&profile.date, date_sel) {
        (DateRule::Listing { attr, format, .. }, Some(sel)) => row
            .select(sel)
            .next()
            .and_then(|el| match attr {
                Some(name) => el.value().attr(name).map(str::to_string),
                None => Some(inline_text(&el)),
            })
            .map(|raw| parse_date(&raw, *format, now))
            .unwrap_or_default(),
        _ => String::new(),
    };

    Some(ListingEntry {
        title,
        link: resolve_url(base_url, href),
        published,
    })
}

pub(crate) fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}
