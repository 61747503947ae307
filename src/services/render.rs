// src/services/render.rs

//! Page rendering backends.
//!
//! A renderer loads a URL and hands back its HTML once a selector is present.
//! `Ok(None)` means the selector never showed up within the wait, which the
//! scrapers treat as an empty page rather than an error.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use scraper::Html;
use serde_json::json;

use crate::error::{AppError, Result};
use crate::models::{RenderBackend, RenderConfig};
use crate::services::extract::parse_selector;
use crate::utils::http;

/// Black-box "open page, wait for selector, return DOM" capability.
///
/// Every call is a self-contained page open and close.
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, url: &str, wait_for: &str, wait: Duration) -> Result<Option<String>>;
}

/// Build the renderer selected in configuration.
pub fn from_config(config: &RenderConfig) -> Result<Arc<dyn Renderer>> {
    let client = http::create_client(config)?;
    let renderer: Arc<dyn Renderer> = match config.backend {
        RenderBackend::Http => Arc::new(HttpRenderer::new(client)),
        RenderBackend::Browserless => Arc::new(BrowserlessRenderer::new(
            client,
            &config.browserless_url,
            config.browserless_token.as_deref(),
        )),
    };
    Ok(renderer)
}

/// Check whether `html` contains at least one element matching `selector`.
pub fn contains_selector(html: &str, selector: &str) -> Result<bool> {
    let sel = parse_selector(selector)?;
    let document = Html::parse_document(html);
    Ok(document.select(&sel).next().is_some())
}

/// Fetches server-rendered HTML directly.
pub struct HttpRenderer {
    client: Client,
}

impl HttpRenderer {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn fetch(&self, url: &str, wait: Duration) -> reqwest::Result<String> {
        self.client
            .get(url)
            .timeout(wait)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }
}

#[async_trait]
impl Renderer for HttpRenderer {
    async fn render(&self, url: &str, wait_for: &str, wait: Duration) -> Result<Option<String>> {
        // The wait overrides the client-wide timeout.
        let html = match self.fetch(url, wait).await {
            Ok(html) => html,
            Err(e) if e.is_timeout() => return Ok(None),
            Err(e) => return Err(AppError::render(url, e)),
        };

        if contains_selector(&html, wait_for)? {
            Ok(Some(html))
        } else {
            log::debug!("Selector '{}' not present at {}", wait_for, url);
            Ok(None)
        }
    }
}

/// Time allowed on top of the selector wait for navigation and serialization.
const BROWSERLESS_OVERHEAD: Duration = Duration::from_secs(30);

/// Renders pages in headless Chrome through a Browserless `/content` endpoint.
pub struct BrowserlessRenderer {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl BrowserlessRenderer {
    pub fn new(client: Client, base_url: &str, token: Option<&str>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()).map(String::from),
        }
    }

    fn endpoint(&self) -> String {
        let mut endpoint = format!("{}/content", self.base_url);
        if let Some(ref token) = self.token {
            endpoint.push_str(&format!("?token={token}"));
        }
        endpoint
    }
}

#[async_trait]
impl Renderer for BrowserlessRenderer {
    async fn render(&self, url: &str, wait_for: &str, wait: Duration) -> Result<Option<String>> {
        let body = json!({
            "url": url,
            "gotoOptions": { "waitUntil": "domcontentloaded" },
            "waitForSelector": {
                "selector": wait_for,
                "timeout": u64::try_from(wait.as_millis()).unwrap_or(u64::MAX),
            },
        });

        let request = self
            .client
            .post(self.endpoint())
            .timeout(wait.saturating_add(BROWSERLESS_OVERHEAD))
            .json(&body);
        let resp = match request.send().await {
            Ok(resp) => resp,
            Err(e) if e.is_timeout() => return Ok(None),
            Err(e) => return Err(AppError::render(url, e)),
        };

        let status = resp.status();
        let text = resp.text().await?;

        if status.is_success() {
            return Ok(Some(text));
        }
        if status == StatusCode::REQUEST_TIMEOUT || text.contains("TimeoutError") {
            log::debug!("Browserless timed out waiting for '{}' at {}", wait_for, url);
            return Ok(None);
        }

        Err(AppError::render(
            url,
            format!("browserless status {}: {}", status.as_u16(), text.trim()),
        ))
    }
}
