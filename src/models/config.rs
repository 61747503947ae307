//! Application configuration structures.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::SiteProfile;

/// Environment variable that overrides `bot.token`.
pub const TOKEN_ENV: &str = "BOT_TOKEN";

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Telegram Bot API settings
    #[serde(default)]
    pub bot: BotConfig,

    /// Polling loop settings
    #[serde(default)]
    pub ingest: IngestConfig,

    /// Page rendering backend settings
    #[serde(default)]
    pub render: RenderConfig,

    /// SQLite database location
    #[serde(default)]
    pub storage: StorageConfig,

    /// Notification message settings
    #[serde(default)]
    pub notify: NotifyConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Site profiles, selectable by name from `ingest.sources`
    #[serde(default = "defaults::default_profiles")]
    pub profiles: Vec<SiteProfile>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration, or defaults when the file does not exist.
    ///
    /// A file that exists but does not parse is still an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Bot token from the environment, falling back to the config file.
    pub fn bot_token(&self) -> Result<String> {
        let token = std::env::var(TOKEN_ENV)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| self.bot.token.clone());

        if token.trim().is_empty() {
            return Err(AppError::config(format!(
                "bot token missing: set {TOKEN_ENV} or bot.token"
            )));
        }
        Ok(token.trim().to_string())
    }

    /// Profiles named in `ingest.sources`, in configured order.
    pub fn enabled_profiles(&self) -> Result<Vec<SiteProfile>> {
        self.ingest
            .sources
            .iter()
            .map(|name| {
                self.profile(name)
                    .cloned()
                    .ok_or_else(|| AppError::config(format!("unknown source '{name}'")))
            })
            .collect()
    }

    /// Find a profile by source name.
    pub fn profile(&self, name: &str) -> Option<&SiteProfile> {
        self.profiles.iter().find(|p| p.name == name)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.ingest.interval_secs == 0 {
            return Err(AppError::validation("ingest.interval_secs must be > 0"));
        }
        if self.ingest.max_records == 0 {
            return Err(AppError::validation("ingest.max_records must be > 0"));
        }
        if self.ingest.max_pages == 0 {
            return Err(AppError::validation("ingest.max_pages must be > 0"));
        }
        if self.ingest.sources.is_empty() {
            return Err(AppError::validation("No sources enabled"));
        }
        if self.render.user_agent.trim().is_empty() {
            return Err(AppError::validation("render.user_agent is empty"));
        }
        if self.render.timeout_secs == 0 {
            return Err(AppError::validation("render.timeout_secs must be > 0"));
        }
        if self.render.backend == RenderBackend::Browserless
            && self.render.browserless_url.trim().is_empty()
        {
            return Err(AppError::validation(
                "render.browserless_url is required for the browserless backend",
            ));
        }
        if self.storage.database.trim().is_empty() {
            return Err(AppError::validation("storage.database is empty"));
        }
        if self.notify.template.trim().is_empty() {
            return Err(AppError::validation("notify.template is empty"));
        }

        let mut names = HashSet::new();
        for profile in &self.profiles {
            if !names.insert(profile.name.as_str()) {
                return Err(AppError::validation(format!(
                    "duplicate profile '{}'",
                    profile.name
                )));
            }
            url::Url::parse(&profile.start_url)?;
            for selector in profile.selectors() {
                scraper::Selector::parse(selector)
                    .map_err(|e| AppError::selector(selector, format!("{e:?}")))?;
            }
        }

        self.enabled_profiles()?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot: BotConfig::default(),
            ingest: IngestConfig::default(),
            render: RenderConfig::default(),
            storage: StorageConfig::default(),
            notify: NotifyConfig::default(),
            logging: LoggingConfig::default(),
            profiles: defaults::default_profiles(),
        }
    }
}

/// Telegram Bot API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Bot token; `BOT_TOKEN` takes precedence
    #[serde(default)]
    pub token: String,

    #[serde(default = "defaults::api_base")]
    pub api_base: String,

    /// Long-polling timeout for `getUpdates`
    #[serde(default = "defaults::poll_timeout")]
    pub poll_timeout_secs: u64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            api_base: defaults::api_base(),
            poll_timeout_secs: defaults::poll_timeout(),
        }
    }
}

/// Ingestion loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Sleep between cycles in seconds
    #[serde(default = "defaults::interval")]
    pub interval_secs: u64,

    /// Pause after each delivered posting in milliseconds
    #[serde(default = "defaults::delivery_delay")]
    pub delivery_delay_ms: u64,

    /// Maximum postings collected per source per cycle
    #[serde(default = "defaults::max_records")]
    pub max_records: usize,

    /// Maximum listing pages visited per source per cycle
    #[serde(default = "defaults::max_pages")]
    pub max_pages: usize,

    /// Enabled source names, in scan order
    #[serde(default = "defaults::sources")]
    pub sources: Vec<String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            interval_secs: defaults::interval(),
            delivery_delay_ms: defaults::delivery_delay(),
            max_records: defaults::max_records(),
            max_pages: defaults::max_pages(),
            sources: defaults::sources(),
        }
    }
}

/// Rendering backend selection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RenderBackend {
    /// Plain HTTP fetch of the server-rendered page
    #[default]
    Http,
    /// Headless Chrome through a Browserless `/content` endpoint
    Browserless,
}

/// Page rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    #[serde(default)]
    pub backend: RenderBackend,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    #[serde(default = "defaults::browserless_url")]
    pub browserless_url: String,

    #[serde(default)]
    pub browserless_token: Option<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            backend: RenderBackend::default(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            browserless_url: defaults::browserless_url(),
            browserless_token: None,
        }
    }
}

/// Persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    #[serde(default = "defaults::database")]
    pub database: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database: defaults::database(),
        }
    }
}

/// Notification formatting settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Message template, see `PostingRecord::format`
    #[serde(default = "defaults::template")]
    pub template: String,

    /// Description length cap in graphemes
    #[serde(default = "defaults::description_limit")]
    pub description_limit: usize,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            template: defaults::template(),
            description_limit: defaults::description_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    use crate::models::{DateFormat, DateRule, LinkSource, SiteProfile};

    // Bot defaults
    pub fn api_base() -> String {
        "https://api.telegram.org".into()
    }
    pub fn poll_timeout() -> u64 {
        30
    }

    // Ingest defaults
    pub fn interval() -> u64 {
        15 * 60
    }
    pub fn delivery_delay() -> u64 {
        500
    }
    pub fn max_records() -> usize {
        20
    }
    pub fn max_pages() -> usize {
        10
    }
    pub fn sources() -> Vec<String> {
        default_profiles().into_iter().map(|p| p.name).collect()
    }

    // Render defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn browserless_url() -> String {
        "http://localhost:3000".into()
    }

    // Storage defaults
    pub fn database() -> String {
        "jobs.db".into()
    }

    // Notify defaults
    pub fn template() -> String {
        "<b>{title}</b>\n\n{description}\n\nPublished: {date}\nSource: <i>{source}</i>\n<a href=\"{link}\">Link</a>".into()
    }
    pub fn description_limit() -> usize {
        2000
    }

    pub fn log_level() -> String {
        "info".into()
    }

    fn next_page() -> String {
        "a[aria-label='Наступна сторінка']".to_string()
    }

    // Site profile defaults
    pub fn default_profiles() -> Vec<SiteProfile> {
        vec![
            SiteProfile {
                name: "work.ua".to_string(),
                start_url: "https://www.work.ua/jobs-it-industry-it/?advs=1&sort=date&days=122&language=1+41&language_level=1-83+1-84+41-22836".to_string(),
                listing_selector: "div.card.card-hover.card-visited.wordwrap.job-link".to_string(),
                title_selector: "h2.my-0 a".to_string(),
                link_source: LinkSource::Title,
                description_selector: "div#job-description".to_string(),
                next_page_selector: next_page(),
                date: DateRule::Listing {
                    selector: "div.flex.flex-align-center.flex-wrap time".to_string(),
                    attr: Some("datetime".to_string()),
                    format: DateFormat::IsoDateTime,
                },
                listing_wait_ms: 8_000,
                detail_wait_ms: 5_000,
            },
            SiteProfile {
                name: "robota.ua".to_string(),
                start_url: "https://robota.ua/zapros/ukraine/params;scheduleIds=3;rubrics=1-404,1-429,1-439;salaryType=false".to_string(),
                listing_selector: "a.card[href*='/vacancy']".to_string(),
                title_selector: "h2".to_string(),
                link_source: LinkSource::Entry,
                description_selector: "div.full-desc".to_string(),
                next_page_selector: next_page(),
                date: DateRule::Detail {
                    selector: "span.santa-typo-regular.santa-whitespace-nowrap".to_string(),
                    format: DateFormat::RelativeAgo,
                },
                // The listing is rendered client-side and is slow to settle.
                listing_wait_ms: 60_000,
                detail_wait_ms: 8_000,
            },
            SiteProfile {
                name: "olx.ua".to_string(),
                start_url: "https://www.olx.ua/uk/rabota/it-telekom-kompyutery/drugoe/?currency=UAH&search%5Bfilter_enum_job_type%5D%5B0%5D=remote&search%5Bfilter_enum_job_type%5D%5B1%5D=perm&search%5Bfilter_enum_job_type%5D%5B2%5D=part_time&search%5Border%5D=created_at%3Adesc".to_string(),
                listing_selector: "div.jobs-ad-card".to_string(),
                title_selector: "div.css-1s4cikj a".to_string(),
                link_source: LinkSource::Title,
                description_selector: "div.css-1i3492".to_string(),
                next_page_selector: next_page(),
                date: DateRule::Listing {
                    selector: "p.css-996jis".to_string(),
                    attr: None,
                    format: DateFormat::TodayYesterdayOrDate,
                },
                listing_wait_ms: 8_000,
                detail_wait_ms: 8_000,
            },
            SiteProfile {
                name: "dou.ua".to_string(),
                start_url: "https://jobs.dou.ua/vacancies/?category=Python&exp=1-3".to_string(),
                listing_selector: "li.l-vacancy".to_string(),
                title_selector: "div.title a.vt".to_string(),
                link_source: LinkSource::Title,
                description_selector: "div.b-typo.vacancy-section".to_string(),
                next_page_selector: next_page(),
                date: DateRule::Listing {
                    selector: "div.date".to_string(),
                    attr: None,
                    format: DateFormat::DayMonth,
                },
                listing_wait_ms: 8_000,
                detail_wait_ms: 8_000,
            },
            SiteProfile {
                name: "djinni.co".to_string(),
                start_url: "https://djinni.co/jobs/?primary_keyword=Python&exp_level=1y&exp_level=2y&employment=remote".to_string(),
                listing_selector: "ul.list-unstyled.list-jobs.mb-4 li".to_string(),
                title_selector: "h2.fs-3.mb-2 a.job-item__title-link".to_string(),
                link_source: LinkSource::Title,
                description_selector: "div.mb-4.job-post__description".to_string(),
                next_page_selector: next_page(),
                date: DateRule::Listing {
                    selector: "span.text-nowrap[data-original-title]".to_string(),
                    attr: Some("data-original-title".to_string()),
                    format: DateFormat::SecondToken,
                },
                listing_wait_ms: 8_000,
                detail_wait_ms: 8_000,
            },
        ]
    }
}
