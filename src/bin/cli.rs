//! jobwatch CLI
//!
//! Runs the ingestion loop and the chat command poller, plus a few
//! operator commands against the same configuration and database.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use jobwatch::{
    bot::{CommandHandler, CommandPoller, TelegramClient},
    error::{AppError, Result},
    models::Config,
    pipeline::IngestionLoop,
    services::{self, ListingScraper, Notifier, ScrapeLimits, SourceAdapter, render},
    storage::Database,
    utils::http,
};

/// jobwatch - job board crawler with Telegram delivery
#[derive(Parser, Debug)]
#[command(name = "jobwatch", version, about = "Job board crawler with Telegram delivery")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "jobwatch.toml", global = true)]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the ingestion loop and the command poller
    Run,

    /// Scrape one source once and print its postings as JSON
    Scrape {
        /// Source name, e.g. "work.ua"
        #[arg(short, long)]
        source: String,
    },

    /// Show database statistics
    Status,

    /// Delete seen postings older than the given number of days
    Prune {
        #[arg(long)]
        days: u32,
    },

    /// Validate the configuration
    Validate,
}

/// Initialize logging. `RUST_LOG` wins over the configured level.
fn init_logging(level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    // A missing .env is fine.
    let _ = dotenvy::dotenv();

    let config = Config::load_or_default(&cli.config)?;
    let level = if cli.verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    init_logging(level);

    if !cli.config.exists() {
        log::warn!(
            "Config not found at {}. Using defaults.",
            cli.config.display()
        );
    }

    match cli.command {
        Command::Run => run(config).await?,

        Command::Scrape { source } => {
            let profile = config
                .profile(&source)
                .cloned()
                .ok_or_else(|| AppError::config(format!("unknown source '{source}'")))?;
            let renderer = render::from_config(&config.render)?;
            let scraper = ListingScraper::new(profile, renderer, ScrapeLimits::from(&config.ingest));

            let records = scraper.run().await?;
            log::info!("{}: {} postings", source, records.len());
            println!("{}", serde_json::to_string_pretty(&records)?);
        }

        Command::Status => {
            let db = Database::open(&config.storage.database)?;
            log::info!("Database: {}", config.storage.database);
            log::info!("Seen postings: {}", db.identity().count()?);
            log::info!("Subscribers: {}", db.subscribers().count()?);
        }

        Command::Prune { days } => {
            let db = Database::open(&config.storage.database)?;
            let deleted = db.identity().prune_older_than(days)?;
            log::info!("Pruned {} postings older than {} days", deleted, days);
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!(
                "✓ Config OK ({} profiles, sources: {})",
                config.profiles.len(),
                config.ingest.sources.join(", ")
            );
        }
    }

    Ok(())
}

async fn run(config: Config) -> Result<()> {
    config.validate()?;
    let token = config.bot_token()?;

    let db = Database::open(&config.storage.database)?;
    log::info!("Opened database {}", config.storage.database);

    let telegram = TelegramClient::new(
        http::create_polling_client(config.bot.poll_timeout_secs)?,
        &config.bot.api_base,
        &token,
    );

    let renderer = render::from_config(&config.render)?;
    let adapters = services::build_adapters(
        config.enabled_profiles()?,
        renderer,
        ScrapeLimits::from(&config.ingest),
    );
    let notifier = Notifier::new(
        db.subscribers(),
        Arc::new(telegram.clone()),
        config.notify.clone(),
    );
    let ingestion = IngestionLoop::new(adapters, db.identity(), notifier, &config.ingest);

    let handler = CommandHandler::new(db.subscribers(), db.identity(), config.ingest.interval_secs);
    let poller = CommandPoller::new(telegram, handler, config.bot.poll_timeout_secs);

    tokio::select! {
        _ = ingestion.run_forever() => {}
        _ = poller.run() => {}
        result = tokio::signal::ctrl_c() => {
            result?;
            log::info!("Shutting down...");
        }
    }

    Ok(())
}
