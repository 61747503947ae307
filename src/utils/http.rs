// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use crate::error::Result;
use crate::models::RenderConfig;

/// Create a configured asynchronous HTTP client for page fetching.
pub fn create_client(config: &RenderConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Create a client for long-polling APIs.
///
/// The request timeout must outlive the server-side poll timeout, otherwise
/// every idle poll would surface as an error.
pub fn create_polling_client(poll_timeout_secs: u64) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(poll_timeout_secs + 15))
        .build()?;
    Ok(client)
}
