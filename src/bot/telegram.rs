// src/bot/telegram.rs

//! Minimal Telegram Bot API client.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::services::Transport;

/// Envelope of every Bot API response.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    error_code: Option<i64>,
    #[serde(default)]
    description: Option<String>,
}

impl<T> ApiResponse<T> {
    fn into_result(self) -> Result<T> {
        match (self.ok, self.result) {
            (true, Some(result)) => Ok(result),
            _ => Err(AppError::Telegram {
                code: self.error_code.unwrap_or_default(),
                description: self
                    .description
                    .unwrap_or_else(|| "empty response".to_string()),
            }),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub text: Option<String>,
}

impl Message {
    /// Sender id, falling back to the chat id for anonymous senders.
    pub fn sender_id(&self) -> i64 {
        self.from.as_ref().map_or(self.chat.id, |user| user.id)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
}

#[derive(Serialize)]
struct GetUpdates {
    offset: i64,
    timeout: u64,
    allowed_updates: &'static [&'static str],
}

/// Bot API client bound to one token.
#[derive(Clone)]
pub struct TelegramClient {
    client: reqwest::Client,
    base: String,
}

impl TelegramClient {
    pub fn new(client: reqwest::Client, api_base: &str, token: &str) -> Self {
        Self {
            client,
            base: format!("{}/bot{}", api_base.trim_end_matches('/'), token),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.base, method)
    }

    async fn call<B, T>(&self, method: &str, body: &B, timeout: Option<Duration>) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self.client.post(self.method_url(method)).json(body);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        // Errors come back as JSON with a non-2xx status, so the body is parsed either way.
        let response: ApiResponse<T> = request.send().await?.json().await?;
        response.into_result()
    }

    /// Send an HTML message with link previews disabled.
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        let body = SendMessage {
            chat_id,
            text,
            parse_mode: "HTML",
            disable_web_page_preview: true,
        };
        let _: serde_json::Value = self.call("sendMessage", &body, None).await?;
        Ok(())
    }

    /// Long-poll for updates after `offset`.
    pub async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>> {
        let body = GetUpdates {
            offset,
            timeout: timeout_secs,
            allowed_updates: &["message"],
        };
        let wait = Duration::from_secs(timeout_secs + 15);
        self.call("getUpdates", &body, Some(wait)).await
    }
}

#[async_trait]
impl Transport for TelegramClient {
    async fn send(&self, recipient: i64, text: &str) -> Result<()> {
        self.send_message(recipient, text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_url() {
        let client = TelegramClient::new(reqwest::Client::new(), "https://api.telegram.org/", "123:abc");
        assert_eq!(
            client.method_url("sendMessage"),
            "https://api.telegram.org/bot123:abc/sendMessage"
        );
    }

    #[test]
    fn test_error_response_maps_to_telegram_error() {
        let json = r#"{"ok":false,"error_code":403,"description":"Forbidden: bot was blocked by the user"}"#;
        let response: ApiResponse<serde_json::Value> = serde_json::from_str(json).unwrap();

        match response.into_result() {
            Err(AppError::Telegram { code, description }) => {
                assert_eq!(code, 403);
                assert!(description.contains("blocked"));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_parse_updates() {
        let json = r#"{"ok":true,"result":[
            {"update_id":10,"message":{"message_id":1,"chat":{"id":55,"type":"private"},"from":{"id":77,"is_bot":false,"first_name":"A"},"text":"/start"}},
            {"update_id":11,"edited_message":{"message_id":2,"chat":{"id":55}}},
            {"update_id":12,"message":{"message_id":3,"chat":{"id":-100}}}
        ]}"#;
        let response: ApiResponse<Vec<Update>> = serde_json::from_str(json).unwrap();
        let updates = response.into_result().unwrap();

        assert_eq!(updates.len(), 3);
        let first = updates[0].message.as_ref().unwrap();
        assert_eq!(first.sender_id(), 77);
        assert_eq!(first.text.as_deref(), Some("/start"));
        assert!(updates[1].message.is_none());
        assert_eq!(updates[2].message.as_ref().unwrap().sender_id(), -100);
    }
}
