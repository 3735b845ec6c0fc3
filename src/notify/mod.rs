//! Chat broadcast channel for surfacing errors to a set of destinations.
//!
//! Sends one message per configured chat over a Telegram-style HTTP API and
//! aggregates per-destination failures instead of failing fast, so one dead
//! chat never hides the others.

use reqwest::Client;
use serde::Serialize;

use crate::error::{TrailError, join_errors};

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Separator between aggregated per-chat failures.
const FAILURE_SEPARATOR: &str = " && ";

#[derive(Debug, Clone)]
pub struct BroadcastOptions {
    /// Trim leading/trailing whitespace from outgoing messages.
    pub trim_whitespace: bool,
    /// Parse mode forwarded to the chat API.
    pub parse_mode: String,
}

impl Default for BroadcastOptions {
    fn default() -> Self {
        Self {
            trim_whitespace: true,
            parse_mode: "Markdown".to_string(),
        }
    }
}

/// Broadcasts a message to every configured chat destination.
pub struct BroadcastBot {
    client: Client,
    token: String,
    chat_ids: Vec<i64>,
    options: BroadcastOptions,
    api_base: String,
}

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    parse_mode: &'a str,
}

impl BroadcastBot {
    /// Fails on an empty token or an empty destination list.
    pub fn new(
        token: impl Into<String>,
        chat_ids: Vec<i64>,
        options: BroadcastOptions,
    ) -> Result<Self, TrailError> {
        let token = token.into();
        if token.is_empty() || chat_ids.is_empty() {
            return Err(TrailError::new(
                "failed to create broadcast bot: invalid token or chat id",
            ));
        }
        Ok(Self {
            client: Client::new(),
            token,
            chat_ids,
            options,
            api_base: TELEGRAM_API_BASE.to_string(),
        })
    }

    /// Points the bot at a different API host (tests use a local mock).
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    /// Sends `text` to every destination, never failing fast: each chat is
    /// attempted, and per-chat failures are aggregated with
    /// [`join_errors`]. Returns `None` when every send succeeded.
    pub async fn send_to_all(&self, text: &str) -> Option<TrailError> {
        let text = if self.options.trim_whitespace {
            text.trim()
        } else {
            text
        };
        let mut failures = Vec::new();
        for &chat_id in &self.chat_ids {
            if let Err(err) = self.send_to_chat(chat_id, text).await {
                failures.push(Some(err));
            }
        }
        join_errors(FAILURE_SEPARATOR, failures)
    }

    async fn send_to_chat(&self, chat_id: i64, text: &str) -> Result<(), TrailError> {
        let url = format!("{}/bot{}/sendMessage", self.api_base, self.token);
        let body = SendMessageRequest {
            chat_id,
            text,
            parse_mode: &self.options.parse_mode,
        };
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                TrailError::from_error(&err)
                    .context(format!("failed to send message to chat {chat_id}"))
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(TrailError::new(format!("chat api returned status {status}"))
                .context(format!("failed to send message to chat {chat_id}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_empty_token() {
        assert!(BroadcastBot::new("", vec![1], BroadcastOptions::default()).is_err());
    }

    #[test]
    fn new_rejects_empty_chat_list() {
        assert!(BroadcastBot::new("token", vec![], BroadcastOptions::default()).is_err());
    }

    #[test]
    fn options_default_to_trimming_markdown() {
        let options = BroadcastOptions::default();
        assert!(options.trim_whitespace);
        assert_eq!(options.parse_mode, "Markdown");
    }
}
