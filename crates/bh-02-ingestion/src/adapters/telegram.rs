//! Telegram Bot API notifier (reqwest).

use crate::domain::MessageOptions;
use crate::error::{IngestionError, IngestionResult};
use crate::ports::Notifier;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'a str>,
    disable_web_page_preview: bool,
}

#[derive(Debug, Deserialize)]
struct BotApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// `sendMessage` client. No retries.
pub struct TelegramNotifier {
    api_url: String,
    bot_token: String,
    http_client: reqwest::Client,
}

impl TelegramNotifier {
    pub fn new(api_url: impl Into<String>, bot_token: impl Into<String>) -> Self {
        Self::with_timeout(api_url, bot_token, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(
        api_url: impl Into<String>,
        bot_token: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            bot_token: bot_token.into(),
            http_client: super::http_client(timeout),
        }
    }

    fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_url, self.bot_token)
    }
}

impl fmt::Debug for TelegramNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramNotifier")
            .field("api_url", &self.api_url)
            .field("bot_token", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(
        &self,
        channel_id: &str,
        message: &str,
        options: &MessageOptions,
    ) -> IngestionResult<()> {
        let request = SendMessageRequest {
            chat_id: channel_id,
            text: message,
            parse_mode: options.parse_mode.as_deref(),
            disable_web_page_preview: options.disable_web_page_preview,
        };

        // reqwest errors embed the URL, which carries the token.
        let response = self
            .http_client
            .post(self.send_message_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| IngestionError::Notification {
                reason: e.without_url().to_string(),
            })?;

        let status = response.status();
        let body: BotApiResponse =
            response
                .json()
                .await
                .map_err(|e| IngestionError::Notification {
                    reason: format!("HTTP {}: {}", status, e.without_url()),
                })?;

        if !status.is_success() || !body.ok {
            return Err(IngestionError::Notification {
                reason: format!(
                    "HTTP {}: {}",
                    status,
                    body.description.as_deref().unwrap_or("request rejected")
                ),
            });
        }
        Ok(())
    }
}
