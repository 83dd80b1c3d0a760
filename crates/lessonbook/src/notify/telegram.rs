//! Telegram Bot API notifier.

use std::time::Duration;

use chrono::FixedOffset;
use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::Client;
use serde_json::json;
use tracing::info;
use url::Url;

use super::{BookingNotice, Notifier, NotifyError};

/// Default base URL of the Telegram Bot API.
pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Posts booking notices to one Telegram chat via `sendMessage`.
#[derive(Clone)]
pub struct TelegramNotifier {
    client: Client,
    endpoint: Url,
    chat_id: String,
    offset: FixedOffset,
}

impl TelegramNotifier {
    /// Creates a notifier for `chat_id` using bot `token`.
    ///
    /// # Arguments
    /// * `api_base` - Base URL of the Bot API (overridable for testing)
    /// * `token` - Bot token issued by BotFather
    /// * `chat_id` - Chat that receives the messages
    /// * `offset` - Offset used to render lesson times
    pub fn new(
        api_base: &str,
        token: &str,
        chat_id: &str,
        offset: FixedOffset,
    ) -> Result<Self, NotifyError> {
        // Bot tokens contain a colon, so build the path textually rather than via `Url::join`
        let endpoint = Url::parse(&format!(
            "{}/bot{}/sendMessage",
            api_base.trim_end_matches('/'),
            token
        ))?;

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            endpoint,
            chat_id: chat_id.to_string(),
            offset,
        })
    }
}

impl Notifier for TelegramNotifier {
    fn send(&self, notice: BookingNotice) -> BoxFuture<'static, Result<(), NotifyError>> {
        let request = self.client.post(self.endpoint.clone()).json(&json!({
            "chat_id": self.chat_id,
            "text": notice.render(self.offset),
            "parse_mode": "Markdown",
        }));

        async move {
            let response = request.send().await?;
            if !response.status().is_success() {
                let status = response.status().as_u16();
                let body = response.text().await.unwrap_or_default();
                return Err(NotifyError::Rejected { status, body });
            }
            info!("Sent booking notice for {}", notice.student_email);
            Ok(())
        }
        .boxed()
    }
}
