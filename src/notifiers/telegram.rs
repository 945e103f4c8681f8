use crate::models::ListingRecord;
use crate::notifiers::traits::{NotifyError, Notifier};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

pub const TELEGRAM_API: &str = "https://api.telegram.org";

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Sends listing alerts to a Telegram chat through the Bot API
pub struct TelegramNotifier {
    client: Client,
    api_base: String,
    token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(token: impl Into<String>, chat_id: impl Into<String>) -> Result<Self> {
        Self::with_api_base(TELEGRAM_API, token, chat_id)
    }

    /// Point the notifier at a different Bot API host
    pub fn with_api_base(
        api_base: impl Into<String>,
        token: impl Into<String>,
        chat_id: impl Into<String>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token: token.into(),
            chat_id: chat_id.into(),
        })
    }
}

/// Escape characters that legacy Telegram Markdown treats as markup
fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Render the alert text for a listing
pub fn format_message(record: &ListingRecord) -> String {
    let mut message = String::from("🏠 *Neue Wohnung gefunden!*\n");
    message += &format!("*{}*\n\n", escape_markdown(&record.title));
    message += &format!("🏙️ *Adresse:* {}\n", escape_markdown(&record.address));
    message += &format!("📍 *Bezirk:* {}\n", escape_markdown(&record.district));
    message += &format!("🚪 *Zimmer:* {}\n", record.rooms);
    message += &format!("📐 *Fläche:* {} m²\n", record.area);
    message += &format!("💰 *Warmmiete:* {} €\n", record.rent);
    message += &format!("📊 *Preis/m²:* {} €\n", record.price_per_sqm);
    message += &format!("📅 *Verfügbar ab:* {}\n", record.available_from);
    message += &format!("🔗 [Zum Angebot]({})", record.url);
    message
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, record: &ListingRecord) -> Result<(), NotifyError> {
        let url = format!("{}/bot{}/sendMessage", self.api_base, self.token);
        let text = format_message(record);
        let body = SendMessage {
            chat_id: &self.chat_id,
            text: &text,
            parse_mode: "Markdown",
            disable_web_page_preview: false,
        };

        let response = self.client.post(url).json(&body).send().await?;
        let status = response.status();
        let payload = response.text().await?;

        if !status.is_success() {
            warn!("Telegram returned status: {}", status);
            return Err(NotifyError::Api {
                status: status.as_u16(),
                body: payload,
            });
        }

        match serde_json::from_str::<ApiResponse>(&payload) {
            Ok(ApiResponse { ok: false, description }) => Err(NotifyError::Api {
                status: status.as_u16(),
                body: description.unwrap_or(payload),
            }),
            _ => {
                info!(id = %record.id, "Notification sent");
                Ok(())
            }
        }
    }

    fn destination(&self) -> &str {
        &self.chat_id
    }
}
