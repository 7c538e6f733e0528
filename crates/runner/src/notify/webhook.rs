//! Discord-style webhook delivery.
//!
//! Messages are sent as a single embed:
//!
//! ```text
//! {"embeds":[{"title", "description", "color", "footer":{"text"}, "timestamp"}]}
//! ```

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Value};
use tapewatch_core::{Error, NotificationSink, Result, SeverityColor};
use tracing::{debug, instrument};

/// Embed color for a severity.
pub fn color_code(color: SeverityColor) -> u32 {
    match color {
        SeverityColor::Positive => 3_066_993,  // green
        SeverityColor::Negative => 15_158_332, // red
        SeverityColor::Neutral => 9_807_270,   // grey
    }
}

/// Build the webhook payload.
pub fn embed_payload(
    title: &str,
    color: SeverityColor,
    body: &str,
    footer: &str,
    at: DateTime<Utc>,
) -> Value {
    json!({
        "embeds": [{
            "title": title,
            "description": body,
            "color": color_code(color),
            "footer": { "text": footer },
            "timestamp": at.to_rfc3339_opts(SecondsFormat::Secs, true),
        }]
    })
}

/// POSTs embeds to a webhook URL.
pub struct WebhookSink {
    client: reqwest::Client,
    url: String,
    footer: String,
}

impl WebhookSink {
    pub fn with_client(client: reqwest::Client, url: &str, footer: &str) -> Self {
        Self {
            client,
            url: url.to_string(),
            footer: footer.to_string(),
        }
    }
}

#[async_trait]
impl NotificationSink for WebhookSink {
    #[instrument(skip(self, body), name = "webhook::publish")]
    async fn publish(&self, title: &str, color: SeverityColor, body: &str) -> Result<()> {
        let payload = embed_payload(title, color, body, &self.footer, Utc::now());

        let resp = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::notify(format!("webhook POST failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(Error::notify(format!("webhook returned {status}: {text}")));
        }

        debug!(%status, "webhook delivered");
        Ok(())
    }
}
