//! Notification sinks.

pub mod log;
pub mod webhook;

pub use self::log::LogSink;
pub use self::webhook::WebhookSink;

use tapewatch_core::{Config, NotificationSink, Result};
use tracing::info;

use crate::sources::http_client;

/// Webhook sink when a URL is configured, log-only otherwise.
pub fn sink_for(config: &Config) -> Result<Box<dyn NotificationSink>> {
    match config.notify.webhook_url.as_deref() {
        Some(url) => {
            let client = http_client(&config.source)?;
            Ok(Box::new(WebhookSink::with_client(
                client,
                url,
                &config.notify.footer,
            )))
        }
        None => {
            info!("no webhook configured, messages will only be logged");
            Ok(Box::new(LogSink))
        }
    }
}
