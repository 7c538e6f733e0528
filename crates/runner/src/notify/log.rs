//! Log-only sink.

use async_trait::async_trait;
use tapewatch_core::{NotificationSink, Result, SeverityColor};
use tracing::info;

/// Writes messages to the log instead of delivering them.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    async fn publish(&self, title: &str, color: SeverityColor, body: &str) -> Result<()> {
        info!(title, ?color, "notification (not delivered)\n{body}");
        Ok(())
    }
}
