//! Boundaries between the signal engine and the outside world.
//!
//! Market data comes in through [`MarketDataSource`]; finished signals leave
//! through [`NotificationSink`]. Adapters live in the runner crate.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::error::{Error, Result};
use crate::types::{RawRatioRecord, RawTrade, SeverityColor};

/// Supplies one snapshot of market data per call.
///
/// Implementations map network failures, timeouts and non-success statuses to
/// [`Error::Transport`]. Series a venue does not offer report
/// [`Error::Unsupported`].
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Short venue name for logs and message footers.
    fn name(&self) -> &str;

    /// Recent trades for `symbol`. An empty vector means no data this run.
    async fn fetch_trades(&self, symbol: &str) -> Result<Vec<RawTrade>>;

    /// Long/short account-ratio buckets, oldest first, the last one still
    /// forming.
    async fn fetch_ratio_series(
        &self,
        symbol: &str,
        period: &str,
        sample_count: u32,
    ) -> Result<Vec<RawRatioRecord>> {
        let _ = (symbol, period, sample_count);
        Err(Error::unsupported(format!(
            "{} does not provide a long/short ratio series",
            self.name()
        )))
    }

    /// Last traded price for `symbol`.
    async fn fetch_current_price(&self, symbol: &str) -> Result<Decimal>;
}

/// Best-effort delivery of a rendered message.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver one message. Callers log and ignore failures.
    async fn publish(&self, title: &str, color: SeverityColor, body: &str) -> Result<()>;
}
