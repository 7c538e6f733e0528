//! Coinbase Exchange public REST adapter.

use async_trait::async_trait;
use rust_decimal::Decimal;
use tapewatch_core::config::SourceConfig;
use tapewatch_core::{MarketDataSource, RawTrade, Result};
use tracing::{debug, instrument};

use super::{get_json, TickerPrice};

/// Coinbase spot trades and ticker.
///
/// Trades come back newest first with `price`, `size`, `side` and `time`
/// fields, which map onto [`RawTrade`] as-is.
pub struct CoinbaseSource {
    client: reqwest::Client,
    base_url: String,
    trade_limit: u32,
}

impl CoinbaseSource {
    pub fn with_client(client: reqwest::Client, config: &SourceConfig) -> Self {
        Self {
            client,
            base_url: config.coinbase_url.trim_end_matches('/').to_string(),
            trade_limit: config.trade_limit,
        }
    }

    fn trades_url(&self, symbol: &str) -> String {
        format!(
            "{}/products/{}/trades?limit={}",
            self.base_url, symbol, self.trade_limit
        )
    }

    fn ticker_url(&self, symbol: &str) -> String {
        format!("{}/products/{}/ticker", self.base_url, symbol)
    }
}

#[async_trait]
impl MarketDataSource for CoinbaseSource {
    fn name(&self) -> &str {
        "coinbase"
    }

    #[instrument(skip(self), name = "coinbase::fetch_trades")]
    async fn fetch_trades(&self, symbol: &str) -> Result<Vec<RawTrade>> {
        let trades: Vec<RawTrade> =
            get_json(&self.client, &self.trades_url(symbol), "coinbase trades").await?;
        debug!(symbol, count = trades.len(), "coinbase trades fetched");
        Ok(trades)
    }

    #[instrument(skip(self), name = "coinbase::fetch_current_price")]
    async fn fetch_current_price(&self, symbol: &str) -> Result<Decimal> {
        let ticker: TickerPrice =
            get_json(&self.client, &self.ticker_url(symbol), "coinbase ticker").await?;
        ticker.decimal()
    }
}
