//! Binance public REST adapter (spot trades, USD-M futures ratio and ticker).

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use tapewatch_core::config::SourceConfig;
use tapewatch_core::{MarketDataSource, RawRatioRecord, RawTrade, Result};
use tracing::{debug, instrument};

use super::{get_json, TickerPrice};

/// Binance spot `/api/v3/trades` cap.
const MAX_TRADE_LIMIT: u32 = 1000;

/// Binance futures data endpoints cap.
const MAX_RATIO_LIMIT: u32 = 500;

/// One element of `/api/v3/trades`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpotTrade {
    price: Option<Value>,
    qty: Option<Value>,
    time: Option<Value>,
    is_buyer_maker: Option<bool>,
}

impl From<SpotTrade> for RawTrade {
    fn from(t: SpotTrade) -> Self {
        // A resting buyer means the aggressor sold.
        let side = t.is_buyer_maker.map(|maker| {
            if maker {
                Value::from("sell")
            } else {
                Value::from("buy")
            }
        });
        RawTrade {
            price: t.price,
            size: t.qty,
            side,
            time: t.time,
        }
    }
}

/// Binance spot trades, futures long/short account ratio and futures ticker.
pub struct BinanceSource {
    client: reqwest::Client,
    spot_url: String,
    futures_url: String,
    trade_limit: u32,
}

impl BinanceSource {
    pub fn with_client(client: reqwest::Client, config: &SourceConfig) -> Self {
        Self {
            client,
            spot_url: config.binance_spot_url.trim_end_matches('/').to_string(),
            futures_url: config.binance_futures_url.trim_end_matches('/').to_string(),
            trade_limit: config.trade_limit.clamp(1, MAX_TRADE_LIMIT),
        }
    }

    fn trades_url(&self, symbol: &str) -> String {
        format!(
            "{}/api/v3/trades?symbol={}&limit={}",
            self.spot_url, symbol, self.trade_limit
        )
    }

    fn ratio_url(&self, symbol: &str, period: &str, sample_count: u32) -> String {
        format!(
            "{}/futures/data/globalLongShortAccountRatio?symbol={}&period={}&limit={}",
            self.futures_url,
            symbol,
            period,
            sample_count.clamp(1, MAX_RATIO_LIMIT)
        )
    }

    fn ticker_url(&self, symbol: &str) -> String {
        format!("{}/fapi/v1/ticker/price?symbol={}", self.futures_url, symbol)
    }
}

#[async_trait]
impl MarketDataSource for BinanceSource {
    fn name(&self) -> &str {
        "binance"
    }

    #[instrument(skip(self), name = "binance::fetch_trades")]
    async fn fetch_trades(&self, symbol: &str) -> Result<Vec<RawTrade>> {
        let trades: Vec<SpotTrade> =
            get_json(&self.client, &self.trades_url(symbol), "binance trades").await?;
        debug!(symbol, count = trades.len(), "binance trades fetched");
        Ok(trades.into_iter().map(RawTrade::from).collect())
    }

    #[instrument(skip(self), name = "binance::fetch_ratio_series")]
    async fn fetch_ratio_series(
        &self,
        symbol: &str,
        period: &str,
        sample_count: u32,
    ) -> Result<Vec<RawRatioRecord>> {
        let url = self.ratio_url(symbol, period, sample_count);
        let records: Vec<RawRatioRecord> =
            get_json(&self.client, &url, "binance long/short ratio").await?;
        debug!(symbol, period, count = records.len(), "long/short ratio series fetched");
        Ok(records)
    }

    /// Futures last price; the ratio series is a futures statistic.
    #[instrument(skip(self), name = "binance::fetch_current_price")]
    async fn fetch_current_price(&self, symbol: &str) -> Result<Decimal> {
        let ticker: TickerPrice =
            get_json(&self.client, &self.ticker_url(symbol), "binance ticker").await?;
        ticker.decimal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(trade_limit: u32) -> BinanceSource {
        let config = SourceConfig {
            trade_limit,
            ..SourceConfig::default()
        };
        BinanceSource::with_client(reqwest::Client::new(), &config)
    }

    #[test]
    fn test_urls() {
        let src = source(5000);
        assert_eq!(
            src.trades_url("BTCUSDT"),
            "https://api.binance.com/api/v3/trades?symbol=BTCUSDT&limit=1000"
        );
        assert_eq!(
            src.ratio_url("BTCUSDT", "5m", 5),
            "https://fapi.binance.com/futures/data/globalLongShortAccountRatio?symbol=BTCUSDT&period=5m&limit=5"
        );
        assert_eq!(
            src.ticker_url("BTCUSDT"),
            "https://fapi.binance.com/fapi/v1/ticker/price?symbol=BTCUSDT"
        );
    }

    #[test]
    fn test_spot_trade_side_mapping() {
        let json = r#"[
            {"id":1,"price":"42000.00","qty":"0.5","quoteQty":"21000","time":1704067200000,"isBuyerMaker":true,"isBestMatch":true},
            {"id":2,"price":"42001.00","qty":"0.1","quoteQty":"4200.1","time":1704067200001,"isBuyerMaker":false,"isBestMatch":true}
        ]"#;
        let trades: Vec<SpotTrade> = serde_json::from_str(json).unwrap();
        let raw: Vec<RawTrade> = trades.into_iter().map(RawTrade::from).collect();

        assert_eq!(raw[0].side, Some(Value::from("sell")));
        assert_eq!(raw[1].side, Some(Value::from("buy")));
        assert_eq!(raw[0].size, Some(Value::from("0.5")));
        assert_eq!(raw[0].time, Some(Value::from(1_704_067_200_000i64)));
    }

    #[test]
    fn test_missing_maker_flag_leaves_side_empty() {
        let trade: SpotTrade =
            serde_json::from_str(r#"{"price":"1","qty":"1","time":1}"#).unwrap();
        assert_eq!(RawTrade::from(trade).side, None);
    }
}
