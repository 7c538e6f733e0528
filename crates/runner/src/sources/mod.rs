//! Market data adapters.
//!
//! Every HTTP failure (connect, timeout, non-success status, undecodable body)
//! surfaces as [`Error::Transport`], which the run loop treats as "no data".

pub mod binance;
pub mod coinbase;

pub use binance::BinanceSource;
pub use coinbase::CoinbaseSource;

use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tapewatch_core::config::{Exchange, SourceConfig};
use tapewatch_core::{Config, Error, MarketDataSource, Result};
use tracing::debug;

const USER_AGENT: &str = concat!("tapewatch/", env!("CARGO_PKG_VERSION"));

/// Build an HTTP client with the configured per-request timeout.
pub fn http_client(config: &SourceConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| Error::config(format!("failed to build HTTP client: {e}")))
}

/// Trade tape source for the configured exchange.
pub fn trade_source(config: &Config) -> Result<Box<dyn MarketDataSource>> {
    let client = http_client(&config.source)?;
    Ok(match config.source.exchange {
        Exchange::Coinbase => Box::new(CoinbaseSource::with_client(client, &config.source)),
        Exchange::Binance => Box::new(BinanceSource::with_client(client, &config.source)),
    })
}

/// Long/short ratio source. Only Binance futures publishes the series.
pub fn ratio_source(config: &Config) -> Result<Box<dyn MarketDataSource>> {
    let client = http_client(&config.source)?;
    Ok(Box::new(BinanceSource::with_client(client, &config.source)))
}

/// GET `url` and decode a JSON body.
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    what: &str,
) -> Result<T> {
    let resp = client
        .get(url)
        .send()
        .await
        .map_err(|e| Error::transport(format!("GET {what}: {e}")))?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(Error::transport(format!(
            "GET {what} returned {status}: {}",
            truncate(&body, 200)
        )));
    }

    let value = resp
        .json::<T>()
        .await
        .map_err(|e| Error::transport(format!("failed to decode {what} response: {e}")))?;

    debug!(what, "response decoded");
    Ok(value)
}

/// `{"price": "..."}` as returned by ticker endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct TickerPrice {
    pub price: String,
}

impl TickerPrice {
    pub fn decimal(&self) -> Result<Decimal> {
        Decimal::from_str(self.price.trim())
            .map_err(|e| Error::data(format!("ticker price '{}': {e}", self.price)))
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
