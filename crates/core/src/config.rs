//! Configuration structures for the tapewatch system.
//!
//! A [`Config`] is built once per run (defaults, optionally a JSON file, then
//! environment overrides) and passed by reference into the engine and the
//! adapters. Nothing here is global.

use std::path::Path;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Fewest ratio samples that still yield two closed intervals.
pub const MIN_RATIO_SAMPLES: u32 = 3;

/// Main configuration for one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Instrument configuration.
    pub instrument: InstrumentConfig,
    /// Whale flow policy.
    pub flow: FlowPolicy,
    /// Long/short ratio policy.
    pub ratio: RatioPolicy,
    /// Market data source configuration.
    pub source: SourceConfig,
    /// Notification configuration.
    pub notify: NotifyConfig,
}

/// Instrument-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InstrumentConfig {
    /// Symbol used for the trade tape (e.g., "BTC-USD" on Coinbase).
    pub trade_symbol: String,
    /// Futures symbol used for the long/short ratio (e.g., "BTCUSDT").
    pub ratio_symbol: String,
    /// Ratio bucket width as the exchange spells it (e.g., "5m").
    pub ratio_period: String,
    /// Number of ratio buckets to request, including the forming one.
    pub ratio_samples: u32,
}

impl Default for InstrumentConfig {
    fn default() -> Self {
        Self {
            trade_symbol: "BTC-USD".to_string(),
            ratio_symbol: "BTCUSDT".to_string(),
            ratio_period: "5m".to_string(),
            ratio_samples: 5,
        }
    }
}

/// Whale flow policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowPolicy {
    /// USD notional at or above which a trade counts as a whale trade.
    pub whale_threshold_usd: Decimal,
    /// Net flow (base units) that must be exceeded for a directional call.
    pub trigger: Decimal,
}

impl Default for FlowPolicy {
    fn default() -> Self {
        Self {
            whale_threshold_usd: dec!(20000),
            trigger: dec!(0.5),
        }
    }
}

/// Long/short ratio policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RatioPolicy {
    /// Ratio change that must be exceeded for a directional call.
    pub trigger: Decimal,
}

impl Default for RatioPolicy {
    fn default() -> Self {
        Self { trigger: dec!(0.01) }
    }
}

/// Exchange backing the trade tape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Exchange {
    Coinbase,
    Binance,
}

impl FromStr for Exchange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "coinbase" => Ok(Exchange::Coinbase),
            "binance" => Ok(Exchange::Binance),
            other => Err(Error::config(format!("unknown exchange '{other}'"))),
        }
    }
}

impl std::fmt::Display for Exchange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Exchange::Coinbase => f.write_str("coinbase"),
            Exchange::Binance => f.write_str("binance"),
        }
    }
}

/// Market data source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Exchange for the trade tape. The ratio series always comes from
    /// Binance futures.
    pub exchange: Exchange,
    /// Coinbase Exchange REST base URL.
    pub coinbase_url: String,
    /// Binance spot REST base URL.
    pub binance_spot_url: String,
    /// Binance USD-M futures REST base URL.
    pub binance_futures_url: String,
    /// Number of recent trades to request where the exchange allows it.
    pub trade_limit: u32,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            exchange: Exchange::Coinbase,
            coinbase_url: "https://api.exchange.coinbase.com".to_string(),
            binance_spot_url: "https://api.binance.com".to_string(),
            binance_futures_url: "https://fapi.binance.com".to_string(),
            trade_limit: 1000,
            timeout_secs: 10,
        }
    }
}

/// Notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// Webhook URL. When unset, messages are only logged.
    pub webhook_url: Option<String>,
    /// Footer text attached to every message.
    pub footer: String,
    /// Announce neutral results too, so every run leaves a trace.
    pub announce_neutral: bool,
    /// Send a "check failed" notice when a run aborts on bad data.
    pub notify_on_failure: bool,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            footer: "tapewatch • whale & positioning monitor".to_string(),
            announce_neutral: true,
            notify_on_failure: false,
        }
    }
}

impl Config {
    /// Load a configuration from a JSON file. Missing keys keep their
    /// defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&content)?;
        tracing::info!(path = %path.as_ref().display(), "config loaded");
        Ok(config)
    }

    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Overlay values from an environment lookup.
    ///
    /// Recognised keys: `TAPEWATCH_TRADE_SYMBOL`, `TAPEWATCH_RATIO_SYMBOL`,
    /// `TAPEWATCH_RATIO_PERIOD`, `TAPEWATCH_RATIO_SAMPLES`,
    /// `TAPEWATCH_WHALE_THRESHOLD_USD`, `TAPEWATCH_FLOW_TRIGGER`,
    /// `TAPEWATCH_RATIO_TRIGGER`, `TAPEWATCH_EXCHANGE`,
    /// `TAPEWATCH_TRADE_LIMIT`, `TAPEWATCH_TIMEOUT_SECS`, `DISCORD_WEBHOOK`,
    /// `TAPEWATCH_ANNOUNCE_NEUTRAL`, `TAPEWATCH_NOTIFY_ON_FAILURE`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(v) = get("TAPEWATCH_TRADE_SYMBOL") {
            self.instrument.trade_symbol = v;
        }
        if let Some(v) = get("TAPEWATCH_RATIO_SYMBOL") {
            self.instrument.ratio_symbol = v;
        }
        if let Some(v) = get("TAPEWATCH_RATIO_PERIOD") {
            self.instrument.ratio_period = v;
        }
        if let Some(v) = get("TAPEWATCH_RATIO_SAMPLES") {
            self.instrument.ratio_samples = parse_env("TAPEWATCH_RATIO_SAMPLES", &v)?;
        }
        if let Some(v) = get("TAPEWATCH_WHALE_THRESHOLD_USD") {
            self.flow.whale_threshold_usd = parse_env("TAPEWATCH_WHALE_THRESHOLD_USD", &v)?;
        }
        if let Some(v) = get("TAPEWATCH_FLOW_TRIGGER") {
            self.flow.trigger = parse_env("TAPEWATCH_FLOW_TRIGGER", &v)?;
        }
        if let Some(v) = get("TAPEWATCH_RATIO_TRIGGER") {
            self.ratio.trigger = parse_env("TAPEWATCH_RATIO_TRIGGER", &v)?;
        }
        if let Some(v) = get("TAPEWATCH_EXCHANGE") {
            self.source.exchange = v.parse()?;
        }
        if let Some(v) = get("TAPEWATCH_TRADE_LIMIT") {
            self.source.trade_limit = parse_env("TAPEWATCH_TRADE_LIMIT", &v)?;
        }
        if let Some(v) = get("TAPEWATCH_TIMEOUT_SECS") {
            self.source.timeout_secs = parse_env("TAPEWATCH_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = get("DISCORD_WEBHOOK") {
            self.notify.webhook_url = Some(v);
        }
        if let Some(v) = get("TAPEWATCH_ANNOUNCE_NEUTRAL") {
            self.notify.announce_neutral = parse_flag("TAPEWATCH_ANNOUNCE_NEUTRAL", &v)?;
        }
        if let Some(v) = get("TAPEWATCH_NOTIFY_ON_FAILURE") {
            self.notify.notify_on_failure = parse_flag("TAPEWATCH_NOTIFY_ON_FAILURE", &v)?;
        }
        Ok(())
    }

    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.flow.whale_threshold_usd < Decimal::ZERO {
            return Err(Error::config("flow.whale_threshold_usd must not be negative"));
        }
        if self.flow.trigger <= Decimal::ZERO {
            return Err(Error::config("flow.trigger must be strictly positive"));
        }
        if self.ratio.trigger <= Decimal::ZERO {
            return Err(Error::config("ratio.trigger must be strictly positive"));
        }
        if self.instrument.ratio_samples < MIN_RATIO_SAMPLES {
            return Err(Error::config(format!(
                "instrument.ratio_samples must be at least {MIN_RATIO_SAMPLES}"
            )));
        }
        if self.instrument.trade_symbol.is_empty() || self.instrument.ratio_symbol.is_empty() {
            return Err(Error::config("instrument symbols must not be empty"));
        }
        if self.source.timeout_secs == 0 {
            return Err(Error::config("source.timeout_secs must be positive"));
        }
        Ok(())
    }
}

fn parse_env<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::config(format!("{key}: cannot parse '{value}'")))
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::config(format!("{key}: expected a boolean, got '{value}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.flow.whale_threshold_usd, dec!(20000));
        assert_eq!(config.instrument.trade_symbol, "BTC-USD");
        assert_eq!(config.source.exchange, Exchange::Coinbase);
        assert!(config.notify.webhook_url.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overlay() {
        let mut config = Config::default();
        config
            .apply_env(lookup_from(&[
                ("TAPEWATCH_WHALE_THRESHOLD_USD", "50000"),
                ("TAPEWATCH_FLOW_TRIGGER", "2.5"),
                ("TAPEWATCH_EXCHANGE", "Binance"),
                ("TAPEWATCH_TRADE_SYMBOL", "BTCUSDT"),
                ("DISCORD_WEBHOOK", "https://example.invalid/hook"),
                ("TAPEWATCH_ANNOUNCE_NEUTRAL", "no"),
                ("TAPEWATCH_RATIO_SAMPLES", ""),
            ]))
            .unwrap();

        assert_eq!(config.flow.whale_threshold_usd, dec!(50000));
        assert_eq!(config.flow.trigger, dec!(2.5));
        assert_eq!(config.source.exchange, Exchange::Binance);
        assert_eq!(config.instrument.trade_symbol, "BTCUSDT");
        assert_eq!(config.notify.webhook_url.as_deref(), Some("https://example.invalid/hook"));
        assert!(!config.notify.announce_neutral);
        // Blank values are ignored.
        assert_eq!(config.instrument.ratio_samples, 5);
    }

    #[test]
    fn test_env_overlay_rejects_garbage() {
        let mut config = Config::default();
        let err = config
            .apply_env(lookup_from(&[("TAPEWATCH_FLOW_TRIGGER", "lots")]))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = config
            .apply_env(lookup_from(&[("TAPEWATCH_EXCHANGE", "kraken")]))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_validate_trigger_must_be_positive() {
        let mut config = Config::default();
        config.flow.trigger = Decimal::ZERO;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = Config::default();
        config.ratio.trigger = dec!(-0.01);
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_ratio_samples() {
        let mut config = Config::default();
        config.instrument.ratio_samples = 2;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
        config.instrument.ratio_samples = MIN_RATIO_SAMPLES;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{"flow":{"whale_threshold_usd":"100000"},"source":{"exchange":"binance"}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.flow.whale_threshold_usd, dec!(100000));
        assert_eq!(config.flow.trigger, dec!(0.5));
        assert_eq!(config.source.exchange, Exchange::Binance);
        assert_eq!(config.source.timeout_secs, 10);
    }
}
