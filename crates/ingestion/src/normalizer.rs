//! Raw record validation.
//!
//! Turns loosely-typed exchange records into [`Trade`] and [`RatioSample`]
//! values. Any missing or unparseable field fails the whole batch with
//! [`Error::Data`].

use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use tapewatch_core::{
    Error, RatioSample, RawRatioRecord, RawTrade, Result, Timestamp, Trade, TradeSide,
};
use tracing::debug;

/// Counts gathered while normalizing one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizationStats {
    /// Records accepted.
    pub total: usize,
    /// Buyer-initiated trades.
    pub buys: usize,
    /// Seller-initiated trades.
    pub sells: usize,
}

/// Validates raw trade records.
#[derive(Debug, Default)]
pub struct TradeNormalizer {
    stats: NormalizationStats,
}

impl TradeNormalizer {
    /// Create a new normalizer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize a batch, preserving input order.
    pub fn normalize(&mut self, raw: &[RawTrade]) -> Result<Vec<Trade>> {
        let mut trades = Vec::with_capacity(raw.len());
        for (index, record) in raw.iter().enumerate() {
            let trade = self.normalize_one(index, record)?;
            trades.push(trade);
        }
        debug!(
            total = self.stats.total,
            buys = self.stats.buys,
            sells = self.stats.sells,
            "trades normalized"
        );
        Ok(trades)
    }

    /// Normalize a single record. `index` is only used in error messages.
    pub fn normalize_one(&mut self, index: usize, raw: &RawTrade) -> Result<Trade> {
        let ctx = Ctx::new("trade", index);

        let price = ctx.decimal("price", raw.price.as_ref())?;
        let size = ctx.decimal("size", raw.size.as_ref())?;
        let side = ctx.side("side", raw.side.as_ref())?;
        let timestamp = ctx.timestamp("time", raw.time.as_ref())?;

        if price < Decimal::ZERO {
            return Err(ctx.invalid("price", "negative"));
        }
        if size < Decimal::ZERO {
            return Err(ctx.invalid("size", "negative"));
        }
        if price.checked_mul(size).is_none() {
            return Err(ctx.invalid("price", "notional overflows"));
        }

        self.stats.total += 1;
        match side {
            TradeSide::Buy => self.stats.buys += 1,
            TradeSide::Sell => self.stats.sells += 1,
        }

        Ok(Trade {
            price,
            size,
            side,
            timestamp,
        })
    }

    /// Get normalization statistics.
    pub fn stats(&self) -> &NormalizationStats {
        &self.stats
    }
}

/// Validate raw ratio records and order them oldest first.
pub fn normalize_ratios(raw: &[RawRatioRecord]) -> Result<Vec<RatioSample>> {
    let mut samples = Vec::with_capacity(raw.len());

    for (index, record) in raw.iter().enumerate() {
        let ctx = Ctx::new("ratio sample", index);

        let long_short_ratio = ctx.decimal("longShortRatio", record.long_short_ratio.as_ref())?;
        if long_short_ratio <= Decimal::ZERO {
            return Err(ctx.invalid("longShortRatio", "must be positive"));
        }
        let timestamp = ctx.timestamp("timestamp", record.timestamp.as_ref())?;
        let long_account = ctx.optional_decimal("longAccount", record.long_account.as_ref())?;
        let short_account = ctx.optional_decimal("shortAccount", record.short_account.as_ref())?;

        samples.push(RatioSample {
            timestamp,
            long_short_ratio,
            long_account,
            short_account,
        });
    }

    samples.sort_by_key(|s| s.timestamp);
    Ok(samples)
}

/// Field parsing with record context for error messages.
struct Ctx {
    kind: &'static str,
    index: usize,
}

impl Ctx {
    fn new(kind: &'static str, index: usize) -> Self {
        Self { kind, index }
    }

    fn missing(&self, field: &str) -> Error {
        Error::data(format!("{} #{}: missing field `{}`", self.kind, self.index, field))
    }

    fn invalid(&self, field: &str, why: impl std::fmt::Display) -> Error {
        Error::data(format!(
            "{} #{}: invalid field `{}`: {}",
            self.kind, self.index, field, why
        ))
    }

    fn present<'a>(&self, field: &str, value: Option<&'a Value>) -> Result<&'a Value> {
        match value {
            None | Some(Value::Null) => Err(self.missing(field)),
            Some(v) => Ok(v),
        }
    }

    fn decimal(&self, field: &str, value: Option<&Value>) -> Result<Decimal> {
        let text = match self.present(field, value)? {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            other => return Err(self.invalid(field, format!("expected a number, got {other}"))),
        };
        parse_decimal(&text).ok_or_else(|| self.invalid(field, format!("'{text}' is not a decimal")))
    }

    fn optional_decimal(&self, field: &str, value: Option<&Value>) -> Result<Option<Decimal>> {
        match value {
            None | Some(Value::Null) => Ok(None),
            Some(_) => self.decimal(field, value).map(Some),
        }
    }

    fn side(&self, field: &str, value: Option<&Value>) -> Result<TradeSide> {
        match self.present(field, value)? {
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "buy" => Ok(TradeSide::Buy),
                "sell" => Ok(TradeSide::Sell),
                other => Err(self.invalid(field, format!("unknown side '{other}'"))),
            },
            other => Err(self.invalid(field, format!("expected text, got {other}"))),
        }
    }

    fn timestamp(&self, field: &str, value: Option<&Value>) -> Result<Timestamp> {
        match self.present(field, value)? {
            Value::Number(n) => {
                let ms = n
                    .as_i64()
                    .ok_or_else(|| self.invalid(field, format!("{n} is not integer milliseconds")))?;
                self.at_millis(field, ms)
            }
            Value::String(s) => {
                let s = s.trim();
                if let Ok(ms) = s.parse::<i64>() {
                    return self.at_millis(field, ms);
                }
                DateTime::parse_from_rfc3339(s)
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(|e| self.invalid(field, format!("'{s}': {e}")))
            }
            other => Err(self.invalid(field, format!("expected a timestamp, got {other}"))),
        }
    }

    fn at_millis(&self, field: &str, ms: i64) -> Result<Timestamp> {
        Utc.timestamp_millis_opt(ms)
            .single()
            .ok_or_else(|| self.invalid(field, format!("{ms} ms is out of range")))
    }
}

/// Parse plain or scientific decimal text.
fn parse_decimal(text: &str) -> Option<Decimal> {
    Decimal::from_str(text)
        .ok()
        .or_else(|| Decimal::from_scientific(text).ok())
}
