//! Core data types for the tapewatch system.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Absolute point in time (UTC).
pub type Timestamp = DateTime<Utc>;

/// Price type.
pub type Price = Decimal;

/// Size/quantity type (base-asset units).
pub type Size = Decimal;

/// A trade record as delivered by an exchange, before validation.
///
/// Every field is optional and loosely typed: exchanges disagree on whether
/// numbers are JSON strings or JSON numbers, and on the timestamp encoding.
/// [`Value::Null`] and a missing key are treated the same way.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTrade {
    /// Trade price.
    pub price: Option<Value>,
    /// Trade size.
    pub size: Option<Value>,
    /// Taker side (`"buy"` / `"sell"`).
    pub side: Option<Value>,
    /// RFC 3339 text or epoch milliseconds.
    #[serde(alias = "timestamp")]
    pub time: Option<Value>,
}

impl RawTrade {
    /// Build a raw record from text fields.
    pub fn from_text(price: &str, size: &str, side: &str, time: &str) -> Self {
        Self {
            price: Some(Value::from(price)),
            size: Some(Value::from(size)),
            side: Some(Value::from(side)),
            time: Some(Value::from(time)),
        }
    }
}

/// A long/short ratio record as delivered by an exchange.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRatioRecord {
    pub long_short_ratio: Option<Value>,
    pub long_account: Option<Value>,
    pub short_account: Option<Value>,
    pub timestamp: Option<Value>,
}

/// Taker side of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(i8)]
pub enum TradeSide {
    /// Buyer-initiated.
    Buy = 1,
    /// Seller-initiated.
    Sell = -1,
}

impl TradeSide {
    /// Get the sign as i8.
    #[inline]
    pub fn sign(self) -> i8 {
        self as i8
    }
}

/// A validated trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub price: Price,
    pub size: Size,
    pub side: TradeSide,
    pub timestamp: Timestamp,
}

impl Trade {
    /// Notional value in quote currency (USD). `None` when the product
    /// does not fit in a `Decimal`.
    #[inline]
    pub fn value_usd(&self) -> Option<Decimal> {
        self.price.checked_mul(self.size)
    }

    /// Size signed by side: positive for buys, negative for sells.
    #[inline]
    pub fn signed_size(&self) -> Decimal {
        self.size * Decimal::from(self.side.sign())
    }
}

/// Whale flow over one trade snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowAggregate {
    /// `buy_volume - sell_volume`.
    pub net_flow: Decimal,
    pub buy_volume: Size,
    pub sell_volume: Size,
    /// Number of trades at or above the whale threshold.
    pub whale_count: usize,
    /// Price of the most recent trade in the snapshot, whale or not.
    /// `None` only when the snapshot held no trades at all.
    pub reference_price: Option<Price>,
}

impl FlowAggregate {
    /// An aggregate with no whale activity.
    pub fn quiet(reference_price: Option<Price>) -> Self {
        Self {
            net_flow: Decimal::ZERO,
            buy_volume: Decimal::ZERO,
            sell_volume: Decimal::ZERO,
            whale_count: 0,
            reference_price,
        }
    }

    /// Whether any whale trade contributed.
    pub fn has_whales(&self) -> bool {
        self.whale_count > 0
    }
}

/// One long/short account-ratio interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioSample {
    /// Interval open time.
    pub timestamp: Timestamp,
    /// Long accounts divided by short accounts. Always positive.
    pub long_short_ratio: Decimal,
    /// Fraction of accounts net long, when reported.
    pub long_account: Option<Decimal>,
    /// Fraction of accounts net short, when reported.
    pub short_account: Option<Decimal>,
}

/// Change between the two most recent closed ratio intervals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioDelta {
    pub previous: Decimal,
    pub current: Decimal,
    /// `current - previous`.
    pub change: Decimal,
    pub previous_at: Timestamp,
    pub current_at: Timestamp,
}

/// Classified direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Bullish,
    Bearish,
    Neutral,
}

impl Direction {
    /// Notification color for this direction.
    pub fn severity(self) -> SeverityColor {
        match self {
            Direction::Bullish => SeverityColor::Positive,
            Direction::Bearish => SeverityColor::Negative,
            Direction::Neutral => SeverityColor::Neutral,
        }
    }

    /// Is this a directional (non-neutral) call?
    pub fn is_directional(self) -> bool {
        !matches!(self, Direction::Neutral)
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Direction::Bullish => "BULLISH",
            Direction::Bearish => "BEARISH",
            Direction::Neutral => "NEUTRAL",
        };
        f.write_str(label)
    }
}

/// What a signal was computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Evidence {
    Flow(FlowAggregate),
    Ratio(RatioDelta),
}

/// A classified directional signal, created once per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub direction: Direction,
    /// The scalar that was classified (net flow or ratio change).
    pub magnitude: Decimal,
    /// Trigger band half-width used for classification.
    pub trigger: Decimal,
    pub evidence: Evidence,
}

impl Signal {
    /// Flow evidence, if this signal came from the trade tape.
    pub fn flow(&self) -> Option<&FlowAggregate> {
        match &self.evidence {
            Evidence::Flow(agg) => Some(agg),
            Evidence::Ratio(_) => None,
        }
    }

    /// Ratio evidence, if this signal came from the long/short series.
    pub fn ratio(&self) -> Option<&RatioDelta> {
        match &self.evidence {
            Evidence::Ratio(delta) => Some(delta),
            Evidence::Flow(_) => None,
        }
    }
}

/// Notification color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeverityColor {
    Positive,
    Negative,
    Neutral,
}
