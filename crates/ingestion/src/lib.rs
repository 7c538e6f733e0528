//! Data ingestion and normalization for the tapewatch system.
//!
//! This crate handles:
//! - Raw trade validation (price, size, taker side, timestamp)
//! - Long/short ratio record validation and ordering
//! - Whale trade selection by USD notional

pub mod normalizer;
pub mod whale_filter;

pub use normalizer::{normalize_ratios, NormalizationStats, TradeNormalizer};
pub use whale_filter::WhaleFilter;
