//! Core types and configuration for the tapewatch system.
//!
//! This crate provides shared types used across all other crates:
//! - Market data types (raw and validated trades, ratio samples)
//! - Flow aggregates, ratio deltas and classified signals
//! - Configuration structures
//! - Ports for market data sources and notification sinks
//! - Common error types

pub mod config;
pub mod error;
pub mod ports;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use ports::{MarketDataSource, NotificationSink};
pub use types::*;
