//! Adapters and run orchestration for the tapewatch system.
//!
//! This crate provides:
//! - HTTP market data sources (Coinbase, Binance)
//! - Notification sinks (webhook, log-only)
//! - Message rendering
//! - One-shot flow and ratio runs

pub mod notify;
pub mod report;
pub mod run;
pub mod sources;

pub use notify::sink_for;
pub use run::{run, run_flow, run_ratio, Mode, RunOutcome};
pub use sources::{ratio_source, trade_source};
