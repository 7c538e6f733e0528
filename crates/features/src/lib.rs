//! Signal computation for the tapewatch system.
//!
//! This crate handles:
//! - Net whale flow aggregation
//! - Long/short ratio deltas over closed intervals
//! - Trigger-band classification
//! - The configured end-to-end engine

pub mod classifier;
pub mod engine;
pub mod net_flow;
pub mod ratio_delta;

pub use classifier::SignalClassifier;
pub use engine::{FlowReport, RatioReport, SignalEngine};
pub use net_flow::{latest_price, NetFlowAggregator};
pub use ratio_delta::RatioDeltaAnalyzer;
