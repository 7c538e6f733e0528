//! Signal computation engine.
//!
//! Combines all pipeline stages behind one configured interface:
//! normalize → filter → reduce → classify.

use tapewatch_core::{
    Config, Error, Evidence, RatioSample, RawRatioRecord, RawTrade, Result, Signal,
};
use tapewatch_ingestion::{normalize_ratios, TradeNormalizer, WhaleFilter};
use tracing::{debug, info};

use crate::{
    classifier::SignalClassifier, net_flow::NetFlowAggregator, ratio_delta::RatioDeltaAnalyzer,
};

/// Outcome of the whale flow pipeline.
#[derive(Debug, Clone)]
pub struct FlowReport {
    /// Trades in the snapshot, whale or not.
    pub trade_count: usize,
    /// Classified net flow; evidence is the [`tapewatch_core::FlowAggregate`].
    pub signal: Signal,
}

/// Outcome of the long/short ratio pipeline.
#[derive(Debug, Clone)]
pub struct RatioReport {
    /// Most recent closed interval.
    pub latest_closed: RatioSample,
    /// Classified ratio change; evidence is the [`tapewatch_core::RatioDelta`].
    pub signal: Signal,
}

/// Signal computation engine.
pub struct SignalEngine {
    whale_filter: WhaleFilter,
    aggregator: NetFlowAggregator,
    flow_classifier: SignalClassifier,
    ratio_analyzer: RatioDeltaAnalyzer,
    ratio_classifier: SignalClassifier,
}

impl SignalEngine {
    /// Create a new signal engine from configuration.
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            whale_filter: WhaleFilter::new(config.flow.whale_threshold_usd),
            aggregator: NetFlowAggregator::new(),
            flow_classifier: SignalClassifier::new(config.flow.trigger)?,
            ratio_analyzer: RatioDeltaAnalyzer::new(),
            ratio_classifier: SignalClassifier::new(config.ratio.trigger)?,
        })
    }

    /// Run the whale flow pipeline over one trade snapshot.
    ///
    /// Returns `Ok(None)` for an empty snapshot: there is nothing to report,
    /// not even a price.
    pub fn evaluate_trades(&self, raw: &[RawTrade]) -> Result<Option<FlowReport>> {
        if raw.is_empty() {
            debug!("empty trade snapshot");
            return Ok(None);
        }

        let mut normalizer = TradeNormalizer::new();
        let trades = normalizer.normalize(raw)?;
        let whales = self.whale_filter.filter(&trades);
        let aggregate = self.aggregator.aggregate(&trades, &whales)?;
        let stats = normalizer.stats();

        let signal = self
            .flow_classifier
            .signal(aggregate.net_flow, Evidence::Flow(aggregate.clone()));

        info!(
            trades = trades.len(),
            taker_buys = stats.buys,
            taker_sells = stats.sells,
            whales = aggregate.whale_count,
            threshold_usd = %self.whale_filter.threshold(),
            buy_volume = %aggregate.buy_volume,
            sell_volume = %aggregate.sell_volume,
            net_flow = %aggregate.net_flow,
            direction = %signal.direction,
            "whale flow evaluated"
        );

        Ok(Some(FlowReport {
            trade_count: trades.len(),
            signal,
        }))
    }

    /// Run the long/short ratio pipeline over one series.
    pub fn evaluate_ratios(&self, raw: &[RawRatioRecord]) -> Result<RatioReport> {
        let samples = normalize_ratios(raw)?;
        let delta = self.ratio_analyzer.analyze(&samples)?;
        let latest_closed = self
            .ratio_analyzer
            .latest_closed(&samples)
            .cloned()
            .ok_or_else(|| Error::insufficient_data("no closed ratio interval"))?;

        let signal = self
            .ratio_classifier
            .signal(delta.change, Evidence::Ratio(delta.clone()));

        info!(
            samples = samples.len(),
            previous = %delta.previous,
            current = %delta.current,
            change = %delta.change,
            direction = %signal.direction,
            "long/short ratio evaluated"
        );

        Ok(RatioReport {
            latest_closed,
            signal,
        })
    }

    /// The whale filter in use.
    pub fn whale_filter(&self) -> &WhaleFilter {
        &self.whale_filter
    }
}
