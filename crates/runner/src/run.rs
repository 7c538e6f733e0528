//! One-shot pipeline runs.
//!
//! A run fetches one snapshot, evaluates it, and announces the result.
//! Transport failures end the run quietly with [`RunOutcome::NoData`]; bad
//! data ends it with an error. Delivery failures are logged and never abort
//! the run.

use std::str::FromStr;

use chrono::Utc;
use tapewatch_core::{Config, Error, MarketDataSource, NotificationSink, Result, Signal};
use tapewatch_features::SignalEngine;
use tracing::{error, info, warn};

use crate::report::{self, FlowContext, Message, RatioContext};

/// Which pipeline to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Whale net flow from the trade tape.
    Flow,
    /// Long/short account-ratio delta.
    Ratio,
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flow" | "whale" | "whales" => Ok(Mode::Flow),
            "ratio" | "long-short" | "longshort" => Ok(Mode::Ratio),
            other => Err(Error::config(format!(
                "unknown mode '{other}', expected 'flow' or 'ratio'"
            ))),
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// Nothing usable was fetched; nothing was sent.
    NoData,
    /// A neutral signal that was not announced.
    Suppressed(Signal),
    /// The signal was handed to the sink.
    Announced { signal: Signal, delivered: bool },
}

/// Run the whale flow pipeline once.
pub async fn run_flow(
    source: &dyn MarketDataSource,
    sink: &dyn NotificationSink,
    config: &Config,
) -> Result<RunOutcome> {
    let engine = SignalEngine::new(config)?;
    let symbol = config.instrument.trade_symbol.as_str();
    info!(symbol, venue = source.name(), "whale flow check started");

    let raw = match source.fetch_trades(symbol).await {
        Ok(raw) => raw,
        Err(e) if e.is_no_data() => {
            warn!(error = %e, "trade fetch failed, no signal this run");
            return Ok(RunOutcome::NoData);
        }
        Err(e) => return Err(e),
    };

    let report = match engine.evaluate_trades(&raw) {
        Ok(Some(report)) => report,
        Ok(None) => {
            info!(symbol, "source returned no trades, no signal this run");
            return Ok(RunOutcome::NoData);
        }
        Err(e) => return Err(fail(sink, config, "Whale flow", e).await),
    };

    let message = report::render_flow(
        &report,
        &FlowContext {
            symbol,
            venue: source.name(),
            whale_threshold_usd: engine.whale_filter().threshold(),
            at: Utc::now(),
        },
    );
    Ok(announce(sink, config, report.signal, message).await)
}

/// Run the long/short ratio pipeline once.
pub async fn run_ratio(
    source: &dyn MarketDataSource,
    sink: &dyn NotificationSink,
    config: &Config,
) -> Result<RunOutcome> {
    let engine = SignalEngine::new(config)?;
    let instrument = &config.instrument;
    let symbol = instrument.ratio_symbol.as_str();
    info!(symbol, period = %instrument.ratio_period, "long/short ratio check started");

    let raw = match source
        .fetch_ratio_series(symbol, &instrument.ratio_period, instrument.ratio_samples)
        .await
    {
        Ok(raw) => raw,
        Err(e) if e.is_no_data() => {
            warn!(error = %e, "ratio fetch failed, no signal this run");
            return Ok(RunOutcome::NoData);
        }
        Err(e) => return Err(e),
    };

    let report = match engine.evaluate_ratios(&raw) {
        Ok(report) => report,
        Err(e) => return Err(fail(sink, config, "Long/short ratio", e).await),
    };

    let current_price = match source.fetch_current_price(symbol).await {
        Ok(price) => Some(price),
        Err(e) => {
            warn!(error = %e, "current price unavailable");
            None
        }
    };

    let message = report::render_ratio(
        &report,
        &RatioContext {
            symbol,
            period: &instrument.ratio_period,
            current_price,
            at: Utc::now(),
        },
    );
    Ok(announce(sink, config, report.signal, message).await)
}

/// Run the pipeline selected by `mode`.
pub async fn run(
    mode: Mode,
    source: &dyn MarketDataSource,
    sink: &dyn NotificationSink,
    config: &Config,
) -> Result<RunOutcome> {
    match mode {
        Mode::Flow => run_flow(source, sink, config).await,
        Mode::Ratio => run_ratio(source, sink, config).await,
    }
}

async fn announce(
    sink: &dyn NotificationSink,
    config: &Config,
    signal: Signal,
    message: Message,
) -> RunOutcome {
    if !signal.direction.is_directional() && !config.notify.announce_neutral {
        info!("neutral signal, announcement suppressed");
        return RunOutcome::Suppressed(signal);
    }

    let delivered = publish(sink, &message).await;
    RunOutcome::Announced { signal, delivered }
}

async fn publish(sink: &dyn NotificationSink, message: &Message) -> bool {
    match sink.publish(&message.title, message.color, &message.body).await {
        Ok(()) => {
            info!(title = %message.title, "notification sent");
            true
        }
        Err(e) => {
            warn!(error = %e, title = %message.title, "notification failed");
            false
        }
    }
}

/// Log a fatal run error, optionally send a neutral failure notice, and hand
/// the error back.
async fn fail(sink: &dyn NotificationSink, config: &Config, pipeline: &str, err: Error) -> Error {
    error!(error = %err, pipeline, "check aborted");
    if config.notify.notify_on_failure {
        let message = report::render_failure(pipeline, &err.to_string(), Utc::now());
        publish(sink, &message).await;
    }
    err
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing() {
        assert_eq!("flow".parse::<Mode>().unwrap(), Mode::Flow);
        assert_eq!(" Ratio ".parse::<Mode>().unwrap(), Mode::Ratio);
        assert_eq!("whales".parse::<Mode>().unwrap(), Mode::Flow);
        assert!(matches!("orderbook".parse::<Mode>(), Err(Error::Config(_))));
    }
}
