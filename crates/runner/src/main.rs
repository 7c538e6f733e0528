//! `tapewatch <flow|ratio>`: one check per invocation.
//!
//! Configuration: `TAPEWATCH_CONFIG` (optional JSON file), then `TAPEWATCH_*`
//! and `DISCORD_WEBHOOK` environment variables. A `.env` file is honoured.

use anyhow::Context;
use tapewatch_core::Config;
use tapewatch_runner::{ratio_source, run, sink_for, trade_source, Mode, RunOutcome};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mode: Mode = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("TAPEWATCH_MODE").ok())
        .as_deref()
        .unwrap_or("flow")
        .parse()?;

    let mut config = match std::env::var("TAPEWATCH_CONFIG") {
        Ok(path) => Config::load(&path).with_context(|| format!("failed to load config {path}"))?,
        Err(_) => Config::default(),
    };
    config
        .apply_env(|key| std::env::var(key).ok())
        .context("invalid environment configuration")?;
    config.validate()?;

    info!(?mode, exchange = %config.source.exchange, "tapewatch run starting");

    let source = match mode {
        Mode::Flow => trade_source(&config)?,
        Mode::Ratio => ratio_source(&config)?,
    };
    let sink = sink_for(&config)?;

    let outcome = run(mode, source.as_ref(), sink.as_ref(), &config).await?;

    match &outcome {
        RunOutcome::NoData => info!("run finished without data"),
        RunOutcome::Suppressed(signal) => {
            info!(direction = %signal.direction, "run finished, neutral result not announced")
        }
        RunOutcome::Announced { signal, delivered } => {
            info!(direction = %signal.direction, delivered, "run finished")
        }
    }
    Ok(())
}
