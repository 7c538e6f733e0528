//! Message rendering for announced signals.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tapewatch_core::{Direction, SeverityColor};
use tapewatch_features::{FlowReport, RatioReport};

/// A rendered notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub title: String,
    pub color: SeverityColor,
    pub body: String,
}

/// Details of a flow run that are not part of the report itself.
#[derive(Debug, Clone)]
pub struct FlowContext<'a> {
    pub symbol: &'a str,
    pub venue: &'a str,
    pub whale_threshold_usd: Decimal,
    pub at: DateTime<Utc>,
}

/// Details of a ratio run that are not part of the report itself.
#[derive(Debug, Clone)]
pub struct RatioContext<'a> {
    pub symbol: &'a str,
    pub period: &'a str,
    pub current_price: Option<Decimal>,
    pub at: DateTime<Utc>,
}

/// Render a whale flow report.
pub fn render_flow(report: &FlowReport, ctx: &FlowContext<'_>) -> Message {
    let signal = &report.signal;
    let base = base_asset(ctx.symbol);

    let (title, marker) = match signal.direction {
        Direction::Bullish => ("Whale check: whales are buying", "🟢"),
        Direction::Bearish => ("Whale check: whales are selling", "🔴"),
        Direction::Neutral => ("📅 Whale check: market calm", "⚪"),
    };

    let mut body = format!(
        "**{} market snapshot ({})**\n\n",
        ctx.at.format("%Y-%m-%d"),
        ctx.venue
    );

    if let Some(agg) = signal.flow() {
        let price = agg
            .reference_price
            .map(|p| format!("${p}"))
            .unwrap_or_else(|| "n/a".to_string());
        body.push_str(&format!("**{base} price**: {price}\n"));
        body.push_str(&format!(
            "{marker} **Whale net flow**: {} {base}\n",
            signed(agg.net_flow, 2)
        ));
        if agg.has_whales() {
            body.push_str(&format!(
                "**Whale trades**: {} of {}\n",
                agg.whale_count, report.trade_count
            ));
        } else {
            body.push_str(&format!(
                "**Whale trades**: none of {}\n",
                report.trade_count
            ));
        }
        body.push_str(&format!(
            "**Taker buys**: {} {base}\n",
            fixed(agg.buy_volume, 2)
        ));
        body.push_str(&format!(
            "**Taker sells**: {} {base}\n",
            fixed(agg.sell_volume, 2)
        ));
    }

    body.push_str(&format!(
        "\n*Whale cutoff ${} • trigger ±{} {base} • for reference only*",
        ctx.whale_threshold_usd, signal.trigger
    ));

    Message {
        title: title.to_string(),
        color: signal.direction.severity(),
        body,
    }
}

/// Render a long/short ratio report.
pub fn render_ratio(report: &RatioReport, ctx: &RatioContext<'_>) -> Message {
    let signal = &report.signal;

    let (title, marker) = match signal.direction {
        Direction::Bullish => ("Positioning: longs building", "🟢"),
        Direction::Bearish => ("Positioning: shorts building", "🔴"),
        Direction::Neutral => ("Positioning: balanced", "⚪"),
    };

    let mut body = format!(
        "**{} long/short check ({}, {})**\n\n",
        ctx.at.format("%Y-%m-%d %H:%M UTC"),
        ctx.symbol,
        ctx.period
    );

    let price = ctx
        .current_price
        .map(|p| format!("${p}"))
        .unwrap_or_else(|| "n/a".to_string());
    body.push_str(&format!("**Price**: {price}\n"));

    if let Some(delta) = signal.ratio() {
        body.push_str(&format!(
            "**Long/short ratio**: {} → {}\n",
            fixed(delta.previous, 4),
            fixed(delta.current, 4)
        ));
        body.push_str(&format!(
            "{marker} **Change**: {}\n",
            signed(delta.change, 4)
        ));
    }

    let closed = &report.latest_closed;
    let percent = |fraction: Decimal| fraction.checked_mul(Decimal::ONE_HUNDRED);
    if let (Some(long), Some(short)) = (
        closed.long_account.and_then(percent),
        closed.short_account.and_then(percent),
    ) {
        body.push_str(&format!(
            "**Accounts**: {}% long / {}% short\n",
            fixed(long, 1),
            fixed(short, 1)
        ));
    }

    body.push_str(&format!(
        "\n*Trigger ±{} • last interval excluded while forming*",
        signal.trigger
    ));

    Message {
        title: title.to_string(),
        color: signal.direction.severity(),
        body,
    }
}

/// Render a "check failed" notice. Never directional.
pub fn render_failure(pipeline: &str, error: &str, at: DateTime<Utc>) -> Message {
    Message {
        title: format!("⚠️ {pipeline} check failed"),
        color: SeverityColor::Neutral,
        body: format!(
            "**{}**\n\nNo signal was produced for this run.\n`{}`",
            at.format("%Y-%m-%d %H:%M UTC"),
            error
        ),
    }
}

/// Base asset of a symbol: `BTC-USD` → `BTC`, `BTCUSDT` → `BTC`.
pub fn base_asset(symbol: &str) -> &str {
    if let Some((base, _)) = symbol.split_once(['-', '/', '_']) {
        return base;
    }
    for quote in ["USDT", "USDC", "BUSD", "USD"] {
        if let Some(base) = symbol.strip_suffix(quote) {
            if !base.is_empty() {
                return base;
            }
        }
    }
    symbol
}

/// Exactly `dp` decimal places.
fn fixed(value: Decimal, dp: u32) -> String {
    let mut v = value.round_dp(dp);
    v.rescale(dp);
    if v.is_zero() {
        v.set_sign_positive(true);
    }
    v.to_string()
}

/// Exactly `dp` decimal places with an explicit sign.
fn signed(value: Decimal, dp: u32) -> String {
    let text = fixed(value, dp);
    if text.starts_with('-') {
        text
    } else {
        format!("+{text}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use tapewatch_core::{Evidence, FlowAggregate, RatioDelta, RatioSample, Signal};

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 8, 30, 0).unwrap()
    }

    fn flow_report(direction: Direction, net: Decimal) -> FlowReport {
        let agg = FlowAggregate {
            net_flow: net,
            buy_volume: dec!(3),
            sell_volume: dec!(3) - net,
            whale_count: 4,
            reference_price: Some(dec!(42000.5)),
        };
        FlowReport {
            trade_count: 1000,
            signal: Signal {
                direction,
                magnitude: net,
                trigger: dec!(0.5),
                evidence: Evidence::Flow(agg),
            },
        }
    }

    #[test]
    fn test_render_flow_bullish() {
        let ctx = FlowContext {
            symbol: "BTC-USD",
            venue: "coinbase",
            whale_threshold_usd: dec!(20000),
            at: at(),
        };
        let msg = render_flow(&flow_report(Direction::Bullish, dec!(1.256)), &ctx);

        assert_eq!(msg.title, "Whale check: whales are buying");
        assert_eq!(msg.color, SeverityColor::Positive);
        assert!(msg.body.contains("2024-01-01 market snapshot (coinbase)"));
        assert!(msg.body.contains("**BTC price**: $42000.5"));
        assert!(msg.body.contains("**Whale net flow**: +1.26 BTC"));
        assert!(msg.body.contains("**Whale trades**: 4 of 1000"));
        assert!(msg.body.contains("**Taker buys**: 3.00 BTC"));
    }

    #[test]
    fn test_render_flow_bearish_sign() {
        let ctx = FlowContext {
            symbol: "BTCUSDT",
            venue: "binance",
            whale_threshold_usd: dec!(20000),
            at: at(),
        };
        let msg = render_flow(&flow_report(Direction::Bearish, dec!(-2)), &ctx);

        assert_eq!(msg.color, SeverityColor::Negative);
        assert!(msg.body.contains("**Whale net flow**: -2.00 BTC"));
    }

    #[test]
    fn test_render_flow_without_whales() {
        let ctx = FlowContext {
            symbol: "BTC-USD",
            venue: "coinbase",
            whale_threshold_usd: dec!(20000),
            at: at(),
        };
        let report = FlowReport {
            trade_count: 250,
            signal: Signal {
                direction: Direction::Neutral,
                magnitude: Decimal::ZERO,
                trigger: dec!(0.5),
                evidence: Evidence::Flow(FlowAggregate::quiet(Some(dec!(42000)))),
            },
        };

        let msg = render_flow(&report, &ctx);

        assert_eq!(msg.color, SeverityColor::Neutral);
        assert!(msg.body.contains("**Whale trades**: none of 250"));
        assert!(msg.body.contains("**Whale net flow**: +0.00 BTC"));
    }

    #[test]
    fn test_render_ratio() {
        let delta = RatioDelta {
            previous: dec!(0.98),
            current: dec!(1.00),
            change: dec!(0.02),
            previous_at: at(),
            current_at: at(),
        };
        let report = RatioReport {
            latest_closed: RatioSample {
                timestamp: at(),
                long_short_ratio: dec!(1.00),
                long_account: Some(dec!(0.5)),
                short_account: Some(dec!(0.5)),
            },
            signal: Signal {
                direction: Direction::Bullish,
                magnitude: dec!(0.02),
                trigger: dec!(0.01),
                evidence: Evidence::Ratio(delta),
            },
        };
        let ctx = RatioContext {
            symbol: "BTCUSDT",
            period: "5m",
            current_price: None,
            at: at(),
        };

        let msg = render_ratio(&report, &ctx);

        assert_eq!(msg.title, "Positioning: longs building");
        assert!(msg.body.contains("**Price**: n/a"));
        assert!(msg.body.contains("0.9800 → 1.0000"));
        assert!(msg.body.contains("**Change**: +0.0200"));
        assert!(msg.body.contains("50.0% long / 50.0% short"));
    }

    #[test]
    fn test_render_ratio_skips_unrepresentable_accounts() {
        let delta = RatioDelta {
            previous: dec!(1.00),
            current: dec!(1.00),
            change: Decimal::ZERO,
            previous_at: at(),
            current_at: at(),
        };
        let report = RatioReport {
            latest_closed: RatioSample {
                timestamp: at(),
                long_short_ratio: dec!(1.00),
                long_account: Some(Decimal::MAX),
                short_account: Some(dec!(0.5)),
            },
            signal: Signal {
                direction: Direction::Neutral,
                magnitude: Decimal::ZERO,
                trigger: dec!(0.01),
                evidence: Evidence::Ratio(delta),
            },
        };
        let ctx = RatioContext {
            symbol: "BTCUSDT",
            period: "5m",
            current_price: Some(dec!(42000)),
            at: at(),
        };

        let msg = render_ratio(&report, &ctx);

        assert!(!msg.body.contains("**Accounts**"));
        assert!(msg.body.contains("**Price**: $42000"));
    }

    #[test]
    fn test_render_failure_is_neutral() {
        let msg = render_failure("Whale flow", "Data error: trade #0", at());
        assert_eq!(msg.color, SeverityColor::Neutral);
        assert!(msg.title.contains("check failed"));
        assert!(msg.body.contains("Data error: trade #0"));
    }

    #[test]
    fn test_base_asset() {
        assert_eq!(base_asset("BTC-USD"), "BTC");
        assert_eq!(base_asset("ETHUSDT"), "ETH");
        assert_eq!(base_asset("SOL/USDC"), "SOL");
        assert_eq!(base_asset("USD"), "USD");
        assert_eq!(base_asset("XYZ"), "XYZ");
    }

    #[test]
    fn test_number_formatting() {
        assert_eq!(fixed(dec!(1), 2), "1.00");
        assert_eq!(fixed(dec!(0.125), 2), "0.12");
        assert_eq!(fixed(dec!(-0.001), 2), "0.00");
        assert_eq!(signed(dec!(0), 2), "+0.00");
        assert_eq!(signed(dec!(-1.5), 2), "-1.50");
    }
}
