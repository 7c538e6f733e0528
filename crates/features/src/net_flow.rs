//! Net whale flow aggregation.
//!
//! Reduces a whale subsequence into buy/sell volumes and net flow. The fold is
//! order-independent; only the reference price depends on timestamps.

use rust_decimal::Decimal;
use tapewatch_core::{Error, FlowAggregate, Price, Result, Trade, TradeSide};

/// Running per-side totals.
#[derive(Debug, Clone, Default)]
struct FlowAccumulator {
    buy_volume: Decimal,
    sell_volume: Decimal,
    net_flow: Decimal,
    count: usize,
}

impl FlowAccumulator {
    fn add(&mut self, trade: &Trade) -> Result<()> {
        let volume = match trade.side {
            TradeSide::Buy => &mut self.buy_volume,
            TradeSide::Sell => &mut self.sell_volume,
        };
        *volume = volume
            .checked_add(trade.size)
            .ok_or_else(|| Error::data(format!("{:?} volume overflows", trade.side)))?;
        // Bounded by the per-side totals above.
        self.net_flow = self
            .net_flow
            .checked_add(trade.signed_size())
            .ok_or_else(|| Error::data("net flow overflows"))?;
        self.count += 1;
        Ok(())
    }

    fn to_aggregate(&self, reference_price: Option<Price>) -> FlowAggregate {
        FlowAggregate {
            net_flow: self.net_flow,
            buy_volume: self.buy_volume,
            sell_volume: self.sell_volume,
            whale_count: self.count,
            reference_price,
        }
    }
}

/// Builds a [`FlowAggregate`] from a trade snapshot and its whale subset.
#[derive(Debug, Default, Clone, Copy)]
pub struct NetFlowAggregator;

impl NetFlowAggregator {
    /// Create a new aggregator.
    pub fn new() -> Self {
        Self
    }

    /// Aggregate `whales`, taking the reference price from the full `trades`
    /// snapshot so a quiet market still reports a price.
    ///
    /// Fails with a data error when a volume total does not fit in a
    /// `Decimal`.
    pub fn aggregate(&self, trades: &[Trade], whales: &[&Trade]) -> Result<FlowAggregate> {
        let reference_price = latest_price(trades);

        if whales.is_empty() {
            return Ok(FlowAggregate::quiet(reference_price));
        }

        let mut acc = FlowAccumulator::default();
        for trade in whales {
            acc.add(trade)?;
        }
        Ok(acc.to_aggregate(reference_price))
    }
}

/// Price of the most recent trade. Ties keep the first one seen.
pub fn latest_price(trades: &[Trade]) -> Option<Price> {
    let mut latest: Option<&Trade> = None;
    for trade in trades {
        match latest {
            Some(current) if trade.timestamp <= current.timestamp => {}
            _ => latest = Some(trade),
        }
    }
    latest.map(|t| t.price)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn make_trade(secs: i64, price: Decimal, size: Decimal, side: TradeSide) -> Trade {
        Trade {
            price,
            size,
            side,
            timestamp: Utc.timestamp_opt(1_704_067_200 + secs, 0).unwrap(),
        }
    }

    #[test]
    fn test_mixed_whales() {
        let trades = vec![
            make_trade(0, dec!(30000), dec!(2), TradeSide::Buy),
            make_trade(1, dec!(30010), dec!(0.75), TradeSide::Sell),
            make_trade(2, dec!(30020), dec!(1), TradeSide::Buy),
            make_trade(3, dec!(30030), dec!(0.01), TradeSide::Sell),
        ];
        let whales: Vec<&Trade> = trades.iter().take(3).collect();

        let agg = NetFlowAggregator::new().aggregate(&trades, &whales).unwrap();

        assert_eq!(agg.buy_volume, dec!(3));
        assert_eq!(agg.sell_volume, dec!(0.75));
        assert_eq!(agg.net_flow, dec!(2.25));
        assert_eq!(agg.whale_count, 3);
        // Non-whale trade at t=3 is still the latest print.
        assert_eq!(agg.reference_price, Some(dec!(30030)));
    }

    #[test]
    fn test_no_whales_still_reports_price() {
        let trades = vec![
            make_trade(5, dec!(41000), dec!(0.01), TradeSide::Buy),
            make_trade(9, dec!(41005), dec!(0.02), TradeSide::Sell),
            make_trade(7, dec!(40990), dec!(0.01), TradeSide::Sell),
        ];

        let agg = NetFlowAggregator::new().aggregate(&trades, &[]).unwrap();

        assert_eq!(agg, FlowAggregate::quiet(Some(dec!(41005))));
    }

    #[test]
    fn test_empty_snapshot_has_no_price() {
        let agg = NetFlowAggregator::new().aggregate(&[], &[]).unwrap();
        assert_eq!(agg.net_flow, Decimal::ZERO);
        assert_eq!(agg.buy_volume, Decimal::ZERO);
        assert_eq!(agg.sell_volume, Decimal::ZERO);
        assert_eq!(agg.whale_count, 0);
        assert_eq!(agg.reference_price, None);
    }

    #[test]
    fn test_latest_price_newest_first_input() {
        // Coinbase returns newest first.
        let trades = vec![
            make_trade(10, dec!(100), dec!(1), TradeSide::Buy),
            make_trade(9, dec!(99), dec!(1), TradeSide::Buy),
            make_trade(8, dec!(98), dec!(1), TradeSide::Buy),
        ];
        assert_eq!(latest_price(&trades), Some(dec!(100)));
    }

    #[test]
    fn test_latest_price_tie_keeps_first() {
        let trades = vec![
            make_trade(10, dec!(100), dec!(1), TradeSide::Buy),
            make_trade(10, dec!(101), dec!(1), TradeSide::Sell),
        ];
        assert_eq!(latest_price(&trades), Some(dec!(100)));
    }

    #[test]
    fn test_net_flow_identity_and_order_independence() {
        let trades = vec![
            make_trade(0, dec!(25000), dec!(1.2), TradeSide::Buy),
            make_trade(1, dec!(25000), dec!(3.4), TradeSide::Sell),
            make_trade(2, dec!(25000), dec!(0.9), TradeSide::Sell),
            make_trade(3, dec!(25000), dec!(5.0), TradeSide::Buy),
        ];
        let forward: Vec<&Trade> = trades.iter().collect();
        let backward: Vec<&Trade> = trades.iter().rev().collect();

        let a = NetFlowAggregator::new().aggregate(&trades, &forward).unwrap();
        let b = NetFlowAggregator::new().aggregate(&trades, &backward).unwrap();

        assert_eq!(a, b);
        assert_eq!(a.net_flow, a.buy_volume - a.sell_volume);
        assert!(a.buy_volume >= Decimal::ZERO && a.sell_volume >= Decimal::ZERO);
        let signed: Decimal = trades.iter().map(Trade::signed_size).sum();
        assert_eq!(a.net_flow, signed);
    }

    #[test]
    fn test_volume_overflow_is_data_error() {
        let trades = vec![
            make_trade(0, dec!(1), Decimal::MAX, TradeSide::Buy),
            make_trade(1, dec!(1), Decimal::MAX, TradeSide::Buy),
        ];
        let whales: Vec<&Trade> = trades.iter().collect();

        let result = NetFlowAggregator::new().aggregate(&trades, &whales);

        assert!(matches!(result, Err(Error::Data(_))));
    }

    #[test]
    fn test_opposite_extremes_do_not_overflow() {
        let trades = vec![
            make_trade(0, dec!(1), Decimal::MAX, TradeSide::Buy),
            make_trade(1, dec!(1), Decimal::MAX, TradeSide::Sell),
        ];
        let whales: Vec<&Trade> = trades.iter().collect();

        let agg = NetFlowAggregator::new().aggregate(&trades, &whales).unwrap();

        assert_eq!(agg.net_flow, Decimal::ZERO);
        assert_eq!(agg.buy_volume, Decimal::MAX);
    }
}
