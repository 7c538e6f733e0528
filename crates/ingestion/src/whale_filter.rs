//! Whale trade selection.

use rust_decimal::Decimal;
use tapewatch_core::Trade;

/// Selects trades whose USD notional meets a threshold.
#[derive(Debug, Clone, Copy)]
pub struct WhaleFilter {
    threshold_usd: Decimal,
}

impl WhaleFilter {
    /// Create a filter with an inclusive USD notional cutoff.
    pub fn new(threshold_usd: Decimal) -> Self {
        Self { threshold_usd }
    }

    /// The configured cutoff.
    pub fn threshold(&self) -> Decimal {
        self.threshold_usd
    }

    /// Is this trade at or above the cutoff? A notional too large to
    /// represent is above any cutoff.
    #[inline]
    pub fn is_whale(&self, trade: &Trade) -> bool {
        match trade.value_usd() {
            Some(value) => value >= self.threshold_usd,
            None => true,
        }
    }

    /// Whale subsequence of `trades`, in input order.
    pub fn filter<'a>(&self, trades: &'a [Trade]) -> Vec<&'a Trade> {
        trades.iter().filter(|t| self.is_whale(t)).collect()
    }
}
