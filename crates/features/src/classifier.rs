//! Trigger-band classification.
//!
//! ```text
//!   magnitude >  trigger  => Bullish
//!   magnitude < -trigger  => Bearish
//!   otherwise             => Neutral   (including exactly +/- trigger)
//! ```

use rust_decimal::Decimal;
use tapewatch_core::{Direction, Error, Evidence, Result, Signal};

/// Maps a scalar against a symmetric trigger band.
#[derive(Debug, Clone, Copy)]
pub struct SignalClassifier {
    trigger: Decimal,
}

impl SignalClassifier {
    /// Create a classifier. `trigger` must be strictly positive.
    pub fn new(trigger: Decimal) -> Result<Self> {
        if trigger <= Decimal::ZERO {
            return Err(Error::config(format!(
                "trigger threshold must be strictly positive, got {trigger}"
            )));
        }
        Ok(Self { trigger })
    }

    /// The band half-width.
    pub fn trigger(&self) -> Decimal {
        self.trigger
    }

    /// Classify a magnitude.
    pub fn classify(&self, magnitude: Decimal) -> Direction {
        if magnitude > self.trigger {
            Direction::Bullish
        } else if magnitude < -self.trigger {
            Direction::Bearish
        } else {
            Direction::Neutral
        }
    }

    /// Classify and attach the evidence.
    pub fn signal(&self, magnitude: Decimal, evidence: Evidence) -> Signal {
        Signal {
            direction: self.classify(magnitude),
            magnitude,
            trigger: self.trigger,
            evidence,
        }
    }
}
