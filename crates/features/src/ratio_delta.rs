//! Long/short ratio change between closed intervals.

use tapewatch_core::{Error, RatioDelta, RatioSample, Result};

/// Minimum samples: two closed intervals plus the forming one.
pub const MIN_SAMPLES: usize = 3;

/// Compares the two most recent closed ratio intervals.
///
/// Input is ordered oldest first and the last sample is the interval still
/// being formed, so it never takes part in the comparison.
#[derive(Debug, Default, Clone, Copy)]
pub struct RatioDeltaAnalyzer;

impl RatioDeltaAnalyzer {
    /// Create a new analyzer.
    pub fn new() -> Self {
        Self
    }

    /// Delta between the second-to-last (current) and third-to-last
    /// (previous) samples.
    pub fn analyze(&self, samples: &[RatioSample]) -> Result<RatioDelta> {
        match samples {
            [.., previous, current, _forming] => Ok(RatioDelta {
                previous: previous.long_short_ratio,
                current: current.long_short_ratio,
                change: current.long_short_ratio - previous.long_short_ratio,
                previous_at: previous.timestamp,
                current_at: current.timestamp,
            }),
            _ => Err(Error::insufficient_data(format!(
                "need at least {MIN_SAMPLES} ratio samples, got {}",
                samples.len()
            ))),
        }
    }

    /// Most recent closed sample, if any.
    pub fn latest_closed<'a>(&self, samples: &'a [RatioSample]) -> Option<&'a RatioSample> {
        samples.len().checked_sub(2).map(|i| &samples[i])
    }
}
