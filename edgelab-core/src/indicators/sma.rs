//! Simple Moving Average over close or volume.
//!
//! The volume source exists for the volume-ratio feature (current volume
//! relative to its trailing average). Lookback: period - 1.

use super::{rolling_mean, Indicator};
use crate::domain::Bar;

/// Which bar field the SMA averages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceSource {
    Close,
    Volume,
}

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    source: PriceSource,
    name: String,
}

impl Sma {
    pub fn new(period: usize, source: PriceSource) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        let tag = match source {
            PriceSource::Close => "sma",
            PriceSource::Volume => "vol_sma",
        };
        Self {
            period,
            source,
            name: format!("{tag}_{period}"),
        }
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let series: Vec<f64> = match self.source {
            PriceSource::Close => bars.iter().map(|b| b.close).collect(),
            PriceSource::Volume => bars.iter().map(|b| b.volume).collect(),
        };
        rolling_mean(&series, self.period)
    }
}
