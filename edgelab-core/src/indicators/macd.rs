//! MACD histogram.
//!
//! MACD line = EMA(close, fast) - EMA(close, slow); signal = EMA of the
//! MACD line; histogram = MACD - signal. Only the histogram is exposed,
//! that is the column the feature set consumes.
//! Lookback: slow - 1 + signal - 1.

use super::{closes, ema_of_series, Indicator};
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct MacdHistogram {
    fast: usize,
    slow: usize,
    signal: usize,
    name: String,
}

impl MacdHistogram {
    pub fn new(fast: usize, slow: usize, signal: usize) -> Self {
        assert!(fast >= 1 && slow >= 1 && signal >= 1, "MACD periods must be >= 1");
        assert!(fast < slow, "MACD fast period must be shorter than slow");
        Self {
            fast,
            slow,
            signal,
            name: format!("macd_hist_{fast}_{slow}_{signal}"),
        }
    }
}

impl Indicator for MacdHistogram {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.slow + self.signal - 2
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let series = closes(bars);
        let fast_ema = ema_of_series(&series, self.fast);
        let slow_ema = ema_of_series(&series, self.slow);

        let macd_line: Vec<f64> = fast_ema
            .iter()
            .zip(&slow_ema)
            .map(|(f, s)| f - s)
            .collect();

        // Signal EMA seeds from the first defined MACD value.
        let first_valid = macd_line.iter().position(|v| !v.is_nan());
        let mut out = vec![f64::NAN; series.len()];
        let start = match first_valid {
            Some(s) => s,
            None => return out,
        };
        let signal_line = ema_of_series(&macd_line[start..], self.signal);
        for (i, sig) in signal_line.iter().enumerate() {
            if !sig.is_nan() {
                out[start + i] = macd_line[start + i] - sig;
            }
        }
        out
    }
}
