//! Realized volatility: rolling stddev of one-bar simple returns.
//!
//! Return[t] = close[t] / close[t-1] - 1 (NaN at t = 0), then population
//! stddev over a trailing window. Lookback: period.

use super::{rolling_std, Indicator};
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct ReturnVolatility {
    period: usize,
    name: String,
}

impl ReturnVolatility {
    pub fn new(period: usize) -> Self {
        assert!(period >= 2, "volatility period must be >= 2");
        Self {
            period,
            name: format!("ret_vol_{period}"),
        }
    }
}

impl Indicator for ReturnVolatility {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut returns = vec![f64::NAN; n];
        for i in 1..n {
            let prev = bars[i - 1].close;
            let curr = bars[i].close;
            if prev.is_nan() || curr.is_nan() || prev == 0.0 {
                continue;
            }
            returns[i] = curr / prev - 1.0;
        }
        rolling_std(&returns, self.period)
    }
}
