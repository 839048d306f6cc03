//! Rate of Change: percent move over N bars. Lookback: period.

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Roc {
    period: usize,
    name: String,
}

impl Roc {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ROC period must be >= 1");
        Self {
            period,
            name: format!("roc_{period}"),
        }
    }
}

impl Indicator for Roc {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut out = vec![f64::NAN; n];
        for i in self.period..n {
            let base = bars[i - self.period].close;
            let curr = bars[i].close;
            if base.is_nan() || curr.is_nan() || base == 0.0 {
                continue;
            }
            out[i] = (curr - base) / base * 100.0;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn roc_compounding_10_percent() {
        let bars = make_bars(&[100.0, 110.0, 121.0]);
        let out = Roc::new(1).compute(&bars);
        assert!(out[0].is_nan());
        assert_approx(out[1], 10.0, DEFAULT_EPSILON);
        assert_approx(out[2], 10.0, DEFAULT_EPSILON);
    }

    #[test]
    fn roc_two_bar_horizon() {
        let bars = make_bars(&[100.0, 110.0, 121.0]);
        let out = Roc::new(2).compute(&bars);
        assert_approx(out[2], 21.0, DEFAULT_EPSILON);
    }

    #[test]
    fn roc_negative_move() {
        let bars = make_bars(&[100.0, 90.0]);
        let out = Roc::new(1).compute(&bars);
        assert_approx(out[1], -10.0, DEFAULT_EPSILON);
    }
}
