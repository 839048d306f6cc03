//! Bollinger band width.
//!
//! Width = (upper - lower) / middle = 2 * mult * stddev / SMA, a scale-free
//! squeeze measure. Population stddev. NaN when the middle band is zero.
//! Lookback: period - 1.

use super::{closes, rolling_mean, rolling_std, Indicator};
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct BollingerWidth {
    period: usize,
    multiplier: f64,
    name: String,
}

impl BollingerWidth {
    pub fn new(period: usize, multiplier: f64) -> Self {
        assert!(period >= 1, "Bollinger period must be >= 1");
        Self {
            period,
            multiplier,
            name: format!("bb_width_{period}_{multiplier}"),
        }
    }
}

impl Indicator for BollingerWidth {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let series = closes(bars);
        let mid = rolling_mean(&series, self.period);
        let std = rolling_std(&series, self.period);
        mid.iter()
            .zip(&std)
            .map(|(&m, &s)| {
                if m.is_nan() || s.is_nan() || m == 0.0 {
                    f64::NAN
                } else {
                    2.0 * self.multiplier * s / m
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn width_zero_for_constant_price() {
        let bars = make_bars(&[100.0; 5]);
        let out = BollingerWidth::new(3, 2.0).compute(&bars);
        assert_approx(out[4], 0.0, DEFAULT_EPSILON);
    }

    #[test]
    fn width_grows_with_dispersion() {
        let calm = make_bars(&[100.0, 100.5, 99.5, 100.0, 100.2]);
        let wild = make_bars(&[100.0, 110.0, 90.0, 105.0, 95.0]);
        let ind = BollingerWidth::new(3, 2.0);
        assert!(ind.compute(&wild)[4] > ind.compute(&calm)[4]);
    }

    #[test]
    fn width_warmup_is_nan() {
        let bars = make_bars(&[10.0, 11.0, 12.0]);
        let out = BollingerWidth::new(3, 2.0).compute(&bars);
        assert!(out[0].is_nan() && out[1].is_nan());
        assert!(!out[2].is_nan());
    }
}
