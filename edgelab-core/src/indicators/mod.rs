//! Indicator implementations feeding the feature builder.
//!
//! Every indicator implements the `Indicator` trait: a stable column name,
//! a warm-up `lookback()`, and a `compute()` that returns one value per
//! input bar. The first `lookback()` outputs are NaN; a NaN anywhere in an
//! input window propagates to the affected outputs rather than being
//! silently patched. The feature builder drops NaN warm-up rows after
//! aligning all columns.
//!
//! Shared series math (rolling mean/std, EMA, Wilder smoothing) lives in
//! this module so composed indicators (MACD, ADX) reuse one implementation.

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod roc;
pub mod rsi;
pub mod sma;
pub mod volatility;

pub use adx::Adx;
pub use atr::Atr;
pub use bollinger::BollingerWidth;
pub use ema::Ema;
pub use macd::MacdHistogram;
pub use roc::Roc;
pub use rsi::Rsi;
pub use sma::{PriceSource, Sma};
pub use volatility::ReturnVolatility;

use crate::domain::Bar;

/// A single-series technical indicator over a bar history.
///
/// `compute` returns exactly `bars.len()` values. Outputs before the
/// warm-up completes are NaN, as are outputs tainted by NaN inputs.
pub trait Indicator {
    /// Stable column name, unique per configured instance.
    fn name(&self) -> &str;

    /// Number of leading bars with no defined output.
    fn lookback(&self) -> usize;

    /// Compute the full output series, one value per bar.
    fn compute(&self, bars: &[Bar]) -> Vec<f64>;
}

// ─── Shared series math ─────────────────────────────────────────────

/// Rolling arithmetic mean over a trailing window of `period` values.
/// Output[i] is NaN until `period` values are available or when the
/// window contains a NaN.
pub fn rolling_mean(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut out = vec![f64::NAN; n];
    if period == 0 || n < period {
        return out;
    }
    for i in (period - 1)..n {
        let window = &values[i + 1 - period..=i];
        if window.iter().any(|v| v.is_nan()) {
            continue;
        }
        out[i] = window.iter().sum::<f64>() / period as f64;
    }
    out
}

/// Rolling population standard deviation over a trailing window.
pub fn rolling_std(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut out = vec![f64::NAN; n];
    if period == 0 || n < period {
        return out;
    }
    for i in (period - 1)..n {
        let window = &values[i + 1 - period..=i];
        if window.iter().any(|v| v.is_nan()) {
            continue;
        }
        let mean = window.iter().sum::<f64>() / period as f64;
        let var = window.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / period as f64;
        out[i] = var.sqrt();
    }
    out
}

/// EMA of an arbitrary series. Seed: SMA of the first `period` values;
/// alpha = 2 / (period + 1). NaN in the seed window yields an all-NaN
/// output; NaN after the seed taints the remainder of the series.
pub fn ema_of_series(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut out = vec![f64::NAN; n];
    if period == 0 || n < period {
        return out;
    }

    let mut sum = 0.0;
    for &v in &values[..period] {
        if v.is_nan() {
            return out;
        }
        sum += v;
    }
    let mut prev = sum / period as f64;
    out[period - 1] = prev;

    let alpha = 2.0 / (period as f64 + 1.0);
    for i in period..n {
        if values[i].is_nan() {
            return out;
        }
        prev = alpha * values[i] + (1.0 - alpha) * prev;
        out[i] = prev;
    }
    out
}

/// Wilder smoothing (alpha = 1/period). Seeds from the first run of
/// `period` consecutive non-NaN values; NaN after the seed taints the
/// rest of the output.
pub fn wilder_smooth(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut out = vec![f64::NAN; n];
    if period == 0 || n < period {
        return out;
    }

    let seed_start = (0..n).find(|&i| {
        i + period <= n && values[i..i + period].iter().all(|v| !v.is_nan())
    });
    let seed_start = match seed_start {
        Some(s) => s,
        None => return out,
    };
    let seed_end = seed_start + period;

    let mut prev = values[seed_start..seed_end].iter().sum::<f64>() / period as f64;
    out[seed_end - 1] = prev;

    let alpha = 1.0 / period as f64;
    for i in seed_end..n {
        if values[i].is_nan() {
            return out;
        }
        prev = alpha * values[i] + (1.0 - alpha) * prev;
        out[i] = prev;
    }
    out
}

/// Extract the close series from bars.
pub fn closes(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

// ─── Test helpers ───────────────────────────────────────────────────

/// Build synthetic hourly bars from a close series. Open is the previous
/// close, high/low bracket the body by 1.0, volume is constant.
#[cfg(test)]
pub fn make_bars(close_series: &[f64]) -> Vec<Bar> {
    let start = chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    close_series
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { close_series[i - 1] };
            Bar {
                timestamp: start + chrono::Duration::hours(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000.0,
            }
        })
        .collect()
}

#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, epsilon={epsilon}"
    );
}

#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rolling_mean_basic() {
        let out = rolling_mean(&[1.0, 2.0, 3.0, 4.0], 2);
        assert!(out[0].is_nan());
        assert_approx(out[1], 1.5, DEFAULT_EPSILON);
        assert_approx(out[2], 2.5, DEFAULT_EPSILON);
        assert_approx(out[3], 3.5, DEFAULT_EPSILON);
    }

    #[test]
    fn rolling_std_constant_is_zero() {
        let out = rolling_std(&[5.0; 6], 3);
        assert_approx(out[5], 0.0, DEFAULT_EPSILON);
    }

    #[test]
    fn rolling_window_with_nan_is_nan() {
        let out = rolling_mean(&[1.0, f64::NAN, 3.0, 4.0], 2);
        assert!(out[1].is_nan());
        assert!(out[2].is_nan());
        assert_approx(out[3], 3.5, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_of_series_known_values() {
        // period 3, alpha = 0.5; seed at index 2 = 11.0
        let out = ema_of_series(&[10.0, 11.0, 12.0, 13.0, 14.0], 3);
        assert!(out[1].is_nan());
        assert_approx(out[2], 11.0, DEFAULT_EPSILON);
        assert_approx(out[3], 12.0, DEFAULT_EPSILON);
        assert_approx(out[4], 13.0, DEFAULT_EPSILON);
    }

    #[test]
    fn wilder_smooth_skips_leading_nan() {
        // Seed window = [8, 9, 6] starting at index 1
        let out = wilder_smooth(&[f64::NAN, 8.0, 9.0, 6.0, 6.0], 3);
        assert!(out[2].is_nan());
        assert_approx(out[3], 23.0 / 3.0, DEFAULT_EPSILON);
        assert_approx(out[4], 64.0 / 9.0, DEFAULT_EPSILON);
    }
}
