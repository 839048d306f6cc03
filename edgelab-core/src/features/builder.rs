//! Feature matrix construction from bar history.

use super::FeatureConfig;
use crate::domain::{is_strictly_ordered, Bar, FeatureVector, Label};
use crate::indicators::{
    Adx, Atr, BollingerWidth, Ema, Indicator, MacdHistogram, PriceSource, ReturnVolatility, Roc,
    Rsi, Sma,
};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum FeatureError {
    #[error("insufficient history: need at least {required} bars, got {actual}")]
    InsufficientHistory { required: usize, actual: usize },

    #[error("bars must be strictly ordered by timestamp")]
    UnorderedBars,

    #[error("auxiliary series length {actual} does not match bar count {expected}")]
    AuxLengthMismatch { expected: usize, actual: usize },
}

/// Output of one feature build: column names plus fully-defined rows.
///
/// `first_bar` is the index into the source bars of `rows[0]`; everything
/// before it was warm-up and carries no row.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSet {
    pub names: Vec<String>,
    pub rows: Vec<FeatureVector>,
    pub first_bar: usize,
}

impl FeatureSet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub struct FeatureBuilder {
    config: FeatureConfig,
}

impl FeatureBuilder {
    pub fn new(config: FeatureConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Build the feature matrix over `bars`, optionally joining `aux`, a
    /// scalar series pre-aligned one-to-one with the bars (e.g. a daily
    /// sentiment index forward-filled onto the bar grid by the caller).
    ///
    /// Every value in row *t* derives only from bars at or before *t*.
    /// Warm-up rows are dropped; any residual non-finite value after the
    /// warm-up is clamped to 0.0.
    pub fn build(&self, bars: &[Bar], aux: Option<&[f64]>) -> Result<FeatureSet, FeatureError> {
        let n = bars.len();
        let warmup = self.config.max_lookback();
        let required = warmup + 1;
        if n < required {
            return Err(FeatureError::InsufficientHistory {
                required,
                actual: n,
            });
        }
        if !is_strictly_ordered(bars) {
            return Err(FeatureError::UnorderedBars);
        }
        if let Some(aux) = aux {
            if aux.len() != n {
                return Err(FeatureError::AuxLengthMismatch {
                    expected: n,
                    actual: aux.len(),
                });
            }
        }

        let cfg = &self.config;
        let mut names: Vec<String> = Vec::new();
        let mut columns: Vec<Vec<f64>> = Vec::new();

        let mut push = |name: String, column: Vec<f64>| {
            debug_assert_eq!(column.len(), n);
            names.push(name);
            columns.push(column);
        };

        let rsi = Rsi::new(cfg.rsi_period);
        push(rsi.name().to_string(), rsi.compute(bars));

        let macd = MacdHistogram::new(cfg.macd_fast, cfg.macd_slow, cfg.macd_signal);
        push(macd.name().to_string(), macd.compute(bars));

        let adx = Adx::new(cfg.adx_period);
        push(adx.name().to_string(), adx.compute(bars));

        // Close relative to each trend EMA, as a fraction.
        for period in [cfg.ema_fast, cfg.ema_slow] {
            let ema = Ema::new(period).compute(bars);
            let dist: Vec<f64> = bars
                .iter()
                .zip(&ema)
                .map(|(b, &e)| if e == 0.0 { f64::NAN } else { b.close / e - 1.0 })
                .collect();
            push(format!("ema_dist_{period}"), dist);
        }

        // ATR as a fraction of close, comparable across price levels.
        let atr = Atr::new(cfg.atr_period).compute(bars);
        let atr_pct: Vec<f64> = bars
            .iter()
            .zip(&atr)
            .map(|(b, &a)| if b.close == 0.0 { f64::NAN } else { a / b.close })
            .collect();
        push(format!("atr_pct_{}", cfg.atr_period), atr_pct);

        let bb = BollingerWidth::new(cfg.bollinger_period, cfg.bollinger_multiplier);
        push(bb.name().to_string(), bb.compute(bars));

        let roc = Roc::new(cfg.roc_period);
        push(roc.name().to_string(), roc.compute(bars));

        let vol = ReturnVolatility::new(cfg.volatility_period);
        push(vol.name().to_string(), vol.compute(bars));

        // Current volume against its trailing average.
        let vol_sma = Sma::new(cfg.volume_sma_period, PriceSource::Volume).compute(bars);
        let vol_ratio: Vec<f64> = bars
            .iter()
            .zip(&vol_sma)
            .map(|(b, &s)| if s == 0.0 { f64::NAN } else { b.volume / s })
            .collect();
        push(format!("vol_ratio_{}", cfg.volume_sma_period), vol_ratio);

        // Intrabar range as a fraction of close.
        let hl_range: Vec<f64> = bars
            .iter()
            .map(|b| {
                if b.close == 0.0 {
                    f64::NAN
                } else {
                    (b.high - b.low) / b.close
                }
            })
            .collect();
        push("hl_range".to_string(), hl_range);

        // Lagged one-bar simple returns.
        let one_bar_return: Vec<f64> = (0..n)
            .map(|i| {
                if i == 0 || bars[i - 1].close == 0.0 {
                    f64::NAN
                } else {
                    bars[i].close / bars[i - 1].close - 1.0
                }
            })
            .collect();
        for &lag in &cfg.return_lags {
            let lagged: Vec<f64> = (0..n)
                .map(|i| {
                    if i < lag {
                        f64::NAN
                    } else {
                        one_bar_return[i - lag]
                    }
                })
                .collect();
            push(format!("ret_lag_{lag}"), lagged);
        }

        if let Some(aux) = aux {
            push("sentiment".to_string(), aux.to_vec());
        }

        let rows: Vec<FeatureVector> = (warmup..n)
            .map(|i| FeatureVector {
                timestamp: bars[i].timestamp,
                values: columns
                    .iter()
                    .map(|col| if col[i].is_finite() { col[i] } else { 0.0 })
                    .collect(),
            })
            .collect();

        Ok(FeatureSet {
            names,
            rows,
            first_bar: warmup,
        })
    }
}

/// Label every bar from its forward return over `horizon` bars.
///
/// `Up` iff `close[t + horizon] / close[t] - 1` strictly exceeds
/// `threshold`; the last `horizon` bars have no forward close and stay
/// unlabeled.
pub fn label_bars(bars: &[Bar], horizon: usize, threshold: f64) -> Vec<Option<Label>> {
    let n = bars.len();
    (0..n)
        .map(|t| {
            if t + horizon >= n || bars[t].close == 0.0 {
                None
            } else {
                let forward = bars[t + horizon].close / bars[t].close - 1.0;
                Some(Label::from_return(forward, threshold))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_bars;

    fn small_config() -> FeatureConfig {
        FeatureConfig {
            rsi_period: 3,
            macd_fast: 3,
            macd_slow: 5,
            macd_signal: 3,
            adx_period: 3,
            ema_fast: 3,
            ema_slow: 5,
            atr_period: 3,
            bollinger_period: 4,
            bollinger_multiplier: 2.0,
            roc_period: 3,
            volatility_period: 4,
            volume_sma_period: 4,
            return_lags: vec![1, 2],
            label_horizon: 1,
            label_threshold: 0.0,
        }
    }

    fn wavy_closes(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0 + i as f64 * 0.3)
            .collect()
    }

    #[test]
    fn insufficient_history_is_rejected() {
        let cfg = small_config();
        let required = cfg.max_lookback() + 1;
        let bars = make_bars(&wavy_closes(required - 1));
        let err = FeatureBuilder::new(cfg).build(&bars, None).unwrap_err();
        assert_eq!(
            err,
            FeatureError::InsufficientHistory {
                required,
                actual: required - 1
            }
        );
    }

    #[test]
    fn rows_are_fully_finite() {
        let bars = make_bars(&wavy_closes(40));
        let set = FeatureBuilder::new(small_config())
            .build(&bars, None)
            .unwrap();
        assert!(!set.is_empty());
        for row in &set.rows {
            assert!(row.is_finite(), "non-finite row at {}", row.timestamp);
        }
    }

    #[test]
    fn row_count_matches_warmup_drop() {
        let cfg = small_config();
        let warmup = cfg.max_lookback();
        let bars = make_bars(&wavy_closes(40));
        let set = FeatureBuilder::new(cfg).build(&bars, None).unwrap();
        assert_eq!(set.first_bar, warmup);
        assert_eq!(set.len(), 40 - warmup);
        assert_eq!(set.rows[0].timestamp, bars[warmup].timestamp);
    }

    #[test]
    fn future_bars_do_not_change_past_features() {
        let bars = make_bars(&wavy_closes(40));
        let builder = FeatureBuilder::new(small_config());
        let full = builder.build(&bars, None).unwrap();

        let mut altered = bars.clone();
        for bar in &mut altered[30..] {
            bar.close *= 3.0;
            bar.high = bar.high.max(bar.close) + 5.0;
        }
        let partial = builder.build(&altered, None).unwrap();

        // Rows strictly before the first altered bar must be identical.
        for (a, b) in full.rows.iter().zip(&partial.rows) {
            if a.timestamp < bars[30].timestamp {
                assert_eq!(a, b, "feature row at {} changed", a.timestamp);
            }
        }
    }

    #[test]
    fn aux_series_becomes_sentiment_column() {
        let bars = make_bars(&wavy_closes(40));
        let aux: Vec<f64> = (0..40).map(|i| 50.0 + i as f64).collect();
        let set = FeatureBuilder::new(small_config())
            .build(&bars, Some(&aux))
            .unwrap();
        let col = set.names.iter().position(|n| n == "sentiment").unwrap();
        assert_eq!(set.rows[0].values[col], aux[set.first_bar]);
    }

    #[test]
    fn aux_length_mismatch_is_rejected() {
        let bars = make_bars(&wavy_closes(40));
        let aux = vec![50.0; 10];
        let err = FeatureBuilder::new(small_config())
            .build(&bars, Some(&aux))
            .unwrap_err();
        assert_eq!(
            err,
            FeatureError::AuxLengthMismatch {
                expected: 40,
                actual: 10
            }
        );
    }

    #[test]
    fn unordered_bars_are_rejected() {
        let mut bars = make_bars(&wavy_closes(40));
        bars.swap(5, 6);
        let err = FeatureBuilder::new(small_config())
            .build(&bars, None)
            .unwrap_err();
        assert_eq!(err, FeatureError::UnorderedBars);
    }

    #[test]
    fn labels_follow_forward_return() {
        let bars = make_bars(&[100.0, 110.0, 105.0, 105.0]);
        let labels = label_bars(&bars, 1, 0.0);
        assert_eq!(labels[0], Some(Label::Up));
        assert_eq!(labels[1], Some(Label::Down));
        assert_eq!(labels[2], Some(Label::Down)); // flat is not Up
        assert_eq!(labels[3], None);
    }

    #[test]
    fn longer_horizon_leaves_tail_unlabeled() {
        let bars = make_bars(&[100.0, 101.0, 102.0, 103.0, 104.0]);
        let labels = label_bars(&bars, 3, 0.0);
        assert_eq!(labels.iter().filter(|l| l.is_some()).count(), 2);
        assert_eq!(labels[0], Some(Label::Up));
        assert_eq!(labels[2], None);
    }
}
