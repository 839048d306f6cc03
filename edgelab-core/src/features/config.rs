//! Feature builder configuration.

use serde::{Deserialize, Serialize};

/// Indicator periods and labeling parameters for one feature build.
///
/// Defaults match the standard daily-chart settings the feature set was
/// designed around. `return_lags` are offsets in bars for the lagged
/// simple-return columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub adx_period: usize,
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub atr_period: usize,
    pub bollinger_period: usize,
    pub bollinger_multiplier: f64,
    pub roc_period: usize,
    pub volatility_period: usize,
    pub volume_sma_period: usize,
    pub return_lags: Vec<usize>,
    /// Bars ahead used to compute the forward return a label is read from.
    pub label_horizon: usize,
    /// Forward return must strictly exceed this to label `Up`.
    pub label_threshold: f64,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            adx_period: 14,
            ema_fast: 50,
            ema_slow: 200,
            atr_period: 14,
            bollinger_period: 20,
            bollinger_multiplier: 2.0,
            roc_period: 10,
            volatility_period: 20,
            volume_sma_period: 20,
            return_lags: vec![1, 4],
            label_horizon: 1,
            label_threshold: 0.0,
        }
    }
}

impl FeatureConfig {
    /// The longest warm-up any configured column needs.
    pub fn max_lookback(&self) -> usize {
        let mut lookback = [
            self.rsi_period,
            self.macd_slow + self.macd_signal - 2,
            2 * self.adx_period,
            self.ema_fast.saturating_sub(1),
            self.ema_slow.saturating_sub(1),
            self.atr_period,
            self.bollinger_period.saturating_sub(1),
            self.roc_period,
            self.volatility_period,
            self.volume_sma_period.saturating_sub(1),
        ]
        .into_iter()
        .max()
        .unwrap_or(0);
        // A lagged one-bar return at offset k reaches back k + 1 closes.
        for &lag in &self.return_lags {
            lookback = lookback.max(lag + 1);
        }
        lookback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_lookback_dominated_by_slow_ema() {
        let cfg = FeatureConfig::default();
        assert_eq!(cfg.max_lookback(), 199);
    }

    #[test]
    fn lookback_tracks_largest_component() {
        let cfg = FeatureConfig {
            ema_slow: 10,
            ema_fast: 5,
            ..FeatureConfig::default()
        };
        // With the slow EMA shortened, MACD (26 + 9 - 2) dominates.
        assert_eq!(cfg.max_lookback(), 33);
    }

    #[test]
    fn toml_roundtrip_with_defaults() {
        let cfg: FeatureConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, FeatureConfig::default());
    }
}
