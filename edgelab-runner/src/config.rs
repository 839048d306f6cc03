//! Serializable run configuration with a content-addressed run id.

use crate::walk_forward::{WalkForwardConfig, WalkForwardError};
use edgelab_core::backtest::{BacktestConfig, BacktestError};
use edgelab_core::features::FeatureConfig;
use edgelab_core::models::{ForestConfig, KernelConfig, LogisticConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Content-addressed identifier of a run configuration.
pub type RunId = String;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("signal threshold must be in (0, 1), got {0}")]
    InvalidSignalThreshold(f64),

    #[error("label horizon must be at least 1")]
    InvalidHorizon,

    #[error("ensemble weights must be three finite positive values")]
    InvalidWeights,

    #[error(transparent)]
    WalkForward(#[from] WalkForwardError),

    #[error(transparent)]
    Backtest(#[from] BacktestError),

    #[error("configuration file is not valid TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Hyperparameters of the three base classifiers plus optional voting
/// weights (member order: forest, logistic, kernel).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub forest: ForestConfig,
    pub logistic: LogisticConfig,
    pub kernel: KernelConfig,
    pub weights: Option<Vec<f64>>,
}

/// Everything needed to reproduce one pipeline run.
///
/// Two runs with equal configs share a `run_id`, so reports can be
/// matched to the exact parameters that produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub feature: FeatureConfig,
    pub walk_forward: WalkForwardConfig,
    pub models: ModelConfig,
    /// Ensemble probability must strictly exceed this for an Up signal.
    pub signal_threshold: f64,
    pub backtest: BacktestConfig,
    pub seed: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            feature: FeatureConfig::default(),
            walk_forward: WalkForwardConfig::default(),
            models: ModelConfig::default(),
            signal_threshold: 0.5,
            backtest: BacktestConfig::default(),
            seed: 42,
        }
    }
}

impl RunConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.signal_threshold > 0.0 && self.signal_threshold < 1.0) {
            return Err(ConfigError::InvalidSignalThreshold(self.signal_threshold));
        }
        if self.feature.label_horizon == 0 {
            return Err(ConfigError::InvalidHorizon);
        }
        if let Some(weights) = &self.models.weights {
            if weights.len() != 3 || weights.iter().any(|w| !w.is_finite() || *w <= 0.0) {
                return Err(ConfigError::InvalidWeights);
            }
        }
        self.walk_forward.validate()?;
        self.backtest.validate()?;
        Ok(())
    }

    /// Deterministic blake3 hash of the canonical JSON encoding.
    pub fn run_id(&self) -> RunId {
        let json = serde_json::to_string(self).expect("RunConfig serializes");
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}
