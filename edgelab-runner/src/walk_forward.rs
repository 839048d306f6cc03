//! Walk-forward window formation and out-of-sample training.
//!
//! The dataset is split into chronological train/test pairs. Fixed mode
//! slides a constant-size train window forward by `step`; expanding mode
//! grows the train window from the origin. Every test window starts
//! exactly where its train window ends, so no training row ever lies at
//! or after a bar being predicted. A fresh ensemble is fitted per window
//! and discarded afterwards — expanding mode grows the train slice, it
//! never reuses fitted state.

use crate::config::ModelConfig;
use edgelab_core::domain::PredictionRecord;
use edgelab_core::features::Dataset;
use edgelab_core::models::{
    EnsembleClassifier, EnsembleError, ForestConfig, KernelMachine, LogisticModel, ModelError,
    RandomForest,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ─── Configuration ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowMode {
    /// Constant-size train window sliding forward by `step`.
    Fixed,
    /// Train window anchored at the origin, growing by `step`.
    Expanding,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkForwardConfig {
    pub train_size: usize,
    pub test_size: usize,
    /// Samples the split advances between windows; must be >= test_size
    /// so test windows never overlap.
    pub step: usize,
    pub mode: WindowMode,
}

impl Default for WalkForwardConfig {
    fn default() -> Self {
        Self {
            train_size: 252,
            test_size: 63,
            step: 63,
            mode: WindowMode::Fixed,
        }
    }
}

impl WalkForwardConfig {
    pub fn validate(&self) -> Result<(), WalkForwardError> {
        if self.train_size == 0 || self.test_size == 0 || self.step == 0 {
            return Err(WalkForwardError::ZeroWindowSize {
                train: self.train_size,
                test: self.test_size,
                step: self.step,
            });
        }
        if self.step < self.test_size {
            return Err(WalkForwardError::OverlappingTestWindows {
                step: self.step,
                test_size: self.test_size,
            });
        }
        Ok(())
    }
}

// ─── Window formation ────────────────────────────────────────────────

/// One train/test pair, as index ranges into the dataset (end exclusive).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSpec {
    pub index: usize,
    pub train_start: usize,
    pub train_end: usize,
    /// Always equals `train_end`.
    pub test_start: usize,
    pub test_end: usize,
}

#[derive(Debug, Error, PartialEq)]
pub enum WalkForwardError {
    #[error("window sizes must be positive: train={train}, test={test}, step={step}")]
    ZeroWindowSize {
        train: usize,
        test: usize,
        step: usize,
    },

    #[error("step {step} is smaller than test size {test_size}: test windows would overlap")]
    OverlappingTestWindows { step: usize, test_size: usize },

    #[error("insufficient data: need at least {required} samples, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Ensemble(#[from] EnsembleError),
}

/// Lay out the train/test windows over `n_samples` rows.
///
/// The final window is clipped when fewer than `test_size` samples
/// remain, as long as at least one test sample exists.
pub fn build_windows(
    n_samples: usize,
    config: &WalkForwardConfig,
) -> Result<Vec<WindowSpec>, WalkForwardError> {
    config.validate()?;

    let required = config.train_size + 1;
    if n_samples < required {
        return Err(WalkForwardError::InsufficientData {
            required,
            actual: n_samples,
        });
    }

    let mut windows = Vec::new();
    let mut offset = 0;
    loop {
        let (train_start, train_end) = match config.mode {
            WindowMode::Fixed => (offset, offset + config.train_size),
            WindowMode::Expanding => (0, config.train_size + offset),
        };
        if train_end >= n_samples {
            break;
        }
        let test_end = (train_end + config.test_size).min(n_samples);
        windows.push(WindowSpec {
            index: windows.len(),
            train_start,
            train_end,
            test_start: train_end,
            test_end,
        });
        if test_end == n_samples {
            break;
        }
        offset += config.step;
    }

    if windows.is_empty() {
        return Err(WalkForwardError::InsufficientData {
            required,
            actual: n_samples,
        });
    }
    Ok(windows)
}

// ─── Training ────────────────────────────────────────────────────────

pub struct WalkForwardTrainer {
    config: WalkForwardConfig,
    models: ModelConfig,
    seed: u64,
}

/// Windows used plus every out-of-sample prediction, in bar order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalkForwardOutcome {
    pub windows: Vec<WindowSpec>,
    pub records: Vec<PredictionRecord>,
}

impl WalkForwardTrainer {
    pub fn new(config: WalkForwardConfig, models: ModelConfig, seed: u64) -> Self {
        Self {
            config,
            models,
            seed,
        }
    }

    /// Evaluate the dataset window by window. Windows run in parallel;
    /// the per-window forest seed derives from the run seed and window
    /// index, so results do not depend on scheduling.
    pub fn run(&self, dataset: &Dataset) -> Result<WalkForwardOutcome, WalkForwardError> {
        let windows = build_windows(dataset.len(), &self.config)?;

        let per_window: Vec<Vec<PredictionRecord>> = windows
            .par_iter()
            .map(|window| self.evaluate_window(dataset, window))
            .collect::<Result<_, _>>()?;

        Ok(WalkForwardOutcome {
            windows,
            records: per_window.into_iter().flatten().collect(),
        })
    }

    fn evaluate_window(
        &self,
        dataset: &Dataset,
        window: &WindowSpec,
    ) -> Result<Vec<PredictionRecord>, WalkForwardError> {
        let train = dataset.slice(window.train_start, window.train_end);
        let mut ensemble = self.fresh_ensemble(window.index)?;
        ensemble.fit(&train.samples, &train.labels)?;

        let mut records = Vec::with_capacity(window.test_end - window.test_start);
        for i in window.test_start..window.test_end {
            let prediction = ensemble.predict(&dataset.samples[i])?;
            records.push(PredictionRecord {
                timestamp: dataset.timestamps[i],
                base_probabilities: prediction.base_probabilities,
                ensemble_probability: prediction.probability,
                predicted: prediction.label,
                actual: Some(dataset.labels[i]),
            });
        }
        Ok(records)
    }

    fn fresh_ensemble(&self, window_index: usize) -> Result<EnsembleClassifier, EnsembleError> {
        let forest_config = ForestConfig {
            seed: self.seed.wrapping_add(window_index as u64),
            ..self.models.forest.clone()
        };
        EnsembleClassifier::new(
            vec![
                Box::new(RandomForest::new(forest_config)),
                Box::new(LogisticModel::new(self.models.logistic.clone())),
                Box::new(KernelMachine::new(self.models.kernel.clone())),
            ],
            self.models.weights.clone(),
        )
    }
}
