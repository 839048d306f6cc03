//! PredictionRecord — one out-of-sample prediction from a test window.

use super::Label;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Out-of-sample prediction for a single test-window bar.
///
/// Created once per test bar during walk-forward evaluation and immutable
/// after creation. `base_probabilities` holds each base classifier's
/// probability of `Up`, in ensemble member order; `ensemble_probability`
/// is their (weighted) soft-voting mean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub timestamp: NaiveDateTime,
    pub base_probabilities: Vec<f64>,
    pub ensemble_probability: f64,
    pub predicted: Label,
    /// Realized label, filled in at creation when the forward bar exists.
    pub actual: Option<Label>,
}

impl PredictionRecord {
    /// True when the prediction matched the realized direction.
    /// None when the realized label is unknown.
    pub fn is_correct(&self) -> Option<bool> {
        self.actual.map(|a| a == self.predicted)
    }
}
