//! Base classifiers and the soft-voting ensemble.
//!
//! Three base models of deliberately different inductive bias — a
//! rule-partitioning forest, a linear-boundary logistic model, and an
//! RBF kernel machine — behind one `Classifier` trait. The ensemble
//! combines their `Up` probabilities by weighted arithmetic mean.
//!
//! All models consume a row-major feature matrix and `Label` targets and
//! emit a probability of `Up`. Fitting is destructive: a refit replaces
//! all learned state.

mod ensemble;
mod forest;
mod kernel;
mod logistic;
mod tree;

pub use ensemble::{EnsembleClassifier, EnsembleError, EnsemblePrediction};
pub use forest::{ForestConfig, RandomForest};
pub use kernel::{KernelConfig, KernelMachine};
pub use logistic::{LogisticConfig, LogisticModel};
pub use tree::{DecisionTree, TreeConfig};

use crate::domain::Label;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("model has not been fitted")]
    NotFitted,

    #[error("training set is empty")]
    EmptyTrainingSet,

    #[error("feature count mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("training matrix rows and labels differ: {rows} rows, {labels} labels")]
    LengthMismatch { rows: usize, labels: usize },
}

/// A binary direction classifier.
///
/// `predict_up` returns the probability of `Label::Up` in [0, 1] and
/// fails with `ModelError::NotFitted` before the first successful `fit`.
pub trait Classifier: Send + Sync {
    fn name(&self) -> &str;

    fn fit(&mut self, x: &[Vec<f64>], y: &[Label]) -> Result<(), ModelError>;

    fn predict_up(&self, features: &[f64]) -> Result<f64, ModelError>;
}

pub(crate) fn validate_training_set(x: &[Vec<f64>], y: &[Label]) -> Result<usize, ModelError> {
    if x.is_empty() {
        return Err(ModelError::EmptyTrainingSet);
    }
    if x.len() != y.len() {
        return Err(ModelError::LengthMismatch {
            rows: x.len(),
            labels: y.len(),
        });
    }
    let n_features = x[0].len();
    for row in x {
        if row.len() != n_features {
            return Err(ModelError::DimensionMismatch {
                expected: n_features,
                actual: row.len(),
            });
        }
    }
    Ok(n_features)
}

/// Column means and stddevs learned from a training matrix, applied to
/// later queries. Stddev is floored to keep constant columns harmless.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Standardizer {
    means: Vec<f64>,
    stds: Vec<f64>,
}

impl Standardizer {
    pub(crate) fn fit(x: &[Vec<f64>]) -> Self {
        let n = x.len() as f64;
        let n_features = x[0].len();
        let mut means = vec![0.0; n_features];
        for row in x {
            for (m, v) in means.iter_mut().zip(row) {
                *m += v;
            }
        }
        for m in &mut means {
            *m /= n;
        }
        let mut stds = vec![0.0; n_features];
        for row in x {
            for ((s, v), m) in stds.iter_mut().zip(row).zip(&means) {
                *s += (v - m) * (v - m);
            }
        }
        for s in &mut stds {
            *s = (*s / n).sqrt().max(1e-9);
        }
        Self { means, stds }
    }

    pub(crate) fn apply(&self, features: &[f64]) -> Vec<f64> {
        features
            .iter()
            .zip(&self.means)
            .zip(&self.stds)
            .map(|((v, m), s)| (v - m) / s)
            .collect()
    }

    pub(crate) fn n_features(&self) -> usize {
        self.means.len()
    }
}

/// Numerically stable logistic function.
pub(crate) fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sigmoid_is_symmetric_and_bounded() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-12);
        assert!(sigmoid(40.0) > 0.999);
        assert!(sigmoid(-40.0) < 0.001);
        assert!((sigmoid(2.0) + sigmoid(-2.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn standardizer_floors_constant_columns() {
        let x = vec![vec![3.0, 1.0], vec![3.0, 2.0], vec![3.0, 3.0]];
        let std = Standardizer::fit(&x);
        let z = std.apply(&[3.0, 2.0]);
        assert_eq!(z[0], 0.0);
        assert!(z[1].abs() < 1e-9);
    }

    #[test]
    fn ragged_matrix_is_rejected() {
        let x = vec![vec![1.0, 2.0], vec![1.0]];
        let y = vec![crate::domain::Label::Up, crate::domain::Label::Down];
        assert_eq!(
            validate_training_set(&x, &y),
            Err(ModelError::DimensionMismatch {
                expected: 2,
                actual: 1
            })
        );
    }
}
