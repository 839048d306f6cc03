//! Logistic regression on standardized features.
//!
//! Columns are z-scored with statistics learned from the training
//! window only, then weights train by batch gradient descent on log-loss
//! with L2 shrinkage. Training stops early once the loss change falls
//! below the tolerance.

use super::{sigmoid, validate_training_set, Classifier, ModelError, Standardizer};
use crate::domain::Label;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogisticConfig {
    pub learning_rate: f64,
    pub max_epochs: usize,
    pub l2: f64,
    pub tolerance: f64,
}

impl Default for LogisticConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            max_epochs: 500,
            l2: 1e-3,
            tolerance: 1e-7,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogisticModel {
    config: LogisticConfig,
    fitted: Option<Fitted>,
}

#[derive(Debug, Clone)]
struct Fitted {
    standardizer: Standardizer,
    weights: Vec<f64>,
    bias: f64,
}

impl LogisticModel {
    pub fn new(config: LogisticConfig) -> Self {
        Self {
            config,
            fitted: None,
        }
    }
}

impl Classifier for LogisticModel {
    fn name(&self) -> &str {
        "logistic"
    }

    fn fit(&mut self, x: &[Vec<f64>], y: &[Label]) -> Result<(), ModelError> {
        let n_features = validate_training_set(x, y)?;
        let n = x.len() as f64;

        let standardizer = Standardizer::fit(x);
        let z: Vec<Vec<f64>> = x.iter().map(|row| standardizer.apply(row)).collect();
        let targets: Vec<f64> = y.iter().map(|l| l.as_f64()).collect();

        let mut weights = vec![0.0; n_features];
        let mut bias = 0.0;
        let mut prev_loss = f64::INFINITY;

        for _ in 0..self.config.max_epochs {
            let probs: Vec<f64> = z
                .iter()
                .map(|row| {
                    let lin: f64 =
                        row.iter().zip(&weights).map(|(v, w)| v * w).sum::<f64>() + bias;
                    sigmoid(lin)
                })
                .collect();

            let mut grad_w = vec![0.0; n_features];
            let mut grad_b = 0.0;
            for (row, (&p, &t)) in z.iter().zip(probs.iter().zip(&targets)) {
                let err = p - t;
                for (g, v) in grad_w.iter_mut().zip(row) {
                    *g += err * v;
                }
                grad_b += err;
            }
            for (g, w) in grad_w.iter_mut().zip(&weights) {
                *g = *g / n + self.config.l2 * w;
            }
            grad_b /= n;

            for (w, g) in weights.iter_mut().zip(&grad_w) {
                *w -= self.config.learning_rate * g;
            }
            bias -= self.config.learning_rate * grad_b;

            let loss = log_loss(&targets, &probs);
            if (prev_loss - loss).abs() < self.config.tolerance {
                break;
            }
            prev_loss = loss;
        }

        self.fitted = Some(Fitted {
            standardizer,
            weights,
            bias,
        });
        Ok(())
    }

    fn predict_up(&self, features: &[f64]) -> Result<f64, ModelError> {
        let fitted = self.fitted.as_ref().ok_or(ModelError::NotFitted)?;
        if features.len() != fitted.standardizer.n_features() {
            return Err(ModelError::DimensionMismatch {
                expected: fitted.standardizer.n_features(),
                actual: features.len(),
            });
        }
        let z = fitted.standardizer.apply(features);
        let lin: f64 = z.iter().zip(&fitted.weights).map(|(v, w)| v * w).sum::<f64>() + fitted.bias;
        Ok(sigmoid(lin))
    }
}

fn log_loss(targets: &[f64], probs: &[f64]) -> f64 {
    let eps = 1e-15;
    let n = targets.len() as f64;
    -targets
        .iter()
        .zip(probs)
        .map(|(&t, &p)| {
            let p = p.clamp(eps, 1.0 - eps);
            t * p.ln() + (1.0 - t) * (1.0 - p).ln()
        })
        .sum::<f64>()
        / n
}
