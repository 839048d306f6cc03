//! RBF kernel machine with dual hinge-loss training.
//!
//! Samples are standardized, then per-sample dual coefficients train by
//! cycling the window: whenever a sample sits inside the margin, its
//! coefficient grows (capped at `alpha_cap`) and the bias shifts toward
//! its side. Prediction evaluates the kernel expansion over the retained
//! support samples and squashes the decision value through a sigmoid to
//! yield a probability. Fully deterministic.

use super::{sigmoid, validate_training_set, Classifier, ModelError, Standardizer};
use crate::domain::Label;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// RBF width; `None` means 1 / n_features.
    pub gamma: Option<f64>,
    pub learning_rate: f64,
    pub epochs: usize,
    /// Upper bound on each dual coefficient.
    pub alpha_cap: f64,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            gamma: None,
            learning_rate: 0.1,
            epochs: 20,
            alpha_cap: 1.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct KernelMachine {
    config: KernelConfig,
    fitted: Option<Fitted>,
}

#[derive(Debug, Clone)]
struct Fitted {
    standardizer: Standardizer,
    support: Vec<Vec<f64>>,
    /// Signed targets (+1 Up, -1 Down) scaled by the dual coefficients.
    signed_alphas: Vec<f64>,
    bias: f64,
    gamma: f64,
}

impl KernelMachine {
    pub fn new(config: KernelConfig) -> Self {
        Self {
            config,
            fitted: None,
        }
    }
}

fn rbf(a: &[f64], b: &[f64], gamma: f64) -> f64 {
    let dist2: f64 = a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum();
    (-gamma * dist2).exp()
}

impl Classifier for KernelMachine {
    fn name(&self) -> &str {
        "kernel_machine"
    }

    fn fit(&mut self, x: &[Vec<f64>], y: &[Label]) -> Result<(), ModelError> {
        let n_features = validate_training_set(x, y)?;
        let n = x.len();
        let gamma = self.config.gamma.unwrap_or(1.0 / n_features as f64);

        let standardizer = Standardizer::fit(x);
        let z: Vec<Vec<f64>> = x.iter().map(|row| standardizer.apply(row)).collect();
        let targets: Vec<f64> = y
            .iter()
            .map(|l| if l.is_up() { 1.0 } else { -1.0 })
            .collect();

        // Gram matrix once; the epochs only touch alphas and bias.
        let mut gram = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in i..n {
                let k = rbf(&z[i], &z[j], gamma);
                gram[i][j] = k;
                gram[j][i] = k;
            }
        }

        let lr = self.config.learning_rate;
        let mut alphas = vec![0.0; n];
        let mut bias = 0.0;

        for _ in 0..self.config.epochs {
            for i in 0..n {
                let decision: f64 = (0..n)
                    .map(|j| alphas[j] * targets[j] * gram[j][i])
                    .sum::<f64>()
                    + bias;
                if targets[i] * decision < 1.0 {
                    alphas[i] = (alphas[i] + lr).min(self.config.alpha_cap);
                    bias += lr * targets[i];
                }
            }
        }

        // Keep only samples that earned a coefficient.
        let mut support = Vec::new();
        let mut signed_alphas = Vec::new();
        for i in 0..n {
            if alphas[i] > 0.0 {
                support.push(z[i].clone());
                signed_alphas.push(alphas[i] * targets[i]);
            }
        }

        self.fitted = Some(Fitted {
            standardizer,
            support,
            signed_alphas,
            bias,
            gamma,
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
        let decision: f64 = fitted
            .support
            .iter()
            .zip(&fitted.signed_alphas)
            .map(|(s, &a)| a * rbf(s, &z, fitted.gamma))
            .sum::<f64>()
            + fitted.bias;
        Ok(sigmoid(decision))
    }
}
