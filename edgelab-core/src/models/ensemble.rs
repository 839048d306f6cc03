//! Soft-voting ensemble over three base classifiers.

use super::{Classifier, ModelError};
use crate::domain::Label;
use rayon::prelude::*;
use thiserror::Error;

/// Number of base classifiers the ensemble is built around.
pub const ENSEMBLE_SIZE: usize = 3;

#[derive(Debug, Error, PartialEq)]
pub enum EnsembleError {
    #[error("ensemble requires exactly {ENSEMBLE_SIZE} base classifiers, got {0}")]
    WrongMemberCount(usize),

    #[error("weight count {weights} does not match member count {members}")]
    WeightCountMismatch { weights: usize, members: usize },

    #[error("ensemble weights must be finite and positive")]
    InvalidWeights,
}

/// One ensemble query: per-member probabilities plus the combined vote.
#[derive(Debug, Clone, PartialEq)]
pub struct EnsemblePrediction {
    /// Probability of `Up` from each member, in member order.
    pub base_probabilities: Vec<f64>,
    /// Weighted arithmetic mean of the base probabilities.
    pub probability: f64,
    /// `Up` iff `probability` strictly exceeds 0.5.
    pub label: Label,
}

pub struct EnsembleClassifier {
    members: Vec<Box<dyn Classifier>>,
    weights: Vec<f64>,
}

impl std::fmt::Debug for EnsembleClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnsembleClassifier")
            .field(
                "members",
                &self.members.iter().map(|m| m.name()).collect::<Vec<_>>(),
            )
            .field("weights", &self.weights)
            .finish()
    }
}

impl EnsembleClassifier {
    /// Build the ensemble. `weights` defaults to equal weighting; when
    /// given it must carry one finite positive weight per member.
    pub fn new(
        members: Vec<Box<dyn Classifier>>,
        weights: Option<Vec<f64>>,
    ) -> Result<Self, EnsembleError> {
        if members.len() != ENSEMBLE_SIZE {
            return Err(EnsembleError::WrongMemberCount(members.len()));
        }
        let weights = match weights {
            Some(w) => {
                if w.len() != members.len() {
                    return Err(EnsembleError::WeightCountMismatch {
                        weights: w.len(),
                        members: members.len(),
                    });
                }
                if w.iter().any(|v| !v.is_finite() || *v <= 0.0) {
                    return Err(EnsembleError::InvalidWeights);
                }
                w
            }
            None => vec![1.0; members.len()],
        };
        Ok(Self { members, weights })
    }

    pub fn member_names(&self) -> Vec<&str> {
        self.members.iter().map(|m| m.name()).collect()
    }

    /// Fit every member on the same window, in parallel. Fails on the
    /// first member error; members are refit from scratch on every call.
    pub fn fit(&mut self, x: &[Vec<f64>], y: &[Label]) -> Result<(), ModelError> {
        self.members
            .par_iter_mut()
            .map(|member| member.fit(x, y))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(())
    }

    /// Combined probability of `Up` for one feature row.
    pub fn predict_up(&self, features: &[f64]) -> Result<f64, ModelError> {
        Ok(self.predict(features)?.probability)
    }

    pub fn predict(&self, features: &[f64]) -> Result<EnsemblePrediction, ModelError> {
        let mut base_probabilities = Vec::with_capacity(self.members.len());
        for member in &self.members {
            base_probabilities.push(member.predict_up(features)?);
        }

        let weight_sum: f64 = self.weights.iter().sum();
        let probability = base_probabilities
            .iter()
            .zip(&self.weights)
            .map(|(p, w)| p * w)
            .sum::<f64>()
            / weight_sum;

        let label = if probability > 0.5 {
            Label::Up
        } else {
            Label::Down
        };

        Ok(EnsemblePrediction {
            base_probabilities,
            probability,
            label,
        })
    }
}
