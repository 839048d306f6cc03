//! Random forest: bagged gini trees with feature subsampling.
//!
//! Each tree trains on a bootstrap resample of the window, built in
//! parallel with per-tree seeds derived from the forest seed so runs are
//! reproducible regardless of thread scheduling. The forest probability
//! is the mean of the trees' leaf probabilities.

use super::tree::{DecisionTree, TreeConfig};
use super::{validate_training_set, Classifier, ModelError};
use crate::domain::Label;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    pub n_trees: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features per split; `None` means sqrt(n_features).
    pub max_features: Option<usize>,
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 50,
            max_depth: 6,
            min_samples_split: 4,
            min_samples_leaf: 2,
            max_features: None,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RandomForest {
    config: ForestConfig,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn new(config: ForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
        }
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Classifier for RandomForest {
    fn name(&self) -> &str {
        "random_forest"
    }

    fn fit(&mut self, x: &[Vec<f64>], y: &[Label]) -> Result<(), ModelError> {
        let n_features = validate_training_set(x, y)?;
        let n = x.len();
        let max_features = self
            .config
            .max_features
            .unwrap_or_else(|| (n_features as f64).sqrt().ceil() as usize)
            .clamp(1, n_features);

        let tree_config = TreeConfig {
            max_depth: self.config.max_depth,
            min_samples_split: self.config.min_samples_split,
            min_samples_leaf: self.config.min_samples_leaf,
            max_features: Some(max_features),
        };

        self.trees = (0..self.config.n_trees)
            .into_par_iter()
            .map(|t| {
                let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed.wrapping_add(t as u64));

                // Bootstrap resample of the training window.
                let mut bx = Vec::with_capacity(n);
                let mut by = Vec::with_capacity(n);
                for _ in 0..n {
                    let i = rng.gen_range(0..n);
                    bx.push(x[i].clone());
                    by.push(y[i]);
                }

                let mut tree = DecisionTree::new(tree_config.clone());
                tree.fit(&bx, &by, &mut rng)?;
                Ok(tree)
            })
            .collect::<Result<Vec<_>, ModelError>>()?;

        Ok(())
    }

    fn predict_up(&self, features: &[f64]) -> Result<f64, ModelError> {
        if self.trees.is_empty() {
            return Err(ModelError::NotFitted);
        }
        let mut sum = 0.0;
        for tree in &self.trees {
            sum += tree.predict_up(features)?;
        }
        Ok(sum / self.trees.len() as f64)
    }
}
