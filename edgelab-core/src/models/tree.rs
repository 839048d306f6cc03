//! Binary classification tree on gini impurity.
//!
//! Grown greedily: at each node the best (feature, threshold) pair by
//! impurity reduction splits the samples, until depth, sample-count, or
//! purity stops growth. Leaves hold the fraction of `Up` samples, which
//! is the tree's probability output. Feature subsampling per split makes
//! trees decorrelate inside a forest.

use super::{validate_training_set, ModelError};
use crate::domain::Label;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features considered per split; `None` means all.
    pub max_features: Option<usize>,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 6,
            min_samples_split: 4,
            min_samples_leaf: 2,
            max_features: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum Node {
    Leaf {
        p_up: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    config: TreeConfig,
    root: Option<Node>,
    n_features: usize,
}

impl DecisionTree {
    pub fn new(config: TreeConfig) -> Self {
        Self {
            config,
            root: None,
            n_features: 0,
        }
    }

    /// Grow the tree. The RNG drives per-split feature subsampling; the
    /// forest passes a per-tree seeded RNG for reproducibility.
    pub fn fit(
        &mut self,
        x: &[Vec<f64>],
        y: &[Label],
        rng: &mut ChaCha8Rng,
    ) -> Result<(), ModelError> {
        self.n_features = validate_training_set(x, y)?;
        let indices: Vec<usize> = (0..x.len()).collect();
        self.root = Some(self.grow(x, y, &indices, 0, rng));
        Ok(())
    }

    pub fn predict_up(&self, features: &[f64]) -> Result<f64, ModelError> {
        let mut node = self.root.as_ref().ok_or(ModelError::NotFitted)?;
        if features.len() != self.n_features {
            return Err(ModelError::DimensionMismatch {
                expected: self.n_features,
                actual: features.len(),
            });
        }
        loop {
            match node {
                Node::Leaf { p_up } => return Ok(*p_up),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if features[*feature] <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }

    fn grow(
        &self,
        x: &[Vec<f64>],
        y: &[Label],
        indices: &[usize],
        depth: usize,
        rng: &mut ChaCha8Rng,
    ) -> Node {
        let p_up = up_fraction(y, indices);
        let impurity = gini(p_up);

        if depth >= self.config.max_depth
            || indices.len() < self.config.min_samples_split
            || impurity < 1e-10
        {
            return Node::Leaf { p_up };
        }

        match self.best_split(x, y, indices, impurity, rng) {
            Some((feature, threshold, left_idx, right_idx)) => {
                let left = self.grow(x, y, &left_idx, depth + 1, rng);
                let right = self.grow(x, y, &right_idx, depth + 1, rng);
                Node::Split {
                    feature,
                    threshold,
                    left: Box::new(left),
                    right: Box::new(right),
                }
            }
            None => Node::Leaf { p_up },
        }
    }

    #[allow(clippy::type_complexity)]
    fn best_split(
        &self,
        x: &[Vec<f64>],
        y: &[Label],
        indices: &[usize],
        parent_impurity: f64,
        rng: &mut ChaCha8Rng,
    ) -> Option<(usize, f64, Vec<usize>, Vec<usize>)> {
        let n_features = x[0].len();
        let considered = self.config.max_features.unwrap_or(n_features).min(n_features);

        let mut candidates: Vec<usize> = (0..n_features).collect();
        candidates.shuffle(rng);
        candidates.truncate(considered);

        let mut best_gain = 0.0;
        let mut best: Option<(usize, f64, Vec<usize>, Vec<usize>)> = None;

        for &feature in &candidates {
            let mut values: Vec<f64> = indices.iter().map(|&i| x[i][feature]).collect();
            values.sort_by(f64::total_cmp);
            values.dedup();

            for pair in values.windows(2) {
                let threshold = (pair[0] + pair[1]) / 2.0;
                let (left, right): (Vec<usize>, Vec<usize>) =
                    indices.iter().partition(|&&i| x[i][feature] <= threshold);
                if left.len() < self.config.min_samples_leaf
                    || right.len() < self.config.min_samples_leaf
                {
                    continue;
                }

                let n = indices.len() as f64;
                let weighted = left.len() as f64 / n * gini(up_fraction(y, &left))
                    + right.len() as f64 / n * gini(up_fraction(y, &right));
                let gain = parent_impurity - weighted;
                if gain > best_gain {
                    best_gain = gain;
                    best = Some((feature, threshold, left, right));
                }
            }
        }

        best
    }
}

fn up_fraction(y: &[Label], indices: &[usize]) -> f64 {
    if indices.is_empty() {
        return 0.5;
    }
    let ups = indices.iter().filter(|&&i| y[i].is_up()).count();
    ups as f64 / indices.len() as f64
}

fn gini(p: f64) -> f64 {
    2.0 * p * (1.0 - p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_data::separable_clusters;
    use rand::SeedableRng;

    #[test]
    fn unfitted_tree_errors() {
        let tree = DecisionTree::new(TreeConfig::default());
        assert_eq!(tree.predict_up(&[1.0, 2.0]), Err(ModelError::NotFitted));
    }

    #[test]
    fn tree_separates_clusters() {
        let (x, y) = separable_clusters(30);
        let mut tree = DecisionTree::new(TreeConfig::default());
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        tree.fit(&x, &y, &mut rng).unwrap();

        assert!(tree.predict_up(&[0.4, 0.4]).unwrap() < 0.5);
        assert!(tree.predict_up(&[5.1, 5.0]).unwrap() > 0.5);
    }

    #[test]
    fn pure_node_yields_extreme_probability() {
        let x = vec![vec![0.0], vec![1.0], vec![2.0], vec![3.0]];
        let y = vec![Label::Down, Label::Down, Label::Up, Label::Up];
        let mut tree = DecisionTree::new(TreeConfig {
            min_samples_split: 2,
            min_samples_leaf: 1,
            ..TreeConfig::default()
        });
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        tree.fit(&x, &y, &mut rng).unwrap();
        assert_eq!(tree.predict_up(&[0.5]).unwrap(), 0.0);
        assert_eq!(tree.predict_up(&[2.5]).unwrap(), 1.0);
    }

    #[test]
    fn dimension_mismatch_on_predict() {
        let (x, y) = separable_clusters(10);
        let mut tree = DecisionTree::new(TreeConfig::default());
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        tree.fit(&x, &y, &mut rng).unwrap();
        assert_eq!(
            tree.predict_up(&[1.0]),
            Err(ModelError::DimensionMismatch {
                expected: 2,
                actual: 1
            })
        );
    }
}
