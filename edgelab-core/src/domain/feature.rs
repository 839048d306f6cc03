//! FeatureVector — one row of the feature matrix.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A fixed-width numeric feature row for a single bar.
///
/// Column names live on the owning `FeatureSet` / `Dataset`, not on each
/// row; every row in one build shares the same schema. No value in a row
/// may be derived from bars later than `timestamp` (warm-up rows are
/// dropped at build time rather than padded).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub timestamp: NaiveDateTime,
    pub values: Vec<f64>,
}

impl FeatureVector {
    pub fn is_finite(&self) -> bool {
        self.values.iter().all(|v| v.is_finite())
    }
}
