//! Dataset — aligned feature matrix, labels, and timestamps.

use super::FeatureSet;
use crate::domain::Label;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A supervised learning dataset: one sample per labeled feature row.
///
/// Rows are in bar order; `timestamps[i]` is the bar the features of
/// `samples[i]` were computed at, and `labels[i]` encodes that bar's
/// realized forward return. Windows for walk-forward evaluation are
/// contiguous index ranges over this structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub feature_names: Vec<String>,
    pub timestamps: Vec<NaiveDateTime>,
    pub samples: Vec<Vec<f64>>,
    pub labels: Vec<Label>,
}

impl Dataset {
    /// Zip feature rows with per-bar labels, keeping only rows whose
    /// forward label is known. `labels` is indexed by source bar, the
    /// same indexing `FeatureSet::first_bar` refers to.
    pub fn assemble(set: &FeatureSet, labels: &[Option<Label>]) -> Self {
        let mut timestamps = Vec::new();
        let mut samples = Vec::new();
        let mut kept_labels = Vec::new();

        for (i, row) in set.rows.iter().enumerate() {
            let bar_index = set.first_bar + i;
            if let Some(Some(label)) = labels.get(bar_index) {
                timestamps.push(row.timestamp);
                samples.push(row.values.clone());
                kept_labels.push(*label);
            }
        }

        Self {
            feature_names: set.names.clone(),
            timestamps,
            samples,
            labels: kept_labels,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    /// Clone out the contiguous range `[start, end)`.
    pub fn slice(&self, start: usize, end: usize) -> Self {
        Self {
            feature_names: self.feature_names.clone(),
            timestamps: self.timestamps[start..end].to_vec(),
            samples: self.samples[start..end].to_vec(),
            labels: self.labels[start..end].to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FeatureVector;
    use chrono::NaiveDate;

    fn toy_set(n: usize, first_bar: usize) -> FeatureSet {
        let start = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        FeatureSet {
            names: vec!["a".into(), "b".into()],
            rows: (0..n)
                .map(|i| FeatureVector {
                    timestamp: start + chrono::Duration::hours((first_bar + i) as i64),
                    values: vec![i as f64, -(i as f64)],
                })
                .collect(),
            first_bar,
        }
    }

    #[test]
    fn assemble_drops_unlabeled_rows() {
        let set = toy_set(4, 2);
        // Bars 0..6; bars 2..=4 labeled, bar 5 (last) unlabeled.
        let labels = vec![
            Some(Label::Up),
            Some(Label::Down),
            Some(Label::Up),
            Some(Label::Down),
            Some(Label::Up),
            None,
        ];
        let ds = Dataset::assemble(&set, &labels);
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.labels, vec![Label::Up, Label::Down, Label::Up]);
        assert_eq!(ds.samples[0], vec![0.0, 0.0]);
    }

    #[test]
    fn slice_is_contiguous_range() {
        let set = toy_set(5, 0);
        let labels = vec![Some(Label::Up); 5];
        let ds = Dataset::assemble(&set, &labels);
        let window = ds.slice(1, 4);
        assert_eq!(window.len(), 3);
        assert_eq!(window.samples[0], ds.samples[1]);
        assert_eq!(window.timestamps[2], ds.timestamps[3]);
    }
}
