//! Rolling Z-score anomaly detection for derivatives-market metrics.
//!
//! The detector keeps the last `window` observations and scores each new
//! value against their mean and population stddev, so the current value
//! never contributes to its own baseline. The stddev is floored at 1e-9:
//! a flat window with a flat value scores z = 0 and stays silent, while
//! a flat window hit by a genuine spike scores far off scale and alerts.

use crate::domain::{AlertEvent, Severity};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use thiserror::Error;

const STD_FLOOR: f64 = 1e-9;

#[derive(Debug, Error, PartialEq)]
pub enum AnomalyError {
    #[error("window must be at least 2, got {0}")]
    InvalidWindow(usize),

    #[error("thresholds must satisfy 0 < building <= extreme, got {building} / {extreme}")]
    InvalidThresholds { building: f64, extreme: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyConfig {
    pub window: usize,
    pub building_threshold: f64,
    pub extreme_threshold: f64,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            window: 20,
            building_threshold: 2.0,
            extreme_threshold: 3.0,
        }
    }
}

impl AnomalyConfig {
    pub fn validate(&self) -> Result<(), AnomalyError> {
        if self.window < 2 {
            return Err(AnomalyError::InvalidWindow(self.window));
        }
        let ok = self.building_threshold.is_finite()
            && self.extreme_threshold.is_finite()
            && self.building_threshold > 0.0
            && self.extreme_threshold >= self.building_threshold;
        if !ok {
            return Err(AnomalyError::InvalidThresholds {
                building: self.building_threshold,
                extreme: self.extreme_threshold,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct AnomalyDetector {
    config: AnomalyConfig,
    history: VecDeque<f64>,
}

impl AnomalyDetector {
    pub fn new(config: AnomalyConfig) -> Result<Self, AnomalyError> {
        config.validate()?;
        let capacity = config.window;
        Ok(Self {
            config,
            history: VecDeque::with_capacity(capacity),
        })
    }

    /// Feed one observation. Returns an alert when the value's |z| against
    /// the trailing window crosses a threshold; always silent during the
    /// first `window` observations. Non-finite values are dropped without
    /// touching the baseline.
    pub fn observe(&mut self, timestamp: NaiveDateTime, value: f64) -> Option<AlertEvent> {
        if !value.is_finite() {
            return None;
        }

        let alert = if self.history.len() < self.config.window {
            None
        } else {
            let n = self.history.len() as f64;
            let mean = self.history.iter().sum::<f64>() / n;
            let var = self
                .history
                .iter()
                .map(|v| (v - mean) * (v - mean))
                .sum::<f64>()
                / n;
            let std = var.sqrt().max(STD_FLOOR);
            let z = (value - mean) / std;

            self.severity(z).map(|severity| AlertEvent {
                timestamp,
                value,
                rolling_mean: mean,
                rolling_std: std,
                z_score: z,
                severity,
            })
        };

        self.history.push_back(value);
        if self.history.len() > self.config.window {
            self.history.pop_front();
        }
        alert
    }

    /// Run the detector over a whole series at once.
    pub fn scan(&mut self, series: &[(NaiveDateTime, f64)]) -> Vec<AlertEvent> {
        series
            .iter()
            .filter_map(|&(ts, value)| self.observe(ts, value))
            .collect()
    }

    fn severity(&self, z: f64) -> Option<Severity> {
        let magnitude = z.abs();
        if magnitude >= self.config.extreme_threshold {
            Some(Severity::Extreme)
        } else if magnitude >= self.config.building_threshold {
            Some(Severity::Building)
        } else {
            None
        }
    }
}
