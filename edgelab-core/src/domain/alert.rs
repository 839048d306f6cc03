//! AlertEvent — a statistically abnormal move in a derivatives metric.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Severity tier, a step function of |Z-score|.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    /// |z| crossed the building threshold (default 2.0).
    Building,
    /// |z| crossed the extreme threshold (default 3.0).
    Extreme,
}

/// Emitted by the anomaly detector when |Z-score| exceeds a configured
/// threshold. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    pub timestamp: NaiveDateTime,
    pub value: f64,
    pub rolling_mean: f64,
    pub rolling_std: f64,
    pub z_score: f64,
    pub severity: Severity,
}
