//! Classification and strategy performance metrics.
//!
//! Pure functions over prediction records, equity curves, and trade
//! ledgers. Degenerate inputs (no predictions, empty denominators, zero
//! return variance) report 0.0 rather than NaN so downstream reports
//! stay serializable.

use edgelab_core::domain::{PredictionRecord, Trade};
use serde::{Deserialize, Serialize};

/// Bars per year used to annualize the Sharpe ratio (daily bars).
const PERIODS_PER_YEAR: f64 = 252.0;

/// Cap applied to the profit factor when no trade ever lost.
const PROFIT_FACTOR_CAP: f64 = 1000.0;

// ─── Classification ──────────────────────────────────────────────────

/// Up/Down confusion counts over records with a known realized label.
/// `Up` is the positive class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub true_positives: usize,
    pub true_negatives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
}

impl ConfusionMatrix {
    pub fn from_records(records: &[PredictionRecord]) -> Self {
        let mut matrix = Self::default();
        for record in records {
            let Some(actual) = record.actual else {
                continue;
            };
            match (record.predicted.is_up(), actual.is_up()) {
                (true, true) => matrix.true_positives += 1,
                (false, false) => matrix.true_negatives += 1,
                (true, false) => matrix.false_positives += 1,
                (false, true) => matrix.false_negatives += 1,
            }
        }
        matrix
    }

    pub fn total(&self) -> usize {
        self.true_positives + self.true_negatives + self.false_positives + self.false_negatives
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.true_positives + self.true_negatives, self.total())
    }

    pub fn precision(&self) -> f64 {
        ratio(
            self.true_positives,
            self.true_positives + self.false_positives,
        )
    }

    pub fn recall(&self) -> f64 {
        ratio(
            self.true_positives,
            self.true_positives + self.false_negatives,
        )
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

// ─── Strategy ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyMetrics {
    /// Final equity minus 1.0.
    pub total_return: f64,
    /// Worst peak-to-trough equity decline; always <= 0.
    pub max_drawdown: f64,
    /// Annualized mean/std of per-bar equity returns; 0 on zero variance.
    pub sharpe: f64,
    pub win_rate: f64,
    pub profit_factor: f64,
    pub trade_count: usize,
}

impl StrategyMetrics {
    pub fn compute(equity_curve: &[f64], trades: &[Trade]) -> Self {
        Self {
            total_return: equity_curve.last().map_or(0.0, |e| e - 1.0),
            max_drawdown: max_drawdown(equity_curve),
            sharpe: annualized_sharpe(equity_curve),
            win_rate: win_rate(trades),
            profit_factor: profit_factor(trades),
            trade_count: trades.len(),
        }
    }
}

fn max_drawdown(equity_curve: &[f64]) -> f64 {
    let mut peak = f64::MIN;
    let mut worst = 0.0_f64;
    for &equity in equity_curve {
        peak = peak.max(equity);
        if peak > 0.0 {
            worst = worst.min(equity / peak - 1.0);
        }
    }
    worst
}

fn annualized_sharpe(equity_curve: &[f64]) -> f64 {
    if equity_curve.len() < 2 {
        return 0.0;
    }
    let returns: Vec<f64> = equity_curve
        .windows(2)
        .map(|pair| {
            if pair[0] == 0.0 {
                0.0
            } else {
                pair[1] / pair[0] - 1.0
            }
        })
        .collect();
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let var = returns.iter().map(|r| (r - mean) * (r - mean)).sum::<f64>() / n;
    let std = var.sqrt();
    if std == 0.0 {
        0.0
    } else {
        mean / std * PERIODS_PER_YEAR.sqrt()
    }
}

fn win_rate(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    trades.iter().filter(|t| t.is_winner()).count() as f64 / trades.len() as f64
}

fn profit_factor(trades: &[Trade]) -> f64 {
    let gross_profit: f64 = trades
        .iter()
        .filter(|t| t.return_pct > 0.0)
        .map(|t| t.return_pct)
        .sum();
    let gross_loss: f64 = trades
        .iter()
        .filter(|t| t.return_pct < 0.0)
        .map(|t| -t.return_pct)
        .sum();

    if gross_loss == 0.0 {
        if gross_profit > 0.0 {
            PROFIT_FACTOR_CAP
        } else {
            0.0
        }
    } else {
        (gross_profit / gross_loss).min(PROFIT_FACTOR_CAP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use edgelab_core::domain::{Label, PositionSide};

    fn record(predicted: Label, actual: Option<Label>) -> PredictionRecord {
        PredictionRecord {
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 2)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            base_probabilities: vec![0.5, 0.5, 0.5],
            ensemble_probability: 0.5,
            predicted,
            actual,
        }
    }

    fn trade(return_pct: f64) -> Trade {
        let ts = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        Trade {
            side: PositionSide::Long,
            entry_index: 0,
            entry_timestamp: ts,
            entry_price: 100.0,
            exit_index: 1,
            exit_timestamp: ts,
            exit_price: 100.0 * (1.0 + return_pct),
            return_pct,
            bars_held: 1,
        }
    }

    #[test]
    fn confusion_counts_and_rates() {
        let records = vec![
            record(Label::Up, Some(Label::Up)),
            record(Label::Up, Some(Label::Up)),
            record(Label::Up, Some(Label::Down)),
            record(Label::Down, Some(Label::Down)),
            record(Label::Down, Some(Label::Up)),
            record(Label::Up, None), // no realized label, ignored
        ];
        let matrix = ConfusionMatrix::from_records(&records);
        assert_eq!(matrix.true_positives, 2);
        assert_eq!(matrix.false_positives, 1);
        assert_eq!(matrix.true_negatives, 1);
        assert_eq!(matrix.false_negatives, 1);
        assert_eq!(matrix.total(), 5);
        assert!((matrix.accuracy() - 0.6).abs() < 1e-12);
        assert!((matrix.precision() - 2.0 / 3.0).abs() < 1e-12);
        assert!((matrix.recall() - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn empty_records_give_zero_rates() {
        let matrix = ConfusionMatrix::from_records(&[]);
        assert_eq!(matrix.accuracy(), 0.0);
        assert_eq!(matrix.precision(), 0.0);
        assert_eq!(matrix.recall(), 0.0);
    }

    #[test]
    fn drawdown_is_peak_to_trough() {
        let curve = vec![1.0, 1.2, 0.9, 1.1, 1.3];
        let metrics = StrategyMetrics::compute(&curve, &[]);
        // Trough 0.9 against peak 1.2.
        assert!((metrics.max_drawdown - (0.9 / 1.2 - 1.0)).abs() < 1e-12);
        assert!((metrics.total_return - 0.3).abs() < 1e-12);
    }

    #[test]
    fn monotonic_curve_has_zero_drawdown() {
        let curve: Vec<f64> = (0..50).map(|i| 1.0 + i as f64 * 0.01).collect();
        let metrics = StrategyMetrics::compute(&curve, &[]);
        assert_eq!(metrics.max_drawdown, 0.0);
        assert!(metrics.sharpe > 0.0);
    }

    #[test]
    fn flat_curve_has_zero_sharpe() {
        let curve = vec![1.0; 30];
        assert_eq!(StrategyMetrics::compute(&curve, &[]).sharpe, 0.0);
    }

    #[test]
    fn trade_statistics() {
        let trades = vec![trade(0.10), trade(-0.05), trade(0.02), trade(-0.01)];
        let metrics = StrategyMetrics::compute(&[1.0], &trades);
        assert_eq!(metrics.trade_count, 4);
        assert!((metrics.win_rate - 0.5).abs() < 1e-12);
        assert!((metrics.profit_factor - 0.12 / 0.06).abs() < 1e-9);
    }

    #[test]
    fn all_winning_trades_cap_profit_factor() {
        let trades = vec![trade(0.05), trade(0.03)];
        let metrics = StrategyMetrics::compute(&[1.0], &trades);
        assert_eq!(metrics.profit_factor, 1000.0);
        assert_eq!(metrics.win_rate, 1.0);
    }
}
