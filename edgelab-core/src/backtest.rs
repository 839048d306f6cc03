//! Deterministic signal-driven backtest simulator.
//!
//! A signal emitted at bar *t* takes effect at bar *t+1*'s open, so no
//! fill ever uses information from its own bar. The book holds at most
//! one position of one unit of notional; long/flat by default, long/short
//! when configured. Any position still open at the end of the series is
//! closed at the final close.

use crate::domain::{Bar, Label, Position, PositionSide, PredictionRecord, Trade};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum BacktestError {
    #[error("per-trade cost must be in [0, 1), got {0}")]
    InvalidCost(f64),

    #[error("signal series length {signals} does not match bar count {bars}")]
    LengthMismatch { bars: usize, signals: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    /// When false, a Down signal goes flat instead of short.
    pub allow_short: bool,
    /// Round-trip cost charged against each trade's return.
    pub per_trade_cost: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            allow_short: false,
            per_trade_cost: 0.0,
        }
    }
}

impl BacktestConfig {
    pub fn validate(&self) -> Result<(), BacktestError> {
        if !self.per_trade_cost.is_finite()
            || self.per_trade_cost < 0.0
            || self.per_trade_cost >= 1.0
        {
            return Err(BacktestError::InvalidCost(self.per_trade_cost));
        }
        Ok(())
    }
}

/// Per-bar equity (cumulative return on a 1.0 basis) plus the ledger of
/// completed round trips, in close order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestOutcome {
    pub equity_curve: Vec<f64>,
    pub trades: Vec<Trade>,
}

impl BacktestOutcome {
    pub fn final_equity(&self) -> f64 {
        self.equity_curve.last().copied().unwrap_or(1.0)
    }
}

pub struct BacktestEngine {
    config: BacktestConfig,
}

impl BacktestEngine {
    pub fn new(config: BacktestConfig) -> Result<Self, BacktestError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Run the simulation. `signals[t]` is the direction called at bar
    /// *t* (None where no signal exists, e.g. warm-up or train bars);
    /// it is acted on at bar *t+1*'s open.
    pub fn run(
        &self,
        bars: &[Bar],
        signals: &[Option<Label>],
    ) -> Result<BacktestOutcome, BacktestError> {
        let n = bars.len();
        if signals.len() != n {
            return Err(BacktestError::LengthMismatch {
                bars: n,
                signals: signals.len(),
            });
        }

        let mut equity_curve = Vec::with_capacity(n);
        let mut trades = Vec::new();
        let mut realized = 1.0_f64;
        let mut open: Option<Position> = None;

        for t in 0..n {
            // Yesterday's signal fills at today's open.
            if t > 0 {
                if let Some(signal) = signals[t - 1] {
                    let desired = self.desired_side(signal);
                    if open.as_ref().map(|p| p.side) != desired {
                        if let Some(position) = open.take() {
                            realized *= 1.0 + self.close_trade(&position, t, bars, &mut trades);
                        }
                        if let Some(side) = desired {
                            open = Some(Position {
                                side,
                                entry_index: t,
                                entry_timestamp: bars[t].timestamp,
                                entry_price: bars[t].open,
                            });
                        }
                    }
                }
            }

            // Series end: flatten at the final close.
            if t == n - 1 {
                if let Some(position) = open.take() {
                    realized *= 1.0 + self.final_close(&position, t, bars, &mut trades);
                }
            }

            let marked = match &open {
                Some(p) => {
                    let unrealized =
                        p.side.direction() * (bars[t].close / p.entry_price - 1.0);
                    realized * (1.0 + unrealized)
                }
                None => realized,
            };
            equity_curve.push(marked);
        }

        Ok(BacktestOutcome {
            equity_curve,
            trades,
        })
    }

    fn desired_side(&self, signal: Label) -> Option<PositionSide> {
        match signal {
            Label::Up => Some(PositionSide::Long),
            Label::Down if self.config.allow_short => Some(PositionSide::Short),
            Label::Down => None,
        }
    }

    fn close_trade(
        &self,
        position: &Position,
        exit_index: usize,
        bars: &[Bar],
        trades: &mut Vec<Trade>,
    ) -> f64 {
        self.record_exit(position, exit_index, bars[exit_index].open, bars, trades)
    }

    fn final_close(
        &self,
        position: &Position,
        exit_index: usize,
        bars: &[Bar],
        trades: &mut Vec<Trade>,
    ) -> f64 {
        self.record_exit(position, exit_index, bars[exit_index].close, bars, trades)
    }

    fn record_exit(
        &self,
        position: &Position,
        exit_index: usize,
        exit_price: f64,
        bars: &[Bar],
        trades: &mut Vec<Trade>,
    ) -> f64 {
        let gross = position.side.direction() * (exit_price / position.entry_price - 1.0);
        let return_pct = gross - self.config.per_trade_cost;
        trades.push(Trade {
            side: position.side,
            entry_index: position.entry_index,
            entry_timestamp: position.entry_timestamp,
            entry_price: position.entry_price,
            exit_index,
            exit_timestamp: bars[exit_index].timestamp,
            exit_price,
            return_pct,
            bars_held: exit_index - position.entry_index,
        });
        return_pct
    }
}

/// Map out-of-sample predictions onto a per-bar signal series by
/// timestamp. Bars without a prediction carry no signal; the call
/// is `Up` iff the ensemble probability strictly exceeds `threshold`.
pub fn signals_from_predictions(
    bars: &[Bar],
    records: &[PredictionRecord],
    threshold: f64,
) -> Vec<Option<Label>> {
    let by_ts: HashMap<_, _> = records
        .iter()
        .map(|r| (r.timestamp, r.ensemble_probability))
        .collect();
    bars.iter()
        .map(|bar| {
            by_ts.get(&bar.timestamp).map(|&p| {
                if p > threshold {
                    Label::Up
                } else {
                    Label::Down
                }
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars};

    fn engine(allow_short: bool, cost: f64) -> BacktestEngine {
        BacktestEngine::new(BacktestConfig {
            allow_short,
            per_trade_cost: cost,
        })
        .unwrap()
    }

    #[test]
    fn invalid_cost_rejected() {
        let cfg = BacktestConfig {
            allow_short: false,
            per_trade_cost: 1.5,
        };
        assert_eq!(cfg.validate(), Err(BacktestError::InvalidCost(1.5)));
    }

    #[test]
    fn signal_fills_at_next_bar_open() {
        let bars = make_bars(&[100.0, 102.0, 104.0, 106.0]);
        let signals = vec![Some(Label::Up), Some(Label::Up), Some(Label::Down), None];
        let outcome = engine(false, 0.0).run(&bars, &signals).unwrap();

        assert_eq!(outcome.trades.len(), 1);
        let trade = &outcome.trades[0];
        // Entered at bar 1's open (= bar 0 close), exited at bar 3's open.
        assert_eq!(trade.entry_index, 1);
        assert_approx(trade.entry_price, bars[1].open, 1e-12);
        assert_eq!(trade.exit_index, 3);
        assert_approx(trade.exit_price, bars[3].open, 1e-12);
        assert!(trade.is_winner());
    }

    #[test]
    fn rising_market_single_long_trade() {
        let closes: Vec<f64> = (0..100).map(|i| 100.0 + i as f64).collect();
        let bars = make_bars(&closes);
        let signals: Vec<Option<Label>> = (0..100)
            .map(|i| Some(if i < 50 { Label::Up } else { Label::Down }))
            .collect();

        let outcome = engine(false, 0.0).run(&bars, &signals).unwrap();
        assert_eq!(outcome.trades.len(), 1);
        let trade = &outcome.trades[0];
        assert_eq!(trade.side, PositionSide::Long);
        assert_eq!(trade.entry_index, 1);
        assert_eq!(trade.exit_index, 51);
        assert!(trade.return_pct > 0.0);
        assert!(outcome.final_equity() > 1.0);
    }

    #[test]
    fn down_signal_goes_flat_without_shorting() {
        let bars = make_bars(&[100.0, 99.0, 98.0, 97.0]);
        let signals = vec![Some(Label::Down); 4];
        let outcome = engine(false, 0.0).run(&bars, &signals).unwrap();
        assert!(outcome.trades.is_empty());
        for eq in &outcome.equity_curve {
            assert_approx(*eq, 1.0, 1e-12);
        }
    }

    #[test]
    fn short_profits_in_falling_market() {
        let bars = make_bars(&[100.0, 95.0, 90.0, 85.0]);
        let signals = vec![Some(Label::Down), Some(Label::Down), Some(Label::Down), None];
        let outcome = engine(true, 0.0).run(&bars, &signals).unwrap();
        assert_eq!(outcome.trades.len(), 1);
        assert_eq!(outcome.trades[0].side, PositionSide::Short);
        assert!(outcome.trades[0].return_pct > 0.0);
        assert!(outcome.final_equity() > 1.0);
    }

    #[test]
    fn open_position_closes_at_series_end() {
        let bars = make_bars(&[100.0, 105.0, 110.0]);
        let signals = vec![Some(Label::Up), None, None];
        let outcome = engine(false, 0.0).run(&bars, &signals).unwrap();
        assert_eq!(outcome.trades.len(), 1);
        let trade = &outcome.trades[0];
        assert_eq!(trade.exit_index, 2);
        assert_approx(trade.exit_price, 110.0, 1e-12);
    }

    #[test]
    fn cost_is_charged_per_round_trip() {
        let bars = make_bars(&[100.0, 105.0, 110.0]);
        let signals = vec![Some(Label::Up), None, None];
        let free = engine(false, 0.0).run(&bars, &signals).unwrap();
        let taxed = engine(false, 0.01).run(&bars, &signals).unwrap();
        assert_approx(
            taxed.trades[0].return_pct,
            free.trades[0].return_pct - 0.01,
            1e-12,
        );
    }

    #[test]
    fn identical_inputs_identical_outcome() {
        let closes: Vec<f64> = (0..60)
            .map(|i| 100.0 + (i as f64 * 0.9).sin() * 8.0)
            .collect();
        let bars = make_bars(&closes);
        let signals: Vec<Option<Label>> = (0..60)
            .map(|i| {
                if i % 7 == 0 {
                    None
                } else if i % 3 == 0 {
                    Some(Label::Down)
                } else {
                    Some(Label::Up)
                }
            })
            .collect();

        let eng = engine(true, 0.002);
        let a = eng.run(&bars, &signals).unwrap();
        let b = eng.run(&bars, &signals).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn signal_length_mismatch_rejected() {
        let bars = make_bars(&[100.0, 101.0]);
        let err = engine(false, 0.0).run(&bars, &[None]).unwrap_err();
        assert_eq!(
            err,
            BacktestError::LengthMismatch {
                bars: 2,
                signals: 1
            }
        );
    }

    #[test]
    fn prediction_mapping_respects_threshold() {
        use chrono::NaiveDate;
        let bars = make_bars(&[100.0, 101.0, 102.0]);
        let records = vec![
            PredictionRecord {
                timestamp: bars[1].timestamp,
                base_probabilities: vec![0.6, 0.6, 0.6],
                ensemble_probability: 0.6,
                predicted: Label::Up,
                actual: None,
            },
            PredictionRecord {
                // Timestamp not on the bar grid: ignored.
                timestamp: NaiveDate::from_ymd_opt(1999, 1, 1)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap(),
                base_probabilities: vec![0.9, 0.9, 0.9],
                ensemble_probability: 0.9,
                predicted: Label::Up,
                actual: None,
            },
        ];
        let signals = signals_from_predictions(&bars, &records, 0.5);
        assert_eq!(signals, vec![None, Some(Label::Up), None]);

        let strict = signals_from_predictions(&bars, &records, 0.6);
        // 0.6 does not strictly exceed 0.6.
        assert_eq!(strict[1], Some(Label::Down));
    }
}
