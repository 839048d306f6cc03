//! Trade — a completed round-trip with realized PnL.

use super::position::PositionSide;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A realized entry/exit pair. Created when a position closes, immutable
/// thereafter, appended to the trade ledger in close order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub side: PositionSide,

    pub entry_index: usize,
    pub entry_timestamp: NaiveDateTime,
    pub entry_price: f64,

    pub exit_index: usize,
    pub exit_timestamp: NaiveDateTime,
    pub exit_price: f64,

    /// Net return on one unit of notional, costs included.
    pub return_pct: f64,
    pub bars_held: usize,
}

impl Trade {
    pub fn is_winner(&self) -> bool {
        self.return_pct > 0.0
    }
}
