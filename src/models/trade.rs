use serde::{Deserialize, Serialize};

pub const UNKNOWN_DATE: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Win,
    Loss,
    BreakEven,
}

/// One closed position as read from an export row.
///
/// Trades are kept in file row order. That order is the time axis for the
/// streak-based behavior checks, so sequences of trades are never re-sorted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub symbol: String,
    pub pnl: f64,
    /// `MM/DD/YYYY`, or [`UNKNOWN_DATE`].
    pub date: String,
}

impl Trade {
    pub fn new(symbol: impl Into<String>, pnl: f64, date: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            pnl,
            date: date.into(),
        }
    }

    pub fn outcome(&self) -> Outcome {
        if self.pnl > 0.0 {
            Outcome::Win
        } else if self.pnl < 0.0 {
            Outcome::Loss
        } else {
            Outcome::BreakEven
        }
    }

    pub fn is_win(&self) -> bool {
        self.outcome() == Outcome::Win
    }

    pub fn is_loss(&self) -> bool {
        self.outcome() == Outcome::Loss
    }
}
