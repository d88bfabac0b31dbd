use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::{Outcome, Trade};

#[derive(Debug, Clone, Serialize)]
pub struct Metrics {
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub break_even_trades: usize,
    pub total_pnl: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub win_rate: f64,
    /// `avg_win / avg_loss`; infinite when there are wins but no losses,
    /// 0 when there are neither.
    pub reward_ratio: f64,
    pub by_date: BTreeMap<String, Vec<Trade>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySummary {
    pub date: String,
    pub trades: usize,
    pub wins: usize,
    pub losses: usize,
    pub break_even: usize,
    pub pnl: f64,
}

impl DaySummary {
    fn from_trades(date: &str, trades: &[Trade]) -> Self {
        let count = |o: Outcome| trades.iter().filter(|t| t.outcome() == o).count();
        Self {
            date: date.to_string(),
            trades: trades.len(),
            wins: count(Outcome::Win),
            losses: count(Outcome::Loss),
            break_even: count(Outcome::BreakEven),
            pnl: trades.iter().map(|t| t.pnl).sum(),
        }
    }
}

impl Metrics {
    pub fn compute(trades: &[Trade]) -> Self {
        let wins: Vec<f64> = trades.iter().filter(|t| t.is_win()).map(|t| t.pnl).collect();
        let losses: Vec<f64> = trades.iter().filter(|t| t.is_loss()).map(|t| t.pnl).collect();
        let total_trades = trades.len();

        let total_pnl: f64 = trades.iter().map(|t| t.pnl).sum();
        let avg_win = if !wins.is_empty() {
            wins.iter().sum::<f64>() / wins.len() as f64
        } else {
            0.0
        };
        let avg_loss = if !losses.is_empty() {
            losses.iter().sum::<f64>().abs() / losses.len() as f64
        } else {
            0.0
        };
        let win_rate = if total_trades > 0 {
            wins.len() as f64 / total_trades as f64 * 100.0
        } else {
            0.0
        };

        let reward_ratio = if avg_loss > 0.0 {
            avg_win / avg_loss
        } else if avg_win > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };

        let mut by_date: BTreeMap<String, Vec<Trade>> = BTreeMap::new();
        for t in trades {
            by_date.entry(t.date.clone()).or_default().push(t.clone());
        }

        Metrics {
            total_trades,
            winning_trades: wins.len(),
            losing_trades: losses.len(),
            break_even_trades: total_trades - wins.len() - losses.len(),
            total_pnl,
            avg_win,
            avg_loss,
            win_rate,
            reward_ratio,
            by_date,
        }
    }

    pub fn daily_breakdown(&self) -> Vec<DaySummary> {
        self.by_date
            .iter()
            .map(|(date, trades)| DaySummary::from_trades(date, trades))
            .collect()
    }
}
