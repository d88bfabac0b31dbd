use serde::Serialize;
use tracing::debug;

use crate::analysis::metrics::Metrics;
use crate::config::Thresholds;
use crate::models::Trade;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorKind {
    Overtrading,
    Revenge,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OvertradingDay {
    pub date: String,
    pub total: usize,
    pub wins: usize,
    pub losses: usize,
    pub break_evens: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevengeInstance {
    pub date: String,
    pub prior_wins: [f64; 2],
    pub spike_loss: f64,
    /// `|spike_loss| / avg_loss`, two decimals.
    pub multiplier: f64,
}

/// A detected pattern with its evidence. Only produced when there is at
/// least one instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "evidence", rename_all = "snake_case")]
pub enum BehaviorFlag {
    Overtrading(Vec<OvertradingDay>),
    Revenge(Vec<RevengeInstance>),
}

impl BehaviorFlag {
    pub fn kind(&self) -> BehaviorKind {
        match self {
            BehaviorFlag::Overtrading(_) => BehaviorKind::Overtrading,
            BehaviorFlag::Revenge(_) => BehaviorKind::Revenge,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            BehaviorFlag::Overtrading(_) => "Overtrading Detected",
            BehaviorFlag::Revenge(_) => "Revenge Trading Detected",
        }
    }

    pub fn instances(&self) -> usize {
        match self {
            BehaviorFlag::Overtrading(days) => days.len(),
            BehaviorFlag::Revenge(hits) => hits.len(),
        }
    }
}

/// Run both checks over the full trade set. Overtrading comes first.
pub fn detect(metrics: &Metrics, trades: &[Trade], thresholds: &Thresholds) -> Vec<BehaviorFlag> {
    let mut flags = Vec::new();

    let days = detect_overtrading(metrics, thresholds);
    if !days.is_empty() {
        debug!("Overtrading on {} days", days.len());
        flags.push(BehaviorFlag::Overtrading(days));
    }

    let hits = detect_revenge(trades, metrics.avg_loss, thresholds);
    if !hits.is_empty() {
        debug!("{} revenge trades", hits.len());
        flags.push(BehaviorFlag::Revenge(hits));
    }

    flags
}

/// Days with more than the minimum trade count, several break-evens, and
/// losses outnumbering both wins and break-evens.
pub fn detect_overtrading(metrics: &Metrics, thresholds: &Thresholds) -> Vec<OvertradingDay> {
    metrics
        .daily_breakdown()
        .into_iter()
        .filter(|d| {
            d.trades > thresholds.overtrading_min_trades
                && d.break_even > 1
                && d.losses > d.wins
                && d.losses > d.break_even
        })
        .map(|d| OvertradingDay {
            date: d.date,
            total: d.trades,
            wins: d.wins,
            losses: d.losses,
            break_evens: d.break_even,
        })
        .collect()
}

/// Two wins followed by a loss of at least `spike_multiplier` average losses.
/// Windows overlap, so one trade can appear in several hits. Nothing is
/// reported when there is no average loss to compare against.
pub fn detect_revenge(trades: &[Trade], avg_loss: f64, thresholds: &Thresholds) -> Vec<RevengeInstance> {
    if avg_loss == 0.0 {
        return Vec::new();
    }

    trades
        .windows(3)
        .filter(|w| {
            w[0].is_win()
                && w[1].is_win()
                && w[2].is_loss()
                && w[2].pnl.abs() >= avg_loss * thresholds.spike_multiplier
        })
        .map(|w| RevengeInstance {
            date: w[2].date.clone(),
            prior_wins: [w[0].pnl, w[1].pnl],
            spike_loss: w[2].pnl,
            multiplier: round2(w[2].pnl.abs() / avg_loss),
        })
        .collect()
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
