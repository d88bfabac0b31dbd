use serde::Serialize;
use tracing::debug;

use crate::analysis::metrics::Metrics;
use crate::config::Thresholds;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Warning,
    Danger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    ScaleUp,
    ImproveWinRate,
    WinRateFirst,
    ImproveRewardRatio,
}

impl Verdict {
    pub fn severity(&self) -> Severity {
        match self {
            Verdict::ScaleUp => Severity::Success,
            Verdict::ImproveWinRate | Verdict::ImproveRewardRatio => Severity::Warning,
            Verdict::WinRateFirst => Severity::Danger,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Verdict::ScaleUp => "Profitable: Consider Scaling Up",
            Verdict::ImproveWinRate => "Your Reward Is Good, Work On Your Win Rate",
            Verdict::WinRateFirst => "Work On Your Win Rate First",
            Verdict::ImproveRewardRatio => "Win Rate Is Fine, Improve Your Reward Ratio",
        }
    }
}

/// Pick at most one verdict. Profitability wins outright; otherwise the
/// reward/win-rate combination decides.
///
/// An unprofitable record with both a good reward ratio and a good win rate
/// gets no verdict. Metrics computed from trades cannot land there (more
/// wins than losses at avg win >= avg loss is always net positive), so this
/// only matters for hand-built metrics or custom thresholds.
pub fn classify(metrics: &Metrics, thresholds: &Thresholds) -> Option<Verdict> {
    let profitable = metrics.total_pnl > 0.0;
    let reward_good = metrics.reward_ratio >= thresholds.benchmark_ratio;
    let win_rate_good = metrics.win_rate > thresholds.win_rate_target;

    let verdict = match (profitable, reward_good, win_rate_good) {
        (true, _, _) => Some(Verdict::ScaleUp),
        (false, true, false) => Some(Verdict::ImproveWinRate),
        (false, false, false) => Some(Verdict::WinRateFirst),
        (false, false, true) => Some(Verdict::ImproveRewardRatio),
        (false, true, true) => None,
    };

    if verdict.is_none() {
        debug!(
            "No verdict: PnL {:.2} with reward ratio {:.2} and win rate {:.1}%",
            metrics.total_pnl, metrics.reward_ratio, metrics.win_rate
        );
    }
    verdict
}
