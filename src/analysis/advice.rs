use serde::Serialize;

use crate::analysis::metrics::Metrics;
use crate::config::Thresholds;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdviceTopic {
    WinRate,
    RewardRatio,
    AvgLoss,
    AvgWin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Advice {
    pub topic: AdviceTopic,
    pub on_track: bool,
    pub status: &'static str,
}

impl Advice {
    fn new(topic: AdviceTopic, on_track: bool) -> Self {
        let status = match (topic, on_track) {
            (AdviceTopic::WinRate, true) => "good",
            (AdviceTopic::RewardRatio, true) | (AdviceTopic::AvgWin, true) => "solid",
            (AdviceTopic::AvgLoss, true) => "within range",
            (AdviceTopic::AvgLoss, false) => "review needed",
            (AdviceTopic::AvgWin, false) => "extend targets",
            (_, false) => "needs work",
        };
        Self {
            topic,
            on_track,
            status,
        }
    }
}

/// Per-metric status, always in the order win rate, reward ratio,
/// average loss, average win.
pub fn advise(metrics: &Metrics, thresholds: &Thresholds) -> Vec<Advice> {
    vec![
        Advice::new(
            AdviceTopic::WinRate,
            metrics.win_rate > thresholds.win_rate_target,
        ),
        Advice::new(
            AdviceTopic::RewardRatio,
            metrics.reward_ratio >= thresholds.benchmark_ratio,
        ),
        Advice::new(
            AdviceTopic::AvgLoss,
            metrics.avg_loss <= thresholds.avg_loss_ceiling,
        ),
        Advice::new(AdviceTopic::AvgWin, metrics.avg_win >= metrics.avg_loss),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::make_trades;

    #[test]
    fn statuses_follow_thresholds() {
        let m = Metrics::compute(&make_trades(&[100.0, 100.0, -500.0]));
        let advice = advise(&m, &Thresholds::default());
        let got: Vec<(AdviceTopic, &str)> = advice.iter().map(|a| (a.topic, a.status)).collect();
        assert_eq!(
            got,
            [
                (AdviceTopic::WinRate, "good"),
                (AdviceTopic::RewardRatio, "needs work"),
                (AdviceTopic::AvgLoss, "review needed"),
                (AdviceTopic::AvgWin, "extend targets"),
            ]
        );
    }

    #[test]
    fn empty_record_is_mostly_on_track() {
        let advice = advise(&Metrics::compute(&[]), &Thresholds::default());
        let on_track: Vec<bool> = advice.iter().map(|a| a.on_track).collect();
        assert_eq!(on_track, [false, false, true, true]);
    }
}
