use serde::Serialize;

use crate::analysis::{
    advise, classify, detect, Advice, AdviceTopic, BehaviorFlag, DaySummary, Metrics, Verdict,
};
use crate::config::Thresholds;
use crate::models::Trade;
use crate::pipeline::FileKind;

#[derive(Debug, Clone, Serialize)]
pub struct EdgeReport {
    pub file_kind: FileKind,
    pub trades: Vec<Trade>,
    pub metrics: Metrics,
    pub daily: Vec<DaySummary>,
    pub verdict: Option<Verdict>,
    pub flags: Vec<BehaviorFlag>,
    pub advice: Vec<Advice>,
    pub thresholds: Thresholds,
}

impl EdgeReport {
    pub fn build(file_kind: FileKind, trades: Vec<Trade>, thresholds: &Thresholds) -> Self {
        let metrics = Metrics::compute(&trades);
        let flags = detect(&metrics, &trades, thresholds);
        let verdict = classify(&metrics, thresholds);
        let advice = advise(&metrics, thresholds);
        let daily = metrics.daily_breakdown();

        EdgeReport {
            file_kind,
            trades,
            metrics,
            daily,
            verdict,
            flags,
            advice,
            thresholds: *thresholds,
        }
    }

    pub fn print_summary(&self) {
        let m = &self.metrics;

        println!("\n{}", "=".repeat(70));
        println!("  EDGE REPORT");
        println!("{}", "=".repeat(70));
        println!();
        println!("  PERFORMANCE");
        println!("  ───────────────────────────────────");
        println!("  Trades:      {}", m.total_trades);
        println!(
            "  W / L / BE:  {} / {} / {}",
            m.winning_trades, m.losing_trades, m.break_even_trades
        );
        println!("  Total PnL:   ${:+.2}", m.total_pnl);
        println!("  Win Rate:    {:.1}%", m.win_rate);
        println!("  Avg Win:     ${:.2}", m.avg_win);
        println!("  Avg Loss:    ${:.2}", m.avg_loss);
        println!("  Reward:      {}:1", fmt_ratio(m.reward_ratio));

        println!();
        println!("  VERDICT");
        println!("  ───────────────────────────────────");
        match self.verdict {
            Some(v) => {
                println!("  [{:?}] {}", v.severity(), v.title());
                println!("  {}", self.verdict_message(v));
            }
            None => println!("  (none)"),
        }

        if !self.flags.is_empty() {
            println!();
            println!("  BEHAVIOURAL FLAGS");
            println!("  ───────────────────────────────────");
            for flag in &self.flags {
                println!("  {} ({})", flag.title(), flag.instances());
                println!("  {}", flag_message(flag, &self.thresholds));
                for line in evidence_lines(flag) {
                    println!("    - {}", line);
                }
            }
        }

        println!();
        println!("  METRIC ADVICE");
        println!("  ───────────────────────────────────");
        for a in &self.advice {
            println!("  {:>13}: {}", topic_label(a.topic), a.status);
            println!("  {:>13}  {}", "", advice_message(a, m, &self.thresholds));
        }

        if !self.daily.is_empty() {
            println!();
            println!("  DAILY BREAKDOWN");
            println!("  ───────────────────────────────────");
            for d in &self.daily {
                println!(
                    "  {:>10}: {:>3} trades | W {:>2} L {:>2} BE {:>2} | PnL ${:+.2}",
                    d.date, d.trades, d.wins, d.losses, d.break_even, d.pnl
                );
            }
        }

        println!("{}", "=".repeat(70));
    }

    fn verdict_message(&self, verdict: Verdict) -> String {
        let m = &self.metrics;
        let ratio = fmt_ratio(m.reward_ratio);
        match verdict {
            Verdict::ScaleUp => format!(
                "Total PnL is ${:+.2} with a {}:1 reward ratio and {:.1}% win rate. \
                 The edge is proven; consider scaling up.",
                m.total_pnl, ratio, m.win_rate
            ),
            Verdict::ImproveWinRate => format!(
                "Reward ratio is {}:1 (avg win ${:.2} vs avg loss ${:.2}), but the win rate \
                 of {:.1}% is below {:.0}%. Take only your highest-conviction setups.",
                ratio, m.avg_win, m.avg_loss, m.win_rate, self.thresholds.win_rate_target
            ),
            Verdict::WinRateFirst => format!(
                "Reward ratio is {}:1 (avg win ${:.2} vs avg loss ${:.2}) and the win rate is \
                 {:.1}%. Both are below target; fix the win rate first.",
                ratio, m.avg_win, m.avg_loss, m.win_rate
            ),
            Verdict::ImproveRewardRatio => format!(
                "Win rate is {:.1}%, but the reward ratio is only {}:1 (avg win ${:.2} vs \
                 avg loss ${:.2}). Tighten stops and let winners run longer.",
                m.win_rate, ratio, m.avg_win, m.avg_loss
            ),
        }
    }
}

fn flag_message(flag: &BehaviorFlag, thresholds: &Thresholds) -> String {
    match flag {
        BehaviorFlag::Overtrading(days) => format!(
            "On {} day{} you took more than {} trades, had multiple break-evens, and most \
             were losses. You kept forcing trades after the session turned against you.",
            days.len(),
            plural(days.len()),
            thresholds.overtrading_min_trades
        ),
        BehaviorFlag::Revenge(hits) => {
            let multipliers: Vec<String> =
                hits.iter().map(|h| format!("{:.2}x", h.multiplier)).collect();
            format!(
                "{} time{} a winning streak was followed by a loss of {} your average loss. \
                 That is emotional re-entry, not a clean setup.",
                hits.len(),
                plural(hits.len()),
                multipliers.join(", ")
            )
        }
    }
}

fn evidence_lines(flag: &BehaviorFlag) -> Vec<String> {
    match flag {
        BehaviorFlag::Overtrading(days) => days
            .iter()
            .map(|d| {
                format!(
                    "{}: {} trades ({}W {}L {}BE)",
                    d.date, d.total, d.wins, d.losses, d.break_evens
                )
            })
            .collect(),
        BehaviorFlag::Revenge(hits) => hits
            .iter()
            .map(|h| {
                format!(
                    "{}: wins [+${:.0}, +${:.0}] -> loss ${:.0} ({}x avg)",
                    h.date, h.prior_wins[0], h.prior_wins[1], h.spike_loss, h.multiplier
                )
            })
            .collect(),
    }
}

fn advice_message(advice: &Advice, m: &Metrics, thresholds: &Thresholds) -> String {
    match (advice.topic, advice.on_track) {
        (AdviceTopic::WinRate, true) => format!(
            "At {:.1}% you win more often than you lose. Keep entries to your \
             highest-conviction setups.",
            m.win_rate
        ),
        (AdviceTopic::WinRate, false) => format!(
            "At {:.1}% you lose more often than you win. Wait for your best setups \
             and drop low-conviction trades.",
            m.win_rate
        ),
        (AdviceTopic::RewardRatio, true) => format!(
            "Your avg win (${:.2}) is {}x your avg loss (${:.2}). That edge compounds.",
            m.avg_win,
            fmt_ratio(m.reward_ratio),
            m.avg_loss
        ),
        (AdviceTopic::RewardRatio, false) => format!(
            "Your avg win (${:.2}) is only {}x your avg loss (${:.2}). Tighten stops or \
             let winners run to reach at least 1:1.",
            m.avg_win,
            fmt_ratio(m.reward_ratio),
            m.avg_loss
        ),
        (AdviceTopic::AvgLoss, true) => format!(
            "An average loss of ${:.2} is controlled. Keep risk defined on every trade.",
            m.avg_loss
        ),
        (AdviceTopic::AvgLoss, false) => format!(
            "Your average loss is ${:.2}, above ${:.0}. Review stop placement and lock in \
             risk before entering.",
            m.avg_loss, thresholds.avg_loss_ceiling
        ),
        (AdviceTopic::AvgWin, true) => format!(
            "You average ${:.2} per win. Keep letting winners develop before taking profit.",
            m.avg_win
        ),
        (AdviceTopic::AvgWin, false) => format!(
            "Your average win of ${:.2} is less than your average loss (${:.2}). Extend \
             take-profit targets or trail stops.",
            m.avg_win, m.avg_loss
        ),
    }
}

fn topic_label(topic: AdviceTopic) -> &'static str {
    match topic {
        AdviceTopic::WinRate => "Win Rate",
        AdviceTopic::RewardRatio => "Reward Ratio",
        AdviceTopic::AvgLoss => "Avg Loss",
        AdviceTopic::AvgWin => "Avg Win",
    }
}

fn fmt_ratio(ratio: f64) -> String {
    if ratio.is_infinite() {
        "inf".to_string()
    } else {
        format!("{:.2}", ratio)
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}
