use serde::{Deserialize, Serialize};

pub const BENCHMARK_RATIO: f64 = 1.0;
pub const WIN_RATE_TARGET: f64 = 50.0;
/// Loss size, in multiples of the average loss, that marks a revenge trade.
pub const SPIKE_MULTIPLIER: f64 = 2.0;
/// A day needs more trades than this to be considered for overtrading.
pub const OVERTRADING_MIN_TRADES: usize = 4;
/// Average loss above this is flagged for stop-loss review.
pub const AVG_LOSS_CEILING: f64 = 400.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub benchmark_ratio: f64,
    pub win_rate_target: f64,
    pub spike_multiplier: f64,
    pub overtrading_min_trades: usize,
    pub avg_loss_ceiling: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            benchmark_ratio: BENCHMARK_RATIO,
            win_rate_target: WIN_RATE_TARGET,
            spike_multiplier: SPIKE_MULTIPLIER,
            overtrading_min_trades: OVERTRADING_MIN_TRADES,
            avg_loss_ceiling: AVG_LOSS_CEILING,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub log_level: String,
    pub thresholds: Thresholds,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let env = |key: &str, default: &str| -> String {
            std::env::var(key).unwrap_or_else(|_| default.to_string())
        };

        let thresholds = Thresholds {
            benchmark_ratio: env("EDGE_BENCHMARK_RATIO", "1.0")
                .parse()
                .unwrap_or(BENCHMARK_RATIO),
            win_rate_target: env("EDGE_WIN_RATE_TARGET", "50.0")
                .parse()
                .unwrap_or(WIN_RATE_TARGET),
            spike_multiplier: env("EDGE_SPIKE_MULTIPLIER", "2.0")
                .parse()
                .unwrap_or(SPIKE_MULTIPLIER),
            overtrading_min_trades: env("EDGE_OVERTRADING_MIN_TRADES", "4")
                .parse()
                .unwrap_or(OVERTRADING_MIN_TRADES),
            avg_loss_ceiling: env("EDGE_AVG_LOSS_CEILING", "400.0")
                .parse()
                .unwrap_or(AVG_LOSS_CEILING),
        };

        Config {
            log_level: env("LOG_LEVEL", "info"),
            thresholds,
        }
    }
}
