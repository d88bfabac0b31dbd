pub mod advice;
pub mod behavior;
pub mod metrics;
pub mod verdict;

pub use advice::{advise, Advice, AdviceTopic};
pub use behavior::{detect, BehaviorFlag, BehaviorKind, OvertradingDay, RevengeInstance};
pub use metrics::{DaySummary, Metrics};
pub use verdict::{classify, Severity, Verdict};
