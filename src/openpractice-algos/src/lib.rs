pub(crate) mod readiness;
pub use readiness::{
    Metric, MetricScore, ReadinessBand, ReadinessCalculator, ReadinessInput, ReadinessScore,
    insight,
};

pub(crate) mod baseline;
pub use baseline::RestingBaseline;

pub(crate) mod sleep;
pub use sleep::{SleepAnalyzer, SleepBlock, SleepSource, SleepSummary};

pub(crate) mod sleep_consistency;
pub use sleep_consistency::SleepConsistency;

pub(crate) mod effort;
pub use effort::{EffortEstimator, EffortInput};

pub(crate) mod streak;
pub use streak::{Streak, StreakAnalyzer};

pub(crate) mod weekly;
pub use weekly::{SessionWorkload, WeeklyAnalyzer, WeeklyMetrics};

pub(crate) mod workload;
pub use workload::{LoggedExercise, WorkloadSummary};

pub(crate) mod vo2max;
pub use vo2max::Vo2MaxTrend;

pub mod helpers;
