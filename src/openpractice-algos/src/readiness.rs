/// Blends today's biometric signals against personal rolling baselines
/// into a single 0-100 recovery score:
/// 1. Each metric is scored 0-100 on its own scale
/// 2. Scores are weighted (weights total 1.0 with strain included)
/// 3. Strain is a penalty and is subtracted, everything else adds
/// 4. The weighted sum is clamped to 0-100 and truncated to an integer
pub struct ReadinessCalculator;

/// Raw signals and baselines feeding one scoring pass. Sleep figures are
/// hours, HRV is SDNN milliseconds, strain is active kilocalories.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadinessInput {
    pub hrv: f64,
    pub resting_hr: f64,
    pub sleep_actual: f64,
    pub sleep_effective: f64,
    pub strain: f64,
    /// Precomputed start-time consistency, scored neutral when absent.
    pub sleep_consistency: Option<f64>,
    pub avg_hrv: f64,
    pub avg_rhr: f64,
    pub avg_strain: f64,
    pub sleep_avg: f64,
}

impl ReadinessInput {
    pub fn hrv_delta(&self) -> f64 {
        self.hrv - self.avg_hrv
    }

    pub fn sleep_delta(&self) -> f64 {
        self.sleep_actual - self.sleep_avg
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Hrv,
    RestingHr,
    Sleep,
    Strain,
    SleepQuality,
    SleepConsistency,
    HrvTrend,
    StrainRatio,
}

impl Metric {
    pub const ALL: [Metric; 8] = [
        Metric::Hrv,
        Metric::RestingHr,
        Metric::Sleep,
        Metric::Strain,
        Metric::SleepQuality,
        Metric::SleepConsistency,
        Metric::HrvTrend,
        Metric::StrainRatio,
    ];

    pub fn weight(&self) -> f64 {
        match self {
            Metric::Hrv => 0.20,
            Metric::RestingHr => 0.25,
            Metric::Sleep => 0.20,
            Metric::Strain => 0.10,
            Metric::SleepQuality => 0.10,
            Metric::SleepConsistency => 0.05,
            Metric::HrvTrend => 0.05,
            Metric::StrainRatio => 0.05,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Metric::Hrv => "HRV",
            Metric::RestingHr => "RHR",
            Metric::Sleep => "Sleep",
            Metric::Strain => "Strain",
            Metric::SleepQuality => "Sleep Quality",
            Metric::SleepConsistency => "Consistency",
            Metric::HrvTrend => "HRV Trend",
            Metric::StrainRatio => "Strain Ratio",
        }
    }

    /// Strain counts against recovery, everything else counts towards it.
    pub fn is_penalty(&self) -> bool {
        matches!(self, Metric::Strain)
    }

    pub fn score(&self, input: &ReadinessInput) -> f64 {
        match self {
            Metric::Hrv => normalize(input.hrv, 0.5 * input.avg_hrv, 1.2 * input.avg_hrv),
            Metric::RestingHr => normalize(
                1.2 * input.avg_rhr - input.resting_hr,
                0.0,
                0.4 * input.avg_rhr,
            ),
            Metric::Sleep => normalize(input.sleep_effective, 5.0, 8.0),
            Metric::Strain => normalize(input.strain, input.avg_strain, 1.5 * input.avg_strain),
            Metric::SleepQuality => {
                if input.sleep_actual <= 0.0 {
                    100.0
                } else {
                    (input.sleep_effective / input.sleep_actual * 100.0).clamp(0.0, 100.0)
                }
            }
            Metric::SleepConsistency => input.sleep_consistency.unwrap_or(100.0),
            Metric::HrvTrend => {
                if input.avg_hrv <= 0.0 {
                    100.0
                } else {
                    (input.hrv / input.avg_hrv * 100.0).clamp(0.0, 100.0)
                }
            }
            Metric::StrainRatio => {
                if input.avg_strain <= 0.0 {
                    100.0
                } else {
                    let ratio = input.strain / input.avg_strain;
                    let adjusted = if ratio <= 1.0 { 1.0 } else { 1.0 / ratio };
                    (adjusted * 100.0).clamp(0.0, 100.0)
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricScore {
    pub metric: Metric,
    pub score: f64,
}

impl MetricScore {
    /// Share of the final score attributed to this metric. Strain is
    /// reported as remaining headroom so stacked charts sum upward.
    pub fn contribution(&self) -> f64 {
        if self.metric.is_penalty() {
            (100.0 - self.score) * self.metric.weight()
        } else {
            self.score * self.metric.weight()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadinessScore {
    pub score: i64,
    pub metrics: [MetricScore; 8],
}

impl ReadinessScore {
    pub fn band(&self) -> ReadinessBand {
        ReadinessBand::for_score(self.score)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadinessBand {
    High,
    ModerateHigh,
    ModerateLow,
    Low,
}

impl ReadinessBand {
    pub fn for_score(score: i64) -> Self {
        if score >= 80 {
            Self::High
        } else if score >= 60 {
            Self::ModerateHigh
        } else if score >= 40 {
            Self::ModerateLow
        } else {
            Self::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::ModerateHigh => "moderate-high",
            Self::ModerateLow => "moderate-low",
            Self::Low => "low",
        }
    }
}

impl ReadinessCalculator {
    pub fn calculate(input: &ReadinessInput) -> ReadinessScore {
        let metrics = Metric::ALL.map(|metric| MetricScore {
            metric,
            score: metric.score(input),
        });

        let mut total = 0.0;
        for m in &metrics {
            let weighted = m.score * m.metric.weight();
            if m.metric.is_penalty() {
                total -= weighted;
            } else {
                total += weighted;
            }
        }

        ReadinessScore {
            score: total.clamp(0.0, 100.0) as i64,
            metrics,
        }
    }
}

/// Maps `value` onto 0-100 between `min` and `max`, clamping outside the
/// range. Degenerate ranges score a neutral 50.
pub(crate) fn normalize(value: f64, min: f64, max: f64) -> f64 {
    if max <= min {
        return 50.0;
    }
    let clamped = value.clamp(min, max);
    (clamped - min) / (max - min) * 100.0
}

/// One-line training recommendation for the dashboard.
pub fn insight(score: i64, hrv_delta: f64, sleep_delta: f64) -> &'static str {
    if score < 40 {
        if hrv_delta < 0.0 {
            "Low recovery due to reduced HRV"
        } else if sleep_delta < 0.0 {
            "Low recovery from short sleep"
        } else {
            "Low recovery from accumulated fatigue"
        }
    } else if score > 70 {
        "Strong recovery - well done"
    } else {
        "Moderate recovery - steady training recommended"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn baseline_input() -> ReadinessInput {
        ReadinessInput {
            hrv: 60.0,
            resting_hr: 60.0,
            sleep_actual: 7.0,
            sleep_effective: 6.5,
            strain: 500.0,
            sleep_consistency: None,
            avg_hrv: 60.0,
            avg_rhr: 60.0,
            avg_strain: 500.0,
            sleep_avg: 7.0,
        }
    }

    #[test]
    fn weights_total_one() {
        let total: f64 = Metric::ALL.iter().map(Metric::weight).sum();
        assert!((total - 1.0).abs() < 1e-9, "weights must total 1.0: {total}");
    }

    #[test]
    fn normalize_is_monotonic_and_clamped() {
        assert_eq!(normalize(-10.0, 0.0, 100.0), 0.0);
        assert_eq!(normalize(110.0, 0.0, 100.0), 100.0);
        assert_eq!(normalize(25.0, 0.0, 100.0), 25.0);
        let lower = normalize(30.0, 0.0, 100.0);
        let higher = normalize(60.0, 0.0, 100.0);
        assert!(higher > lower);
    }

    #[test]
    fn normalize_degenerate_range_is_neutral() {
        assert_eq!(normalize(42.0, 10.0, 10.0), 50.0);
        assert_eq!(normalize(42.0, 10.0, 5.0), 50.0);
        assert_eq!(normalize(0.0, 0.0, 0.0), 50.0);
    }

    #[test]
    fn baseline_equal_input_hand_computed() {
        // hrv:    normalize(60, 30, 72)  = 71.43 x 0.20 = 14.286
        // rhr:    normalize(12, 0, 24)   = 50.00 x 0.25 = 12.5
        // sleep:  normalize(6.5, 5, 8)   = 50.00 x 0.20 = 10.0
        // strain: normalize(500,500,750) = 0     x 0.10 = -0.0
        // quality: 6.5/7.0               = 92.86 x 0.10 = 9.286
        // consistency: absent            = 100   x 0.05 = 5.0
        // trend: 60/60                   = 100   x 0.05 = 5.0
        // ratio: 500/500 <= 1            = 100   x 0.05 = 5.0
        // total = 61.07 -> 61
        let result = ReadinessCalculator::calculate(&baseline_input());
        assert_eq!(result.score, 61);
    }

    #[test]
    fn strain_spike_lowers_score() {
        let calm = ReadinessCalculator::calculate(&baseline_input());
        let mut hard = baseline_input();
        hard.strain = 900.0;
        let stressed = ReadinessCalculator::calculate(&hard);
        assert!(
            stressed.score < calm.score,
            "strain above baseline must cost points: {} vs {}",
            stressed.score,
            calm.score
        );
    }

    #[test]
    fn zero_baselines_stay_in_range() {
        let input = ReadinessInput {
            hrv: 55.0,
            resting_hr: 58.0,
            sleep_actual: 0.0,
            sleep_effective: 0.0,
            strain: 0.0,
            sleep_consistency: None,
            avg_hrv: 0.0,
            avg_rhr: 0.0,
            avg_strain: 0.0,
            sleep_avg: 0.0,
        };
        // hrv and rhr ranges degenerate to 50, the ratio metrics fall back
        // to neutral 100
        assert_eq!(Metric::Hrv.score(&input), 50.0);
        assert_eq!(Metric::RestingHr.score(&input), 50.0);
        assert_eq!(Metric::SleepQuality.score(&input), 100.0);
        assert_eq!(Metric::HrvTrend.score(&input), 100.0);
        assert_eq!(Metric::StrainRatio.score(&input), 100.0);

        let result = ReadinessCalculator::calculate(&input);
        assert!((0..=100).contains(&result.score), "score {}", result.score);
    }

    #[test]
    fn strain_ratio_decays_above_baseline() {
        let mut input = baseline_input();
        input.strain = 1000.0;
        // ratio 2.0 -> adjusted 0.5 -> 50
        assert_eq!(Metric::StrainRatio.score(&input), 50.0);
        input.strain = 250.0;
        // under baseline stays neutral
        assert_eq!(Metric::StrainRatio.score(&input), 100.0);
    }

    #[test]
    fn contribution_inverts_strain() {
        let scored = MetricScore {
            metric: Metric::Strain,
            score: 30.0,
        };
        // 30 points of penalty leaves 70 headroom at weight 0.10
        assert!((scored.contribution() - 7.0).abs() < 1e-9);

        let scored = MetricScore {
            metric: Metric::Hrv,
            score: 80.0,
        };
        assert!((scored.contribution() - 16.0).abs() < 1e-9);
    }

    #[test]
    fn bands() {
        assert_eq!(ReadinessBand::for_score(80), ReadinessBand::High);
        assert_eq!(ReadinessBand::for_score(79), ReadinessBand::ModerateHigh);
        assert_eq!(ReadinessBand::for_score(60), ReadinessBand::ModerateHigh);
        assert_eq!(ReadinessBand::for_score(59), ReadinessBand::ModerateLow);
        assert_eq!(ReadinessBand::for_score(40), ReadinessBand::ModerateLow);
        assert_eq!(ReadinessBand::for_score(39), ReadinessBand::Low);
    }

    #[test]
    fn insight_lines() {
        assert_eq!(insight(30, -5.0, 0.5), "Low recovery due to reduced HRV");
        assert_eq!(insight(30, 2.0, -1.0), "Low recovery from short sleep");
        assert_eq!(
            insight(30, 2.0, 0.5),
            "Low recovery from accumulated fatigue"
        );
        assert_eq!(insight(85, 0.0, 0.0), "Strong recovery - well done");
        assert_eq!(
            insight(55, 0.0, 0.0),
            "Moderate recovery - steady training recommended"
        );
    }
}
