use std::collections::BTreeMap;

use chrono::{NaiveDate, Timelike};

use openpractice_types::StageSample;

use crate::helpers::time_math::{mean, std_dev};

/// Scores how regular bedtime was over the trailing week. Uses raw stage
/// samples, one bedtime per calendar day, spread measured in hours.
pub struct SleepConsistency;

impl SleepConsistency {
    /// Spread at which the score bottoms out.
    pub const MAX_STD_HOURS: f64 = 3.0;

    pub fn score(stages: &[StageSample]) -> f64 {
        let starts = Self::nightly_starts(stages);
        if starts.len() < 2 {
            return 100.0;
        }

        let mean = mean(&starts);
        let std = std_dev(&starts, mean);
        100.0 * (1.0 - std.min(Self::MAX_STD_HOURS) / Self::MAX_STD_HOURS)
    }

    /// One bedtime per day: the start of that day's longest asleep
    /// sample, as a fractional hour.
    fn nightly_starts(stages: &[StageSample]) -> Vec<f64> {
        let mut by_day: BTreeMap<NaiveDate, StageSample> = BTreeMap::new();
        for stage in stages.iter().filter(|s| s.kind.is_asleep()) {
            by_day
                .entry(stage.start.date())
                .and_modify(|longest| {
                    if stage.end - stage.start > longest.end - longest.start {
                        *longest = *stage;
                    }
                })
                .or_insert(*stage);
        }

        by_day
            .values()
            .map(|s| f64::from(s.start.time().hour()) + f64::from(s.start.time().minute()) / 60.0)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use openpractice_types::SleepStageKind;

    fn night(day: u32, h: u32, m: u32, hours: i64) -> StageSample {
        let start: NaiveDateTime = NaiveDate::from_ymd_opt(2025, 8, day)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap();
        StageSample {
            start,
            end: start + chrono::TimeDelta::hours(hours),
            kind: SleepStageKind::Core,
        }
    }

    #[test]
    fn too_few_nights_scores_neutral() {
        assert_eq!(SleepConsistency::score(&[]), 100.0);
        assert_eq!(SleepConsistency::score(&[night(18, 23, 0, 7)]), 100.0);
    }

    #[test]
    fn identical_bedtimes_score_perfect() {
        let stages: Vec<StageSample> = (13..20).map(|d| night(d, 23, 0, 7)).collect();
        assert_eq!(SleepConsistency::score(&stages), 100.0);
    }

    #[test]
    fn one_hour_spread_hand_computed() {
        // starts 22.0 and 23.0 -> population std 0.5 -> 100 x (1 - 0.5/3)
        let stages = [night(18, 22, 0, 7), night(19, 23, 0, 7)];
        let score = SleepConsistency::score(&stages);
        assert!((score - 83.333).abs() < 0.01, "got {score}");
    }

    #[test]
    fn wild_spread_bottoms_out_at_zero() {
        // starts 16.0 and 23.0 -> std 3.5, capped at 3
        let stages = [night(18, 16, 0, 7), night(19, 23, 0, 7)];
        assert_eq!(SleepConsistency::score(&stages), 0.0);
    }

    #[test]
    fn longest_sample_wins_the_day() {
        // same day: a short evening nap and the real night
        let nap = night(18, 18, 0, 1);
        let real = night(18, 23, 30, 7);
        let next = night(19, 23, 30, 7);
        let score = SleepConsistency::score(&[nap, real, next]);
        assert_eq!(score, 100.0, "nap start must not count, got {score}");
    }

    #[test]
    fn awake_samples_are_ignored() {
        let mut awake = night(18, 2, 0, 9);
        awake.kind = SleepStageKind::Awake;
        let stages = [awake, night(18, 23, 0, 7), night(19, 23, 0, 7)];
        assert_eq!(SleepConsistency::score(&stages), 100.0);
    }

    #[test]
    fn minutes_count_fractionally() {
        // 22:30 -> 22.5, 23:00 -> 23.0 -> std 0.25 -> 91.67
        let stages = [night(18, 22, 30, 7), night(19, 23, 0, 7)];
        let score = SleepConsistency::score(&stages);
        assert!((score - 91.666).abs() < 0.01, "got {score}");
    }
}
