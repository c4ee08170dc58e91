use std::fmt::Display;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

use crate::{helpers::format_hm::FormatHM, weekly::SessionWorkload};
use openpractice_types::{Exercise, HrSample};

/// One activity boundary read back from a recorded session: the decoded
/// exercise, the segment it ran in and its wall-clock span.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggedExercise {
    pub exercise: Exercise,
    pub segment: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl LoggedExercise {
    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }
}

/// Totals for a single recorded session: mass moved, the work/rest time
/// split and the HR envelope over the whole practice.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct WorkloadSummary {
    pub tonnage: f64,
    pub work: TimeDelta,
    pub rest: TimeDelta,
    pub low_bpm: Option<i16>,
    pub high_bpm: Option<i16>,
}

impl WorkloadSummary {
    /// Sessions counted by the rolling tonnage average.
    pub const ROLLING_WINDOW: usize = 5;

    pub fn new(events: &[LoggedExercise], samples: &[HrSample]) -> Self {
        let work: TimeDelta = events
            .iter()
            .filter(|e| !e.exercise.is_rest())
            .map(LoggedExercise::duration)
            .sum();
        let rest: TimeDelta = events
            .iter()
            .filter(|e| e.exercise.is_rest())
            .map(LoggedExercise::duration)
            .sum();

        // Only ballistic and grind sets move weight; goblet squats and
        // halos are warm-up positioning, not volume.
        let tonnage: f64 = events
            .iter()
            .map(|e| match e.exercise {
                Exercise::Swing { reps, weight, .. } | Exercise::GetUp { reps, weight, .. } => {
                    f64::from(reps * weight)
                }
                _ => 0.0,
            })
            .sum();

        Self {
            tonnage,
            work,
            rest,
            low_bpm: samples.iter().map(|s| s.bpm).min(),
            high_bpm: samples.iter().map(|s| s.bpm).max(),
        }
    }

    /// Collapses into the per-day shape the weekly rollup consumes.
    pub fn to_session(&self, date: NaiveDate) -> SessionWorkload {
        SessionWorkload {
            date,
            work_secs: self.work.num_milliseconds() as f64 / 1000.0,
            rest_secs: self.rest.num_milliseconds() as f64 / 1000.0,
            tonnage: self.tonnage,
        }
    }

    /// Mean tonnage across the last [`Self::ROLLING_WINDOW`] sessions.
    pub fn rolling_tonnage(sessions: &[WorkloadSummary]) -> f64 {
        let from = sessions.len().saturating_sub(Self::ROLLING_WINDOW);
        let recent = &sessions[from..];
        if recent.is_empty() {
            return 0.0;
        }
        recent.iter().map(|s| s.tonnage).sum::<f64>() / recent.len() as f64
    }
}

impl Display for WorkloadSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let range = match (self.low_bpm, self.high_bpm) {
            (Some(low), Some(high)) => format!("{low}-{high}"),
            _ => "n/a".into(),
        };
        f.write_fmt(format_args!(
            "Tonnage: {:.0}kg\nWork: {}\nRest: {}\nHR range: {}",
            self.tonnage,
            self.work.format_hm(),
            self.rest.format_hm(),
            range
        ))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use openpractice_types::Handedness;

    use super::*;

    fn make_events(specs: &[(Exercise, i64)]) -> Vec<LoggedExercise> {
        let base = NaiveDate::from_ymd_opt(2025, 7, 5)
            .unwrap()
            .and_hms_opt(7, 30, 0)
            .unwrap();
        let mut events = Vec::new();
        let mut cursor = base;
        for &(exercise, secs) in specs {
            let end = cursor + TimeDelta::seconds(secs);
            events.push(LoggedExercise {
                exercise,
                segment: "Swings".into(),
                start: cursor,
                end,
            });
            cursor = end;
        }
        events
    }

    #[test]
    fn empty_session_is_all_zero() {
        let summary = WorkloadSummary::new(&[], &[]);
        assert_eq!(summary.tonnage, 0.0);
        assert_eq!(summary.work, TimeDelta::zero());
        assert_eq!(summary.rest, TimeDelta::zero());
        assert_eq!(summary.low_bpm, None);
        assert_eq!(summary.high_bpm, None);
    }

    #[test]
    fn tonnage_counts_swings_and_get_ups_only() {
        let events = make_events(&[
            (
                Exercise::Squat {
                    reps: 5,
                    weight: 16,
                },
                60,
            ),
            (
                Exercise::Swing {
                    reps: 10,
                    weight: 24,
                    hand: Handedness::Left,
                },
                30,
            ),
            (Exercise::Rest, 60),
            (
                Exercise::GetUp {
                    reps: 1,
                    weight: 24,
                    hand: Handedness::Right,
                },
                45,
            ),
        ]);
        let summary = WorkloadSummary::new(&events, &[]);
        // 10x24 + 1x24, squat excluded
        assert_eq!(summary.tonnage, 264.0);
    }

    #[test]
    fn work_and_rest_split_by_tag() {
        let events = make_events(&[
            (
                Exercise::Swing {
                    reps: 10,
                    weight: 24,
                    hand: Handedness::TwoHanded,
                },
                30,
            ),
            (Exercise::Rest, 90),
            (
                Exercise::Swing {
                    reps: 10,
                    weight: 24,
                    hand: Handedness::TwoHanded,
                },
                30,
            ),
        ]);
        let summary = WorkloadSummary::new(&events, &[]);
        assert_eq!(summary.work, TimeDelta::seconds(60));
        assert_eq!(summary.rest, TimeDelta::seconds(90));

        let session = summary.to_session(NaiveDate::from_ymd_opt(2025, 7, 5).unwrap());
        assert_eq!(session.work_secs, 60.0);
        assert_eq!(session.rest_secs, 90.0);
    }

    #[test]
    fn hr_range_spans_samples() {
        let base = NaiveDate::from_ymd_opt(2025, 7, 5)
            .unwrap()
            .and_hms_opt(7, 30, 0)
            .unwrap();
        let samples: Vec<HrSample> = [92, 145, 161, 138]
            .into_iter()
            .enumerate()
            .map(|(i, bpm)| HrSample {
                time: base + TimeDelta::seconds(i as i64),
                bpm,
            })
            .collect();
        let summary = WorkloadSummary::new(&[], &samples);
        assert_eq!(summary.low_bpm, Some(92));
        assert_eq!(summary.high_bpm, Some(161));
    }

    #[test]
    fn rolling_tonnage_uses_last_five() {
        let sessions: Vec<WorkloadSummary> = [100.0, 200.0, 300.0, 400.0, 500.0, 600.0]
            .into_iter()
            .map(|tonnage| WorkloadSummary {
                tonnage,
                ..Default::default()
            })
            .collect();
        // first session falls outside the window
        assert_eq!(WorkloadSummary::rolling_tonnage(&sessions), 400.0);
        assert_eq!(WorkloadSummary::rolling_tonnage(&sessions[..2]), 150.0);
        assert_eq!(WorkloadSummary::rolling_tonnage(&[]), 0.0);
    }
}
