use std::collections::BTreeSet;

use chrono::{NaiveDate, TimeDelta};

/// Practice streaks with a tolerance budget: a run stays alive as long as
/// every full week inside it has at most [`StreakAnalyzer::MAX_MISSED_PER_WEEK`]
/// missed days. Length counts distinct practice days, not span days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Streak {
    pub length: usize,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

pub struct StreakAnalyzer;

impl StreakAnalyzer {
    pub const MAX_MISSED_PER_WEEK: usize = 2;
    /// A current streak dies once the last session is older than this.
    pub const GRACE_DAYS: i64 = 2;

    pub fn longest(days: &[NaiveDate]) -> Streak {
        let days = Self::distinct_sorted(days);
        let Some(&most_recent) = days.last() else {
            return Streak::default();
        };
        let set: BTreeSet<NaiveDate> = days.iter().copied().collect();

        let mut best = Streak {
            length: 1,
            start: Some(most_recent),
            end: Some(most_recent),
        };
        for i in 0..days.len() {
            let mut j = i;
            while j + 1 < days.len() && Self::span_compliant(days[i], days[j + 1], &set) {
                j += 1;
            }
            let length = j - i + 1;
            if length > best.length {
                best = Streak {
                    length,
                    start: Some(days[i]),
                    end: Some(days[j]),
                };
            }
        }
        best
    }

    pub fn current(days: &[NaiveDate], today: NaiveDate) -> Streak {
        let days = Self::distinct_sorted(days);
        let Some(&last) = days.last() else {
            return Streak::default();
        };
        if (today - last).num_days() > Self::GRACE_DAYS {
            return Streak::default();
        }
        let set: BTreeSet<NaiveDate> = days.iter().copied().collect();

        let mut i = days.len() - 1;
        while i > 0 && Self::span_compliant(days[i - 1], last, &set) {
            i -= 1;
        }
        Streak {
            length: days.len() - i,
            start: Some(days[i]),
            end: Some(last),
        }
    }

    /// Every 7-day window lying fully inside `[first, last]` may miss at
    /// most [`Self::MAX_MISSED_PER_WEEK`] days. Spans shorter than a week
    /// are always compliant.
    fn span_compliant(first: NaiveDate, last: NaiveDate, set: &BTreeSet<NaiveDate>) -> bool {
        first
            .iter_days()
            .take_while(|ws| *ws + TimeDelta::days(6) <= last)
            .all(|ws| {
                let missed = ws
                    .iter_days()
                    .take(7)
                    .filter(|d| !set.contains(d))
                    .count();
                missed <= Self::MAX_MISSED_PER_WEEK
            })
    }

    fn distinct_sorted(days: &[NaiveDate]) -> Vec<NaiveDate> {
        let mut days: Vec<NaiveDate> = days.to_vec();
        days.sort();
        days.dedup();
        days
    }
}
