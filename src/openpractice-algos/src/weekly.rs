use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, TimeDelta};

use crate::helpers::time_math::mean;

/// Per-session workload feeding the weekly rollup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionWorkload {
    pub date: NaiveDate,
    pub work_secs: f64,
    pub rest_secs: f64,
    pub tonnage: f64,
}

/// One ISO week of training. Tonnage is the average over sessions that
/// actually moved weight, so stretch days do not drag it down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeeklyMetrics {
    pub week_start: NaiveDate,
    pub work_secs: f64,
    pub rest_secs: f64,
    pub tonnage: f64,
    pub change_from_last: Option<f64>,
}

impl WeeklyMetrics {
    /// Share of session time spent working, 0 when the week is empty.
    pub fn ratio(&self) -> f64 {
        let total = self.work_secs + self.rest_secs;
        if total == 0.0 { 0.0 } else { self.work_secs / total }
    }
}

pub struct WeeklyAnalyzer;

impl WeeklyAnalyzer {
    /// Trailing window of the ratio smoother.
    pub const SMOOTHING_WINDOW: usize = 2;

    pub fn week_start(date: NaiveDate) -> NaiveDate {
        date - TimeDelta::days(i64::from(date.weekday().num_days_from_monday()))
    }

    /// Groups sessions into ascending ISO weeks and computes the ratio
    /// change against the week before.
    pub fn group(sessions: &[SessionWorkload]) -> Vec<WeeklyMetrics> {
        let mut by_week: BTreeMap<NaiveDate, Vec<&SessionWorkload>> = BTreeMap::new();
        for session in sessions {
            by_week
                .entry(Self::week_start(session.date))
                .or_default()
                .push(session);
        }

        let mut weeks: Vec<WeeklyMetrics> = Vec::with_capacity(by_week.len());
        for (week_start, sessions) in by_week {
            let work_secs = sessions.iter().map(|s| s.work_secs).sum();
            let rest_secs = sessions.iter().map(|s| s.rest_secs).sum();
            let loaded: Vec<f64> = sessions
                .iter()
                .map(|s| s.tonnage)
                .filter(|t| *t > 0.0)
                .collect();
            let tonnage = mean(&loaded);

            let mut week = WeeklyMetrics {
                week_start,
                work_secs,
                rest_secs,
                tonnage,
                change_from_last: None,
            };
            if let Some(previous) = weeks.last() {
                week.change_from_last = Some(week.ratio() - previous.ratio());
            }
            weeks.push(week);
        }
        weeks
    }

    /// Smooths the work/rest ratio with a trailing mean and rebuilds each
    /// week's split from the smoothed ratio. Weekly totals are preserved.
    pub fn smooth(weekly: &[WeeklyMetrics]) -> Vec<WeeklyMetrics> {
        let mut out: Vec<WeeklyMetrics> = Vec::with_capacity(weekly.len());
        for (i, week) in weekly.iter().enumerate() {
            let from = (i + 1).saturating_sub(Self::SMOOTHING_WINDOW);
            let ratios: Vec<f64> = weekly[from..=i].iter().map(WeeklyMetrics::ratio).collect();
            let avg_ratio = mean(&ratios);
            let total = week.work_secs + week.rest_secs;

            let change_from_last = if i > 0 {
                Some(avg_ratio - out[i - 1].ratio())
            } else {
                None
            };

            out.push(WeeklyMetrics {
                week_start: week.week_start,
                work_secs: avg_ratio * total,
                rest_secs: (1.0 - avg_ratio) * total,
                tonnage: week.tonnage,
                change_from_last,
            });
        }
        out
    }
}
