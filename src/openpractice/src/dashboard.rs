use std::fmt::Display;

use chrono::{NaiveDateTime, TimeDelta};

use openpractice_algos::{
    ReadinessBand, Streak, WeeklyMetrics, WorkloadSummary, helpers::format_hm::FormatHM,
};
use openpractice_entities::sessions;
use openpractice_types::{Practice, PracticeSettings};

use crate::WidgetSnapshot;

/// Weeks of the rollup shown on the terminal dashboard.
const DISPLAY_WEEKS: usize = 4;

/// Everything the dashboard renders, assembled by
/// [`crate::OpenPractice::dashboard`].
#[derive(Debug, Clone)]
pub struct DashboardReport {
    pub snapshot: WidgetSnapshot,
    pub now: NaiveDateTime,
    pub current: Streak,
    pub longest: Streak,
    pub weekly: Vec<WeeklyMetrics>,
    pub rolling_tonnage: f64,
    pub vo2_trend: Vec<(NaiveDateTime, f64)>,
    pub recent: Vec<(sessions::Model, WorkloadSummary)>,
}

impl Display for DashboardReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.snapshot.score {
            Some(score) if !self.snapshot.is_stale(self.now) => writeln!(
                f,
                "Readiness: {score} ({})",
                ReadinessBand::for_score(score).label()
            )?,
            _ => writeln!(f, "Readiness: --")?,
        }
        writeln!(f, "Current streak: {}", describe(&self.current))?;
        writeln!(f, "Longest streak: {}", describe(&self.longest))?;
        writeln!(f, "Rolling tonnage: {:.0}kg", self.rolling_tonnage)?;
        if let Some(((_, first), (_, latest))) = self.vo2_trend.first().zip(self.vo2_trend.last())
        {
            writeln!(f, "VO2max trend: {first:.1} to {latest:.1}")?;
        }

        let from = self.weekly.len().saturating_sub(DISPLAY_WEEKS);
        for week in &self.weekly[from..] {
            let change = match week.change_from_last {
                Some(change) => format!(", ratio {:+.0}%", change * 100.0),
                None => String::new(),
            };
            writeln!(
                f,
                "Week of {}: {} work, {} rest, {:.0}kg{change}",
                week.week_start,
                TimeDelta::seconds(week.work_secs as i64).format_hm(),
                TimeDelta::seconds(week.rest_secs as i64).format_hm(),
                week.tonnage,
            )?;
        }

        if !self.recent.is_empty() {
            writeln!(f, "Recent sessions:")?;
        }
        let settings = PracticeSettings::default();
        for (session, workload) in &self.recent {
            // renamed or retired protocol tags fall back to the raw tag
            let name = Practice::by_name(&session.practice, &settings)
                .map(|p| p.display_name)
                .unwrap_or_else(|_| session.practice.clone());
            let effort = match session.effort {
                Some(effort) if effort > 0 => format!("effort {effort}"),
                _ => "unscored".to_string(),
            };
            writeln!(
                f,
                "  {} {name}: {:.0}kg, {} work, {effort}",
                session.start.format("%Y-%m-%d %H:%M"),
                workload.tonnage,
                workload.work.format_hm(),
            )?;
        }
        Ok(())
    }
}

fn describe(streak: &Streak) -> String {
    let Some((start, end)) = streak.start.zip(streak.end) else {
        return "none".to_string();
    };
    if streak.length == 1 {
        format!("1 day ({end})")
    } else {
        format!("{} days ({start} to {end})", streak.length)
    }
}
