use chrono::{NaiveDate, NaiveDateTime};

use openpractice_algos::{
    LoggedExercise, StreakAnalyzer, Vo2MaxTrend, WeeklyAnalyzer, WorkloadSummary,
};
use openpractice_db::{DatabaseHandler, SampleRange};
use openpractice_entities::sessions;
use openpractice_types::{Exercise, PracticeSettings, keys};

use crate::{DashboardReport, WidgetSnapshot};

/// Read side of the app. History, settings and the dashboard all go
/// through here; the live session and readiness pipelines have their
/// own entry points.
pub struct OpenPractice {
    pub database: DatabaseHandler,
}

impl OpenPractice {
    /// VO2max estimates fed into the trend smoother.
    pub const VO2_TREND_SAMPLES: u64 = 30;
    /// History rows shown on the dashboard.
    pub const DASHBOARD_RECENT: usize = 5;

    pub fn new(database: DatabaseHandler) -> Self {
        Self { database }
    }

    /// Decodes the activity boundaries of a recorded session. A row
    /// whose metadata no longer parses is skipped so one bad event
    /// cannot hide the rest of the session.
    pub async fn logged_exercises(
        &self,
        session: &sessions::Model,
    ) -> anyhow::Result<Vec<LoggedExercise>> {
        let events = self.database.session_events(session.id).await?;

        let mut logged = Vec::with_capacity(events.len());
        for event in events {
            match Exercise::from_metadata(&event.exercise) {
                Ok(exercise) => logged.push(LoggedExercise {
                    exercise,
                    segment: event.segment,
                    start: event.start,
                    end: event.end,
                }),
                Err(error) => {
                    debug!(
                        "skipping event {} of session {}: {error}",
                        event.id, session.id
                    );
                }
            }
        }
        Ok(logged)
    }

    pub async fn workload_for(
        &self,
        session: &sessions::Model,
    ) -> anyhow::Result<WorkloadSummary> {
        let events = self.logged_exercises(session).await?;
        let samples = self
            .database
            .heart_rate_in(SampleRange::between(session.start, session.end))
            .await?;
        Ok(WorkloadSummary::new(&events, &samples))
    }

    /// Every catalog session with its workload totals, oldest first.
    pub async fn session_workloads(
        &self,
    ) -> anyhow::Result<Vec<(sessions::Model, WorkloadSummary)>> {
        let sessions = self
            .database
            .sessions_between(SampleRange::default())
            .await?;

        let mut out = Vec::with_capacity(sessions.len());
        for session in sessions {
            let workload = self.workload_for(&session).await?;
            out.push((session, workload));
        }
        Ok(out)
    }

    /// Stored weights the catalog no longer accepts are ignored, the
    /// defaults stand in for them.
    pub async fn load_settings(&self) -> anyhow::Result<PracticeSettings> {
        let mut settings = PracticeSettings::default();
        for key in PracticeSettings::weight_keys() {
            let Some(stored) = self.database.kv_get_i64(key).await? else {
                continue;
            };
            let weight = u32::try_from(stored).unwrap_or_default();
            if let Err(error) = settings.set_weight(key, weight) {
                warn!("ignoring stored weight for {key}: {error}");
            }
        }
        if let Some(two_handed) = self.database.kv_get_bool(keys::TWO_HANDED_SWINGS).await? {
            settings.two_handed_swings = two_handed;
        }
        Ok(settings)
    }

    pub async fn save_settings(&self, settings: &PracticeSettings) -> anyhow::Result<()> {
        for key in PracticeSettings::weight_keys() {
            let weight = settings.weight(key)?;
            self.database.kv_set_i64(key, i64::from(weight)).await?;
        }
        self.database
            .kv_set_bool(keys::TWO_HANDED_SWINGS, settings.two_handed_swings)
            .await?;
        Ok(())
    }

    /// Assembles the dashboard in one pass: readiness snapshot, streaks,
    /// weekly rollup, rolling tonnage, VO2max trend and recent history.
    pub async fn dashboard(&self, now: NaiveDateTime) -> anyhow::Result<DashboardReport> {
        let snapshot = WidgetSnapshot::load(&self.database).await;
        let sessions = self.session_workloads().await?;

        let days: Vec<NaiveDate> = sessions.iter().map(|(s, _)| s.start.date()).collect();
        let current = StreakAnalyzer::current(&days, now.date());
        let longest = StreakAnalyzer::longest(&days);

        let per_session: Vec<_> = sessions
            .iter()
            .map(|(session, workload)| workload.to_session(session.start.date()))
            .collect();
        let weekly = WeeklyAnalyzer::smooth(&WeeklyAnalyzer::group(&per_session));

        let summaries: Vec<WorkloadSummary> =
            sessions.iter().map(|(_, workload)| workload.clone()).collect();
        let rolling_tonnage = WorkloadSummary::rolling_tonnage(&summaries);

        let estimates = self
            .database
            .vo2_max_samples(Self::VO2_TREND_SAMPLES)
            .await?;
        let vo2_trend = Vo2MaxTrend::rolling(&estimates);

        let recent: Vec<(sessions::Model, WorkloadSummary)> = sessions
            .into_iter()
            .rev()
            .take(Self::DASHBOARD_RECENT)
            .collect();

        Ok(DashboardReport {
            snapshot,
            now,
            current,
            longest,
            weekly,
            rolling_tonnage,
            vo2_trend,
            recent,
        })
    }
}
