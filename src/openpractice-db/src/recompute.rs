use std::fmt;

use indicatif::ProgressBar;
use openpractice_algos::{EffortEstimator, EffortInput};
use openpractice_types::{ActivityKind, Practice, PracticeSettings, keys};

use crate::progress::bar_style;
use crate::{DatabaseHandler, SampleRange};

/// Re-scores every stored session against the current effort model and
/// the configured age, writing only the rows whose score moved.
pub struct EffortRecompute<'a> {
    db: &'a DatabaseHandler,
}

pub struct RecomputeReport {
    pub scored: usize,
    pub unchanged: usize,
}

impl fmt::Display for RecomputeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Recompute complete:")?;
        writeln!(f, "  scored:    {}", self.scored)?;
        write!(f, "  unchanged: {}", self.unchanged)
    }
}

impl<'a> EffortRecompute<'a> {
    pub fn new(db: &'a DatabaseHandler) -> Self {
        Self { db }
    }

    pub async fn run(&self) -> anyhow::Result<RecomputeReport> {
        let age = self.db.kv_get_i64(keys::USER_AGE).await?;
        let sessions = self.db.sessions_between(SampleRange::default()).await?;

        let pb = ProgressBar::new(sessions.len() as u64);
        pb.set_style(bar_style());
        pb.set_prefix("effort");

        let mut scored = 0usize;
        let mut unchanged = 0usize;

        for session in sessions {
            let samples = self
                .db
                .heart_rate_in(SampleRange::between(session.start, session.end))
                .await?;
            let kind = Practice::by_name(&session.practice, &PracticeSettings::default())
                .map(|p| p.kind)
                .unwrap_or(ActivityKind::Traditional);
            let duration_secs = (session.end - session.start).num_milliseconds() as f64 / 1000.0;

            let effort = EffortEstimator::estimate(&EffortInput {
                samples: &samples,
                active_kcal: session.kcal,
                duration_secs,
                kind,
                age,
            });

            if session.effort == Some(effort) {
                unchanged += 1;
            } else {
                self.db.set_session_effort(session.id, effort).await?;
                scored += 1;
            }
            pb.inc(1);
        }

        pb.finish();
        let report = RecomputeReport { scored, unchanged };
        println!("{report}");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PracticeRecord;
    use chrono::NaiveDate;
    use openpractice_types::HrSample;
    use uuid::Uuid;

    fn make_session(db_start_hour: u32) -> PracticeRecord {
        let start = NaiveDate::from_ymd_opt(2025, 8, 20)
            .unwrap()
            .and_hms_opt(db_start_hour, 0, 0)
            .unwrap();
        PracticeRecord {
            id: Uuid::new_v4(),
            start,
            end: start + chrono::TimeDelta::minutes(30),
            practice: Practice::SIMPLE_AND_SINISTER.to_string(),
            kcal: 250.0,
            avg_bpm: 140,
            effort: None,
            events: Vec::new(),
        }
    }

    async fn seed_samples(db: &DatabaseHandler, start_hour: u32) {
        let start = NaiveDate::from_ymd_opt(2025, 8, 20)
            .unwrap()
            .and_hms_opt(start_hour, 0, 0)
            .unwrap();
        for i in 0..60 {
            db.create_heart_rate(HrSample {
                time: start + chrono::TimeDelta::seconds(i * 10),
                bpm: 140,
            })
            .await
            .unwrap();
        }
    }

    #[tokio::test]
    async fn scores_unscored_sessions() {
        let db = DatabaseHandler::new("sqlite::memory:").await;
        db.kv_set_i64(keys::USER_AGE, 40).await.unwrap();
        db.create_session(make_session(17)).await.unwrap();
        seed_samples(&db, 17).await;

        let report = EffortRecompute::new(&db).run().await.unwrap();
        assert_eq!(report.scored, 1);
        assert_eq!(report.unchanged, 0);

        let sessions = db.sessions_between(SampleRange::default()).await.unwrap();
        let effort = sessions[0].effort.unwrap();
        assert!(effort > 0, "140 bpm at age 40 is well into zone 3");
    }

    #[tokio::test]
    async fn second_pass_changes_nothing() {
        let db = DatabaseHandler::new("sqlite::memory:").await;
        db.kv_set_i64(keys::USER_AGE, 40).await.unwrap();
        db.create_session(make_session(17)).await.unwrap();
        seed_samples(&db, 17).await;

        EffortRecompute::new(&db).run().await.unwrap();
        let report = EffortRecompute::new(&db).run().await.unwrap();

        assert_eq!(report.scored, 0);
        assert_eq!(report.unchanged, 1);
    }

    #[tokio::test]
    async fn without_age_sessions_stay_at_zero() {
        let db = DatabaseHandler::new("sqlite::memory:").await;
        db.create_session(make_session(17)).await.unwrap();
        seed_samples(&db, 17).await;

        EffortRecompute::new(&db).run().await.unwrap();

        let sessions = db.sessions_between(SampleRange::default()).await.unwrap();
        assert_eq!(sessions[0].effort, Some(0));
    }
}
