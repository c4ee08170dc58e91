use chrono::NaiveDateTime;
use uuid::Uuid;

use openpractice_algos::{EffortEstimator, EffortInput, LoggedExercise, WorkloadSummary};
use openpractice_db::{DatabaseHandler, PracticeRecord, RecordedEvent};
use openpractice_types::{
    ActivityKind, Exercise, HrSample, Practice, PracticeSegment, PracticeSettings, keys,
};

/// Ticks shown before the sensor starts recording.
pub const COUNTDOWN_TICKS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    AwaitingSettings,
    Countdown,
    Running { segment: usize, exercise: usize },
    Paused { segment: usize, exercise: usize },
    Ending,
    Summary,
}

/// Recording side of a guided session. The sensor owns the clock: every
/// boundary is stamped when the recorder processes it, so the resulting
/// event log is consistent even if the UI lags.
#[allow(async_fn_in_trait)]
pub trait SensorSession {
    async fn start(&mut self, kind: ActivityKind) -> anyhow::Result<()>;
    async fn tag(&mut self, segment: &str, exercise: Exercise) -> anyhow::Result<()>;
    async fn pause(&mut self) -> anyhow::Result<()>;
    async fn resume(&mut self) -> anyhow::Result<()>;
    async fn end(&mut self) -> anyhow::Result<SensorOutcome>;
}

/// Everything the recorder hands back when a session ends.
#[derive(Debug, Clone, Default)]
pub struct SensorOutcome {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub events: Vec<RecordedEvent>,
    pub samples: Vec<HrSample>,
    pub kcal: f64,
}

#[derive(Debug, Clone)]
pub struct FinishedPractice {
    pub record: PracticeRecord,
    pub workload: WorkloadSummary,
}

/// Guided-session state machine. The caller drives exercise boundaries,
/// the machine keeps phase transitions legal and forwards boundary tags
/// to the sensor. Calls that make no sense in the current phase are
/// ignored rather than being errors, double taps must be harmless.
pub struct PracticeSession<S> {
    database: DatabaseHandler,
    sensor: S,
    phase: SessionPhase,
    practice: Option<Practice>,
    outcome: Option<FinishedPractice>,
}

impl<S: SensorSession> PracticeSession<S> {
    pub fn new(database: DatabaseHandler, sensor: S) -> Self {
        Self {
            database,
            sensor,
            phase: SessionPhase::Idle,
            practice: None,
            outcome: None,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn practice(&self) -> Option<&Practice> {
        self.practice.as_ref()
    }

    pub fn outcome(&self) -> Option<&FinishedPractice> {
        self.outcome.as_ref()
    }

    /// Picks the protocol. Configurable ones stop for a settings step,
    /// the rest go straight to the countdown.
    pub fn select(&mut self, practice: Practice) {
        self.phase = if practice.requires_settings {
            SessionPhase::AwaitingSettings
        } else {
            SessionPhase::Countdown
        };
        self.practice = Some(practice);
        self.outcome = None;
    }

    /// Rebuilds the selected protocol with the confirmed loads.
    pub fn confirm_settings(&mut self, settings: &PracticeSettings) -> anyhow::Result<()> {
        if self.phase != SessionPhase::AwaitingSettings {
            return Ok(());
        }
        let Some(practice) = &self.practice else {
            return Ok(());
        };
        self.practice = Some(Practice::by_name(&practice.name, settings)?);
        self.phase = SessionPhase::Countdown;
        Ok(())
    }

    /// Starts recording at the first boundary. A sensor that will not
    /// start drops the session back to idle rather than running an
    /// untracked practice.
    pub async fn begin(&mut self) -> anyhow::Result<()> {
        if self.phase != SessionPhase::Countdown {
            return Ok(());
        }
        let Some(kind) = self.practice.as_ref().map(|p| p.kind) else {
            return Ok(());
        };

        if let Err(error) = self.sensor.start(kind).await {
            error!("sensor refused to start: {error:#}");
            self.phase = SessionPhase::Idle;
            self.practice = None;
            return Ok(());
        }

        self.tag_boundary(0, 0).await?;
        self.phase = SessionPhase::Running {
            segment: 0,
            exercise: 0,
        };
        Ok(())
    }

    /// Moves to the next exercise boundary. Running off the end of the
    /// last segment parks the session at `Ending` for the finish step.
    pub async fn advance(&mut self) -> anyhow::Result<()> {
        let SessionPhase::Running { segment, exercise } = self.phase else {
            return Ok(());
        };
        let Some(practice) = &self.practice else {
            return Ok(());
        };

        let segment_len = practice
            .segments
            .get(segment)
            .map_or(0, PracticeSegment::len);
        let (next_segment, next_exercise) = if exercise + 1 < segment_len {
            (segment, exercise + 1)
        } else if segment + 1 < practice.segments.len() {
            (segment + 1, 0)
        } else {
            self.phase = SessionPhase::Ending;
            return Ok(());
        };

        self.tag_boundary(next_segment, next_exercise).await?;
        self.phase = SessionPhase::Running {
            segment: next_segment,
            exercise: next_exercise,
        };
        Ok(())
    }

    pub async fn pause(&mut self) -> anyhow::Result<()> {
        if let SessionPhase::Running { segment, exercise } = self.phase {
            self.sensor.pause().await?;
            self.phase = SessionPhase::Paused { segment, exercise };
        }
        Ok(())
    }

    pub async fn resume(&mut self) -> anyhow::Result<()> {
        if let SessionPhase::Paused { segment, exercise } = self.phase {
            self.sensor.resume().await?;
            self.phase = SessionPhase::Running { segment, exercise };
        }
        Ok(())
    }

    pub async fn toggle_pause(&mut self) -> anyhow::Result<()> {
        match self.phase {
            SessionPhase::Running { .. } => self.pause().await,
            SessionPhase::Paused { .. } => self.resume().await,
            _ => Ok(()),
        }
    }

    /// Ends the recording, scores the effort, and persists the session.
    /// The workload summary is computed either way: a failed insert
    /// costs the history row, not the summary screen.
    pub async fn finish(&mut self) -> anyhow::Result<()> {
        if self.phase != SessionPhase::Ending {
            return Ok(());
        }
        let Some(practice) = self.practice.take() else {
            return Ok(());
        };

        let outcome = self.sensor.end().await?;

        let avg_bpm = if outcome.samples.is_empty() {
            0
        } else {
            let total: i64 = outcome.samples.iter().map(|s| i64::from(s.bpm)).sum();
            (total / outcome.samples.len() as i64) as i16
        };
        let duration_secs = (outcome.end - outcome.start).num_milliseconds() as f64 / 1000.0;

        // effort 0 means unscored, recompute picks it up once an age is set
        let effort = match self.database.kv_get_i64(keys::USER_AGE).await {
            Ok(age) => EffortEstimator::estimate(&EffortInput {
                samples: &outcome.samples,
                active_kcal: outcome.kcal,
                duration_secs,
                kind: practice.kind,
                age,
            }),
            Err(error) => {
                error!("could not read the configured age: {error:#}");
                0
            }
        };

        let logged: Vec<LoggedExercise> = outcome
            .events
            .iter()
            .map(|event| LoggedExercise {
                exercise: event.exercise,
                segment: event.segment.clone(),
                start: event.start,
                end: event.end,
            })
            .collect();
        let workload = WorkloadSummary::new(&logged, &outcome.samples);

        let record = PracticeRecord {
            id: Uuid::new_v4(),
            start: outcome.start,
            end: outcome.end,
            practice: practice.name,
            kcal: outcome.kcal,
            avg_bpm,
            effort: Some(effort),
            events: outcome.events,
        };
        if let Err(error) = self.database.create_session(record.clone()).await {
            error!("failed to persist the session: {error:#}");
        }

        self.outcome = Some(FinishedPractice { record, workload });
        self.phase = SessionPhase::Summary;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.phase = SessionPhase::Idle;
        self.practice = None;
        self.outcome = None;
    }

    /// The boundary the session is sitting at, for display.
    pub fn current_exercise(&self) -> Option<(&str, &Exercise)> {
        let (segment, exercise) = match self.phase {
            SessionPhase::Running { segment, exercise }
            | SessionPhase::Paused { segment, exercise } => (segment, exercise),
            _ => return None,
        };
        let practice = self.practice.as_ref()?;
        let found = practice.segments.get(segment)?;
        let exercise = found.exercises.get(exercise)?;
        Some((found.name.as_str(), exercise))
    }

    async fn tag_boundary(&mut self, segment: usize, exercise: usize) -> anyhow::Result<()> {
        let Some(practice) = &self.practice else {
            return Ok(());
        };
        let Some(found) = practice.segments.get(segment) else {
            return Ok(());
        };
        let Some(exercise) = found.exercises.get(exercise).copied() else {
            return Ok(());
        };
        let name = found.name.clone();
        self.sensor.tag(&name, exercise).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use anyhow::bail;
    use chrono::{NaiveDate, TimeDelta};
    use openpractice_types::Handedness;

    use super::*;

    #[derive(Default)]
    struct SensorInner {
        started: Option<ActivityKind>,
        fail_start: bool,
        paused: u32,
        resumed: u32,
        tags: Vec<(String, Exercise)>,
        clock: NaiveDateTime,
    }

    #[derive(Clone)]
    struct ScriptedSensor {
        inner: Arc<Mutex<SensorInner>>,
    }

    impl ScriptedSensor {
        fn new(clock: NaiveDateTime) -> Self {
            Self {
                inner: Arc::new(Mutex::new(SensorInner {
                    clock,
                    ..SensorInner::default()
                })),
            }
        }

        fn tags(&self) -> Vec<(String, Exercise)> {
            self.inner.lock().unwrap().tags.clone()
        }
    }

    impl SensorSession for ScriptedSensor {
        async fn start(&mut self, kind: ActivityKind) -> anyhow::Result<()> {
            let mut inner = self.inner.lock().unwrap();
            if inner.fail_start {
                bail!("no recorder available");
            }
            inner.started = Some(kind);
            Ok(())
        }

        async fn tag(&mut self, segment: &str, exercise: Exercise) -> anyhow::Result<()> {
            self.inner
                .lock()
                .unwrap()
                .tags
                .push((segment.to_string(), exercise));
            Ok(())
        }

        async fn pause(&mut self) -> anyhow::Result<()> {
            self.inner.lock().unwrap().paused += 1;
            Ok(())
        }

        async fn resume(&mut self) -> anyhow::Result<()> {
            self.inner.lock().unwrap().resumed += 1;
            Ok(())
        }

        /// One minute per tagged boundary, a flat 140bpm trace.
        async fn end(&mut self) -> anyhow::Result<SensorOutcome> {
            let inner = self.inner.lock().unwrap();
            let start = inner.clock;
            let step = TimeDelta::minutes(1);
            let events: Vec<RecordedEvent> = inner
                .tags
                .iter()
                .enumerate()
                .map(|(i, (segment, exercise))| RecordedEvent {
                    segment: segment.clone(),
                    exercise: *exercise,
                    start: start + step * i as i32,
                    end: start + step * (i as i32 + 1),
                })
                .collect();
            let end = start + step * inner.tags.len() as i32;
            let samples = (0..=inner.tags.len() as i32)
                .map(|i| HrSample {
                    time: start + step * i,
                    bpm: 140,
                })
                .collect();
            Ok(SensorOutcome {
                start,
                end,
                events,
                samples,
                kcal: 80.0,
            })
        }
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 8, 20)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn swing() -> Exercise {
        Exercise::Swing {
            reps: 10,
            weight: 24,
            hand: Handedness::Left,
        }
    }

    fn get_up() -> Exercise {
        Exercise::GetUp {
            reps: 1,
            weight: 32,
            hand: Handedness::Left,
        }
    }

    fn tiny_practice() -> Practice {
        Practice {
            name: "Tiny".to_string(),
            display_name: "Tiny".to_string(),
            kind: ActivityKind::Hiit,
            requires_settings: false,
            segments: vec![
                PracticeSegment::new("First", 0, vec![swing(), Exercise::Rest]),
                PracticeSegment::new("Second", 1, vec![get_up()]),
            ],
        }
    }

    #[tokio::test]
    async fn walks_every_boundary_then_parks_at_ending() {
        let db = DatabaseHandler::new("sqlite::memory:").await;
        let sensor = ScriptedSensor::new(at(9, 0));
        let mut session = PracticeSession::new(db, sensor.clone());

        session.select(tiny_practice());
        assert_eq!(session.phase(), SessionPhase::Countdown);
        session.begin().await.unwrap();
        assert_eq!(
            session.phase(),
            SessionPhase::Running {
                segment: 0,
                exercise: 0
            }
        );
        assert_eq!(
            sensor.inner.lock().unwrap().started,
            Some(ActivityKind::Hiit)
        );
        let (segment, exercise) = session.current_exercise().unwrap();
        assert_eq!(segment, "First");
        assert!(!exercise.is_rest());

        session.advance().await.unwrap();
        assert_eq!(
            session.phase(),
            SessionPhase::Running {
                segment: 0,
                exercise: 1
            }
        );
        session.advance().await.unwrap();
        assert_eq!(
            session.phase(),
            SessionPhase::Running {
                segment: 1,
                exercise: 0
            }
        );
        session.advance().await.unwrap();
        assert_eq!(session.phase(), SessionPhase::Ending);
        assert!(session.current_exercise().is_none());

        let tags = sensor.tags();
        assert_eq!(tags.len(), 3);
        assert_eq!(tags[0].0, "First");
        assert_eq!(tags[1].1, Exercise::Rest);
        assert_eq!(tags[2].0, "Second");
    }

    #[tokio::test]
    async fn settings_step_rebuilds_the_protocol() {
        let db = DatabaseHandler::new("sqlite::memory:").await;
        let mut session = PracticeSession::new(db, ScriptedSensor::new(at(9, 0)));
        let defaults = PracticeSettings::default();

        session.select(Practice::simple_and_sinister(&defaults));
        assert_eq!(session.phase(), SessionPhase::AwaitingSettings);

        // begin is a no-op until the loads are confirmed
        session.begin().await.unwrap();
        assert_eq!(session.phase(), SessionPhase::AwaitingSettings);

        let heavier = PracticeSettings {
            swing_weight: 32,
            ..defaults
        };
        session.confirm_settings(&heavier).unwrap();
        assert_eq!(session.phase(), SessionPhase::Countdown);
        let practice = session.practice().unwrap();
        assert_eq!(practice.segments[1].exercises[0].weight(), Some(32));
    }

    #[tokio::test]
    async fn refused_sensor_drops_back_to_idle() {
        let db = DatabaseHandler::new("sqlite::memory:").await;
        let sensor = ScriptedSensor::new(at(9, 0));
        sensor.inner.lock().unwrap().fail_start = true;
        let mut session = PracticeSession::new(db, sensor.clone());

        session.select(tiny_practice());
        session.begin().await.unwrap();

        assert_eq!(session.phase(), SessionPhase::Idle);
        assert!(session.practice().is_none());
        assert!(sensor.tags().is_empty());
    }

    #[tokio::test]
    async fn pause_blocks_advances_until_resume() {
        let db = DatabaseHandler::new("sqlite::memory:").await;
        let sensor = ScriptedSensor::new(at(9, 0));
        let mut session = PracticeSession::new(db, sensor.clone());
        session.select(tiny_practice());
        session.begin().await.unwrap();

        session.toggle_pause().await.unwrap();
        assert_eq!(
            session.phase(),
            SessionPhase::Paused {
                segment: 0,
                exercise: 0
            }
        );
        session.advance().await.unwrap();
        assert_eq!(
            session.phase(),
            SessionPhase::Paused {
                segment: 0,
                exercise: 0
            }
        );

        session.toggle_pause().await.unwrap();
        assert_eq!(
            session.phase(),
            SessionPhase::Running {
                segment: 0,
                exercise: 0
            }
        );
        assert_eq!(sensor.inner.lock().unwrap().paused, 1);
        assert_eq!(sensor.inner.lock().unwrap().resumed, 1);
    }

    #[tokio::test]
    async fn finish_persists_and_scores_the_session() {
        let db = DatabaseHandler::new("sqlite::memory:").await;
        db.kv_set_i64(keys::USER_AGE, 40).await.unwrap();
        let sensor = ScriptedSensor::new(at(9, 0));
        let mut session = PracticeSession::new(db.clone(), sensor);

        // history queries filter on catalog tags, so store a real one
        let mut practice = tiny_practice();
        practice.name = Practice::SIMPLE_AND_SINISTER.to_string();
        session.select(practice);
        session.begin().await.unwrap();
        while session.phase() != SessionPhase::Ending {
            session.advance().await.unwrap();
        }
        session.finish().await.unwrap();
        assert_eq!(session.phase(), SessionPhase::Summary);

        let finished = session.outcome().unwrap();
        assert!(
            finished.record.effort.unwrap() > 0,
            "140bpm at age 40 is well past zone one"
        );
        assert_eq!(finished.record.avg_bpm, 140);
        assert!(finished.workload.tonnage > 0.0);

        let stored = db.recent_sessions(1).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].practice, Practice::SIMPLE_AND_SINISTER);
        let events = db.session_events(stored[0].id).await.unwrap();
        assert_eq!(events.len(), 3);

        session.reset();
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert!(session.outcome().is_none());
    }

    #[tokio::test]
    async fn finish_without_an_age_leaves_the_session_unscored() {
        let db = DatabaseHandler::new("sqlite::memory:").await;
        let mut session = PracticeSession::new(db, ScriptedSensor::new(at(9, 0)));

        session.select(tiny_practice());
        session.begin().await.unwrap();
        while session.phase() != SessionPhase::Ending {
            session.advance().await.unwrap();
        }
        session.finish().await.unwrap();

        assert_eq!(session.outcome().unwrap().record.effort, Some(0));
    }
}
