use chrono::{NaiveDateTime, TimeDelta};

use openpractice_db::RecordedEvent;
use openpractice_types::{ActivityKind, Exercise, HrSample};

use crate::{SensorOutcome, SensorSession};

const WORK_BPM: i16 = 150;
const REST_BPM: i16 = 105;
const WOBBLE: [i16; 6] = [-4, 3, -1, 5, 0, -3];
const SAMPLE_EVERY_SECS: i64 = 5;
const KCAL_PER_ACTIVE_MIN: f64 = 9.0;

struct OpenBoundary {
    segment: String,
    exercise: Exercise,
    start: NaiveDateTime,
}

/// Synthetic recorder for sessions run from the terminal: fabricates a
/// plausible heart-rate trace and energy figure instead of talking to a
/// device. Every boundary lasts one fixed step of the synthetic clock.
pub struct SimulatedSensor {
    clock: NaiveDateTime,
    step: TimeDelta,
    started_at: Option<NaiveDateTime>,
    open: Option<OpenBoundary>,
    events: Vec<RecordedEvent>,
    samples: Vec<HrSample>,
    kcal: f64,
}

impl SimulatedSensor {
    pub fn new(start: NaiveDateTime, seconds_per_exercise: u64) -> Self {
        Self {
            clock: start,
            step: TimeDelta::seconds(seconds_per_exercise as i64),
            started_at: None,
            open: None,
            events: Vec::new(),
            samples: Vec::new(),
            kcal: 0.0,
        }
    }

    fn close_open(&mut self) {
        let Some(open) = self.open.take() else {
            return;
        };

        let target = if open.exercise.is_rest() {
            REST_BPM
        } else {
            WORK_BPM
        };
        let mut time = open.start;
        let mut index = self.samples.len();
        while time < self.clock {
            self.samples.push(HrSample {
                time,
                bpm: target + WOBBLE[index % WOBBLE.len()],
            });
            time += TimeDelta::seconds(SAMPLE_EVERY_SECS);
            index += 1;
        }

        if !open.exercise.is_rest() {
            let minutes = (self.clock - open.start).num_seconds() as f64 / 60.0;
            self.kcal += minutes * KCAL_PER_ACTIVE_MIN;
        }

        self.events.push(RecordedEvent {
            segment: open.segment,
            exercise: open.exercise,
            start: open.start,
            end: self.clock,
        });
    }
}

impl SensorSession for SimulatedSensor {
    async fn start(&mut self, _kind: ActivityKind) -> anyhow::Result<()> {
        self.started_at = Some(self.clock);
        Ok(())
    }

    async fn tag(&mut self, segment: &str, exercise: Exercise) -> anyhow::Result<()> {
        if self.open.is_some() {
            self.clock += self.step;
            self.close_open();
        }
        self.open = Some(OpenBoundary {
            segment: segment.to_string(),
            exercise,
            start: self.clock,
        });
        Ok(())
    }

    // the synthetic clock only moves on boundaries, there is nothing to stop
    async fn pause(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn resume(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn end(&mut self) -> anyhow::Result<SensorOutcome> {
        if self.open.is_some() {
            self.clock += self.step;
            self.close_open();
        }

        let start = self.started_at.take().unwrap_or(self.clock);
        Ok(SensorOutcome {
            start,
            end: self.clock,
            events: std::mem::take(&mut self.events),
            samples: std::mem::take(&mut self.samples),
            kcal: std::mem::take(&mut self.kcal),
        })
    }
}
