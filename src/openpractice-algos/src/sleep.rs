use chrono::{Duration, NaiveDate, NaiveDateTime, TimeDelta};

use openpractice_types::{HrSample, SleepStageKind, StageSample};

/// Overnight sleep reconstruction from staged samples, with a heart-rate
/// fallback for nights where the wearable recorded no staging.
pub struct SleepAnalyzer;

/// Merged run of asleep stages. `weighted_secs` accumulates each stage's
/// duration times its stage weight, so restorative phases count for more.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SleepBlock {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub weighted_secs: f64,
}

impl SleepBlock {
    pub fn actual_hours(&self) -> f64 {
        (self.end - self.start).num_seconds() as f64 / 3600.0
    }

    pub fn effective_hours(&self) -> f64 {
        self.weighted_secs / 3600.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SleepSource {
    Stages,
    HeartRate,
    Average,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SleepSummary {
    pub actual_hours: f64,
    pub effective_hours: f64,
    pub source: SleepSource,
    /// The block the figures came from, absent on fallback paths.
    pub primary: Option<SleepBlock>,
}

impl SleepAnalyzer {
    /// Stage gaps of this length or more split the night into separate
    /// blocks.
    pub const MAX_STAGE_GAP: Duration = Duration::minutes(20);
    /// Heart-rate fallback counts samples this far below the window mean
    /// as sleep.
    pub const HR_DIP_OFFSET: f64 = 10.0;
    /// Assumed night when no data of any kind is available, in hours.
    pub const DEFAULT_SLEEP_HOURS: f64 = 7.0;

    const WINDOW_OPEN_HOUR: u32 = 20;
    const WINDOW_CLOSE_HOUR: u32 = 12;

    /// The window sleep for `date` can fall in: the prior evening through
    /// noon.
    pub fn overnight_window(date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
        let open = (date - TimeDelta::days(1))
            .and_hms_opt(Self::WINDOW_OPEN_HOUR, 0, 0)
            .unwrap_or_default();
        let close = date
            .and_hms_opt(Self::WINDOW_CLOSE_HOUR, 0, 0)
            .unwrap_or_default();
        (open, close)
    }

    pub fn stage_weight(kind: SleepStageKind) -> f64 {
        match kind {
            SleepStageKind::Deep => 1.2,
            SleepStageKind::Rem => 1.0,
            SleepStageKind::Core => 0.8,
            SleepStageKind::Unspecified => 1.0,
            SleepStageKind::Awake | SleepStageKind::InBed => 0.0,
        }
    }

    /// Folds chronological asleep stages into blocks. A stage whose gap to
    /// the running block is under [`Self::MAX_STAGE_GAP`] extends it,
    /// anything longer starts a new block. Awake and in-bed stages are
    /// dropped before merging, so brief wake-ups do not split the night.
    pub fn merge_blocks(stages: &[StageSample]) -> Vec<SleepBlock> {
        let mut asleep: Vec<StageSample> = stages
            .iter()
            .filter(|s| s.kind.is_asleep())
            .copied()
            .collect();
        asleep.sort_by_key(|s| s.start);

        let mut blocks: Vec<SleepBlock> = Vec::new();
        for stage in asleep {
            let weighted =
                (stage.end - stage.start).num_seconds() as f64 * Self::stage_weight(stage.kind);

            match blocks.last_mut() {
                Some(block) if stage.start - block.end < Self::MAX_STAGE_GAP => {
                    block.end = block.end.max(stage.end);
                    block.weighted_secs += weighted;
                }
                _ => blocks.push(SleepBlock {
                    start: stage.start,
                    end: stage.end,
                    weighted_secs: weighted,
                }),
            }
        }
        blocks
    }

    /// The night's main sleep: the block with the most weighted sleep.
    pub fn primary_block(blocks: &[SleepBlock]) -> Option<SleepBlock> {
        blocks
            .iter()
            .copied()
            .max_by(|a, b| a.weighted_secs.total_cmp(&b.weighted_secs))
    }

    /// Full fallback ladder: staged blocks, then heart-rate depression,
    /// then the rolling average.
    pub fn analyze(stages: &[StageSample], hr: &[HrSample], seven_day_avg: f64) -> SleepSummary {
        let blocks = Self::merge_blocks(stages);
        if let Some(primary) = Self::primary_block(&blocks) {
            return SleepSummary {
                actual_hours: primary.actual_hours(),
                effective_hours: primary.effective_hours(),
                source: SleepSource::Stages,
                primary: Some(primary),
            };
        }

        if let Some((start, end)) = Self::longest_low_hr_run(hr) {
            let hours = (end - start).num_seconds() as f64 / 3600.0;
            return SleepSummary {
                actual_hours: hours,
                effective_hours: hours,
                source: SleepSource::HeartRate,
                primary: None,
            };
        }

        SleepSummary {
            actual_hours: seven_day_avg,
            effective_hours: seven_day_avg,
            source: SleepSource::Average,
            primary: None,
        }
    }

    /// Weighted nightly average over the trailing week, in hours.
    pub fn seven_day_average(stages: &[StageSample]) -> f64 {
        if stages.iter().all(|s| !s.kind.is_asleep()) {
            return Self::DEFAULT_SLEEP_HOURS;
        }

        let weighted: f64 = stages
            .iter()
            .filter(|s| s.kind.is_asleep())
            .map(|s| (s.end - s.start).num_seconds() as f64 * Self::stage_weight(s.kind))
            .sum();
        weighted / 7.0 / 3600.0
    }

    /// Minimum heart rate strictly inside the block, the sleep-based
    /// resting rate.
    pub fn lowest_bpm_in(block: &SleepBlock, hr: &[HrSample]) -> Option<i16> {
        hr.iter()
            .filter(|s| s.time > block.start && s.time < block.end)
            .map(|s| s.bpm)
            .min()
    }

    /// Longest contiguous run of samples at least [`Self::HR_DIP_OFFSET`]
    /// below the window mean. The trailing run is closed at the last
    /// sample.
    fn longest_low_hr_run(hr: &[HrSample]) -> Option<(NaiveDateTime, NaiveDateTime)> {
        if hr.is_empty() {
            return None;
        }

        let mean = hr.iter().map(|s| f64::from(s.bpm)).sum::<f64>() / hr.len() as f64;
        let threshold = mean - Self::HR_DIP_OFFSET;

        let mut best: Option<(NaiveDateTime, NaiveDateTime)> = None;
        let mut run: Option<(NaiveDateTime, NaiveDateTime)> = None;

        let mut close = |candidate: Option<(NaiveDateTime, NaiveDateTime)>,
                         best: &mut Option<(NaiveDateTime, NaiveDateTime)>| {
            if let Some((start, end)) = candidate {
                let longer = match best {
                    Some((b_start, b_end)) => end - start > *b_end - *b_start,
                    None => true,
                };
                if longer {
                    *best = Some((start, end));
                }
            }
        };

        for sample in hr {
            if f64::from(sample.bpm) <= threshold {
                match &mut run {
                    Some((_, end)) => *end = sample.time,
                    None => run = Some((sample.time, sample.time)),
                }
            } else {
                close(run.take(), &mut best);
            }
        }
        close(run.take(), &mut best);

        best
    }
}
