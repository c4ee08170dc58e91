use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;
use std::str::FromStr;

use chrono::NaiveDateTime;
use indicatif::{MultiProgress, ProgressBar};
use openpractice_entities::{heart_rate, hrv_reading, sleep_stage, vo2_max};
use openpractice_types::SleepStageKind;
use sea_orm::{
    ActiveValue::{NotSet, Set},
    DatabaseConnection, EntityTrait,
    sea_query::OnConflict,
};
use serde::Deserialize;

use crate::progress::bar_style;

// Sqlite allows at most 999 bound variables per statement, capping the
// rows per insert:
// heart_rate: 2 Set columns -> max 499 rows
// hrv_reading: 3 Set columns -> max 333 rows
// sleep_stage: 3 Set columns -> max 333 rows
// vo2_max: 2 Set columns -> max 499 rows
const HEART_RATE_BATCH: usize = 400;
const HRV_READING_BATCH: usize = 300;
const SLEEP_STAGE_BATCH: usize = 300;
const VO2_MAX_BATCH: usize = 400;

/// Loads a CSV export of wearable samples. Expected header:
/// `kind,start,end,value` with kinds `heartRate`, `hrv`,
/// `restingHeartRate`, `sleepStage` (end required, value is the stage
/// name) and `vo2Max`. Unparseable rows are counted, not fatal.
pub struct SampleImport<'a> {
    db: &'a DatabaseConnection,
}

pub struct ImportReport {
    pub heart_rate: usize,
    pub sdnn: usize,
    pub resting_rate: usize,
    pub sleep_stages: usize,
    pub vo2_max: usize,
    pub skipped: usize,
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Import complete:")?;
        writeln!(f, "  heart_rate:   {}", self.heart_rate)?;
        writeln!(f, "  sdnn:         {}", self.sdnn)?;
        writeln!(f, "  resting_rate: {}", self.resting_rate)?;
        writeln!(f, "  sleep_stage:  {}", self.sleep_stages)?;
        writeln!(f, "  vo2_max:      {}", self.vo2_max)?;
        write!(f, "  skipped:      {}", self.skipped)
    }
}

#[derive(Debug, Deserialize)]
struct SampleRow {
    kind: String,
    start: String,
    #[serde(default)]
    end: String,
    value: String,
}

// Keyed by natural key so duplicate timestamps collapse before the batch
// upsert; a key hit twice in one INSERT would abort it on sqlite.
#[derive(Default)]
struct Batches {
    heart_rate: BTreeMap<NaiveDateTime, i16>,
    sdnn: BTreeMap<NaiveDateTime, f64>,
    resting: BTreeMap<NaiveDateTime, i16>,
    stages: BTreeMap<NaiveDateTime, (NaiveDateTime, SleepStageKind)>,
    vo2: BTreeMap<NaiveDateTime, f64>,
}

fn classify(row: SampleRow, into: &mut Batches) -> bool {
    let Ok(start) = row.start.parse::<NaiveDateTime>() else {
        return false;
    };

    match row.kind.as_str() {
        "heartRate" => {
            let Ok(bpm) = row.value.parse() else {
                return false;
            };
            into.heart_rate.insert(start, bpm);
        }
        "hrv" => {
            let Ok(sdnn) = row.value.parse() else {
                return false;
            };
            into.sdnn.insert(start, sdnn);
        }
        "restingHeartRate" => {
            let Ok(bpm) = row.value.parse() else {
                return false;
            };
            into.resting.insert(start, bpm);
        }
        "sleepStage" => {
            let Ok(end) = row.end.parse::<NaiveDateTime>() else {
                return false;
            };
            let Ok(kind) = SleepStageKind::from_str(&row.value) else {
                return false;
            };
            into.stages.insert(start, (end, kind));
        }
        "vo2Max" => {
            let Ok(value) = row.value.parse() else {
                return false;
            };
            into.vo2.insert(start, value);
        }
        _ => return false,
    }

    true
}

impl<'a> SampleImport<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn run<R: Read>(&self, input: R) -> anyhow::Result<ImportReport> {
        let mut reader = csv::Reader::from_reader(input);
        let mut batches = Batches::default();
        let mut skipped = 0usize;

        for row in reader.deserialize::<SampleRow>() {
            match row {
                Ok(row) => {
                    if !classify(row, &mut batches) {
                        skipped += 1;
                    }
                }
                Err(_) => skipped += 1,
            }
        }

        let mp = MultiProgress::new();
        let heart_rate = self.insert_heart_rate(batches.heart_rate, &mp).await?;
        let sdnn = self.insert_sdnn(batches.sdnn, &mp).await?;
        let resting_rate = self.insert_resting(batches.resting, &mp).await?;
        let sleep_stages = self.insert_stages(batches.stages, &mp).await?;
        let vo2_max = self.insert_vo2(batches.vo2, &mp).await?;

        let report = ImportReport {
            heart_rate,
            sdnn,
            resting_rate,
            sleep_stages,
            vo2_max,
            skipped,
        };
        println!("{report}");
        Ok(report)
    }

    async fn insert_heart_rate(
        &self,
        rows: BTreeMap<NaiveDateTime, i16>,
        mp: &MultiProgress,
    ) -> anyhow::Result<usize> {
        let models: Vec<heart_rate::ActiveModel> = rows
            .into_iter()
            .map(|(time, bpm)| heart_rate::ActiveModel {
                id: NotSet,
                time: Set(time),
                bpm: Set(bpm),
            })
            .collect();

        let pb = mp.add(ProgressBar::new(models.len() as u64));
        pb.set_style(bar_style());
        pb.set_prefix("heart_rate");

        let total = models.len();
        for chunk in models.chunks(HEART_RATE_BATCH) {
            heart_rate::Entity::insert_many(chunk.to_vec())
                .on_conflict(
                    OnConflict::column(heart_rate::Column::Time)
                        .update_column(heart_rate::Column::Bpm)
                        .to_owned(),
                )
                .exec(self.db)
                .await?;
            pb.inc(chunk.len() as u64);
        }

        pb.finish();
        Ok(total)
    }

    async fn insert_sdnn(
        &self,
        rows: BTreeMap<NaiveDateTime, f64>,
        mp: &MultiProgress,
    ) -> anyhow::Result<usize> {
        let models: Vec<hrv_reading::ActiveModel> = rows
            .into_iter()
            .map(|(time, sdnn)| hrv_reading::ActiveModel {
                id: NotSet,
                time: Set(time),
                sdnn_ms: Set(Some(sdnn)),
                resting_bpm: Set(None),
            })
            .collect();

        let pb = mp.add(ProgressBar::new(models.len() as u64));
        pb.set_style(bar_style());
        pb.set_prefix("sdnn");

        let total = models.len();
        for chunk in models.chunks(HRV_READING_BATCH) {
            hrv_reading::Entity::insert_many(chunk.to_vec())
                .on_conflict(
                    OnConflict::column(hrv_reading::Column::Time)
                        .update_column(hrv_reading::Column::SdnnMs)
                        .to_owned(),
                )
                .exec(self.db)
                .await?;
            pb.inc(chunk.len() as u64);
        }

        pb.finish();
        Ok(total)
    }

    async fn insert_resting(
        &self,
        rows: BTreeMap<NaiveDateTime, i16>,
        mp: &MultiProgress,
    ) -> anyhow::Result<usize> {
        let models: Vec<hrv_reading::ActiveModel> = rows
            .into_iter()
            .map(|(time, bpm)| hrv_reading::ActiveModel {
                id: NotSet,
                time: Set(time),
                sdnn_ms: Set(None),
                resting_bpm: Set(Some(bpm)),
            })
            .collect();

        let pb = mp.add(ProgressBar::new(models.len() as u64));
        pb.set_style(bar_style());
        pb.set_prefix("resting_rate");

        let total = models.len();
        for chunk in models.chunks(HRV_READING_BATCH) {
            hrv_reading::Entity::insert_many(chunk.to_vec())
                .on_conflict(
                    OnConflict::column(hrv_reading::Column::Time)
                        .update_column(hrv_reading::Column::RestingBpm)
                        .to_owned(),
                )
                .exec(self.db)
                .await?;
            pb.inc(chunk.len() as u64);
        }

        pb.finish();
        Ok(total)
    }

    async fn insert_stages(
        &self,
        rows: BTreeMap<NaiveDateTime, (NaiveDateTime, SleepStageKind)>,
        mp: &MultiProgress,
    ) -> anyhow::Result<usize> {
        let models: Vec<sleep_stage::ActiveModel> = rows
            .into_iter()
            .map(|(start, (end, kind))| sleep_stage::ActiveModel {
                id: NotSet,
                start: Set(start),
                end: Set(end),
                kind: Set(kind.to_string()),
            })
            .collect();

        let pb = mp.add(ProgressBar::new(models.len() as u64));
        pb.set_style(bar_style());
        pb.set_prefix("sleep_stage");

        let total = models.len();
        for chunk in models.chunks(SLEEP_STAGE_BATCH) {
            sleep_stage::Entity::insert_many(chunk.to_vec())
                .on_conflict(
                    OnConflict::column(sleep_stage::Column::Start)
                        .update_column(sleep_stage::Column::End)
                        .update_column(sleep_stage::Column::Kind)
                        .to_owned(),
                )
                .exec(self.db)
                .await?;
            pb.inc(chunk.len() as u64);
        }

        pb.finish();
        Ok(total)
    }

    async fn insert_vo2(
        &self,
        rows: BTreeMap<NaiveDateTime, f64>,
        mp: &MultiProgress,
    ) -> anyhow::Result<usize> {
        let models: Vec<vo2_max::ActiveModel> = rows
            .into_iter()
            .map(|(time, value)| vo2_max::ActiveModel {
                id: NotSet,
                time: Set(time),
                value: Set(value),
            })
            .collect();

        let pb = mp.add(ProgressBar::new(models.len() as u64));
        pb.set_style(bar_style());
        pb.set_prefix("vo2_max");

        let total = models.len();
        for chunk in models.chunks(VO2_MAX_BATCH) {
            vo2_max::Entity::insert_many(chunk.to_vec())
                .on_conflict(
                    OnConflict::column(vo2_max::Column::Time)
                        .update_column(vo2_max::Column::Value)
                        .to_owned(),
                )
                .exec(self.db)
                .await?;
            pb.inc(chunk.len() as u64);
        }

        pb.finish();
        Ok(total)
    }
}
