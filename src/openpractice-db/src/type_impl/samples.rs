use std::str::FromStr;

use chrono::NaiveDateTime;
use openpractice_algos::helpers::time_math::mean;
use openpractice_entities::{heart_rate, hrv_reading, sessions, sleep_stage, vo2_max};
use openpractice_types::{HrSample, SleepStageKind, StageSample, Vo2Sample};
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, QuerySelect};

use crate::DatabaseHandler;

/// Half-open time window [from, to); both bounds optional.
#[derive(Default, Debug, Clone, Copy)]
pub struct SampleRange {
    pub from: Option<NaiveDateTime>,
    pub to: Option<NaiveDateTime>,
}

impl SampleRange {
    pub fn between(from: NaiveDateTime, to: NaiveDateTime) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
        }
    }

    pub(crate) fn conditions<C: ColumnTrait>(self, column: C) -> Condition {
        Condition::all()
            .add_option(self.from.map(|from| column.gte(from)))
            .add_option(self.to.map(|to| column.lt(to)))
    }
}

impl DatabaseHandler {
    pub async fn avg_hrv(&self, range: SampleRange) -> anyhow::Result<Option<f64>> {
        let values: Vec<f64> = hrv_reading::Entity::find()
            .filter(range.conditions(hrv_reading::Column::Time))
            .filter(hrv_reading::Column::SdnnMs.is_not_null())
            .all(&self.db)
            .await?
            .into_iter()
            .filter_map(|r| r.sdnn_ms)
            .collect();

        if values.is_empty() {
            return Ok(None);
        }
        Ok(Some(mean(&values)))
    }

    pub async fn avg_rhr(&self, range: SampleRange) -> anyhow::Result<Option<f64>> {
        let values: Vec<f64> = hrv_reading::Entity::find()
            .filter(range.conditions(hrv_reading::Column::Time))
            .filter(hrv_reading::Column::RestingBpm.is_not_null())
            .all(&self.db)
            .await?
            .into_iter()
            .filter_map(|r| r.resting_bpm)
            .map(f64::from)
            .collect();

        if values.is_empty() {
            return Ok(None);
        }
        Ok(Some(mean(&values)))
    }

    pub async fn heart_rate_in(&self, range: SampleRange) -> anyhow::Result<Vec<HrSample>> {
        Ok(heart_rate::Entity::find()
            .filter(range.conditions(heart_rate::Column::Time))
            .order_by_asc(heart_rate::Column::Time)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|m| HrSample {
                time: m.time,
                bpm: m.bpm,
            })
            .collect())
    }

    /// Rows with stage names this build doesn't know are dropped.
    pub async fn sleep_stages_in(&self, range: SampleRange) -> anyhow::Result<Vec<StageSample>> {
        Ok(sleep_stage::Entity::find()
            .filter(range.conditions(sleep_stage::Column::Start))
            .order_by_asc(sleep_stage::Column::Start)
            .all(&self.db)
            .await?
            .into_iter()
            .filter_map(map_stage)
            .collect())
    }

    /// Active energy of every session starting in the window, regardless
    /// of protocol tag.
    pub async fn energy_sum(&self, range: SampleRange) -> anyhow::Result<Option<f64>> {
        let sessions = sessions::Entity::find()
            .filter(range.conditions(sessions::Column::Start))
            .all(&self.db)
            .await?;

        if sessions.is_empty() {
            return Ok(None);
        }
        Ok(Some(sessions.iter().map(|s| s.kcal).sum()))
    }

    /// Most recent `limit` estimates, oldest first.
    pub async fn vo2_max_samples(&self, limit: u64) -> anyhow::Result<Vec<Vo2Sample>> {
        let mut samples: Vec<Vo2Sample> = vo2_max::Entity::find()
            .order_by_desc(vo2_max::Column::Time)
            .limit(limit)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|m| Vo2Sample {
                time: m.time,
                value: m.value,
            })
            .collect();

        samples.reverse();
        Ok(samples)
    }
}

fn map_stage(model: sleep_stage::Model) -> Option<StageSample> {
    let kind = SleepStageKind::from_str(&model.kind).ok()?;
    Some(StageSample {
        start: model.start,
        end: model.end,
        kind,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use openpractice_types::{HrvSample, RestingRateSample};
    use sea_orm::{ActiveValue::NotSet, Set};

    fn day_time(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 8, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[tokio::test]
    async fn averages_are_none_without_readings() {
        let db = DatabaseHandler::new("sqlite::memory:").await;
        assert_eq!(db.avg_hrv(SampleRange::default()).await.unwrap(), None);
        assert_eq!(db.avg_rhr(SampleRange::default()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn avg_hrv_respects_the_window() {
        let db = DatabaseHandler::new("sqlite::memory:").await;
        for (day, sdnn) in [(18, 40.0), (19, 50.0), (20, 90.0)] {
            db.create_hrv(HrvSample {
                time: day_time(day, 7),
                sdnn_ms: sdnn,
            })
            .await
            .unwrap();
        }

        let range = SampleRange::between(day_time(18, 0), day_time(20, 0));
        assert_eq!(db.avg_hrv(range).await.unwrap(), Some(45.0));
        assert_eq!(db.avg_hrv(SampleRange::default()).await.unwrap(), Some(60.0));
    }

    #[tokio::test]
    async fn avg_rhr_ignores_sdnn_only_rows() {
        let db = DatabaseHandler::new("sqlite::memory:").await;
        db.create_hrv(HrvSample {
            time: day_time(20, 6),
            sdnn_ms: 48.0,
        })
        .await
        .unwrap();
        db.create_resting_rate(RestingRateSample {
            time: day_time(20, 7),
            bpm: 54,
        })
        .await
        .unwrap();

        assert_eq!(db.avg_rhr(SampleRange::default()).await.unwrap(), Some(54.0));
    }

    #[tokio::test]
    async fn heart_rate_in_is_ascending() {
        let db = DatabaseHandler::new("sqlite::memory:").await;
        for (hour, bpm) in [(9, 80), (7, 60), (8, 70)] {
            db.create_heart_rate(HrSample {
                time: day_time(20, hour),
                bpm,
            })
            .await
            .unwrap();
        }

        let samples = db.heart_rate_in(SampleRange::default()).await.unwrap();
        let bpms: Vec<i16> = samples.iter().map(|s| s.bpm).collect();
        assert_eq!(bpms, [60, 70, 80]);
    }

    #[tokio::test]
    async fn unknown_stage_kinds_are_skipped() {
        let db = DatabaseHandler::new("sqlite::memory:").await;

        let good = sleep_stage::ActiveModel {
            id: NotSet,
            start: Set(day_time(20, 1)),
            end: Set(day_time(20, 2)),
            kind: Set("deep".to_string()),
        };
        let bad = sleep_stage::ActiveModel {
            id: NotSet,
            start: Set(day_time(20, 2)),
            end: Set(day_time(20, 3)),
            kind: Set("lucidDreaming".to_string()),
        };
        sleep_stage::Entity::insert_many([good, bad])
            .exec(db.connection())
            .await
            .unwrap();

        let stages = db.sleep_stages_in(SampleRange::default()).await.unwrap();
        assert_eq!(stages.len(), 1);
        assert_eq!(stages[0].kind, SleepStageKind::Deep);
    }

    #[tokio::test]
    async fn vo2_max_keeps_most_recent_oldest_first() {
        let db = DatabaseHandler::new("sqlite::memory:").await;
        for (day, value) in [(18, 39.0), (19, 40.0), (20, 41.0)] {
            db.create_vo2_max(Vo2Sample {
                time: day_time(day, 8),
                value,
            })
            .await
            .unwrap();
        }

        let samples = db.vo2_max_samples(2).await.unwrap();
        let values: Vec<f64> = samples.iter().map(|s| s.value).collect();
        assert_eq!(values, [40.0, 41.0], "newest two, in time order");
    }
}
