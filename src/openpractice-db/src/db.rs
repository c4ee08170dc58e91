use openpractice_entities::{heart_rate, hrv_reading, sleep_stage, vo2_max};
use openpractice_migration::{Migrator, MigratorTrait, OnConflict};
use openpractice_types::{HrSample, HrvSample, RestingRateSample, StageSample, Vo2Sample};
use sea_orm::{
    ActiveValue::NotSet, ConnectOptions, Database, DatabaseConnection, EntityTrait, Set,
};

#[derive(Clone)]
pub struct DatabaseHandler {
    pub(crate) db: DatabaseConnection,
}

impl DatabaseHandler {
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    pub async fn new<C>(path: C) -> Self
    where
        C: Into<ConnectOptions>,
    {
        let db = Database::connect(path)
            .await
            .expect("could not open the practice database");

        Migrator::up(&db, None)
            .await
            .expect("schema migration failed");

        Self { db }
    }

    pub async fn create_heart_rate(&self, sample: HrSample) -> anyhow::Result<()> {
        let model = heart_rate::ActiveModel {
            id: NotSet,
            time: Set(sample.time),
            bpm: Set(sample.bpm),
        };

        heart_rate::Entity::insert(model)
            .on_conflict(
                OnConflict::column(heart_rate::Column::Time)
                    .update_column(heart_rate::Column::Bpm)
                    .to_owned(),
            )
            .exec(&self.db)
            .await?;

        Ok(())
    }

    /// SDNN and daily resting rate share a row per timestamp; each write
    /// touches only its own channel.
    pub async fn create_hrv(&self, sample: HrvSample) -> anyhow::Result<()> {
        let model = hrv_reading::ActiveModel {
            id: NotSet,
            time: Set(sample.time),
            sdnn_ms: Set(Some(sample.sdnn_ms)),
            resting_bpm: NotSet,
        };

        hrv_reading::Entity::insert(model)
            .on_conflict(
                OnConflict::column(hrv_reading::Column::Time)
                    .update_column(hrv_reading::Column::SdnnMs)
                    .to_owned(),
            )
            .exec(&self.db)
            .await?;

        Ok(())
    }

    pub async fn create_resting_rate(&self, sample: RestingRateSample) -> anyhow::Result<()> {
        let model = hrv_reading::ActiveModel {
            id: NotSet,
            time: Set(sample.time),
            sdnn_ms: NotSet,
            resting_bpm: Set(Some(sample.bpm)),
        };

        hrv_reading::Entity::insert(model)
            .on_conflict(
                OnConflict::column(hrv_reading::Column::Time)
                    .update_column(hrv_reading::Column::RestingBpm)
                    .to_owned(),
            )
            .exec(&self.db)
            .await?;

        Ok(())
    }

    pub async fn create_sleep_stage(&self, stage: StageSample) -> anyhow::Result<()> {
        let model = sleep_stage::ActiveModel {
            id: NotSet,
            start: Set(stage.start),
            end: Set(stage.end),
            kind: Set(stage.kind.to_string()),
        };

        sleep_stage::Entity::insert(model)
            .on_conflict(
                OnConflict::column(sleep_stage::Column::Start)
                    .update_column(sleep_stage::Column::End)
                    .update_column(sleep_stage::Column::Kind)
                    .to_owned(),
            )
            .exec(&self.db)
            .await?;

        Ok(())
    }

    pub async fn create_vo2_max(&self, sample: Vo2Sample) -> anyhow::Result<()> {
        let model = vo2_max::ActiveModel {
            id: NotSet,
            time: Set(sample.time),
            value: Set(sample.value),
        };

        vo2_max::Entity::insert(model)
            .on_conflict(
                OnConflict::column(vo2_max::Column::Time)
                    .update_column(vo2_max::Column::Value)
                    .to_owned(),
            )
            .exec(&self.db)
            .await?;

        Ok(())
    }
}
