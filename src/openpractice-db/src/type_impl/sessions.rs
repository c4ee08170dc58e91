use chrono::NaiveDateTime;
use openpractice_entities::{session_events, sessions};
use openpractice_migration::OnConflict;
use openpractice_types::{Exercise, Practice};
use sea_orm::{
    ActiveValue::NotSet, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    sea_query::Expr,
};
use uuid::Uuid;

use crate::{DatabaseHandler, SampleRange};

/// A finished guided session ready to persist.
#[derive(Debug, Clone)]
pub struct PracticeRecord {
    pub id: Uuid,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub practice: String,
    pub kcal: f64,
    pub avg_bpm: i16,
    pub effort: Option<i64>,
    pub events: Vec<RecordedEvent>,
}

#[derive(Debug, Clone)]
pub struct RecordedEvent {
    pub segment: String,
    pub exercise: Exercise,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DatabaseHandler {
    pub async fn create_session(&self, record: PracticeRecord) -> anyhow::Result<()> {
        let session_id = record.id;

        let model = sessions::ActiveModel {
            id: Set(session_id),
            start: Set(record.start),
            end: Set(record.end),
            practice: Set(record.practice),
            kcal: Set(record.kcal),
            avg_bpm: Set(record.avg_bpm),
            effort: Set(record.effort),
        };

        sessions::Entity::insert(model)
            .on_conflict(
                OnConflict::column(sessions::Column::Id)
                    .update_columns([
                        sessions::Column::End,
                        sessions::Column::Kcal,
                        sessions::Column::AvgBpm,
                        sessions::Column::Effort,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await?;

        if record.events.is_empty() {
            return Ok(());
        }

        let events = record
            .events
            .into_iter()
            .map(|e| {
                Ok(session_events::ActiveModel {
                    id: NotSet,
                    session_id: Set(session_id),
                    segment: Set(e.segment),
                    exercise: Set(e.exercise.to_metadata()?),
                    start: Set(e.start),
                    end: Set(e.end),
                })
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        session_events::Entity::insert_many(events)
            .exec(&self.db)
            .await?;

        Ok(())
    }

    /// Sessions carrying one of the catalog's protocol tags, oldest first.
    pub async fn sessions_between(
        &self,
        range: SampleRange,
    ) -> anyhow::Result<Vec<sessions::Model>> {
        Ok(sessions::Entity::find()
            .filter(range.conditions(sessions::Column::Start))
            .filter(catalog_tags())
            .order_by_asc(sessions::Column::Start)
            .all(&self.db)
            .await?)
    }

    /// Most recent catalog sessions, newest first.
    pub async fn recent_sessions(&self, limit: u64) -> anyhow::Result<Vec<sessions::Model>> {
        Ok(sessions::Entity::find()
            .filter(catalog_tags())
            .order_by_desc(sessions::Column::Start)
            .limit(limit)
            .all(&self.db)
            .await?)
    }

    pub async fn session_events(
        &self,
        session_id: Uuid,
    ) -> anyhow::Result<Vec<session_events::Model>> {
        Ok(session_events::Entity::find()
            .filter(session_events::Column::SessionId.eq(session_id))
            .order_by_asc(session_events::Column::Start)
            .all(&self.db)
            .await?)
    }

    pub async fn set_session_effort(&self, id: Uuid, effort: i64) -> anyhow::Result<()> {
        sessions::Entity::update_many()
            .col_expr(sessions::Column::Effort, Expr::value(effort))
            .filter(sessions::Column::Id.eq(id))
            .exec(&self.db)
            .await?;

        Ok(())
    }
}

fn catalog_tags() -> sea_orm::sea_query::SimpleExpr {
    sessions::Column::Practice.is_in([Practice::SIMPLE_AND_SINISTER, Practice::STRETCHES])
}
