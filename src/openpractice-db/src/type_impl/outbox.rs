use chrono::Local;
use openpractice_entities::outbox;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    sea_query::Expr,
};

use crate::DatabaseHandler;

/// Undelivered cross-device payloads. Rows are kept after delivery so a
/// transfer can be audited; `delivered` flips instead.
impl DatabaseHandler {
    pub async fn outbox_enqueue(&self, payload: serde_json::Value) -> anyhow::Result<()> {
        let model = outbox::ActiveModel {
            id: NotSet,
            payload: Set(payload),
            created_at: Set(Local::now().naive_local()),
            delivered: Set(false),
        };

        model.insert(&self.db).await?;
        Ok(())
    }

    /// Oldest first, so a drain replays messages in the order they failed.
    pub async fn outbox_pending(&self) -> anyhow::Result<Vec<outbox::Model>> {
        Ok(outbox::Entity::find()
            .filter(outbox::Column::Delivered.eq(false))
            .order_by_asc(outbox::Column::Id)
            .all(&self.db)
            .await?)
    }

    pub async fn outbox_mark_delivered(&self, id: i32) -> anyhow::Result<()> {
        outbox::Entity::update_many()
            .col_expr(outbox::Column::Delivered, Expr::value(true))
            .filter(outbox::Column::Id.eq(id))
            .exec(&self.db)
            .await?;

        Ok(())
    }
}
