use chrono::NaiveDateTime;
use openpractice_entities::kv;
use openpractice_migration::OnConflict;
use sea_orm::{EntityTrait, Set};

use crate::DatabaseHandler;

const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Single-table key-value store shared by the score writers and readers.
/// Values are stored as text; the typed getters return `None` for both
/// missing keys and values that no longer parse.
impl DatabaseHandler {
    pub async fn kv_get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(kv::Entity::find_by_id(key)
            .one(&self.db)
            .await?
            .map(|m| m.value))
    }

    pub async fn kv_set(&self, key: &str, value: String) -> anyhow::Result<()> {
        let model = kv::ActiveModel {
            key: Set(key.to_string()),
            value: Set(value),
        };

        kv::Entity::insert(model)
            .on_conflict(
                OnConflict::column(kv::Column::Key)
                    .update_column(kv::Column::Value)
                    .to_owned(),
            )
            .exec(&self.db)
            .await?;

        Ok(())
    }

    pub async fn kv_get_f64(&self, key: &str) -> anyhow::Result<Option<f64>> {
        Ok(self.kv_get(key).await?.and_then(|v| v.parse().ok()))
    }

    pub async fn kv_set_f64(&self, key: &str, value: f64) -> anyhow::Result<()> {
        self.kv_set(key, value.to_string()).await
    }

    pub async fn kv_get_i64(&self, key: &str) -> anyhow::Result<Option<i64>> {
        Ok(self.kv_get(key).await?.and_then(|v| v.parse().ok()))
    }

    pub async fn kv_set_i64(&self, key: &str, value: i64) -> anyhow::Result<()> {
        self.kv_set(key, value.to_string()).await
    }

    pub async fn kv_get_bool(&self, key: &str) -> anyhow::Result<Option<bool>> {
        Ok(self.kv_get(key).await?.and_then(|v| v.parse().ok()))
    }

    pub async fn kv_set_bool(&self, key: &str, value: bool) -> anyhow::Result<()> {
        self.kv_set(key, value.to_string()).await
    }

    pub async fn kv_get_date(&self, key: &str) -> anyhow::Result<Option<NaiveDateTime>> {
        Ok(self.kv_get(key).await?.and_then(|v| v.parse().ok()))
    }

    pub async fn kv_set_date(&self, key: &str, value: NaiveDateTime) -> anyhow::Result<()> {
        self.kv_set(key, value.format(DATE_FORMAT).to_string()).await
    }
}
