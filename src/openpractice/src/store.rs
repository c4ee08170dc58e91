use chrono::NaiveDateTime;

use openpractice_db::{DatabaseHandler, SampleRange};
use openpractice_entities::outbox;
use openpractice_types::{HrSample, StageSample};

/// What the readiness pipeline needs from storage: the biometric read
/// surface, the shared key-value slots and the outbox queue.
/// [`DatabaseHandler`] is the production implementation; tests substitute
/// scripted fakes, including failure injection.
#[allow(async_fn_in_trait)]
pub trait ReadinessStore {
    async fn avg_hrv(&self, range: SampleRange) -> anyhow::Result<Option<f64>>;
    async fn avg_rhr(&self, range: SampleRange) -> anyhow::Result<Option<f64>>;
    async fn heart_rate_in(&self, range: SampleRange) -> anyhow::Result<Vec<HrSample>>;
    async fn sleep_stages_in(&self, range: SampleRange) -> anyhow::Result<Vec<StageSample>>;
    async fn energy_sum(&self, range: SampleRange) -> anyhow::Result<Option<f64>>;

    async fn kv_get_f64(&self, key: &str) -> anyhow::Result<Option<f64>>;
    async fn kv_set_f64(&self, key: &str, value: f64) -> anyhow::Result<()>;
    async fn kv_get_i64(&self, key: &str) -> anyhow::Result<Option<i64>>;
    async fn kv_set_i64(&self, key: &str, value: i64) -> anyhow::Result<()>;
    async fn kv_get_date(&self, key: &str) -> anyhow::Result<Option<NaiveDateTime>>;
    async fn kv_set_date(&self, key: &str, value: NaiveDateTime) -> anyhow::Result<()>;

    async fn outbox_enqueue(&self, payload: serde_json::Value) -> anyhow::Result<()>;
    async fn outbox_pending(&self) -> anyhow::Result<Vec<outbox::Model>>;
    async fn outbox_mark_delivered(&self, id: i32) -> anyhow::Result<()>;
}

impl ReadinessStore for DatabaseHandler {
    async fn avg_hrv(&self, range: SampleRange) -> anyhow::Result<Option<f64>> {
        DatabaseHandler::avg_hrv(self, range).await
    }

    async fn avg_rhr(&self, range: SampleRange) -> anyhow::Result<Option<f64>> {
        DatabaseHandler::avg_rhr(self, range).await
    }

    async fn heart_rate_in(&self, range: SampleRange) -> anyhow::Result<Vec<HrSample>> {
        DatabaseHandler::heart_rate_in(self, range).await
    }

    async fn sleep_stages_in(&self, range: SampleRange) -> anyhow::Result<Vec<StageSample>> {
        DatabaseHandler::sleep_stages_in(self, range).await
    }

    async fn energy_sum(&self, range: SampleRange) -> anyhow::Result<Option<f64>> {
        DatabaseHandler::energy_sum(self, range).await
    }

    async fn kv_get_f64(&self, key: &str) -> anyhow::Result<Option<f64>> {
        DatabaseHandler::kv_get_f64(self, key).await
    }

    async fn kv_set_f64(&self, key: &str, value: f64) -> anyhow::Result<()> {
        DatabaseHandler::kv_set_f64(self, key, value).await
    }

    async fn kv_get_i64(&self, key: &str) -> anyhow::Result<Option<i64>> {
        DatabaseHandler::kv_get_i64(self, key).await
    }

    async fn kv_set_i64(&self, key: &str, value: i64) -> anyhow::Result<()> {
        DatabaseHandler::kv_set_i64(self, key, value).await
    }

    async fn kv_get_date(&self, key: &str) -> anyhow::Result<Option<NaiveDateTime>> {
        DatabaseHandler::kv_get_date(self, key).await
    }

    async fn kv_set_date(&self, key: &str, value: NaiveDateTime) -> anyhow::Result<()> {
        DatabaseHandler::kv_set_date(self, key, value).await
    }

    async fn outbox_enqueue(&self, payload: serde_json::Value) -> anyhow::Result<()> {
        DatabaseHandler::outbox_enqueue(self, payload).await
    }

    async fn outbox_pending(&self) -> anyhow::Result<Vec<outbox::Model>> {
        DatabaseHandler::outbox_pending(self).await
    }

    async fn outbox_mark_delivered(&self, id: i32) -> anyhow::Result<()> {
        DatabaseHandler::outbox_mark_delivered(self, id).await
    }
}
