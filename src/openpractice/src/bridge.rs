use anyhow::{Context, bail};
use chrono::{DateTime, NaiveDateTime};

use openpractice_types::{BridgeMessage, keys};

use crate::ReadinessStore;

/// One-way transport towards the paired device. Production is an HTTP
/// POST; tests script the failures.
#[allow(async_fn_in_trait)]
pub trait DeviceChannel {
    async fn send(&self, payload: &BridgeMessage) -> anyhow::Result<()>;
}

/// Pushes readiness scores across to the paired device and applies the
/// ones coming back. The kv slots are written first so the widget path
/// never depends on the peer being reachable; failed sends land in the
/// outbox and are replayed on the next successful publish.
pub struct ConnectivityBridge<S, C> {
    store: S,
    channel: C,
}

impl<S, C> ConnectivityBridge<S, C>
where
    S: ReadinessStore,
    C: DeviceChannel,
{
    pub fn new(store: S, channel: C) -> Self {
        Self { store, channel }
    }

    /// Fire-and-forget: no acknowledgement is awaited beyond the send
    /// itself.
    pub async fn publish(&self, score: i64, now: NaiveDateTime) -> anyhow::Result<()> {
        self.store.kv_set_i64(keys::READINESS_SCORE, score).await?;
        self.store.kv_set_date(keys::READINESS_DATE, now).await?;

        let message = BridgeMessage::readiness_update(score, now.and_utc().timestamp());
        match self.channel.send(&message).await {
            Ok(()) => self.drain_outbox().await?,
            Err(error) => {
                debug!("peer unreachable, queueing readiness update: {error}");
                self.store
                    .outbox_enqueue(serde_json::to_value(&message)?)
                    .await?;
            }
        }

        Ok(())
    }

    /// Replays queued payloads oldest first, stopping at the first send
    /// that fails so order is preserved for the next attempt.
    async fn drain_outbox(&self) -> anyhow::Result<()> {
        for queued in self.store.outbox_pending().await? {
            let Ok(message) = serde_json::from_value::<BridgeMessage>(queued.payload.clone())
            else {
                warn!("dropping malformed outbox row {}", queued.id);
                self.store.outbox_mark_delivered(queued.id).await?;
                continue;
            };

            if self.channel.send(&message).await.is_err() {
                break;
            }
            self.store.outbox_mark_delivered(queued.id).await?;
        }

        Ok(())
    }

    /// Applies a payload received from the peer. Anything that is not a
    /// readiness update with an integer score is ignored.
    pub async fn handle_incoming(
        &self,
        payload: serde_json::Value,
        now: NaiveDateTime,
    ) -> anyhow::Result<()> {
        let Ok(message) = serde_json::from_value::<BridgeMessage>(payload) else {
            debug!("ignoring unparseable peer payload");
            return Ok(());
        };
        if !message.is_readiness_update() {
            debug!("ignoring peer message of kind {:?}", message.kind);
            return Ok(());
        }

        let date = DateTime::from_timestamp(message.timestamp, 0)
            .map(|dt| dt.naive_utc())
            .unwrap_or(now);
        self.store
            .kv_set_i64(keys::READINESS_SCORE, message.score)
            .await?;
        self.store.kv_set_date(keys::READINESS_DATE, date).await?;
        info!("stored readiness {} from the paired device", message.score);

        Ok(())
    }
}

/// Stands in when no peer is configured: sends succeed without going
/// anywhere, so nothing piles up in the outbox on an unpaired install.
pub struct NullChannel;

impl DeviceChannel for NullChannel {
    async fn send(&self, _payload: &BridgeMessage) -> anyhow::Result<()> {
        Ok(())
    }
}

/// POSTs bridge payloads as JSON to the paired device's endpoint.
pub struct HttpChannel {
    client: reqwest::Client,
    peer_url: String,
}

impl HttpChannel {
    pub fn new(peer_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            peer_url,
        }
    }
}

impl DeviceChannel for HttpChannel {
    async fn send(&self, payload: &BridgeMessage) -> anyhow::Result<()> {
        let resp = self
            .client
            .post(&self.peer_url)
            .json(payload)
            .send()
            .await
            .context("failed to reach the paired device")?;

        if !resp.status().is_success() {
            bail!("peer rejected the update: {}", resp.status());
        }

        Ok(())
    }
}
