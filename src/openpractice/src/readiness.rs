use std::time::Duration;

use chrono::{Local, NaiveDateTime, TimeDelta};

use openpractice_algos::{
    ReadinessCalculator, ReadinessInput, ReadinessScore, RestingBaseline, SleepAnalyzer,
    SleepConsistency, insight,
};
use openpractice_db::SampleRange;
use openpractice_types::keys;

use crate::{ConnectivityBridge, DeviceChannel, ReadinessStore, scheduler};

const POLL_INTERVAL: Duration = Duration::from_secs(60);
/// A refresh is forced once this much time passes without one, even if
/// no new samples showed up.
const MAX_REFRESH_GAP: TimeDelta = TimeDelta::hours(1);
/// Assumed resting rate until a real observation exists.
const DEFAULT_RESTING_BPM: f64 = 60.0;

/// The last completed scoring pass, kept around for the dashboard and
/// for callers that want the insight line.
#[derive(Debug, Clone, Copy)]
pub struct ReadinessState {
    pub input: ReadinessInput,
    pub result: ReadinessScore,
    pub computed_at: NaiveDateTime,
}

impl ReadinessState {
    pub fn insight(&self) -> &'static str {
        insight(
            self.result.score,
            self.input.hrv_delta(),
            self.input.sleep_delta(),
        )
    }
}

/// Runs the readiness pipeline: gathers today's signals and the weekly
/// baselines, scores them, and pushes the result out through the bridge.
/// A failed refresh keeps the previous state so stale-but-real numbers
/// are never replaced with garbage.
pub struct ReadinessManager<S, C> {
    store: S,
    bridge: ConnectivityBridge<S, C>,
    state: Option<ReadinessState>,
}

impl<S, C> ReadinessManager<S, C>
where
    S: ReadinessStore + Clone,
    C: DeviceChannel,
{
    pub fn new(store: S, channel: C) -> Self {
        Self {
            bridge: ConnectivityBridge::new(store.clone(), channel),
            store,
            state: None,
        }
    }

    pub fn state(&self) -> Option<&ReadinessState> {
        self.state.as_ref()
    }

    /// One scoring pass. The signal fetches are grouped: everything the
    /// score depends on fails the refresh together, while the bedtime
    /// consistency fetch degrades to a neutral score on its own.
    pub async fn refresh(&mut self, now: NaiveDateTime) -> anyhow::Result<ReadinessState> {
        let today = now.date().and_hms_opt(0, 0, 0).unwrap_or_default();
        let (night_open, night_close) = SleepAnalyzer::overnight_window(now.date());
        let overnight = SampleRange::between(night_open, night_close);
        let week = SampleRange::between(today - TimeDelta::days(7), now);
        let store = &self.store;

        let (scored, consistency_stages) = tokio::join!(
            async {
                tokio::try_join!(
                    store.avg_hrv(SampleRange::between(today, now)),
                    store.sleep_stages_in(overnight),
                    store.heart_rate_in(overnight),
                    store.energy_sum(SampleRange::between(today - TimeDelta::days(1), today)),
                    store.sleep_stages_in(week),
                )
            },
            store.sleep_stages_in(week),
        );
        let (today_hrv, night_stages, night_hr, yesterday_strain, week_stages) = scored?;
        let sleep_consistency = consistency_stages
            .ok()
            .map(|stages| SleepConsistency::score(&stages));

        let sleep_avg = SleepAnalyzer::seven_day_average(&week_stages);
        let sleep = SleepAnalyzer::analyze(&night_stages, &night_hr, sleep_avg);
        let strain = yesterday_strain.unwrap_or(0.0);

        // weekly baselines are best effort, gaps fall back to today
        let (week_hrv, week_rhr, week_strain) = tokio::join!(
            store.avg_hrv(week),
            store.avg_rhr(week),
            store.energy_sum(week),
        );
        let week_hrv = week_hrv.ok().flatten();
        let week_rhr = week_rhr.ok().flatten();
        let avg_strain = week_strain
            .ok()
            .flatten()
            .map(|total| total / 7.0)
            .unwrap_or(strain);

        let hrv = today_hrv.or(week_hrv).unwrap_or(0.0);
        let avg_hrv = week_hrv.unwrap_or(hrv);

        // resting rate prefers the overnight minimum, then daytime
        // readings, and only a real observation moves the EMA baseline
        let sleep_rhr = sleep
            .primary
            .and_then(|block| SleepAnalyzer::lowest_bpm_in(&block, &night_hr))
            .map(f64::from);
        let observed = match sleep_rhr {
            Some(bpm) => Some(bpm),
            None => store
                .avg_rhr(SampleRange::between(today, now))
                .await
                .ok()
                .flatten(),
        };
        let stored_baseline = store
            .kv_get_f64(keys::SLEEP_RHR_BASELINE)
            .await
            .ok()
            .flatten();
        let (resting_hr, avg_rhr) = match observed {
            Some(observed) => {
                let updated = RestingBaseline::update(stored_baseline.unwrap_or(0.0), observed);
                store.kv_set_f64(keys::SLEEP_RHR_BASELINE, updated).await?;
                (observed, updated)
            }
            None => {
                let fallback = stored_baseline.or(week_rhr).unwrap_or(DEFAULT_RESTING_BPM);
                (fallback, fallback)
            }
        };

        let input = ReadinessInput {
            hrv,
            resting_hr,
            sleep_actual: sleep.actual_hours,
            sleep_effective: sleep.effective_hours,
            strain,
            sleep_consistency,
            avg_hrv,
            avg_rhr,
            avg_strain,
            sleep_avg,
        };
        let result = ReadinessCalculator::calculate(&input);

        info!(
            "readiness {} ({}): hrv {:.0}ms, rhr {:.0}bpm, sleep {:.1}h of {:.1}h, strain {:.0}kcal",
            result.score,
            result.band().label(),
            hrv,
            resting_hr,
            input.sleep_effective,
            input.sleep_actual,
            strain,
        );
        info!(
            "baselines: hrv {avg_hrv:.0}ms, rhr {avg_rhr:.0}bpm, sleep {sleep_avg:.1}h, strain {avg_strain:.0}kcal",
        );

        self.bridge.publish(result.score, now).await?;

        let state = ReadinessState {
            input,
            result,
            computed_at: now,
        };
        self.state = Some(state);
        Ok(state)
    }

    /// Keeps refreshing until ctrl-c: every half hour during the day,
    /// sooner when new samples land, never during the overnight blackout.
    pub async fn watch(&mut self) -> anyhow::Result<()> {
        let mut last_refresh = Local::now().naive_local();
        if let Err(error) = self.refresh(last_refresh).await {
            error!("readiness refresh failed: {error:#}");
        }
        let mut next_update = scheduler::next_update_at(last_refresh);
        info!("next scheduled readiness update at {next_update}");

        loop {
            tokio::select! {
                _ = tokio::time::sleep(POLL_INTERVAL) => {
                    let now = Local::now().naive_local();
                    if self.refresh_due(last_refresh, next_update, now).await {
                        if let Err(error) = self.refresh(now).await {
                            error!("readiness refresh failed: {error:#}");
                        }
                        last_refresh = now;
                        next_update = scheduler::next_update_at(now);
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("stopping readiness watch");
                    break;
                }
            }
        }

        Ok(())
    }

    async fn refresh_due(
        &self,
        last_refresh: NaiveDateTime,
        next_update: NaiveDateTime,
        now: NaiveDateTime,
    ) -> bool {
        if now >= next_update || now - last_refresh >= MAX_REFRESH_GAP {
            return true;
        }

        // new overnight data is worth scoring right away
        let since = SampleRange::between(last_refresh, now);
        if self.store.avg_hrv(since).await.ok().flatten().is_some() {
            return true;
        }
        !self
            .store
            .sleep_stages_in(since)
            .await
            .unwrap_or_default()
            .is_empty()
    }
}
