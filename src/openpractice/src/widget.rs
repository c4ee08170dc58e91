use chrono::{NaiveDateTime, TimeDelta};

use openpractice_types::keys;

use crate::{ReadinessStore, scheduler};

/// A stored score older than this renders as a placeholder.
pub const STALE_AFTER: TimeDelta = TimeDelta::hours(2);

/// What the home-screen surface shows between refreshes: the last
/// published score and when it was computed. Reads never fail, a
/// missing or unreadable slot just means the placeholder.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WidgetSnapshot {
    pub score: Option<i64>,
    pub updated_at: Option<NaiveDateTime>,
}

impl WidgetSnapshot {
    pub async fn load<S: ReadinessStore>(store: &S) -> Self {
        Self {
            score: store.kv_get_i64(keys::READINESS_SCORE).await.ok().flatten(),
            updated_at: store.kv_get_date(keys::READINESS_DATE).await.ok().flatten(),
        }
    }

    /// A score from exactly two hours ago still counts as fresh.
    pub fn is_stale(&self, now: NaiveDateTime) -> bool {
        match self.updated_at {
            Some(at) => now - at > STALE_AFTER,
            None => true,
        }
    }

    pub fn next_refresh(&self, now: NaiveDateTime) -> NaiveDateTime {
        scheduler::next_update_at(now)
    }

    pub fn render(&self, now: NaiveDateTime) -> String {
        match self.score {
            Some(score) if !self.is_stale(now) => format!("readiness {score}"),
            _ => "readiness --".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 8, 20)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn staleness_cuts_over_past_two_hours() {
        let snapshot = WidgetSnapshot {
            score: Some(82),
            updated_at: Some(at(7, 0, 0)),
        };

        assert!(!snapshot.is_stale(at(9, 0, 0)));
        assert!(snapshot.is_stale(at(9, 0, 1)));
    }

    #[test]
    fn missing_date_is_always_stale() {
        let snapshot = WidgetSnapshot {
            score: Some(82),
            updated_at: None,
        };

        assert!(snapshot.is_stale(at(7, 0, 0)));
        assert_eq!(snapshot.render(at(7, 0, 0)), "readiness --");
    }

    #[test]
    fn render_shows_fresh_scores_only() {
        let snapshot = WidgetSnapshot {
            score: Some(61),
            updated_at: Some(at(7, 0, 0)),
        };

        assert_eq!(snapshot.render(at(7, 30, 0)), "readiness 61");
        assert_eq!(snapshot.render(at(12, 0, 0)), "readiness --");
        assert_eq!(WidgetSnapshot::default().render(at(7, 0, 0)), "readiness --");
    }

    #[test]
    fn next_refresh_follows_the_overnight_schedule() {
        let snapshot = WidgetSnapshot::default();

        assert_eq!(snapshot.next_refresh(at(9, 0, 0)), at(9, 30, 0));
        let tomorrow_morning = NaiveDate::from_ymd_opt(2025, 8, 21)
            .unwrap()
            .and_hms_opt(5, 10, 0)
            .unwrap();
        assert_eq!(snapshot.next_refresh(at(22, 30, 0)), tomorrow_morning);
    }
}
