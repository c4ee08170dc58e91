use chrono::{NaiveDateTime, NaiveTime, TimeDelta};

/// No automatic refreshes start after this hour; the wearable is on the
/// charger and the overnight data is not in yet anyway.
const BLACKOUT_START_HOUR: u32 = 22;
/// First refresh of the day, late enough for overnight staging to have
/// synced.
const MORNING_HOUR: u32 = 5;
const MORNING_MINUTE: u32 = 10;

const DAYTIME_INTERVAL: TimeDelta = TimeDelta::minutes(30);

/// When the next unconditional refresh is due. Inside the overnight
/// blackout the answer is the coming 05:10, otherwise half an hour out.
pub fn next_update_at(now: NaiveDateTime) -> NaiveDateTime {
    let morning = NaiveTime::from_hms_opt(MORNING_HOUR, MORNING_MINUTE, 0).unwrap_or_default();
    let blackout = NaiveTime::from_hms_opt(BLACKOUT_START_HOUR, 0, 0).unwrap_or_default();

    if now.time() >= blackout {
        (now.date() + TimeDelta::days(1)).and_time(morning)
    } else if now.time() < morning {
        now.date().and_time(morning)
    } else {
        now + DAYTIME_INTERVAL
    }
}
