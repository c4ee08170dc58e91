use chrono::NaiveDateTime;

use openpractice_types::Vo2Sample;

pub struct Vo2MaxTrend;

impl Vo2MaxTrend {
    /// Trailing slice is `max(0, i - WINDOW)..=i`, so early points
    /// average over whatever history exists.
    pub const WINDOW: usize = 3;

    /// Smooths VO2max readings with a rolling mean and returns the series
    /// ascending by time. Input order does not matter.
    pub fn rolling(samples: &[Vo2Sample]) -> Vec<(NaiveDateTime, f64)> {
        let mut values: Vec<Vo2Sample> = samples.to_vec();
        values.sort_by_key(|s| s.time);

        let mut trend = Vec::with_capacity(values.len());
        for i in 0..values.len() {
            let from = i.saturating_sub(Self::WINDOW);
            let slice = &values[from..=i];
            let avg = slice.iter().map(|s| s.value).sum::<f64>() / slice.len() as f64;
            trend.push((values[i].time, avg));
        }
        trend
    }
}
