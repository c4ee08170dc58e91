use openpractice_types::{ActivityKind, HrSample};

/// Post-session effort score on a 0-100 scale:
/// 1. Classify each HR sample into zone 1-5 by fraction of age-predicted max
/// 2. Drop zone 1 entirely - warm-up and rest periods are not effort
/// 3. Average the remaining zone weights and scale by 10
/// 4. Adjust for energy rate and activity type, cap at 100
///
/// Without a configured age there is no max HR to classify against and the
/// session stays unscored at 0.
pub struct EffortEstimator;

#[derive(Debug, Clone, Copy)]
pub struct EffortInput<'a> {
    pub samples: &'a [HrSample],
    pub active_kcal: f64,
    pub duration_secs: f64,
    pub kind: ActivityKind,
    pub age: Option<i64>,
}

impl EffortEstimator {
    /// Zone 1 is excluded from both the numerator and the denominator.
    pub const MIN_ACTIVE_ZONE: u8 = 2;

    const ZONE_WEIGHTS: [f64; 5] = [1.0, 2.0, 3.0, 4.5, 6.0];

    pub fn estimate(input: &EffortInput) -> i64 {
        let Some(age) = input.age else {
            return 0;
        };
        let max_hr = f64::from(220 - age as i32);

        let sample_secs = Self::sample_duration_secs(input.samples);
        let mut weighted = 0.0;
        let mut total = 0.0;
        for sample in input.samples {
            let zone = Self::zone(f64::from(sample.bpm), max_hr);
            if zone < Self::MIN_ACTIVE_ZONE {
                continue;
            }
            weighted += sample_secs * Self::ZONE_WEIGHTS[usize::from(zone) - 1];
            total += sample_secs;
        }

        let raw = if total == 0.0 {
            0.0
        } else {
            weighted / total * 10.0
        };

        let kcal_per_min = if input.duration_secs > 0.0 {
            input.active_kcal / (input.duration_secs / 60.0)
        } else {
            0.0
        };
        let energy = (kcal_per_min / 10.0).clamp(0.75, 1.5);

        let adjusted = (raw * energy * Self::kind_multiplier(input.kind)).min(100.0);

        // Any scored session is worth at least a point.
        (adjusted as i64).max(1)
    }

    /// Zone by fraction of max HR: under 60% is zone 1, then 10% steps up
    /// to zone 5 at 90%.
    fn zone(bpm: f64, max_hr: f64) -> u8 {
        let pct = bpm / max_hr;
        if pct < 0.6 {
            1
        } else if pct < 0.7 {
            2
        } else if pct < 0.8 {
            3
        } else if pct < 0.9 {
            4
        } else {
            5
        }
    }

    fn kind_multiplier(kind: ActivityKind) -> f64 {
        match kind {
            ActivityKind::FunctionalStrength => 1.15,
            ActivityKind::Hiit => 1.25,
            ActivityKind::Traditional | ActivityKind::Flexibility => 1.0,
        }
    }

    /// Sample interval from the first two readings, 1s fallback.
    fn sample_duration_secs(samples: &[HrSample]) -> f64 {
        if samples.len() < 2 {
            return 1.0;
        }
        let dt = (samples[1].time - samples[0].time)
            .num_milliseconds()
            .unsigned_abs();
        if dt == 0 { 1.0 } else { dt as f64 / 1000.0 }
    }
}
