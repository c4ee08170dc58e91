/// Exponential moving average over sleep-derived resting heart rate.
/// Smooths out single rough nights so the readiness baseline drifts
/// instead of jumping.
pub struct RestingBaseline;

impl RestingBaseline {
    pub const ALPHA: f64 = 0.2;

    /// A stored value of zero means the baseline was never seeded, the
    /// first observation becomes the baseline unchanged.
    pub fn update(previous: f64, observed: f64) -> f64 {
        if previous == 0.0 {
            observed
        } else {
            Self::ALPHA * observed + (1.0 - Self::ALPHA) * previous
        }
    }
}
