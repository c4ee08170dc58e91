use chrono::TimeDelta;

pub trait FormatHM {
    fn format_hm(&self) -> String;
}

impl FormatHM for TimeDelta {
    fn format_hm(&self) -> String {
        let hours = self.num_seconds() as f64 / 3600.0;
        hours.format_hm()
    }
}

/// Fractional hours to `"7h 26m"`.
impl FormatHM for f64 {
    fn format_hm(&self) -> String {
        let total = (self * 60.0).round() as i64;
        format!("{}h {:02}m", total / 60, total % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fractional_hours() {
        assert_eq!(7.433333.format_hm(), "7h 26m");
        assert_eq!(0.0.format_hm(), "0h 00m");
        assert_eq!(8.0.format_hm(), "8h 00m");
    }

    #[test]
    fn delta_rounds_to_minutes() {
        assert_eq!(TimeDelta::minutes(95).format_hm(), "1h 35m");
    }
}
