pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0_f64
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Population standard deviation (divides by the count, not count - 1).
pub fn std_dev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        0_f64
    } else {
        let variance =
            values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
        variance.sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_empty() {
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn mean_basic() {
        assert_eq!(mean(&[2.0, 4.0, 6.0]), 4.0);
    }

    #[test]
    fn std_dev_empty() {
        assert_eq!(std_dev(&[], 0.0), 0.0);
    }

    #[test]
    fn std_dev_zero_variance() {
        assert_eq!(std_dev(&[8.0, 8.0, 8.0], 8.0), 0.0);
    }

    #[test]
    fn std_dev_is_population() {
        // values 2 and 4, mean 3 -> variance (1+1)/2 = 1 -> std 1
        assert_eq!(std_dev(&[2.0, 4.0], 3.0), 1.0);
    }
}
