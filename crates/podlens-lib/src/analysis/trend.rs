//! Trend and variation of a usage series

use crate::models::{DataPoint, Trend};

/// Minimum number of samples for a trend classification
pub const MIN_TREND_SAMPLES: usize = 10;

/// Relative change between first and last quarter that counts as a trend
pub const TREND_THRESHOLD: f64 = 0.10;

/// Classify the series by comparing the means of its first and last quarter
///
/// An empty series is `unknown`, fewer than [`MIN_TREND_SAMPLES`] points is
/// `insufficient_data`. When the first quarter averages zero the result
/// follows the sign of the last quarter mean.
pub fn classify_trend(usage: &[DataPoint]) -> Trend {
    if usage.is_empty() {
        return Trend::Unknown;
    }
    if usage.len() < MIN_TREND_SAMPLES {
        return Trend::InsufficientData;
    }

    let quarter = usage.len() / 4;
    let first_avg = quarter_mean(&usage[..quarter]);
    let last_avg = quarter_mean(&usage[usage.len() - quarter..]);

    if first_avg == 0.0 {
        return if last_avg > 0.0 {
            Trend::Increasing
        } else if last_avg < 0.0 {
            Trend::Decreasing
        } else {
            Trend::Stable
        };
    }

    let diff = (last_avg - first_avg) / first_avg;
    if diff > TREND_THRESHOLD {
        Trend::Increasing
    } else if diff < -TREND_THRESHOLD {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}

fn quarter_mean(points: &[DataPoint]) -> f64 {
    points.iter().map(|p| p.value).sum::<f64>() / points.len() as f64
}

/// Variance divided by mean, times 100
///
/// The population variance is used where a standard deviation would be
/// expected; dashboards are calibrated against this value. Returns 0 for
/// fewer than two points or a zero mean.
pub fn coefficient_of_variation(points: &[DataPoint]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }

    let n = points.len() as f64;
    let mean = points.iter().map(|p| p.value).sum::<f64>() / n;
    if mean == 0.0 {
        return 0.0;
    }

    let variance = points
        .iter()
        .map(|p| (p.value - mean) * (p.value - mean))
        .sum::<f64>()
        / n;

    variance / mean * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn series(values: impl IntoIterator<Item = f64>) -> Vec<DataPoint> {
        values
            .into_iter()
            .enumerate()
            .map(|(i, v)| DataPoint::new(Utc.timestamp_opt(i as i64 * 300, 0).unwrap(), v))
            .collect()
    }

    #[test]
    fn test_trend_needs_enough_samples() {
        assert_eq!(classify_trend(&[]), Trend::Unknown);
        assert_eq!(classify_trend(&series([1.0; 9])), Trend::InsufficientData);
    }

    #[test]
    fn test_flat_series_is_stable() {
        assert_eq!(classify_trend(&series([10.0; 12])), Trend::Stable);
    }

    #[test]
    fn test_ramp_is_increasing() {
        assert_eq!(classify_trend(&series((1..=20).map(f64::from))), Trend::Increasing);
        assert_eq!(
            classify_trend(&series((1..=20).rev().map(f64::from))),
            Trend::Decreasing
        );
    }

    #[test]
    fn test_change_within_threshold_is_stable() {
        // first quarter 10, last quarter 10.5
        let mut values = vec![10.0; 10];
        values.extend([10.5; 2]);
        assert_eq!(classify_trend(&series(values)), Trend::Stable);
    }

    #[test]
    fn test_zero_first_quarter_follows_last_quarter_sign() {
        let mut rising = vec![0.0; 6];
        rising.extend([1.0; 6]);
        assert_eq!(classify_trend(&series(rising)), Trend::Increasing);

        assert_eq!(classify_trend(&series([0.0; 12])), Trend::Stable);

        let mut falling = vec![0.0; 6];
        falling.extend([-1.0; 6]);
        assert_eq!(classify_trend(&series(falling)), Trend::Decreasing);
    }

    #[test]
    fn test_variation_uses_variance() {
        // mean 2, population variance 1, so 1 / 2 * 100
        let cv = coefficient_of_variation(&series([1.0, 3.0]));
        assert!((cv - 50.0).abs() < 1e-12);
    }

    #[test]
    fn test_variation_edge_cases() {
        assert_eq!(coefficient_of_variation(&series([5.0])), 0.0);
        assert_eq!(coefficient_of_variation(&series([0.0, 0.0, 0.0])), 0.0);
        assert_eq!(coefficient_of_variation(&series([4.0; 6])), 0.0);
    }
}
