//! Scalar statistics over a usage series

use crate::models::DataPoint;

/// Arithmetic mean, 0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Mean of the values of a point series, 0 when empty
pub fn mean_of(points: &[DataPoint]) -> f64 {
    if points.is_empty() {
        return 0.0;
    }
    points.iter().map(|p| p.value).sum::<f64>() / points.len() as f64
}

/// Approximate percentile used throughout the dashboard payload
///
/// Takes `index = floor(p * n)` clamped to `n - 1` and returns the mean of
/// the first `index` values in their original order. This is not an order
/// statistic; consumers compare against values computed this way.
pub fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len();
    let index = ((p * n as f64).floor().max(0.0) as usize).min(n - 1);
    if index == 0 {
        return 0.0;
    }
    mean(&values[..index])
}

/// Derived scalars of one usage series
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UsageStats {
    pub average: f64,
    pub peak: f64,
    pub minimum: f64,
    pub p95: f64,
    pub p99: f64,
}

/// Compute the summary scalars, all zero for an empty series
pub fn summarize(usage: &[DataPoint]) -> UsageStats {
    let Some(first) = usage.first() else {
        return UsageStats::default();
    };

    let values: Vec<f64> = usage.iter().map(|p| p.value).collect();
    let (minimum, peak) = values
        .iter()
        .fold((first.value, first.value), |(lo, hi), &v| (lo.min(v), hi.max(v)));

    UsageStats {
        average: mean(&values),
        peak,
        minimum,
        p95: percentile(&values, 0.95),
        p99: percentile(&values, 0.99),
    }
}
