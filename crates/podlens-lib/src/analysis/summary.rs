//! Aggregation over analyzed containers

use super::waste::OVER_PROVISIONED_BELOW;
use crate::models::{AnalysisSummary, HistoricalMetrics, PodTrendSummary, RiskLevel, Trend};
use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, HashSet};

/// Summarize a historical analysis
pub fn summarize_analysis(metrics: &[HistoricalMetrics]) -> AnalysisSummary {
    if metrics.is_empty() {
        return AnalysisSummary::default();
    }

    let mut summary = AnalysisSummary {
        total_pods_analyzed: metrics.len(),
        ..Default::default()
    };
    let mut total_efficiency = 0.0;

    for metric in metrics {
        let waste = &metric.analysis.resource_waste;
        if waste.any_over_provisioned() {
            summary.over_provisioned_pods += 1;
        } else if waste.any_under_provisioned() {
            summary.under_provisioned_pods += 1;
        } else {
            summary.well_optimized_pods += 1;
        }

        total_efficiency += metric.analysis.average_efficiency();
        summary.total_recommendations += metric.analysis.recommendations.len();
    }

    summary.average_efficiency = total_efficiency / metrics.len() as f64;
    summary.most_common_recommendation = most_common(
        metrics
            .iter()
            .flat_map(|m| m.analysis.recommendations.iter().map(String::as_str)),
    )
    .unwrap_or_default()
    .to_string();

    summary
}

/// Most frequent item; the earliest seen wins a tie
fn most_common<'a>(items: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    for item in items {
        let count = counts.entry(item).or_insert(0);
        if *count == 0 {
            order.push(item);
        }
        *count += 1;
    }

    let mut best: Option<(&str, usize)> = None;
    for item in order {
        let count = counts[item];
        if best.map_or(true, |(_, max)| count > max) {
            best = Some((item, count));
        }
    }
    best.map(|(item, _)| item)
}

impl RiskLevel {
    /// Delay until the pod should be looked at again
    pub fn review_interval(&self) -> Option<Duration> {
        match self {
            RiskLevel::High => Some(Duration::days(3)),
            RiskLevel::Medium => Some(Duration::days(7)),
            RiskLevel::Low => Some(Duration::days(30)),
            RiskLevel::Unknown => None,
        }
    }
}

/// Summarize the containers of one pod
pub fn summarize_pod_trend(containers: &[HistoricalMetrics], now: DateTime<Utc>) -> PodTrendSummary {
    if containers.is_empty() {
        return PodTrendSummary {
            overall_trend: Trend::Unknown,
            risk_level: RiskLevel::Unknown,
            ..Default::default()
        };
    }

    let half = containers.len() / 2;
    let increasing = containers
        .iter()
        .filter(|c| c.cpu.trend == Trend::Increasing)
        .count();
    let decreasing = containers
        .iter()
        .filter(|c| c.cpu.trend == Trend::Decreasing)
        .count();
    let low_efficiency = containers
        .iter()
        .filter(|c| c.analysis.average_efficiency() < OVER_PROVISIONED_BELOW)
        .count();

    let overall_trend = if increasing > half {
        Trend::Increasing
    } else if decreasing > half {
        Trend::Decreasing
    } else {
        Trend::Stable
    };

    let risk_level = if low_efficiency > half || increasing > half {
        RiskLevel::High
    } else if low_efficiency > 0 || increasing > 0 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };

    let mut seen = HashSet::new();
    let resource_recommendations = containers
        .iter()
        .flat_map(|c| c.analysis.recommendations.iter())
        .filter(|rec| seen.insert(rec.as_str()))
        .cloned()
        .collect();

    PodTrendSummary {
        overall_trend,
        resource_recommendations,
        risk_level,
        next_review_date: risk_level.review_interval().map(|interval| now + interval),
    }
}
