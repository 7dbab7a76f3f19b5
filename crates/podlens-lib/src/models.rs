//! Core data models for pod resource analysis
//!
//! Field names serialize in camelCase to match the dashboard payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single sample of a range query
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl DataPoint {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Coarse direction of change over the analysis window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
    #[default]
    Unknown,
    InsufficientData,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Increasing => "increasing",
            Trend::Decreasing => "decreasing",
            Trend::Stable => "stable",
            Trend::Unknown => "unknown",
            Trend::InsufficientData => "insufficient_data",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Historical usage, requests and limits of one resource of one container
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSeries {
    pub usage: Vec<DataPoint>,
    pub requests: Vec<DataPoint>,
    pub limits: Vec<DataPoint>,
    pub average: f64,
    pub peak: f64,
    pub minimum: f64,
    pub p95: f64,
    pub p99: f64,
    pub trend: Trend,
}

/// Over/under-provisioning flags
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceWaste {
    pub cpu_over_provisioned: bool,
    pub memory_over_provisioned: bool,
    pub cpu_under_provisioned: bool,
    pub memory_under_provisioned: bool,
    pub cpu_waste_percentage: f64,
    pub memory_waste_percentage: f64,
}

impl ResourceWaste {
    pub fn any_over_provisioned(&self) -> bool {
        self.cpu_over_provisioned || self.memory_over_provisioned
    }

    pub fn any_under_provisioned(&self) -> bool {
        self.cpu_under_provisioned || self.memory_under_provisioned
    }
}

/// Variation metrics of the usage series
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsagePatterns {
    /// Always empty, kept for payload compatibility
    pub peak_hours: Vec<u32>,
    /// Always empty, kept for payload compatibility
    pub low_usage_hours: Vec<u32>,
    /// Variation of CPU usage
    pub daily_variation: f64,
    /// Variation of memory usage
    pub weekly_variation: f64,
}

/// Efficiency, waste and recommendations derived from a CPU/memory pair
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageAnalysis {
    pub cpu_efficiency: f64,
    pub memory_efficiency: f64,
    pub resource_waste: ResourceWaste,
    pub recommendations: Vec<String>,
    pub patterns: UsagePatterns,
}

impl UsageAnalysis {
    /// Mean of CPU and memory efficiency
    pub fn average_efficiency(&self) -> f64 {
        (self.cpu_efficiency + self.memory_efficiency) / 2.0
    }
}

/// Identifies one container of one pod
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerRef {
    pub namespace: String,
    pub pod: String,
    pub container: String,
}

impl ContainerRef {
    pub fn new(
        namespace: impl Into<String>,
        pod: impl Into<String>,
        container: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            pod: pod.into(),
            container: container.into(),
        }
    }
}

impl fmt::Display for ContainerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.namespace, self.pod, self.container)
    }
}

/// Historical analysis of one container
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalMetrics {
    pub pod_name: String,
    pub namespace: String,
    pub container_name: String,
    pub cpu: ResourceSeries,
    pub memory: ResourceSeries,
    pub analysis: UsageAnalysis,
}

/// Aggregate over all analyzed containers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    pub total_pods_analyzed: usize,
    pub over_provisioned_pods: usize,
    pub under_provisioned_pods: usize,
    pub well_optimized_pods: usize,
    pub average_efficiency: f64,
    pub total_recommendations: usize,
    pub most_common_recommendation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Response of the historical analysis endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalAnalysisList {
    pub historical_metrics: Vec<HistoricalMetrics>,
    pub generated_at: DateTime<Utc>,
    pub time_range: TimeRange,
    pub summary: AnalysisSummary,
}

/// Review urgency of a pod
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    High,
    Medium,
    Low,
    #[default]
    Unknown,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::High => "high",
            RiskLevel::Medium => "medium",
            RiskLevel::Low => "low",
            RiskLevel::Unknown => "unknown",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodTrendSummary {
    pub overall_trend: Trend,
    pub resource_recommendations: Vec<String>,
    pub risk_level: RiskLevel,
    pub next_review_date: Option<DateTime<Utc>>,
}

/// Response of the single-pod trends endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodTrendAnalysis {
    pub pod_name: String,
    pub namespace: String,
    pub containers: Vec<HistoricalMetrics>,
    pub days_analyzed: u32,
    pub generated_at: DateTime<Utc>,
    pub summary: PodTrendSummary,
}

/// A pod observed during discovery, with the containers that emitted samples
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodInfo {
    pub name: String,
    pub namespace: String,
    pub containers: Vec<String>,
}

/// Current raw usage of a container, CPU in cores and memory in bytes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodMetric {
    pub name: String,
    pub namespace: String,
    pub container_name: String,
    pub cpu_usage: f64,
    pub cpu_request: f64,
    pub cpu_limit: f64,
    pub memory_usage: f64,
    pub memory_request: f64,
    pub memory_limit: f64,
    pub labels: BTreeMap<String, String>,
}

fn is_zero(value: &f64) -> bool {
    *value == 0.0
}

/// Display form of one resource of a container
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceMetrics {
    pub usage: String,
    pub request: String,
    pub limit: String,
    pub usage_value: f64,
    pub request_value: f64,
    pub limit_value: f64,
    /// usage / request * 100
    pub request_percentage: f64,
    /// usage / limit * 100
    #[serde(default, skip_serializing_if = "is_zero")]
    pub limit_percentage: f64,
}

/// Display form of the current usage of a container
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodMetrics {
    pub name: String,
    pub namespace: String,
    pub container_name: String,
    pub cpu: ResourceMetrics,
    pub memory: ResourceMetrics,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PodMetricsList {
    pub pods: Vec<PodMetrics>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NamespaceList {
    pub namespaces: Vec<String>,
}
