//! Metrics backends
//!
//! The analysis engine only sees the [`MetricsBackend`] trait. Prometheus and
//! VictoriaMetrics both expose the Prometheus HTTP query API, so the two
//! adapters share one wire client and differ only in URL handling, naming
//! and the namespace listing query.

mod prom;
mod victoria;
mod wire;

pub use prom::PrometheusBackend;
pub use victoria::VictoriaMetricsBackend;
pub use wire::HttpQueryClient;

use crate::error::BackendError;
use crate::models::DataPoint;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

pub use async_trait::async_trait;

/// Fixed resolution of historical range queries
pub const DEFAULT_STEP: Duration = Duration::from_secs(5 * 60);

/// Supported backend implementations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Prometheus,
    #[default]
    VictoriaMetrics,
}

impl BackendKind {
    /// Configuration name of the backend
    pub fn name(&self) -> &'static str {
        match self {
            BackendKind::Prometheus => "prometheus",
            BackendKind::VictoriaMetrics => "victoriametrics",
        }
    }

    /// Client type reported by the health endpoint
    pub fn client_type(&self) -> &'static str {
        match self {
            BackendKind::Prometheus => "prometheus",
            BackendKind::VictoriaMetrics => "vmagent",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prometheus" => Ok(BackendKind::Prometheus),
            "victoriametrics" | "victoria-metrics" | "vm" => Ok(BackendKind::VictoriaMetrics),
            other => Err(format!("unknown metrics backend: {}", other)),
        }
    }
}

/// One series of an instant query result
#[derive(Debug, Clone, PartialEq)]
pub struct InstantSample {
    pub labels: BTreeMap<String, String>,
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl InstantSample {
    /// Label value, empty when absent
    pub fn label(&self, name: &str) -> &str {
        self.labels.get(name).map(String::as_str).unwrap_or("")
    }
}

/// One series of a range query result
#[derive(Debug, Clone, PartialEq)]
pub struct RangeSeries {
    pub labels: BTreeMap<String, String>,
    pub points: Vec<DataPoint>,
}

/// Time window and resolution of a range query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub step: Duration,
}

impl QueryRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>, step: Duration) -> Self {
        Self { start, end, step }
    }
}

/// Trait for Prometheus-compatible query backends
#[async_trait]
pub trait MetricsBackend: Send + Sync {
    /// Which implementation this is
    fn kind(&self) -> BackendKind;

    /// Query used to list namespaces
    fn namespace_query(&self) -> &'static str;

    /// Evaluate an instant query at `at`
    async fn query(&self, promql: &str, at: DateTime<Utc>) -> Result<Vec<InstantSample>, BackendError>;

    /// Evaluate a range query
    async fn query_range(
        &self,
        promql: &str,
        range: &QueryRange,
    ) -> Result<Vec<RangeSeries>, BackendError>;
}

/// Create the backend selected by configuration
pub fn create_backend(
    kind: BackendKind,
    url: &str,
    timeout: Duration,
) -> Result<Arc<dyn MetricsBackend>, BackendError> {
    match kind {
        BackendKind::Prometheus => {
            tracing::info!(url = %url, "Using Prometheus metrics backend");
            Ok(Arc::new(PrometheusBackend::new(url, timeout)?))
        }
        BackendKind::VictoriaMetrics => {
            tracing::info!(url = %url, "Using VictoriaMetrics metrics backend");
            Ok(Arc::new(VictoriaMetricsBackend::new(url, timeout)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_kind_parsing() {
        assert_eq!("prometheus".parse::<BackendKind>().unwrap(), BackendKind::Prometheus);
        assert_eq!(
            "VictoriaMetrics".parse::<BackendKind>().unwrap(),
            BackendKind::VictoriaMetrics
        );
        assert!("influx".parse::<BackendKind>().is_err());
        assert_eq!(BackendKind::default(), BackendKind::VictoriaMetrics);
    }

    #[test]
    fn test_client_types() {
        assert_eq!(BackendKind::Prometheus.client_type(), "prometheus");
        assert_eq!(BackendKind::VictoriaMetrics.client_type(), "vmagent");
    }

    #[test]
    fn test_create_backend_rejects_bad_url() {
        let result = create_backend(BackendKind::Prometheus, "not a url", DEFAULT_STEP);
        assert!(matches!(result, Err(BackendError::InvalidUrl(_))));
    }
}
