//! Prometheus backend

use super::{async_trait, BackendKind, HttpQueryClient, InstantSample, MetricsBackend, QueryRange, RangeSeries};
use crate::error::BackendError;
use chrono::{DateTime, Utc};
use std::time::Duration;
use url::Url;

/// kube-state-metrics is expected next to Prometheus
const NAMESPACE_QUERY: &str = "group by (namespace) (kube_pod_info)";

/// Prometheus HTTP API backend
#[derive(Debug, Clone)]
pub struct PrometheusBackend {
    http: HttpQueryClient,
}

impl PrometheusBackend {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let trimmed = url.trim().trim_end_matches('/');
        let base_url = Url::parse(&format!("{}/", trimmed))
            .map_err(|e| BackendError::InvalidUrl(format!("{}: {}", url, e)))?;

        Ok(Self {
            http: HttpQueryClient::new(base_url, timeout, BackendKind::Prometheus.name())?,
        })
    }

    pub fn base_url(&self) -> &Url {
        self.http.base_url()
    }
}

#[async_trait]
impl MetricsBackend for PrometheusBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Prometheus
    }

    fn namespace_query(&self) -> &'static str {
        NAMESPACE_QUERY
    }

    async fn query(&self, promql: &str, at: DateTime<Utc>) -> Result<Vec<InstantSample>, BackendError> {
        self.http.query(promql, at).await
    }

    async fn query_range(
        &self,
        promql: &str,
        range: &QueryRange,
    ) -> Result<Vec<RangeSeries>, BackendError> {
        self.http.query_range(promql, range).await
    }
}
