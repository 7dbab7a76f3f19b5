//! VictoriaMetrics backend
//!
//! Talks to the Prometheus-compatible API of vmselect, e.g.
//! `http://vmselect:8481/select/0/prometheus`.

use super::{async_trait, BackendKind, HttpQueryClient, InstantSample, MetricsBackend, QueryRange, RangeSeries};
use crate::error::BackendError;
use chrono::{DateTime, Utc};
use std::time::Duration;
use url::Url;

/// Namespaces come from cAdvisor series since kube-state-metrics may be absent
const NAMESPACE_QUERY: &str =
    r#"group by (namespace) (container_cpu_usage_seconds_total{container!="POD", container!=""})"#;

/// VictoriaMetrics vmselect backend
#[derive(Debug, Clone)]
pub struct VictoriaMetricsBackend {
    http: HttpQueryClient,
}

impl VictoriaMetricsBackend {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let mut select_url = url.trim().to_string();
        if !select_url.ends_with('/') {
            select_url.push('/');
        }
        let base_url = Url::parse(&select_url)
            .map_err(|e| BackendError::InvalidUrl(format!("{}: {}", url, e)))?;

        Ok(Self {
            http: HttpQueryClient::new(base_url, timeout, BackendKind::VictoriaMetrics.name())?,
        })
    }

    pub fn base_url(&self) -> &Url {
        self.http.base_url()
    }
}

#[async_trait]
impl MetricsBackend for VictoriaMetricsBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::VictoriaMetrics
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
