//! Observability infrastructure for the analysis service
//!
//! Provides:
//! - Prometheus self-metrics (backend query latency, analysis duration, skips, timeouts)
//! - Structured JSON logging with tracing

use prometheus::{
    register_histogram, register_histogram_vec, register_int_counter, register_int_counter_vec,
    Histogram, HistogramVec, IntCounter, IntCounterVec,
};
use std::fmt;
use std::sync::OnceLock;
use tracing::{info, warn};

/// Histogram buckets for backend round trips (in seconds)
const QUERY_LATENCY_BUCKETS: &[f64] = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

/// Histogram buckets for whole analysis requests (in seconds)
const ANALYSIS_BUCKETS: &[f64] = &[0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 20.0, 30.0, 60.0];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<ServiceMetricsInner> = OnceLock::new();

struct ServiceMetricsInner {
    backend_query_latency_seconds: HistogramVec,
    backend_query_errors: IntCounterVec,
    containers_analyzed: IntCounter,
    containers_skipped: IntCounter,
    analysis_duration_seconds: Histogram,
    request_timeouts: IntCounterVec,
}

impl ServiceMetricsInner {
    fn new() -> Self {
        Self {
            backend_query_latency_seconds: register_histogram_vec!(
                "podlens_backend_query_latency_seconds",
                "Round-trip time of metrics backend queries",
                &["kind"],
                QUERY_LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register backend_query_latency_seconds"),

            backend_query_errors: register_int_counter_vec!(
                "podlens_backend_query_errors_total",
                "Backend query failures by series",
                &["series"]
            )
            .expect("Failed to register backend_query_errors_total"),

            containers_analyzed: register_int_counter!(
                "podlens_containers_analyzed_total",
                "Containers that produced a historical analysis"
            )
            .expect("Failed to register containers_analyzed_total"),

            containers_skipped: register_int_counter!(
                "podlens_containers_skipped_total",
                "Containers skipped because their usage series could not be fetched"
            )
            .expect("Failed to register containers_skipped_total"),

            analysis_duration_seconds: register_histogram!(
                "podlens_analysis_duration_seconds",
                "Time spent on a full historical analysis",
                ANALYSIS_BUCKETS.to_vec()
            )
            .expect("Failed to register analysis_duration_seconds"),

            request_timeouts: register_int_counter_vec!(
                "podlens_request_timeouts_total",
                "Requests that exceeded their route deadline",
                &["route"]
            )
            .expect("Failed to register request_timeouts_total"),
        }
    }
}

/// Service metrics for Prometheus exposition
///
/// Lightweight handle to the global metrics instance; clones share the
/// same underlying metrics.
#[derive(Clone)]
pub struct ServiceMetrics {
    _private: (),
}

impl fmt::Debug for ServiceMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ServiceMetrics")
    }
}

impl Default for ServiceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(ServiceMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &ServiceMetricsInner {
        GLOBAL_METRICS.get_or_init(ServiceMetricsInner::new)
    }

    /// Record a backend round trip; `kind` is `instant` or `range`
    pub fn observe_query_latency(&self, kind: &str, duration_secs: f64) {
        self.inner()
            .backend_query_latency_seconds
            .with_label_values(&[kind])
            .observe(duration_secs);
    }

    pub fn inc_query_errors(&self, series: &str) {
        self.inner()
            .backend_query_errors
            .with_label_values(&[series])
            .inc();
    }

    pub fn inc_containers_analyzed(&self, count: u64) {
        self.inner().containers_analyzed.inc_by(count);
    }

    pub fn inc_containers_skipped(&self, count: u64) {
        self.inner().containers_skipped.inc_by(count);
    }

    pub fn observe_analysis_duration(&self, duration_secs: f64) {
        self.inner().analysis_duration_seconds.observe(duration_secs);
    }

    pub fn inc_request_timeouts(&self, route: &str) {
        self.inner().request_timeouts.with_label_values(&[route]).inc();
    }
}

/// Structured logger for service events
///
/// Every event carries an `event` field so log pipelines can filter on it.
#[derive(Debug, Clone)]
pub struct StructuredLogger {
    backend: String,
}

impl StructuredLogger {
    pub fn new(backend: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
        }
    }

    pub fn backend(&self) -> &str {
        &self.backend
    }

    /// Log service startup
    pub fn log_startup(&self, version: &str, port: u16) {
        info!(
            event = "server_started",
            backend = %self.backend,
            version = %version,
            port = port,
            "Pod metrics gateway started"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "server_shutdown",
            backend = %self.backend,
            reason = %reason,
            "Pod metrics gateway shutting down"
        );
    }

    /// Log the selected backend and the knobs that are accepted but inert
    pub fn log_backend_configured(
        &self,
        client_type: &str,
        url: &str,
        timeout_secs: u64,
        retry_attempts: u32,
        enable_caching: bool,
    ) {
        info!(
            event = "backend_configured",
            backend = %self.backend,
            client_type = %client_type,
            url = %url,
            timeout_secs = timeout_secs,
            retry_attempts = retry_attempts,
            enable_caching = enable_caching,
            "Metrics backend configured"
        );
    }

    /// Log a container dropped from an analysis
    pub fn log_container_skipped(&self, container: &str, series: &str, error: &str) {
        warn!(
            event = "container_skipped",
            backend = %self.backend,
            container = %container,
            series = %series,
            error = %error,
            "Skipping container, usage series unavailable"
        );
    }

    /// Log a requests/limits series that could not be fetched
    pub fn log_optional_series_unavailable(&self, container: &str, series: &str, error: &str) {
        warn!(
            event = "optional_series_unavailable",
            backend = %self.backend,
            container = %container,
            series = %series,
            error = %error,
            "Continuing without optional series"
        );
    }

    pub fn log_analysis_completed(
        &self,
        scope: &str,
        discovered: usize,
        analyzed: usize,
        duration_secs: f64,
    ) {
        info!(
            event = "analysis_completed",
            backend = %self.backend,
            scope = %scope,
            containers_discovered = discovered,
            containers_analyzed = analyzed,
            duration_secs = duration_secs,
            "Historical analysis completed"
        );
    }

    pub fn log_request_timed_out(&self, route: &str, deadline_secs: u64) {
        warn!(
            event = "request_timed_out",
            backend = %self.backend,
            route = %route,
            deadline_secs = deadline_secs,
            "Request exceeded its deadline"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_metrics_are_shared() {
        let metrics = ServiceMetrics::new();
        let clone = metrics.clone();

        metrics.observe_query_latency("range", 0.02);
        clone.inc_query_errors("cpu_requests");
        clone.inc_containers_analyzed(3);
        metrics.inc_containers_skipped(1);
        metrics.observe_analysis_duration(1.5);
        metrics.inc_request_timeouts("/api/pods/analysis");

        let families = prometheus::gather();
        let names: Vec<&str> = families.iter().map(|f| f.get_name()).collect();
        assert!(names.contains(&"podlens_backend_query_latency_seconds"));
        assert!(names.contains(&"podlens_request_timeouts_total"));
    }

    #[test]
    fn test_structured_logger_creation() {
        let logger = StructuredLogger::new("prometheus");
        assert_eq!(logger.backend(), "prometheus");
    }
}
