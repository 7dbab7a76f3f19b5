//! Request-scoped analysis orchestration
//!
//! The engine owns the selected [`MetricsBackend`] and turns each request
//! into discovery, a bounded fan-out of per-container series fetches and
//! the pure analysis functions. Nothing is cached between requests.

mod current;
mod discovery;
mod fetch;


pub use discovery::{container_refs, group_containers};
pub use fetch::{merge_series, SeriesFetcher, UsageUnavailable};

use crate::analysis::{analyze_container, summarize_analysis, summarize_pod_trend};
use crate::backend::{BackendKind, MetricsBackend, QueryRange, DEFAULT_STEP};
use crate::error::AnalysisError;
use crate::health::{components, HealthRegistry};
use crate::models::{
    HistoricalAnalysisList, HistoricalMetrics, PodMetric, PodTrendAnalysis, TimeRange,
};
use crate::observability::{ServiceMetrics, StructuredLogger};
use crate::queries::NamespaceFilter;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error};

/// Default length of the analysis window in days
pub const DEFAULT_HISTORY_DAYS: u32 = 7;

/// Longest window accepted by the trends operation
pub const MAX_TREND_DAYS: u32 = 30;

/// Returned when a pod has no analyzable container
pub const NO_TREND_DATA: &str = "No trend data found for the specified pod";

/// Engine tuning
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Containers fetched concurrently
    pub max_concurrent_queries: usize,
    /// Resolution of range queries
    pub step: Duration,
    /// Window of the historical analysis
    pub history_days: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_concurrent_queries: 8,
            step: DEFAULT_STEP,
            history_days: DEFAULT_HISTORY_DAYS,
        }
    }
}

/// Historical analysis engine over one metrics backend
#[derive(Clone)]
pub struct AnalysisEngine {
    backend: Arc<dyn MetricsBackend>,
    config: EngineConfig,
    logger: StructuredLogger,
    metrics: ServiceMetrics,
    health: Option<HealthRegistry>,
}

impl AnalysisEngine {
    pub fn new(backend: Arc<dyn MetricsBackend>, config: EngineConfig) -> Self {
        let logger = StructuredLogger::new(backend.kind().name());
        Self {
            backend,
            config,
            logger,
            metrics: ServiceMetrics::new(),
            health: None,
        }
    }

    /// Report discovery outcomes to `health`
    pub fn with_health(mut self, health: HealthRegistry) -> Self {
        self.health = Some(health);
        self
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn logger(&self) -> &StructuredLogger {
        &self.logger
    }

    /// Analyze every active container in scope over the configured window
    pub async fn get_historical_metrics(
        &self,
        filter: &NamespaceFilter,
    ) -> Result<HistoricalAnalysisList, AnalysisError> {
        let time_range = window_ending_at(Utc::now(), self.config.history_days);
        let historical_metrics = self.analyze_window(filter, None, time_range).await?;
        let summary = summarize_analysis(&historical_metrics);

        Ok(HistoricalAnalysisList {
            historical_metrics,
            generated_at: Utc::now(),
            time_range,
            summary,
        })
    }

    /// Trend analysis of a single pod over `days`, clamped to 1..=30
    pub async fn get_pod_trends(
        &self,
        namespace: &str,
        pod: &str,
        days: u32,
    ) -> Result<PodTrendAnalysis, AnalysisError> {
        if namespace.trim().is_empty() || pod.trim().is_empty() {
            return Err(AnalysisError::invalid_input(
                "namespace and pod parameters are required",
            ));
        }

        let days = days.clamp(1, MAX_TREND_DAYS);
        let now = Utc::now();
        let containers = self
            .analyze_window(
                &NamespaceFilter::Exact(namespace.to_string()),
                Some(pod),
                window_ending_at(now, days),
            )
            .await?;

        if containers.is_empty() {
            return Err(AnalysisError::not_found(NO_TREND_DATA));
        }

        let summary = summarize_pod_trend(&containers, now);
        Ok(PodTrendAnalysis {
            pod_name: pod.to_string(),
            namespace: namespace.to_string(),
            containers,
            days_analyzed: days,
            generated_at: now,
            summary,
        })
    }

    /// Discovery, fan-out and per-container analysis over one window
    ///
    /// Results keep discovery order. Containers whose usage series fail are
    /// skipped; a discovery failure fails the whole call.
    pub async fn analyze_window(
        &self,
        filter: &NamespaceFilter,
        pod: Option<&str>,
        window: TimeRange,
    ) -> Result<Vec<HistoricalMetrics>, AnalysisError> {
        let started = Instant::now();

        let pods = match discovery::discover(self.backend.as_ref(), filter, pod, window.end).await {
            Ok(pods) => {
                self.report_backend(None).await;
                pods
            }
            Err(e) => {
                error!(namespace = %filter, error = %e, "Pod discovery failed");
                self.metrics.inc_query_errors("discovery");
                self.report_backend(Some(e.to_string())).await;
                return Err(AnalysisError::Discovery(e));
            }
        };

        let targets = container_refs(&pods);
        debug!(
            namespace = %filter,
            pods = pods.len(),
            containers = targets.len(),
            "Discovered active containers"
        );

        let range = QueryRange::new(window.start, window.end, self.config.step);
        let fetcher = SeriesFetcher::new(
            self.backend.clone(),
            range,
            self.logger.clone(),
            self.metrics.clone(),
        );

        let analyzed: Vec<HistoricalMetrics> = stream::iter(targets.iter().cloned())
            .map(|target| {
                let fetcher = fetcher.clone();
                async move {
                    let (cpu, memory) = fetcher.fetch(&target).await.ok()?;
                    Some(analyze_container(&target, cpu, memory))
                }
            })
            .buffered(self.config.max_concurrent_queries.max(1))
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .flatten()
            .collect();

        let skipped = targets.len() - analyzed.len();
        self.metrics.inc_containers_analyzed(analyzed.len() as u64);
        self.metrics.inc_containers_skipped(skipped as u64);
        self.report_engine(targets.len(), analyzed.len()).await;

        let elapsed = started.elapsed().as_secs_f64();
        self.metrics.observe_analysis_duration(elapsed);
        self.logger.log_analysis_completed(
            &pod.map(|p| format!("{}/{}", filter, p))
                .unwrap_or_else(|| filter.to_string()),
            targets.len(),
            analyzed.len(),
            elapsed,
        );

        Ok(analyzed)
    }

    /// Current usage with requests and limits
    pub async fn get_current_pod_metrics(
        &self,
        filter: &NamespaceFilter,
    ) -> Result<Vec<PodMetric>, AnalysisError> {
        current::current_pod_metrics(
            self.backend.as_ref(),
            filter,
            Utc::now(),
            &self.logger,
            &self.metrics,
        )
        .await
    }

    pub async fn get_namespaces(&self) -> Result<Vec<String>, AnalysisError> {
        current::namespaces(self.backend.as_ref(), Utc::now())
            .await
            .map_err(|source| AnalysisError::Query {
                what: "namespaces",
                source,
            })
    }

    async fn report_backend(&self, failure: Option<String>) {
        let Some(health) = &self.health else {
            return;
        };
        match failure {
            None => health.set_healthy(components::METRICS_BACKEND).await,
            Some(message) => health.set_degraded(components::METRICS_BACKEND, message).await,
        }
    }

    /// Degraded when containers were discovered but none could be analyzed
    async fn report_engine(&self, discovered: usize, analyzed: usize) {
        let Some(health) = &self.health else {
            return;
        };
        if discovered > 0 && analyzed == 0 {
            health
                .set_degraded(
                    components::ANALYSIS_ENGINE,
                    format!("all {} containers skipped", discovered),
                )
                .await;
        } else {
            health.set_healthy(components::ANALYSIS_ENGINE).await;
        }
    }
}

/// `[end - days, end]`
pub fn window_ending_at(end: DateTime<Utc>, days: u32) -> TimeRange {
    TimeRange {
        start: end - ChronoDuration::days(i64::from(days)),
        end,
    }
}
