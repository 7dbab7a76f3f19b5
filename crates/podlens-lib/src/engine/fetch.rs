//! Range-series fetching for one container
//!
//! Six series per container run concurrently. Usage series are required;
//! requests and limits degrade to empty sequences when unavailable.

use crate::analysis::ResourceSamples;
use crate::backend::{MetricsBackend, QueryRange, RangeSeries};
use crate::error::BackendError;
use crate::models::{ContainerRef, DataPoint};
use crate::observability::{ServiceMetrics, StructuredLogger};
use crate::queries::{self, Allocation, ResourceKind};
use std::sync::Arc;

/// A required series could not be fetched
#[derive(Debug)]
pub struct UsageUnavailable {
    pub series: &'static str,
    pub source: BackendError,
}

/// Merge every series of a range result into one timestamp-ordered sequence
///
/// The sort is stable, so points sharing a timestamp keep result order.
pub fn merge_series(series: Vec<RangeSeries>) -> Vec<DataPoint> {
    let mut points: Vec<DataPoint> = series.into_iter().flat_map(|s| s.points).collect();
    points.sort_by_key(|p| p.timestamp);
    points
}

/// Fetches the CPU and memory series of containers over one window
///
/// Clones share the backend and are handed to each per-container future.
#[derive(Clone)]
pub struct SeriesFetcher {
    backend: Arc<dyn MetricsBackend>,
    range: QueryRange,
    logger: StructuredLogger,
    metrics: ServiceMetrics,
}

impl SeriesFetcher {
    pub fn new(
        backend: Arc<dyn MetricsBackend>,
        range: QueryRange,
        logger: StructuredLogger,
        metrics: ServiceMetrics,
    ) -> Self {
        Self {
            backend,
            range,
            logger,
            metrics,
        }
    }

    async fn range(&self, query: String) -> Result<Vec<DataPoint>, BackendError> {
        let series = self.backend.query_range(&query, &self.range).await?;
        Ok(merge_series(series))
    }

    /// Fetch CPU and memory samples of one container
    pub async fn fetch(
        &self,
        target: &ContainerRef,
    ) -> Result<(ResourceSamples, ResourceSamples), UsageUnavailable> {
        let (cpu_usage, memory_usage, cpu_requests, cpu_limits, memory_requests, memory_limits) = tokio::join!(
            self.range(queries::container_usage(ResourceKind::Cpu, target)),
            self.range(queries::container_usage(ResourceKind::Memory, target)),
            self.allocation(Allocation::Requests, ResourceKind::Cpu, target),
            self.allocation(Allocation::Limits, ResourceKind::Cpu, target),
            self.allocation(Allocation::Requests, ResourceKind::Memory, target),
            self.allocation(Allocation::Limits, ResourceKind::Memory, target),
        );

        let cpu_usage = self.required("cpu_usage", target, cpu_usage)?;
        let memory_usage = self.required("memory_usage", target, memory_usage)?;

        Ok((
            ResourceSamples {
                usage: cpu_usage,
                requests: cpu_requests,
                limits: cpu_limits,
            },
            ResourceSamples {
                usage: memory_usage,
                requests: memory_requests,
                limits: memory_limits,
            },
        ))
    }

    fn required(
        &self,
        series: &'static str,
        target: &ContainerRef,
        result: Result<Vec<DataPoint>, BackendError>,
    ) -> Result<Vec<DataPoint>, UsageUnavailable> {
        result.map_err(|source| {
            self.metrics.inc_query_errors(series);
            self.logger
                .log_container_skipped(&target.to_string(), series, &source.to_string());
            UsageUnavailable { series, source }
        })
    }

    async fn allocation(
        &self,
        allocation: Allocation,
        kind: ResourceKind,
        target: &ContainerRef,
    ) -> Vec<DataPoint> {
        let query = queries::container_allocation(allocation, kind, target);
        match self.range(query).await {
            Ok(points) => points,
            Err(e) => {
                let series = format!("{}_{}", kind.label(), allocation.label());
                self.metrics.inc_query_errors(&series);
                self.logger
                    .log_optional_series_unavailable(&target.to_string(), &series, &e.to_string());
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;

    fn point(secs: i64, value: f64) -> DataPoint {
        DataPoint::new(Utc.timestamp_opt(secs, 0).unwrap(), value)
    }

    #[test]
    fn test_merge_series_sorts_by_timestamp() {
        let merged = merge_series(vec![
            RangeSeries {
                labels: BTreeMap::new(),
                points: vec![point(600, 3.0), point(900, 4.0)],
            },
            RangeSeries {
                labels: BTreeMap::new(),
                points: vec![point(0, 1.0), point(600, 2.0)],
            },
        ]);

        let values: Vec<f64> = merged.iter().map(|p| p.value).collect();
        // equal timestamps keep result order
        assert_eq!(values, vec![1.0, 3.0, 2.0, 4.0]);
    }

    #[test]
    fn test_merge_empty_result() {
        assert!(merge_series(Vec::new()).is_empty());
    }
}
