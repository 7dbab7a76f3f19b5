//! Current usage snapshot and namespace listing

use crate::backend::{InstantSample, MetricsBackend};
use crate::error::{AnalysisError, BackendError};
use crate::models::PodMetric;
use crate::observability::{ServiceMetrics, StructuredLogger};
use crate::queries::{self, Allocation, NamespaceFilter, ResourceKind};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashSet};

type ContainerKey = (String, String, String);

fn key(sample: &InstantSample) -> ContainerKey {
    (
        sample.label("namespace").to_string(),
        sample.label("pod").to_string(),
        sample.label("container").to_string(),
    )
}

fn entry<'m>(snapshot: &'m mut BTreeMap<ContainerKey, PodMetric>, sample: &InstantSample) -> &'m mut PodMetric {
    let (namespace, name, container_name) = key(sample);
    snapshot
        .entry((namespace.clone(), name.clone(), container_name.clone()))
        .or_insert_with(|| PodMetric {
            name,
            namespace,
            container_name,
            ..Default::default()
        })
}

/// Instant usage plus requests and limits, sorted by (namespace, pod, container)
pub async fn current_pod_metrics(
    backend: &dyn MetricsBackend,
    filter: &NamespaceFilter,
    at: DateTime<Utc>,
    logger: &StructuredLogger,
    metrics: &ServiceMetrics,
) -> Result<Vec<PodMetric>, AnalysisError> {
    let cpu_query = queries::current_usage(ResourceKind::Cpu, filter);
    let memory_query = queries::current_usage(ResourceKind::Memory, filter);
    let (cpu, memory) = tokio::join!(
        backend.query(&cpu_query, at),
        backend.query(&memory_query, at)
    );
    let cpu = cpu.map_err(|source| AnalysisError::Query {
        what: "CPU usage",
        source,
    })?;
    let memory = memory.map_err(|source| AnalysisError::Query {
        what: "memory usage",
        source,
    })?;

    let mut snapshot: BTreeMap<ContainerKey, PodMetric> = BTreeMap::new();
    for sample in &cpu {
        entry(&mut snapshot, sample).cpu_usage = sample.value;
    }
    for sample in &memory {
        entry(&mut snapshot, sample).memory_usage = sample.value;
    }

    let allocations = [
        (Allocation::Requests, ResourceKind::Cpu),
        (Allocation::Limits, ResourceKind::Cpu),
        (Allocation::Requests, ResourceKind::Memory),
        (Allocation::Limits, ResourceKind::Memory),
    ];
    let results = futures::future::join_all(allocations.iter().map(|&(allocation, kind)| {
        let query = queries::current_allocation(allocation, kind, filter);
        async move { backend.query(&query, at).await }
    }))
    .await;

    for (&(allocation, kind), result) in allocations.iter().zip(results) {
        match result {
            Ok(samples) => apply_allocation(&mut snapshot, &samples, allocation, kind),
            Err(e) => {
                let series = format!("{}_{}", kind.label(), allocation.label());
                metrics.inc_query_errors(&series);
                logger.log_optional_series_unavailable(&filter.to_string(), &series, &e.to_string());
            }
        }
    }

    Ok(snapshot.into_values().collect())
}

/// Fill requests or limits of containers already in the snapshot
fn apply_allocation(
    snapshot: &mut BTreeMap<ContainerKey, PodMetric>,
    samples: &[InstantSample],
    allocation: Allocation,
    kind: ResourceKind,
) {
    for sample in samples {
        let Some(metric) = snapshot.get_mut(&key(sample)) else {
            continue;
        };
        let slot = match (allocation, kind) {
            (Allocation::Requests, ResourceKind::Cpu) => &mut metric.cpu_request,
            (Allocation::Limits, ResourceKind::Cpu) => &mut metric.cpu_limit,
            (Allocation::Requests, ResourceKind::Memory) => &mut metric.memory_request,
            (Allocation::Limits, ResourceKind::Memory) => &mut metric.memory_limit,
        };
        *slot = sample.value;
    }
}

/// Distinct non-empty namespaces in first-seen order
pub async fn namespaces(
    backend: &dyn MetricsBackend,
    at: DateTime<Utc>,
) -> Result<Vec<String>, BackendError> {
    let samples = backend.query(backend.namespace_query(), at).await?;

    let mut seen = HashSet::new();
    Ok(samples
        .iter()
        .map(|s| s.label("namespace"))
        .filter(|ns| !ns.is_empty() && seen.insert(*ns))
        .map(str::to_string)
        .collect())
}
