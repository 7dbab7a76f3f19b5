//! Pod and container discovery
//!
//! One instant query at the end of the analysis window lists every
//! (namespace, pod, container) that emitted CPU samples.

use crate::backend::{InstantSample, MetricsBackend};
use crate::error::BackendError;
use crate::models::{ContainerRef, PodInfo};
use crate::queries::{self, NamespaceFilter};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tracing::debug;

/// Discover active pods, sorted by (namespace, pod)
pub async fn discover(
    backend: &dyn MetricsBackend,
    filter: &NamespaceFilter,
    pod: Option<&str>,
    at: DateTime<Utc>,
) -> Result<Vec<PodInfo>, BackendError> {
    let query = queries::active_containers(filter, pod);
    debug!(query = %query, "Discovering active containers");

    let samples = backend.query(&query, at).await?;
    Ok(group_containers(&samples, filter))
}

/// Group discovery samples by pod
///
/// Containers keep first-seen order and are deduplicated. Samples without a
/// pod or container label, or outside the filter, are ignored.
pub fn group_containers(samples: &[InstantSample], filter: &NamespaceFilter) -> Vec<PodInfo> {
    let mut pods: BTreeMap<(String, String), Vec<String>> = BTreeMap::new();

    for sample in samples {
        let (namespace, pod, container) = (
            sample.label("namespace"),
            sample.label("pod"),
            sample.label("container"),
        );
        if pod.is_empty() || container.is_empty() || !filter.matches(namespace) {
            continue;
        }

        let containers = pods
            .entry((namespace.to_string(), pod.to_string()))
            .or_default();
        if !containers.iter().any(|c| c == container) {
            containers.push(container.to_string());
        }
    }

    pods.into_iter()
        .map(|((namespace, name), containers)| PodInfo {
            name,
            namespace,
            containers,
        })
        .collect()
}

/// Flatten pods into container references, keeping pod order
pub fn container_refs(pods: &[PodInfo]) -> Vec<ContainerRef> {
    pods.iter()
        .flat_map(|pod| {
            pod.containers
                .iter()
                .map(move |container| ContainerRef::new(&pod.namespace, &pod.name, container))
        })
        .collect()
}
