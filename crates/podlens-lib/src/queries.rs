//! PromQL query construction
//!
//! All label values are escaped before being embedded in a selector, so
//! pod and namespace names coming from HTTP parameters cannot break out of
//! the matcher.

use crate::models::ContainerRef;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Rate window applied to CPU counters
pub const RATE_WINDOW: &str = "5m";

const CPU_USAGE_METRIC: &str = "container_cpu_usage_seconds_total";
const MEMORY_USAGE_METRIC: &str = "container_memory_working_set_bytes";
const REQUESTS_METRIC: &str = "kube_pod_container_resource_requests";
const LIMITS_METRIC: &str = "kube_pod_container_resource_limits";

/// Excludes the pause container and cgroup-level aggregates
const REAL_CONTAINERS: [&str; 2] = [r#"container!="POD""#, r#"container!="""#];

/// Namespace scope of a query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceFilter {
    /// Every namespace
    All,
    /// A single namespace, matched exactly
    Exact(String),
}

impl NamespaceFilter {
    /// Parse a raw filter: empty and `.*` select every namespace
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw == ".*" {
            NamespaceFilter::All
        } else {
            NamespaceFilter::Exact(raw.to_string())
        }
    }

    pub fn matches(&self, namespace: &str) -> bool {
        match self {
            NamespaceFilter::All => true,
            NamespaceFilter::Exact(ns) => ns == namespace,
        }
    }

    fn matcher(&self) -> Option<String> {
        match self {
            NamespaceFilter::All => None,
            NamespaceFilter::Exact(ns) => Some(label_eq("namespace", ns)),
        }
    }
}

impl fmt::Display for NamespaceFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamespaceFilter::All => f.write_str(".*"),
            NamespaceFilter::Exact(ns) => f.write_str(ns),
        }
    }
}

/// Resource dimension of a series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Cpu,
    Memory,
}

impl ResourceKind {
    pub fn label(&self) -> &'static str {
        match self {
            ResourceKind::Cpu => "cpu",
            ResourceKind::Memory => "memory",
        }
    }
}

/// kube-state-metrics allocation series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Allocation {
    Requests,
    Limits,
}

impl Allocation {
    fn metric(&self) -> &'static str {
        match self {
            Allocation::Requests => REQUESTS_METRIC,
            Allocation::Limits => LIMITS_METRIC,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Allocation::Requests => "requests",
            Allocation::Limits => "limits",
        }
    }
}

/// Escape a label value for use inside a double-quoted PromQL string
pub fn escape_label_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str(r"\\"),
            '"' => escaped.push_str(r#"\""#),
            '\n' => escaped.push_str(r"\n"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn label_eq(name: &str, value: &str) -> String {
    format!(r#"{}="{}""#, name, escape_label_value(value))
}

fn selector(metric: &str, matchers: &[String]) -> String {
    format!("{}{{{}}}", metric, matchers.join(", "))
}

fn container_matchers(target: &ContainerRef) -> Vec<String> {
    vec![
        label_eq("namespace", &target.namespace),
        label_eq("pod", &target.pod),
        label_eq("container", &target.container),
    ]
}

fn scoped_matchers(filter: &NamespaceFilter) -> Vec<String> {
    let mut matchers: Vec<String> = filter.matcher().into_iter().collect();
    matchers.extend(REAL_CONTAINERS.iter().map(|m| m.to_string()));
    matchers
}

fn usage_expr(kind: ResourceKind, matchers: &[String]) -> String {
    match kind {
        ResourceKind::Cpu => format!("rate({}[{}])", selector(CPU_USAGE_METRIC, matchers), RATE_WINDOW),
        ResourceKind::Memory => selector(MEMORY_USAGE_METRIC, matchers),
    }
}

/// Containers that emitted CPU samples, grouped by label set
pub fn active_containers(filter: &NamespaceFilter, pod: Option<&str>) -> String {
    let mut matchers = filter.matcher().into_iter().collect::<Vec<_>>();
    if let Some(pod) = pod {
        matchers.push(label_eq("pod", pod));
    }
    matchers.extend(REAL_CONTAINERS.iter().map(|m| m.to_string()));

    format!(
        "group by (pod, namespace, container) ({})",
        usage_expr(ResourceKind::Cpu, &matchers)
    )
}

/// Usage series of one container
pub fn container_usage(kind: ResourceKind, target: &ContainerRef) -> String {
    usage_expr(kind, &container_matchers(target))
}

/// Requests or limits series of one container
pub fn container_allocation(
    allocation: Allocation,
    kind: ResourceKind,
    target: &ContainerRef,
) -> String {
    let mut matchers = container_matchers(target);
    matchers.push(label_eq("resource", kind.label()));
    selector(allocation.metric(), &matchers)
}

/// Current usage of every container in scope
pub fn current_usage(kind: ResourceKind, filter: &NamespaceFilter) -> String {
    usage_expr(kind, &scoped_matchers(filter))
}

/// Current requests or limits of every container in scope
pub fn current_allocation(
    allocation: Allocation,
    kind: ResourceKind,
    filter: &NamespaceFilter,
) -> String {
    let mut matchers = vec![label_eq("resource", kind.label())];
    matchers.extend(filter.matcher());
    selector(allocation.metric(), &matchers)
}
