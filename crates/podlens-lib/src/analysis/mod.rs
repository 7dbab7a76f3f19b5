//! Historical usage analysis
//!
//! Pure functions turning fetched series into the dashboard payload:
//! - Summary statistics and the approximate percentiles
//! - Trend classification and variation
//! - Efficiency, waste flags and recommendations
//! - Request-level summaries

mod stats;
mod summary;
mod trend;
mod waste;


pub use stats::{mean, mean_of, percentile, summarize, UsageStats};
pub use summary::{summarize_analysis, summarize_pod_trend};
pub use trend::{classify_trend, coefficient_of_variation, MIN_TREND_SAMPLES, TREND_THRESHOLD};
pub use waste::{
    analyze_usage, efficiency, recommendations, waste_analysis, Provisioning,
    OVER_PROVISIONED_BELOW, UNDER_PROVISIONED_ABOVE, WELL_OPTIMIZED,
};

use crate::models::{ContainerRef, DataPoint, HistoricalMetrics, ResourceSeries};

/// Raw series of one resource of one container
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceSamples {
    pub usage: Vec<DataPoint>,
    pub requests: Vec<DataPoint>,
    pub limits: Vec<DataPoint>,
}

impl ResourceSamples {
    /// Attach statistics and the trend classification
    pub fn into_series(self) -> ResourceSeries {
        let stats = summarize(&self.usage);
        let trend = classify_trend(&self.usage);
        ResourceSeries {
            usage: self.usage,
            requests: self.requests,
            limits: self.limits,
            average: stats.average,
            peak: stats.peak,
            minimum: stats.minimum,
            p95: stats.p95,
            p99: stats.p99,
            trend,
        }
    }
}

/// Analyze one container from its CPU and memory series
pub fn analyze_container(
    target: &ContainerRef,
    cpu: ResourceSamples,
    memory: ResourceSamples,
) -> HistoricalMetrics {
    let cpu = cpu.into_series();
    let memory = memory.into_series();
    let analysis = analyze_usage(&cpu, &memory);

    HistoricalMetrics {
        pod_name: target.pod.clone(),
        namespace: target.namespace.clone(),
        container_name: target.container.clone(),
        cpu,
        memory,
        analysis,
    }
}
