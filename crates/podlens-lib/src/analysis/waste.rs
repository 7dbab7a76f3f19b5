//! Efficiency, provisioning waste and recommendations

use super::stats::mean_of;
use super::trend::coefficient_of_variation;
use crate::models::{ResourceSeries, ResourceWaste, Trend, UsageAnalysis, UsagePatterns};

/// Below this efficiency a resource is over-provisioned
pub const OVER_PROVISIONED_BELOW: f64 = 30.0;

/// Above this efficiency a resource is under-provisioned
pub const UNDER_PROVISIONED_ABOVE: f64 = 80.0;

/// Emitted when no other recommendation applies
pub const WELL_OPTIMIZED: &str = "Resource usage appears well-optimized";

const CPU_TRENDING_UP: &str = "CPU usage is trending upward - monitor for potential scaling needs";
const MEMORY_TRENDING_UP: &str =
    "Memory usage is trending upward - monitor for potential memory leaks or scaling needs";

/// Provisioning class of one resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provisioning {
    Over,
    Under,
    Adequate,
}

impl Provisioning {
    /// An efficiency of 0 means "no data" and is never over-provisioned
    pub fn classify(efficiency: f64) -> Self {
        if efficiency > 0.0 && efficiency < OVER_PROVISIONED_BELOW {
            Provisioning::Over
        } else if efficiency > UNDER_PROVISIONED_ABOVE {
            Provisioning::Under
        } else {
            Provisioning::Adequate
        }
    }
}

/// Average usage as a percentage of the average request
///
/// 0 when there is no request data or the mean request is not positive.
pub fn efficiency(series: &ResourceSeries) -> f64 {
    if series.requests.is_empty() {
        return 0.0;
    }
    let avg_request = mean_of(&series.requests);
    if avg_request > 0.0 {
        series.average / avg_request * 100.0
    } else {
        0.0
    }
}

/// Waste flags for a CPU/memory efficiency pair
pub fn waste_analysis(cpu_efficiency: f64, memory_efficiency: f64) -> ResourceWaste {
    let mut waste = ResourceWaste::default();

    match Provisioning::classify(cpu_efficiency) {
        Provisioning::Over => {
            waste.cpu_over_provisioned = true;
            waste.cpu_waste_percentage = 100.0 - cpu_efficiency;
        }
        Provisioning::Under => waste.cpu_under_provisioned = true,
        Provisioning::Adequate => {}
    }

    match Provisioning::classify(memory_efficiency) {
        Provisioning::Over => {
            waste.memory_over_provisioned = true;
            waste.memory_waste_percentage = 100.0 - memory_efficiency;
        }
        Provisioning::Under => waste.memory_under_provisioned = true,
        Provisioning::Adequate => {}
    }

    waste
}

fn sizing_recommendation(resource: &str, efficiency: f64) -> Option<String> {
    let verb = match Provisioning::classify(efficiency) {
        Provisioning::Over => "reducing",
        Provisioning::Under => "increasing",
        Provisioning::Adequate => return None,
    };
    Some(format!(
        "Consider {} {} requests - current efficiency: {:.1}%",
        verb, resource, efficiency
    ))
}

/// Recommendations in fixed order: CPU sizing, memory sizing, CPU trend, memory trend
pub fn recommendations(
    cpu: &ResourceSeries,
    memory: &ResourceSeries,
    cpu_efficiency: f64,
    memory_efficiency: f64,
) -> Vec<String> {
    let mut recs: Vec<String> = [
        sizing_recommendation("CPU", cpu_efficiency),
        sizing_recommendation("memory", memory_efficiency),
    ]
    .into_iter()
    .flatten()
    .collect();

    if cpu.trend == Trend::Increasing {
        recs.push(CPU_TRENDING_UP.to_string());
    }
    if memory.trend == Trend::Increasing {
        recs.push(MEMORY_TRENDING_UP.to_string());
    }

    if recs.is_empty() {
        recs.push(WELL_OPTIMIZED.to_string());
    }
    recs
}

/// Full usage analysis of a summarized CPU/memory pair
pub fn analyze_usage(cpu: &ResourceSeries, memory: &ResourceSeries) -> UsageAnalysis {
    let cpu_efficiency = efficiency(cpu);
    let memory_efficiency = efficiency(memory);

    UsageAnalysis {
        cpu_efficiency,
        memory_efficiency,
        resource_waste: waste_analysis(cpu_efficiency, memory_efficiency),
        recommendations: recommendations(cpu, memory, cpu_efficiency, memory_efficiency),
        patterns: UsagePatterns {
            peak_hours: Vec::new(),
            low_usage_hours: Vec::new(),
            daily_variation: coefficient_of_variation(&cpu.usage),
            weekly_variation: coefficient_of_variation(&memory.usage),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DataPoint;
    use chrono::Utc;

    fn with_requests(average: f64, request: f64) -> ResourceSeries {
        ResourceSeries {
            average,
            requests: vec![DataPoint::new(Utc::now(), request)],
            ..Default::default()
        }
    }

    #[test]
    fn test_efficiency() {
        assert!((efficiency(&with_requests(0.05, 0.1)) - 50.0).abs() < 1e-9);
        assert_eq!(efficiency(&with_requests(0.05, 0.0)), 0.0);
        assert_eq!(
            efficiency(&ResourceSeries {
                average: 1.0,
                ..Default::default()
            }),
            0.0
        );
    }

    #[test]
    fn test_provisioning_bands() {
        assert_eq!(Provisioning::classify(0.0), Provisioning::Adequate);
        assert_eq!(Provisioning::classify(29.9), Provisioning::Over);
        assert_eq!(Provisioning::classify(30.0), Provisioning::Adequate);
        assert_eq!(Provisioning::classify(80.0), Provisioning::Adequate);
        assert_eq!(Provisioning::classify(80.1), Provisioning::Under);
    }

    #[test]
    fn test_waste_analysis() {
        let waste = waste_analysis(85.0, 20.0);
        assert!(waste.cpu_under_provisioned);
        assert!(!waste.cpu_over_provisioned);
        assert_eq!(waste.cpu_waste_percentage, 0.0);
        assert!(waste.memory_over_provisioned);
        assert_eq!(waste.memory_waste_percentage, 80.0);
    }

    #[test]
    fn test_recommendation_order() {
        let cpu = ResourceSeries {
            trend: Trend::Increasing,
            ..Default::default()
        };
        let memory = ResourceSeries {
            trend: Trend::Increasing,
            ..Default::default()
        };

        let recs = recommendations(&cpu, &memory, 20.0, 90.0);
        assert_eq!(
            recs,
            vec![
                "Consider reducing CPU requests - current efficiency: 20.0%".to_string(),
                "Consider increasing memory requests - current efficiency: 90.0%".to_string(),
                CPU_TRENDING_UP.to_string(),
                MEMORY_TRENDING_UP.to_string(),
            ]
        );
    }

    #[test]
    fn test_fallback_recommendation() {
        let series = ResourceSeries::default();
        assert_eq!(
            recommendations(&series, &series, 50.0, 0.0),
            vec![WELL_OPTIMIZED.to_string()]
        );
    }
}
