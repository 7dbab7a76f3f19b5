//! Display formatting for raw resource values

use crate::models::{PodMetric, PodMetrics, ResourceMetrics};

const KI: f64 = 1024.0;
const MI: f64 = KI * 1024.0;
const GI: f64 = MI * 1024.0;

/// Format CPU cores as millicores
pub fn format_cpu(cores: f64) -> String {
    if cores == 0.0 {
        return "0m".to_string();
    }
    let millicores = cores * 1000.0;
    if millicores < 1.0 {
        format!("{:.1}m", millicores)
    } else {
        format!("{:.0}m", millicores)
    }
}

/// Format bytes with a binary unit suffix
pub fn format_memory(bytes: f64) -> String {
    if bytes == 0.0 {
        return "0Mi".to_string();
    }
    if bytes >= GI {
        format!("{:.1}Gi", bytes / GI)
    } else if bytes >= MI {
        format!("{:.0}Mi", bytes / MI)
    } else if bytes >= KI {
        format!("{:.0}Ki", bytes / KI)
    } else {
        format!("{:.0}B", bytes)
    }
}

/// `usage / denominator * 100`, or 0 when the denominator is not positive
pub fn percentage_of(usage: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        usage / denominator * 100.0
    } else {
        0.0
    }
}

fn resource_metrics(usage: f64, request: f64, limit: f64, render: fn(f64) -> String) -> ResourceMetrics {
    ResourceMetrics {
        usage: render(usage),
        request: render(request),
        limit: render(limit),
        usage_value: usage,
        request_value: request,
        limit_value: limit,
        request_percentage: percentage_of(usage, request),
        limit_percentage: percentage_of(usage, limit),
    }
}

impl From<&PodMetric> for PodMetrics {
    fn from(metric: &PodMetric) -> Self {
        Self {
            name: metric.name.clone(),
            namespace: metric.namespace.clone(),
            container_name: metric.container_name.clone(),
            cpu: resource_metrics(
                metric.cpu_usage,
                metric.cpu_request,
                metric.cpu_limit,
                format_cpu,
            ),
            memory: resource_metrics(
                metric.memory_usage,
                metric.memory_request,
                metric.memory_limit,
                format_memory,
            ),
            labels: metric.labels.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_cpu() {
        assert_eq!(format_cpu(0.0), "0m");
        assert_eq!(format_cpu(0.0005), "0.5m");
        assert_eq!(format_cpu(0.25), "250m");
        assert_eq!(format_cpu(2.0), "2000m");
    }

    #[test]
    fn test_format_memory() {
        assert_eq!(format_memory(0.0), "0Mi");
        assert_eq!(format_memory(512.0), "512B");
        assert_eq!(format_memory(2048.0), "2Ki");
        assert_eq!(format_memory(128.0 * MI), "128Mi");
        assert_eq!(format_memory(1.5 * GI), "1.5Gi");
    }

    #[test]
    fn test_percentages_skip_missing_denominators() {
        let metric = PodMetric {
            name: "api".to_string(),
            namespace: "default".to_string(),
            container_name: "main".to_string(),
            cpu_usage: 0.05,
            cpu_request: 0.1,
            cpu_limit: 0.0,
            memory_usage: 64.0 * MI,
            memory_request: 0.0,
            memory_limit: 256.0 * MI,
            ..Default::default()
        };

        let display = PodMetrics::from(&metric);
        assert!((display.cpu.request_percentage - 50.0).abs() < 1e-9);
        assert_eq!(display.cpu.limit_percentage, 0.0);
        assert_eq!(display.memory.request_percentage, 0.0);
        assert!((display.memory.limit_percentage - 25.0).abs() < 1e-9);
        assert_eq!(display.cpu.usage, "50m");
        assert_eq!(display.memory.limit, "256Mi");
    }

    #[test]
    fn test_zero_limit_percentage_is_omitted_from_json() {
        let display = PodMetrics::from(&PodMetric::default());
        let json = serde_json::to_value(&display).unwrap();
        assert!(json["cpu"].get("limitPercentage").is_none());
        assert_eq!(json["cpu"]["requestPercentage"], 0.0);
        assert!(json.get("labels").is_none());
    }
}
