//! Gateway configuration
//!
//! Backend settings come from `METRICS_*` variables through the `config`
//! crate. `PORT` and the legacy `VICTORIAMETRICS_URL` / `PROMETHEUS_URL`
//! variables are read from the same variable set.

use anyhow::Result;
use podlens_lib::BackendKind;
use humantime_serde::re::humantime::parse_duration;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_PORT: u16 = 8080;

pub const DEFAULT_VICTORIAMETRICS_URL: &str = "http://victoria-metrics-victoria-metrics-cluster-vmselect.pod-metrics-dashboard.svc.cluster.local:8481/select/0/prometheus";

pub const DEFAULT_PROMETHEUS_URL: &str =
    "http://prometheus-stack-kube-prom-prometheus.pod-metrics-dashboard.svc.cluster.local:9090";

/// `METRICS_*` settings as read from the environment
#[derive(Debug, Clone)]
pub struct MetricsSettings {
    pub backend: String,
    pub victoriametrics_url: Option<String>,
    pub prometheus_url: Option<String>,

    /// Backend HTTP client timeout, e.g. `30s`
    pub timeout: Duration,

    /// Accepted and logged, no retry layer exists
    pub retry_attempts: u32,

    /// Accepted and logged, nothing is cached
    pub enable_caching: bool,

    pub enable_historical: bool,
    pub enable_trend: bool,
    pub max_concurrent_queries: usize,
}

impl MetricsSettings {
    /// Read each key on its own so one bad value only resets that key
    fn from_source(source: &config::Config) -> Self {
        let defaults = Self::default();
        Self {
            backend: setting(source, "backend", defaults.backend),
            victoriametrics_url: setting(source, "victoriametrics_url", None),
            prometheus_url: setting(source, "prometheus_url", None),
            timeout: timeout_setting(source, defaults.timeout),
            retry_attempts: setting(source, "retry_attempts", defaults.retry_attempts),
            enable_caching: setting(source, "enable_caching", defaults.enable_caching),
            enable_historical: setting(source, "enable_historical", defaults.enable_historical),
            enable_trend: setting(source, "enable_trend", defaults.enable_trend),
            max_concurrent_queries: setting(
                source,
                "max_concurrent_queries",
                defaults.max_concurrent_queries,
            ),
        }
    }
}

fn setting<T: DeserializeOwned>(source: &config::Config, key: &str, default: T) -> T {
    match source.get::<T>(key) {
        Ok(value) => value,
        Err(config::ConfigError::NotFound(_)) => default,
        Err(e) => {
            warn!(key = key, error = %e, "Invalid METRICS_* value, using default");
            default
        }
    }
}

fn timeout_setting(source: &config::Config, default: Duration) -> Duration {
    let raw = setting::<Option<String>>(source, "timeout", None);
    match raw.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        None => default,
        Some(raw) => parse_duration(raw).unwrap_or_else(|e| {
            warn!(key = "timeout", value = %raw, error = %e, "Invalid METRICS_* value, using default");
            default
        }),
    }
}

fn default_backend() -> String {
    BackendKind::VictoriaMetrics.name().to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_max_concurrent_queries() -> usize {
    8
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            victoriametrics_url: None,
            prometheus_url: None,
            timeout: default_timeout(),
            retry_attempts: default_retry_attempts(),
            enable_caching: false,
            enable_historical: true,
            enable_trend: true,
            max_concurrent_queries: default_max_concurrent_queries(),
        }
    }
}

/// Resolved gateway configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub backend: BackendKind,
    pub backend_url: String,
    pub metrics: MetricsSettings,
}

impl ServerConfig {
    /// Load configuration from the process environment
    pub fn load() -> Result<Self> {
        Self::from_vars(std::env::vars().collect())
    }

    /// Load configuration from an explicit variable set
    pub fn from_vars(vars: config::Map<String, String>) -> Result<Self> {
        let source = config::Config::builder()
            .add_source(
                config::Environment::with_prefix("METRICS")
                    .try_parsing(true)
                    .source(Some(vars.clone())),
            )
            .build()?;

        let metrics = MetricsSettings::from_source(&source);

        let backend = metrics.backend.parse::<BackendKind>().unwrap_or_else(|e| {
            warn!(error = %e, "Falling back to the VictoriaMetrics backend");
            BackendKind::VictoriaMetrics
        });

        let legacy = |key: &str| vars.get(key).filter(|v| !v.is_empty()).cloned();
        let backend_url = match backend {
            BackendKind::VictoriaMetrics => metrics
                .victoriametrics_url
                .clone()
                .filter(|v| !v.is_empty())
                .or_else(|| legacy("VICTORIAMETRICS_URL"))
                .unwrap_or_else(|| DEFAULT_VICTORIAMETRICS_URL.to_string()),
            BackendKind::Prometheus => metrics
                .prometheus_url
                .clone()
                .filter(|v| !v.is_empty())
                .or_else(|| legacy("PROMETHEUS_URL"))
                .unwrap_or_else(|| DEFAULT_PROMETHEUS_URL.to_string()),
        };

        let port = match vars.get("PORT").filter(|v| !v.is_empty()) {
            None => DEFAULT_PORT,
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                warn!(value = %raw, "Invalid PORT, using default {}", DEFAULT_PORT);
                DEFAULT_PORT
            }),
        };

        Ok(Self {
            port,
            backend,
            backend_url,
            metrics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> config::Map<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_vars(vars(&[])).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.backend, BackendKind::VictoriaMetrics);
        assert_eq!(config.backend_url, DEFAULT_VICTORIAMETRICS_URL);
        assert_eq!(config.metrics.timeout, Duration::from_secs(30));
        assert_eq!(config.metrics.retry_attempts, 3);
        assert!(!config.metrics.enable_caching);
        assert!(config.metrics.enable_historical);
        assert!(config.metrics.enable_trend);
        assert_eq!(config.metrics.max_concurrent_queries, 8);
    }

    #[test]
    fn test_prometheus_backend_with_legacy_url() {
        let config = ServerConfig::from_vars(vars(&[
            ("METRICS_BACKEND", "prometheus"),
            ("PROMETHEUS_URL", "http://legacy:9090"),
            ("METRICS_TIMEOUT", "5s"),
            ("METRICS_ENABLE_TREND", "false"),
            ("PORT", "9000"),
        ]))
        .unwrap();

        assert_eq!(config.backend, BackendKind::Prometheus);
        assert_eq!(config.backend_url, "http://legacy:9090");
        assert_eq!(config.metrics.timeout, Duration::from_secs(5));
        assert!(!config.metrics.enable_trend);
        assert_eq!(config.port, 9000);
    }

    #[test]
    fn test_prefixed_url_wins_over_legacy() {
        let config = ServerConfig::from_vars(vars(&[
            ("METRICS_VICTORIAMETRICS_URL", "http://vmselect:8481/select/0/prometheus"),
            ("VICTORIAMETRICS_URL", "http://legacy:8481"),
        ]))
        .unwrap();
        assert_eq!(config.backend_url, "http://vmselect:8481/select/0/prometheus");
    }

    #[test]
    fn test_unknown_backend_falls_back_to_victoriametrics() {
        let config = ServerConfig::from_vars(vars(&[("METRICS_BACKEND", "influxdb")])).unwrap();
        assert_eq!(config.backend, BackendKind::VictoriaMetrics);
        assert_eq!(config.backend_url, DEFAULT_VICTORIAMETRICS_URL);
    }

    #[test]
    fn test_invalid_values_fall_back_to_defaults() {
        let config = ServerConfig::from_vars(vars(&[
            ("METRICS_MAX_CONCURRENT_QUERIES", "lots"),
            ("PORT", "http"),
        ]))
        .unwrap();
        assert_eq!(config.metrics.max_concurrent_queries, 8);
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn test_one_invalid_value_keeps_the_other_settings() {
        let config = ServerConfig::from_vars(vars(&[
            ("METRICS_BACKEND", "prometheus"),
            ("METRICS_PROMETHEUS_URL", "http://prom:9090"),
            ("METRICS_RETRY_ATTEMPTS", "three"),
            ("METRICS_TIMEOUT", "soon"),
            ("METRICS_ENABLE_HISTORICAL", "false"),
        ]))
        .unwrap();

        assert_eq!(config.backend, BackendKind::Prometheus);
        assert_eq!(config.backend_url, "http://prom:9090");
        assert_eq!(config.metrics.retry_attempts, 3);
        assert_eq!(config.metrics.timeout, Duration::from_secs(30));
        assert!(!config.metrics.enable_historical);
    }
}
