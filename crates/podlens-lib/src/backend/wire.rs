//! Prometheus HTTP API client shared by both backends
//!
//! Decodes the `{status, data: {resultType, result}}` envelope returned by
//! `api/v1/query` and `api/v1/query_range`. Samples whose value is not a
//! finite number are dropped rather than failing the query.

use super::{InstantSample, QueryRange, RangeSeries};
use crate::error::BackendError;
use crate::models::DataPoint;
use crate::observability::ServiceMetrics;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use url::Url;

#[derive(Debug, Deserialize)]
struct ApiResponse {
    status: String,
    #[serde(default)]
    data: Option<ApiData>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default, rename = "errorType")]
    error_type: Option<String>,
    #[serde(default)]
    warnings: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ApiData {
    #[serde(rename = "resultType")]
    result_type: String,
    #[serde(default)]
    result: Vec<ApiResult>,
}

#[derive(Debug, Deserialize)]
struct ApiResult {
    #[serde(default)]
    metric: BTreeMap<String, String>,
    #[serde(default)]
    value: Option<Vec<Value>>,
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

/// HTTP client for the Prometheus query API
#[derive(Debug, Clone)]
pub struct HttpQueryClient {
    client: Client,
    base_url: Url,
    backend: &'static str,
    metrics: ServiceMetrics,
}

impl HttpQueryClient {
    /// Create a client rooted at `base_url`, which must end with `/`
    pub fn new(base_url: Url, timeout: Duration, backend: &'static str) -> Result<Self, BackendError> {
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(BackendError::InvalidUrl(format!(
                "{}: URL must start with http:// or https://",
                base_url
            )));
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url,
            backend,
            metrics: ServiceMetrics::new(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Run an instant query
    pub async fn query(&self, promql: &str, at: DateTime<Utc>) -> Result<Vec<InstantSample>, BackendError> {
        let params = [("query", promql.to_string()), ("time", at.timestamp().to_string())];
        let data = self.get("api/v1/query", &params, "instant").await?;

        if data.result_type != "vector" {
            debug!(
                backend = self.backend,
                result_type = %data.result_type,
                "Ignoring non-vector instant query result"
            );
            return Ok(Vec::new());
        }

        Ok(data
            .result
            .into_iter()
            .filter_map(|series| {
                let (timestamp, value) = parse_sample(series.value.as_deref()?)?;
                Some(InstantSample {
                    labels: series.metric,
                    timestamp,
                    value,
                })
            })
            .collect())
    }

    /// Run a range query
    pub async fn query_range(
        &self,
        promql: &str,
        range: &QueryRange,
    ) -> Result<Vec<RangeSeries>, BackendError> {
        let params = [
            ("query", promql.to_string()),
            ("start", range.start.timestamp().to_string()),
            ("end", range.end.timestamp().to_string()),
            ("step", range.step.as_secs().max(1).to_string()),
        ];
        let data = self.get("api/v1/query_range", &params, "range").await?;

        if data.result_type != "matrix" {
            debug!(
                backend = self.backend,
                result_type = %data.result_type,
                "Ignoring non-matrix range query result"
            );
            return Ok(Vec::new());
        }

        Ok(data
            .result
            .into_iter()
            .map(|series| RangeSeries {
                points: series
                    .values
                    .iter()
                    .filter_map(|pair| parse_sample(pair))
                    .map(|(timestamp, value)| DataPoint::new(timestamp, value))
                    .collect(),
                labels: series.metric,
            })
            .collect())
    }

    async fn get(
        &self,
        path: &str,
        params: &[(&str, String)],
        kind: &str,
    ) -> Result<ApiData, BackendError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| BackendError::InvalidUrl(e.to_string()))?;

        let started = Instant::now();
        let result = self.fetch(url, params).await;
        self.metrics
            .observe_query_latency(kind, started.elapsed().as_secs_f64());
        result
    }

    async fn fetch(&self, url: Url, params: &[(&str, String)]) -> Result<ApiData, BackendError> {
        let response = self.client.get(url).query(params).send().await?;
        let status = response.status();
        let body = response.text().await?;

        let decoded = serde_json::from_str::<ApiResponse>(&body);

        if !status.is_success() {
            let message = match decoded {
                Ok(ApiResponse { error: Some(error), .. }) => error,
                _ => body.chars().take(512).collect(),
            };
            return Err(BackendError::Status {
                backend: self.backend,
                status: status.as_u16(),
                message,
            });
        }

        let decoded = decoded.map_err(|e| BackendError::Decode {
            backend: self.backend,
            message: e.to_string(),
        })?;

        if !decoded.warnings.is_empty() {
            warn!(backend = self.backend, warnings = ?decoded.warnings, "Query returned warnings");
        }

        if decoded.status != "success" {
            let message = match (decoded.error_type, decoded.error) {
                (Some(kind), Some(error)) => format!("{}: {}", kind, error),
                (None, Some(error)) => error,
                _ => decoded.status,
            };
            return Err(BackendError::Query {
                backend: self.backend,
                message,
            });
        }

        decoded.data.ok_or_else(|| BackendError::Decode {
            backend: self.backend,
            message: "response has no data section".to_string(),
        })
    }
}

/// Parse a `[<unix seconds>, "<value>"]` pair
fn parse_sample(pair: &[Value]) -> Option<(DateTime<Utc>, f64)> {
    let [ts, value] = pair else {
        return None;
    };
    let seconds = ts.as_f64()?;
    let value: f64 = value.as_str()?.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    let timestamp = DateTime::from_timestamp_millis((seconds * 1000.0).round() as i64)?;
    Some((timestamp, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_sample() {
        let (ts, value) = parse_sample(&[json!(1700000000.5), json!("0.25")]).unwrap();
        assert_eq!(ts.timestamp_millis(), 1_700_000_000_500);
        assert_eq!(value, 0.25);
    }

    #[test]
    fn test_parse_sample_drops_malformed_values() {
        assert!(parse_sample(&[json!(1700000000), json!("abc")]).is_none());
        assert!(parse_sample(&[json!(1700000000), json!("NaN")]).is_none());
        assert!(parse_sample(&[json!(1700000000), json!("+Inf")]).is_none());
        assert!(parse_sample(&[json!(1700000000), json!(1.0)]).is_none());
        assert!(parse_sample(&[json!("bad"), json!("1")]).is_none());
        assert!(parse_sample(&[json!(1700000000)]).is_none());
    }

    #[test]
    fn test_decode_error_envelope() {
        let body = r#"{"status":"error","errorType":"bad_data","error":"parse error"}"#;
        let decoded: ApiResponse = serde_json::from_str(body).unwrap();
        assert_eq!(decoded.status, "error");
        assert_eq!(decoded.error.as_deref(), Some("parse error"));
        assert!(decoded.data.is_none());
    }
}
