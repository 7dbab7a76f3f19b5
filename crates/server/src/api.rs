//! HTTP API of the pod metrics gateway

use crate::error::ApiError;
use axum::{
    extract::{Query, State},
    http::{header, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use podlens_lib::{
    health::{ComponentStatus, HealthRegistry},
    observability::ServiceMetrics,
    AnalysisEngine, AnalysisError, HistoricalAnalysisList, NamespaceFilter, NamespaceList,
    PodMetrics, PodMetricsList, PodTrendAnalysis,
};
use prometheus::{Encoder, TextEncoder};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};

/// Days analyzed by the trends route when `days` is absent
pub const DEFAULT_TREND_DAYS: u32 = 7;

/// Per-route request deadlines
#[derive(Debug, Clone, Copy)]
pub struct RouteDeadlines {
    pub namespaces: Duration,
    pub pods: Duration,
    pub analysis: Duration,
    pub trends: Duration,
}

impl Default for RouteDeadlines {
    fn default() -> Self {
        Self {
            namespaces: Duration::from_secs(10),
            pods: Duration::from_secs(15),
            analysis: Duration::from_secs(30),
            trends: Duration::from_secs(20),
        }
    }
}

/// Routes that configuration can switch off
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Features {
    pub real_time_metrics: bool,
    pub historical_analysis: bool,
    pub trend_analysis: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            real_time_metrics: true,
            historical_analysis: true,
            trend_analysis: true,
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: AnalysisEngine,
    pub health_registry: HealthRegistry,
    pub metrics: ServiceMetrics,
    pub features: Features,
    pub deadlines: RouteDeadlines,
}

impl AppState {
    pub fn new(engine: AnalysisEngine, health_registry: HealthRegistry, features: Features) -> Self {
        Self {
            engine,
            health_registry,
            metrics: ServiceMetrics::new(),
            features,
            deadlines: RouteDeadlines::default(),
        }
    }

    pub fn with_deadlines(mut self, deadlines: RouteDeadlines) -> Self {
        self.deadlines = deadlines;
        self
    }

    /// Run `operation` under the deadline of `route`
    async fn run<T, F>(&self, route: &'static str, deadline: Duration, operation: F) -> Result<T, ApiError>
    where
        F: Future<Output = Result<T, AnalysisError>>,
    {
        match tokio::time::timeout(deadline, operation).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                if !e.is_client_error() {
                    error!(
                        route = route,
                        backend = %self.engine.backend_kind(),
                        error = %e,
                        "Request failed"
                    );
                }
                Err(e.into())
            }
            Err(_) => {
                self.metrics.inc_request_timeouts(route);
                self.engine
                    .logger()
                    .log_request_timed_out(route, deadline.as_secs());
                Err(ApiError::Timeout { route })
            }
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct NamespaceParams {
    pub namespace: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TrendParams {
    pub namespace: Option<String>,
    pub pod: Option<String>,
    pub days: Option<String>,
}

fn required(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Parse the optional `days` parameter, falling back to 7 on bad input
pub fn parse_days(raw: Option<&str>) -> u32 {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => DEFAULT_TREND_DAYS,
        Some(raw) => match raw.parse::<u32>() {
            Ok(days) if days > 0 => days,
            _ => {
                warn!(value = %raw, "Invalid days parameter, using {}", DEFAULT_TREND_DAYS);
                DEFAULT_TREND_DAYS
            }
        },
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ServiceHealth {
    status: &'static str,
    timestamp: String,
    metrics_client: &'static str,
    metrics_backend: &'static str,
    features: Features,
    components: BTreeMap<String, ComponentStatus>,
}

/// Service summary for the dashboard
async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let registry = state.health_registry.health().await;
    Json(ServiceHealth {
        status: "healthy",
        timestamp: Utc::now().to_rfc3339(),
        metrics_client: "available",
        metrics_backend: state.engine.backend_kind().client_type(),
        features: state.features,
        components: registry
            .components
            .into_iter()
            .map(|(name, health)| (name, health.status))
            .collect(),
    })
}

/// Liveness: 200 unless a component is unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = match health.status {
        ComponentStatus::Healthy | ComponentStatus::Degraded => StatusCode::OK,
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus exposition of the self-metrics
async fn metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&prometheus::gather(), &mut buffer) {
        error!(error = %e, "Failed to encode metrics");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            Vec::new(),
        );
    }

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        buffer,
    )
}

async fn namespaces(State(state): State<Arc<AppState>>) -> Result<Json<NamespaceList>, ApiError> {
    let namespaces = state
        .run(
            "/api/namespaces",
            state.deadlines.namespaces,
            state.engine.get_namespaces(),
        )
        .await?;
    Ok(Json(NamespaceList { namespaces }))
}

async fn pods(
    State(state): State<Arc<AppState>>,
    Query(params): Query<NamespaceParams>,
) -> Result<Json<PodMetricsList>, ApiError> {
    let filter = NamespaceFilter::parse(params.namespace.as_deref().unwrap_or(""));
    let metrics = state
        .run(
            "/api/pods",
            state.deadlines.pods,
            state.engine.get_current_pod_metrics(&filter),
        )
        .await?;

    Ok(Json(PodMetricsList {
        pods: metrics.iter().map(PodMetrics::from).collect(),
    }))
}

async fn analysis(
    State(state): State<Arc<AppState>>,
    Query(params): Query<NamespaceParams>,
) -> Result<Json<HistoricalAnalysisList>, ApiError> {
    if !state.features.historical_analysis {
        return Err(ApiError::FeatureDisabled("Historical analysis"));
    }

    let filter = NamespaceFilter::parse(params.namespace.as_deref().unwrap_or(".*"));
    let result = state
        .run(
            "/api/pods/analysis",
            state.deadlines.analysis,
            state.engine.get_historical_metrics(&filter),
        )
        .await?;
    Ok(Json(result))
}

async fn trends(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TrendParams>,
) -> Result<Json<PodTrendAnalysis>, ApiError> {
    if !state.features.trend_analysis {
        return Err(ApiError::FeatureDisabled("Trend analysis"));
    }

    let (Some(namespace), Some(pod)) = (required(params.namespace), required(params.pod)) else {
        return Err(ApiError::BadRequest(
            "namespace and pod parameters are required".to_string(),
        ));
    };
    let days = parse_days(params.days.as_deref());

    let result = state
        .run(
            "/api/pods/trends",
            state.deadlines.trends,
            state.engine.get_pod_trends(&namespace, &pod, days),
        )
        .await?;
    Ok(Json(result))
}

/// CORS policy of the dashboard API
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .route("/api/namespaces", get(namespaces))
        .route("/api/pods", get(pods))
        .route("/api/pods/analysis", get(analysis))
        .route("/api/pods/trends", get(trends))
        .layer(cors_layer())
        .with_state(state)
}

/// Serve the API until `shutdown` resolves
pub async fn serve<S>(port: u16, state: Arc<AppState>, shutdown: S) -> anyhow::Result<()>
where
    S: Future<Output = ()> + Send + 'static,
{
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
