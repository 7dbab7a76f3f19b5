//! podlens-server - Pod resource metrics gateway
//!
//! Serves current usage, seven-day historical analysis and per-pod trends
//! from a Prometheus or VictoriaMetrics backend.

use anyhow::{Context, Result};
use podlens_lib::{
    create_backend,
    health::{components, HealthRegistry},
    AnalysisEngine, EngineConfig,
};
use podlens_server::{api, Features, ServerConfig};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting podlens-server");

    let config = ServerConfig::load().context("failed to load configuration")?;

    let backend = create_backend(config.backend, &config.backend_url, config.metrics.timeout)
        .with_context(|| format!("failed to create {} client", config.backend))?;

    let engine = AnalysisEngine::new(
        backend,
        EngineConfig {
            max_concurrent_queries: config.metrics.max_concurrent_queries,
            ..EngineConfig::default()
        },
    );

    let logger = engine.logger().clone();
    logger.log_backend_configured(
        config.backend.client_type(),
        &config.backend_url,
        config.metrics.timeout.as_secs(),
        config.metrics.retry_attempts,
        config.metrics.enable_caching,
    );

    let health_registry = HealthRegistry::new();
    health_registry.register(components::METRICS_BACKEND).await;
    health_registry.register(components::ANALYSIS_ENGINE).await;

    let features = Features {
        real_time_metrics: true,
        historical_analysis: config.metrics.enable_historical,
        trend_analysis: config.metrics.enable_trend,
    };

    let state = Arc::new(api::AppState::new(
        engine.with_health(health_registry.clone()),
        health_registry.clone(),
        features,
    ));

    health_registry.set_ready(true).await;
    logger.log_startup(SERVER_VERSION, config.port);

    let shutdown_logger = logger.clone();
    api::serve(config.port, state, async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => shutdown_logger.log_shutdown("SIGINT received"),
            Err(e) => {
                warn!(error = %e, "Cannot listen for shutdown signal");
                std::future::pending::<()>().await;
            }
        }
    })
    .await?;

    info!("Shutdown complete");
    Ok(())
}
