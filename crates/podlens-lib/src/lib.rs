//! Pod resource analysis library
//!
//! This crate provides the core functionality for:
//! - Querying Prometheus-compatible metrics backends
//! - Historical statistics, trend classification and waste analysis
//! - Request-scoped analysis orchestration
//! - Health checks and observability

pub mod analysis;
pub mod backend;
pub mod engine;
pub mod error;
pub mod format;
pub mod health;
pub mod models;
pub mod observability;
pub mod queries;

pub use backend::{create_backend, BackendKind, MetricsBackend};
pub use engine::{AnalysisEngine, EngineConfig};
pub use error::{AnalysisError, BackendError};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use models::*;
pub use observability::{ServiceMetrics, StructuredLogger};
pub use queries::NamespaceFilter;
