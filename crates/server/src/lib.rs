//! Pod metrics gateway
//!
//! HTTP routing, environment configuration and error mapping around the
//! analysis engine of `podlens-lib`.

pub mod api;
pub mod config;
pub mod error;

pub use api::{create_router, AppState, Features, RouteDeadlines};
pub use config::ServerConfig;
pub use error::ApiError;
