//! HTTP error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use podlens_lib::AnalysisError;
use serde::Serialize;
use thiserror::Error;

/// Error returned by the API handlers
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed request parameters
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    /// The route is switched off by configuration
    #[error("{0} not available")]
    FeatureDisabled(&'static str),

    /// The route deadline elapsed
    #[error("request to {route} timed out")]
    Timeout { route: &'static str },

    /// Backend or discovery failure
    #[error("{0}")]
    Backend(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: String,
    code: &'a str,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::FeatureDisabled(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Timeout { .. } | ApiError::Backend(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "invalid_input",
            ApiError::NotFound(_) => "not_found",
            ApiError::FeatureDisabled(_) => "feature_disabled",
            ApiError::Timeout { .. } => "timeout",
            ApiError::Backend(_) => "backend_error",
        }
    }
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::InvalidInput(msg) => ApiError::BadRequest(msg),
            AnalysisError::NotFound(msg) => ApiError::NotFound(msg),
            other => ApiError::Backend(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
            code: self.code(),
        };
        (self.status(), Json(body)).into_response()
    }
}
