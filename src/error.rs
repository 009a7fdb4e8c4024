use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::helm::EngineError;

/// Failure envelope, the `{success:false, message}` form of the uniform
/// response wrapper
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub message: String,
}

/// Custom error type for API endpoints
///
/// Mirrors the adapter's failure taxonomy and maps each class to an HTTP
/// status code, formatting every failure as the standard envelope.
#[derive(Debug)]
pub enum ApiError {
    /// Malformed or missing request fields
    Validation(String),
    /// Chart could not be located or loaded
    ChartResolution(String),
    /// No such release
    NotFound(String),
    /// Cluster connection could not be established
    Configuration(String),
    /// Chart repository registration failure
    Repository(String),
    /// Catch-all for downstream engine failures
    Engine(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::ChartResolution(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Configuration(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::Repository(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::Engine(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorEnvelope {
            success: false,
            message,
        });

        (status, body).into_response()
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        let message = err.to_string();
        match err {
            EngineError::ReleaseNotFound(_) => ApiError::NotFound(message),
            EngineError::ChartResolution(_) => ApiError::ChartResolution(message),
            EngineError::Configuration(_) => ApiError::Configuration(message),
            EngineError::Repository(_) => ApiError::Repository(message),
            EngineError::Engine(_) => ApiError::Engine(message),
        }
    }
}
