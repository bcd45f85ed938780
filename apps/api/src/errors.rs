use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::scoring_client::ScoringError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Backend unreachable or timed out; the caller may retry.
    #[error("Scoring service unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Scoring service error: {0}")]
    Upstream(String),
}

impl From<ScoringError> for AppError {
    fn from(err: ScoringError) -> Self {
        match err {
            ScoringError::Validation { message } => AppError::Validation(message),
            ScoringError::Authorization { message } => AppError::Forbidden(message),
            ScoringError::NotFound { message } => AppError::NotFound(message),
            ScoringError::Network(e) => AppError::UpstreamUnavailable(e.to_string()),
            other @ (ScoringError::Remote { .. } | ScoringError::Parse(_)) => {
                AppError::Upstream(other.to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
            AppError::UpstreamUnavailable(msg) => {
                tracing::error!("Scoring backend unreachable: {msg}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "UPSTREAM_UNAVAILABLE",
                    "The scoring service is unreachable, try again".to_string(),
                )
            }
            AppError::Upstream(msg) => {
                tracing::error!("Scoring backend error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM_ERROR",
                    "The scoring service rejected the request".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
