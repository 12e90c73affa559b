use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::bank::validation::ValidationIssue;
use crate::models::SetName;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Pre-layout batch validation failed. Nothing was generated.
    #[error("Invalid batch: {} problem(s) found", .0.len())]
    InvalidBatch(Vec<ValidationIssue>),

    /// A set failed during shuffle or layout; the whole batch is aborted.
    #[error("Failed to generate Set {set}: {message}")]
    SetFailed { set: SetName, message: String },

    #[error("Render error: {0}")]
    Render(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::InvalidBatch(issues) => {
                let body = Json(json!({
                    "error": {
                        "code": "INVALID_BATCH",
                        "message": self.to_string(),
                        "issues": issues,
                    }
                }));
                return (StatusCode::UNPROCESSABLE_ENTITY, body).into_response();
            }
            AppError::SetFailed { set, message } => {
                tracing::error!(set = %set, "Set generation failed: {message}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "SET_FAILED",
                    format!("Failed to generate Set {set}"),
                )
            }
            AppError::Render(msg) => {
                tracing::error!("Render error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "RENDER_ERROR",
                    "A document rendering error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
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
