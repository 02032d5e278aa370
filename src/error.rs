//! Error handling module
//!
//! Provides unified error types and handling for the entire service.

use crate::evolution::SelectionError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

/// Service-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid selection: {0}")]
    InvalidSelection(#[from] SelectionError),
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match &self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "Request validation failed".to_string(),
                Some(msg.clone()),
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                msg.clone(),
                None,
            ),
            AppError::InvalidSelection(e) => {
                warn!("Rejected version selection: {}", e);
                (
                    StatusCode::BAD_REQUEST,
                    "INVALID_SELECTION",
                    e.to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            success: false,
            message,
            error: details,
            code: Some(error_code.to_string()),
        });

        (status, body).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, AppError>;

/// Helper function to create a validation error
pub fn validation_error(msg: impl Into<String>) -> AppError {
    AppError::Validation(msg.into())
}

/// Helper function to create a not found error
pub fn not_found_error(msg: impl Into<String>) -> AppError {
    AppError::NotFound(msg.into())
}
