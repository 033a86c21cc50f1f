//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::services::DispatchError;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Resource not found
    NotFound(String),
    /// Invalid request (validation error)
    BadRequest(String),
    /// Internal server error
    Internal(String),
    /// A staff action the guard layer refused
    Dispatch(DispatchError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", msg)),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ApiError::new("BAD_REQUEST", msg))
            }
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("INTERNAL_ERROR", msg),
            ),
            AppError::Dispatch(e) => {
                let status = match e {
                    DispatchError::UnknownVehicle(_) | DispatchError::UnknownBay(_) => {
                        StatusCode::NOT_FOUND
                    }
                    _ => StatusCode::BAD_REQUEST,
                };
                (status, ApiError::new(dispatch_code(&e), e.to_string()))
            }
        };

        (status, Json(error)).into_response()
    }
}

fn dispatch_code(e: &DispatchError) -> &'static str {
    match e {
        DispatchError::UnknownVehicle(_) => "UNKNOWN_VEHICLE",
        DispatchError::UnknownBay(_) => "UNKNOWN_BAY",
        DispatchError::BaySelectionRequired => "BAY_SELECTION_REQUIRED",
        DispatchError::BayOccupied(_) => "BAY_OCCUPIED",
        DispatchError::ClassMismatch { .. } => "CLASS_MISMATCH",
        DispatchError::WrongStatus { .. } => "WRONG_STATUS",
        DispatchError::BillingUnavailable => "BILLING_UNAVAILABLE",
        DispatchError::UnsupportedTarget(_) => "UNSUPPORTED_TARGET",
        DispatchError::ReentryUnavailable(_) => "REENTRY_UNAVAILABLE",
    }
}

impl From<DispatchError> for AppError {
    fn from(err: DispatchError) -> Self {
        AppError::Dispatch(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}
