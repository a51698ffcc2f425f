//! API error handling

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use usergate_core::UsergateError;
use utoipa::ToSchema;

/// API error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// Error code
    pub code: String,
    /// Human-readable message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }

    pub fn unauthorized() -> Self {
        Self::new("UNAUTHORIZED", "unauthorized")
    }

    pub fn internal_error() -> Self {
        Self::new("INTERNAL_ERROR", "Internal server error")
    }
}

/// Application error type
///
/// Variants carry a detail for the logs; only `BadRequest` echoes anything
/// back to the client.
#[derive(Debug)]
pub enum AppError {
    /// Request body could not be parsed
    BadRequest(String),
    /// Payload parsed but failed validation
    Invalid(String),
    /// Persistence failed, including duplicate email
    StoreFailure(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ApiError::bad_request("invalid").with_details(msg),
            ),
            AppError::Invalid(detail) => {
                tracing::debug!(%detail, "validation failed");
                (StatusCode::BAD_REQUEST, ApiError::bad_request("invalid"))
            }
            AppError::StoreFailure(detail) => {
                tracing::warn!(%detail, "store failure");
                (StatusCode::BAD_REQUEST, ApiError::bad_request("on save"))
            }
            AppError::Internal(detail) => {
                tracing::error!(%detail, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, ApiError::internal_error())
            }
        };

        (status, Json(error)).into_response()
    }
}

impl From<UsergateError> for AppError {
    fn from(err: UsergateError) -> Self {
        match err {
            UsergateError::Invalid(_) => AppError::Invalid(err.detail().to_string()),
            UsergateError::StoreFailure(_) => AppError::StoreFailure(err.detail().to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}
