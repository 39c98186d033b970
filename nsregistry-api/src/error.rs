///! Standardized error handling for API responses
///!
///! Provides consistent JSON error responses across all API endpoints

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

/// Standard API error response format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// HTTP status code
    pub status: u16,

    /// Error code for programmatic handling
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional detailed error information
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,

    /// Timestamp when error occurred
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(status: u16, error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
            message: message.into(),
            details: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// API error types with standardized responses
#[derive(Debug)]
pub enum ApiError {
    /// 500 Internal Server Error
    Internal(String),

    /// 404 Not Found
    NotFound(String),

    /// 403 Forbidden
    Forbidden(String),

    /// 400 Bad Request
    BadRequest(String),

    /// 409 Conflict
    Conflict(String),

    /// 409 Conflict, resource still referenced
    InUse(String),

    /// 502 Bad Gateway, an upstream cluster call failed
    BadGateway(String),
}

impl ApiError {
    /// Convert error to ErrorResponse
    pub fn to_error_response(&self) -> ErrorResponse {
        match self {
            ApiError::Internal(msg) => {
                error!("Internal API error: {}", msg);
                ErrorResponse::new(
                    500,
                    "INTERNAL_ERROR",
                    "An internal server error occurred",
                )
                .with_details(msg)
            }
            ApiError::NotFound(msg) => ErrorResponse::new(404, "NOT_FOUND", msg),
            ApiError::Forbidden(msg) => ErrorResponse::new(403, "FORBIDDEN", msg),
            ApiError::BadRequest(msg) => ErrorResponse::new(400, "BAD_REQUEST", msg),
            ApiError::Conflict(msg) => ErrorResponse::new(409, "CONFLICT", msg),
            ApiError::InUse(msg) => ErrorResponse::new(409, "IN_USE", msg),
            ApiError::BadGateway(msg) => {
                ErrorResponse::new(502, "EXTERNAL_CREATE_FAILED", "Cluster operation failed")
                    .with_details(msg)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error_response = self.to_error_response();
        let status_code = StatusCode::from_u16(error_response.status)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        (status_code, Json(error_response)).into_response()
    }
}

impl From<nsregistry_common::Error> for ApiError {
    fn from(err: nsregistry_common::Error) -> Self {
        match err {
            nsregistry_common::Error::InvalidConfig(msg) => ApiError::BadRequest(msg),
            nsregistry_common::Error::Validation(msg) => ApiError::BadRequest(msg),
            nsregistry_common::Error::System(msg) => ApiError::Internal(msg),
            nsregistry_common::Error::Io(e) => ApiError::Internal(format!("I/O error: {}", e)),
        }
    }
}
