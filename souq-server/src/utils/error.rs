//! Unified error handling
//!
//! Application-level error enum with HTTP mapping.
//!
//! # Error code conventions
//!
//! | Code  | Meaning                         | Status |
//! |-------|---------------------------------|--------|
//! | E0002 | Validation failed               | 400    |
//! | E0003 | Resource not found              | 404    |
//! | E0004 | Conflicting state               | 409    |
//! | E0005 | Window expired                  | 410    |
//! | E0006 | Policy violation (code mismatch)| 422    |
//! | E2001 | Forbidden                       | 403    |
//! | E9001 | Internal error                  | 500    |
//! | E9002 | Database error                  | 500    |

use crate::orders::error::OrderError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

/// API error envelope.
///
/// ```json
/// { "code": "E0003", "message": "Order not found: abc" }
/// ```
#[derive(Debug, Serialize)]
pub struct AppResponse<T> {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// Application error enum
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== Policy errors (4xx) ==========
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Permission denied: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Window expired: {0}")]
    WindowExpired(String),

    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    // ========== System errors (5xx) ==========
    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "E0002", msg.as_str()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "E2001", msg.as_str()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "E0003", msg.as_str()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "E0004", msg.as_str()),
            AppError::WindowExpired(msg) => (StatusCode::GONE, "E0005", msg.as_str()),
            AppError::BusinessRule(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "E0006", msg.as_str())
            }
            AppError::Database(msg) => {
                error!(target: "database", error = %msg, "Database error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, "E9002", "Database error")
            }
            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "E9001",
                    "Internal server error",
                )
            }
        };

        let body = Json(AppResponse::<()> {
            code: code.to_string(),
            message: message.to_string(),
            data: None,
        });

        (status, body).into_response()
    }
}

// ========== Helper constructors ==========

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match &err {
            OrderError::Validation(_) | OrderError::InvalidRating(_) => {
                AppError::Validation(err.to_string())
            }
            OrderError::Forbidden(_) => AppError::Forbidden(err.to_string()),
            OrderError::NotFound(_)
            | OrderError::StoreNotFound(_)
            | OrderError::AddressNotFound(_)
            | OrderError::ProductNotFound(_)
            | OrderError::UserNotFound(_) => AppError::NotFound(err.to_string()),
            OrderError::InvalidTransition(_)
            | OrderError::NotReady(_)
            | OrderError::NotDelivered(_)
            | OrderError::AlreadyRated(_) => AppError::Conflict(err.to_string()),
            OrderError::WindowExpired(_) => AppError::WindowExpired(err.to_string()),
            OrderError::CodeMismatch(_) => AppError::BusinessRule(err.to_string()),
            // Internal identifier-allocation conflicts are not the caller's
            // problem; surface them as internal errors.
            OrderError::Conflict(_) => AppError::Internal(err.to_string()),
            OrderError::Storage(_) => AppError::Database(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn policy_errors_map_to_client_statuses() {
        assert_eq!(
            status_of(AppError::from(OrderError::InvalidRating(9))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::from(OrderError::NotFound("o1".into()))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AppError::from(OrderError::AlreadyRated("o1".into()))),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(AppError::from(OrderError::WindowExpired("o1".into()))),
            StatusCode::GONE
        );
        assert_eq!(
            status_of(AppError::from(OrderError::CodeMismatch("o1".into()))),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn internal_conflicts_are_not_user_facing() {
        let status = status_of(AppError::from(OrderError::Conflict("retries".into())));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
