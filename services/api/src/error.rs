//! Custom error types for the API service
//!
//! Every failure is rendered as the standard error payload
//! `{timestamp, status, error, message, path, validationErrors?}`. The
//! response carries the payload in its extensions so that
//! [`crate::middleware::error_path`] can stamp the request path onto it.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use common::error::DatabaseError;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::error;

/// Message for every 500, whatever the cause
pub const INTERNAL_ERROR_MESSAGE: &str = "An unexpected error occurred. Please try again later.";

/// Custom error type for the API service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Entity absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed input, illegal state transition or broken business rule
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Field-level failures, keyed by field name
    #[error("Validation failed: {0:?}")]
    Validation(BTreeMap<String, String>),

    /// Missing or bad credentials
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not entitled
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Too many requests")]
    TooManyRequests { retry_after_secs: u64 },

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Internal server error
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::TooManyRequests { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Single-field validation failure
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        ApiError::Validation(BTreeMap::from([(field.to_string(), message.into())]))
    }
}

impl From<auth::AuthError> for ApiError {
    fn from(err: auth::AuthError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Standard error payload
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub timestamp: DateTime<Utc>,
    pub status: u16,
    pub error: String,
    pub message: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_errors: Option<BTreeMap<String, String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let retry_after = match &self {
            ApiError::TooManyRequests { retry_after_secs } => Some(*retry_after_secs),
            _ => None,
        };

        let (message, validation_errors) = match self {
            ApiError::NotFound(msg)
            | ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg) => (msg, None),
            ApiError::Validation(errors) => ("Validation failed".to_string(), Some(errors)),
            ApiError::TooManyRequests { .. } => (
                "Too many requests. Please try again later.".to_string(),
                None,
            ),
            ApiError::Database(err) => {
                error!("Database error: {}", err);
                (INTERNAL_ERROR_MESSAGE.to_string(), None)
            }
            ApiError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (INTERNAL_ERROR_MESSAGE.to_string(), None)
            }
        };

        let body = ErrorBody {
            timestamp: Utc::now(),
            status: status.as_u16(),
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message,
            path: String::new(),
            validation_errors,
        };

        let mut response = (status, Json(body.clone())).into_response();
        response.extensions_mut().insert(body);

        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }

        response
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
