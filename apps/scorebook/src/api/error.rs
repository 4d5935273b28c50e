//! # API Errors
//!
//! Maps core errors onto HTTP status codes with a JSON body:
//!
//! | Error | Status | Body |
//! |-------|--------|------|
//! | validation | 400 | `{message, field}` |
//! | bad body, path or query | 400 | `{message}` |
//! | not found | 404 | `{message}` |
//! | unauthenticated | 401 | `{message}` |
//! | duplicate | 409 | `{message}` |
//! | storage / codec | 500 | `{message: "Internal server error"}` |
//!
//! Internal failures are logged with their detail; clients only see the
//! generic message.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use scorebook_core::ScorebookError;
use serde::{Deserialize, Serialize};

/// JSON body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// An error returned by a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    Validation {
        field: Option<String>,
        message: String,
    },
    NotFound(String),
    Unauthorized(String),
    Conflict(String),
    Internal(String),
}

impl ApiError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            field: Some(field.to_string()),
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ScorebookError> for ApiError {
    fn from(err: ScorebookError) -> Self {
        match err {
            ScorebookError::InvalidInput { field, message } => Self::Validation {
                field: Some(field),
                message,
            },
            ScorebookError::NotFound { .. } => Self::NotFound(err.to_string()),
            ScorebookError::Duplicate(message) => Self::Conflict(message),
            ScorebookError::StorageError(_) | ScorebookError::SerializationError(_) => {
                Self::Internal(err.to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation {
            field: None,
            message: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::Validation {
            field: None,
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation {
            field: None,
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::Validation { field, message } => ErrorBody { message, field },
            Self::NotFound(message) | Self::Unauthorized(message) | Self::Conflict(message) => {
                ErrorBody {
                    message,
                    field: None,
                }
            }
            Self::Internal(detail) => {
                tracing::error!(event = "internal_error", error = %detail, "Request failed");
                ErrorBody {
                    message: "Internal server error".to_string(),
                    field: None,
                }
            }
        };
        (status, Json(body)).into_response()
    }
}
