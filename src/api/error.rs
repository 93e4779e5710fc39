use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use super::ApiResponse;
use crate::services::{AnalyticsError, AuthError, MasterDataError, RequestError};

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),

    /// No valid credentials presented (401)
    Unauthorized(String),

    /// Authenticated but not allowed (403)
    Forbidden(String),

    ValidationError(String),

    Conflict(String),

    DatabaseError(String),

    InternalError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
            Self::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
            Self::Forbidden(msg) => write!(f, "Forbidden: {msg}"),
            Self::ValidationError(msg) => write!(f, "Validation error: {msg}"),
            Self::Conflict(msg) => write!(f, "Conflict: {msg}"),
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::InternalError(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            Self::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            Self::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
            Self::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ApiResponse::<()>::error(error_message);
        (status, Json(body)).into_response()
    }
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalError(err.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => Self::Unauthorized("Invalid credentials".to_string()),
            AuthError::EmailInUse => Self::Conflict("Email already in use".to_string()),
            AuthError::UserNotFound => Self::NotFound("User not found".to_string()),
            AuthError::Validation(msg) => Self::ValidationError(msg),
            AuthError::Database(msg) => Self::DatabaseError(msg),
            AuthError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

impl From<RequestError> for ApiError {
    fn from(err: RequestError) -> Self {
        match err {
            RequestError::NotFound => Self::NotFound("Request not found".to_string()),
            RequestError::Unauthorized => {
                Self::Forbidden("Not allowed for your role".to_string())
            }
            RequestError::Validation { field, reason } => {
                Self::ValidationError(format!("{field}: {reason}"))
            }
            RequestError::DefaultStatusMissing => {
                Self::InternalError("No default status configured".to_string())
            }
            RequestError::Database(msg) => Self::DatabaseError(msg),
            RequestError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

impl From<MasterDataError> for ApiError {
    fn from(err: MasterDataError) -> Self {
        match err {
            MasterDataError::Unauthorized => {
                Self::Forbidden("Not allowed for your role".to_string())
            }
            MasterDataError::NotFound => Self::NotFound("Not found".to_string()),
            MasterDataError::Validation(msg) => Self::ValidationError(msg),
            MasterDataError::Database(msg) => Self::DatabaseError(msg),
            MasterDataError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

impl From<AnalyticsError> for ApiError {
    fn from(err: AnalyticsError) -> Self {
        match err {
            AnalyticsError::Unauthorized => {
                Self::Forbidden("Not allowed for your role".to_string())
            }
            AnalyticsError::Database(msg) => Self::DatabaseError(msg),
            AnalyticsError::Internal(msg) => Self::InternalError(msg),
        }
    }
}
