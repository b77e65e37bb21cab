// Error handling types for the API

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use tracing::{error, warn};

use super::validation::ValidationResult;
use super::API_BASE_PATH;

/// Public message for every failed credential or token check
pub const UNAUTHORIZED_MESSAGE: &str = "unauthorized";

/// API error types
///
/// The payload of the `Unauthorized`, `Conflict`, `NotFound` and
/// `ValidationError` variants is shown to the client. The payload of the OAuth
/// variants and `InternalServer` is internal detail and only ever logged.
#[derive(Debug)]
pub enum ApiError {
    Unauthorized(String),
    NotFound(String),
    Conflict(String),
    ValidationError(String),
    OAuthDenied(String),
    OAuthMalformedCallback(String),
    OAuthExchangeFailed(String),
    OAuthLinkFailed(String),
    InternalServer(String),
    DatabaseError(sqlx::Error),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            ApiError::OAuthDenied(msg) => write!(f, "OAuth Denied: {}", msg),
            ApiError::OAuthMalformedCallback(msg) => {
                write!(f, "OAuth Malformed Callback: {}", msg)
            }
            ApiError::OAuthExchangeFailed(msg) => write!(f, "OAuth Exchange Failed: {}", msg),
            ApiError::OAuthLinkFailed(msg) => write!(f, "OAuth Link Failed: {}", msg),
            ApiError::InternalServer(msg) => write!(f, "Internal Server Error: {}", msg),
            ApiError::DatabaseError(e) => write!(f, "Database Error: {}", e),
        }
    }
}

/// JSON error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub message: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_url: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let github_retry = || Some(format!("{}/github/auth", API_BASE_PATH));

        let (status, message, code, retry_url) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, "UNAUTHORIZED", None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, "NOT_FOUND", None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg, "CONFLICT", None),
            ApiError::ValidationError(msg) => {
                (StatusCode::BAD_REQUEST, msg, "VALIDATION_ERROR", None)
            }
            ApiError::OAuthDenied(detail) => {
                warn!(detail = %detail, "GitHub authorization denied");
                (
                    StatusCode::BAD_REQUEST,
                    "GitHub authorization was denied".to_string(),
                    "OAUTH_DENIED",
                    github_retry(),
                )
            }
            ApiError::OAuthMalformedCallback(detail) => {
                warn!(detail = %detail, "Malformed GitHub callback");
                (
                    StatusCode::BAD_REQUEST,
                    "GitHub callback was incomplete or expired".to_string(),
                    "OAUTH_MALFORMED_CALLBACK",
                    github_retry(),
                )
            }
            ApiError::OAuthExchangeFailed(detail) => {
                warn!(detail = %detail, "GitHub code exchange failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "Could not complete GitHub authorization".to_string(),
                    "OAUTH_EXCHANGE_FAILED",
                    github_retry(),
                )
            }
            ApiError::OAuthLinkFailed(detail) => {
                error!(detail = %detail, "GitHub account link could not be saved");
                (
                    StatusCode::BAD_GATEWAY,
                    "Could not complete GitHub authorization".to_string(),
                    "OAUTH_LINK_FAILED",
                    github_retry(),
                )
            }
            ApiError::InternalServer(detail) => {
                error!(detail = %detail, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    "INTERNAL_SERVER_ERROR",
                    None,
                )
            }
            ApiError::DatabaseError(e) => {
                error!(error = %e, "Database error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database operation failed".to_string(),
                    "DATABASE_ERROR",
                    None,
                )
            }
        };

        let error_response = ErrorResponse {
            message,
            code: code.to_string(),
            retry_url,
        };

        (status, Json(error_response)).into_response()
    }
}

/// Helper function to convert ValidationResult to ApiError
impl From<ValidationResult> for ApiError {
    fn from(result: ValidationResult) -> Self {
        if result.is_valid {
            ApiError::InternalServer(
                "Validation result was valid but converted to error".to_string(),
            )
        } else {
            let error_messages: Vec<String> = result
                .errors
                .iter()
                .map(|e| format!("{}: {}", e.field, e.message))
                .collect();
            ApiError::ValidationError(error_messages.join(", "))
        }
    }
}

/// Failure reported by a repository implementation
#[derive(Debug, Error)]
pub enum StoreError {
    /// A UNIQUE constraint rejected the write; carries the constraint name
    #[error("unique constraint violated: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                let constraint = db_err.constraint().unwrap_or("unknown").to_string();
                return StoreError::Conflict(constraint);
            }
        }
        StoreError::Database(err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(constraint) => {
                warn!(constraint = %constraint, "Unique constraint rejected write");
                ApiError::Conflict("resource already exists".to_string())
            }
            StoreError::Database(e) => ApiError::DatabaseError(e),
        }
    }
}
