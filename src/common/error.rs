// Error handling types for the API

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::fmt;
use tracing::error;

use super::validation::ValidationResult;

/// API error types
///
/// Authentication failures carry fixed messages so the response never reveals
/// which precondition failed (unknown email vs wrong password, missing user
/// vs disabled user).
#[derive(Debug)]
pub enum ApiError {
    InvalidCredentials,
    DuplicateIdentity,
    TokenExpired,
    TokenInvalid,
    TokenRevoked,
    MissingToken,
    Forbidden(String),
    StateMismatch,
    ProviderExchangeFailed(String),
    BadRequest(String),
    NotFound(String),
    ValidationError(String),
    InternalServer(String),
    DatabaseError(sqlx::Error),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::InvalidCredentials => write!(f, "Invalid credentials"),
            ApiError::DuplicateIdentity => write!(f, "Duplicate identity"),
            ApiError::TokenExpired => write!(f, "Token expired"),
            ApiError::TokenInvalid => write!(f, "Token invalid"),
            ApiError::TokenRevoked => write!(f, "Token revoked"),
            ApiError::MissingToken => write!(f, "Missing token"),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::StateMismatch => write!(f, "OAuth state mismatch"),
            ApiError::ProviderExchangeFailed(msg) => {
                write!(f, "Provider exchange failed: {}", msg)
            }
            ApiError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            ApiError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            ApiError::InternalServer(msg) => write!(f, "Internal Server Error: {}", msg),
            ApiError::DatabaseError(e) => write!(f, "Database Error: {}", e),
        }
    }
}

/// JSON error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_message, code) = match self {
            ApiError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "invalid email or password".to_string(),
                "INVALID_CREDENTIALS",
            ),
            ApiError::DuplicateIdentity => (
                StatusCode::CONFLICT,
                "an account with this email already exists".to_string(),
                "DUPLICATE_IDENTITY",
            ),
            ApiError::TokenExpired => (
                StatusCode::UNAUTHORIZED,
                "token has expired".to_string(),
                "TOKEN_EXPIRED",
            ),
            ApiError::TokenInvalid => (
                StatusCode::UNAUTHORIZED,
                "invalid token".to_string(),
                "TOKEN_INVALID",
            ),
            ApiError::TokenRevoked => (
                StatusCode::UNAUTHORIZED,
                "token has been revoked".to_string(),
                "TOKEN_REVOKED",
            ),
            ApiError::MissingToken => (
                StatusCode::UNAUTHORIZED,
                "missing authorization header".to_string(),
                "MISSING_TOKEN",
            ),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg, "FORBIDDEN"),
            ApiError::StateMismatch => (
                StatusCode::BAD_REQUEST,
                "oauth state is invalid or expired".to_string(),
                "STATE_MISMATCH",
            ),
            ApiError::ProviderExchangeFailed(msg) => {
                error!(error = %msg, "OAuth provider exchange failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "oauth provider exchange failed".to_string(),
                    "PROVIDER_EXCHANGE_FAILED",
                )
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, "BAD_REQUEST"),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, "NOT_FOUND"),
            ApiError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg, "VALIDATION_ERROR"),
            ApiError::InternalServer(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                msg,
                "INTERNAL_SERVER_ERROR",
            ),
            ApiError::DatabaseError(e) => {
                error!(error = %e, "Database error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database operation failed".to_string(),
                    "DATABASE_ERROR",
                )
            }
        };

        let error_response = ErrorResponse {
            error: error_message,
            code: code.to_string(),
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
