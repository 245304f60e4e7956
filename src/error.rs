/// Application Error Handling
///
/// Unified error taxonomy for the service, mapped onto the HTTP contract:
/// - Validation failures (missing/malformed input) -> 422
/// - Duplicate email on registration -> 409
/// - Credential and token failures -> 401
/// - Authenticated but insufficient role -> 403
/// - Storage and signing failures -> 500, underlying message propagated
///
/// Handlers and middleware return `AppError`; the `ResponseError` impl owns
/// the HTTP mapping so status codes stay consistent across the API.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use std::error::Error as StdError;
use std::fmt;

/// Validation errors for request input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// One or more required fields absent or blank; carries the field list
    /// for the response message.
    MissingFields(&'static str),
    TooLong(&'static str, usize),
    InvalidFormat(&'static str),
    UnknownRole(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingFields(fields) => {
                write!(f, "Please fill in all fields ({})", fields)
            }
            ValidationError::TooLong(field, max) => {
                write!(f, "{} is too long (maximum {} characters)", field, max)
            }
            ValidationError::InvalidFormat(field) => write!(f, "{} has invalid format", field),
            ValidationError::UnknownRole(role) => {
                write!(f, "role must be one of member, moderator, admin (got {})", role)
            }
        }
    }
}

impl StdError for ValidationError {}

/// Which token kind an authentication failure refers to. The two kinds are
/// signed with distinct secrets and rejected with distinct messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Authentication and authorization errors
///
/// `TokenExpired` and `TokenInvalid` stay separate variants (callers may
/// react differently, e.g. a silent re-login prompt on expiry) even though
/// both map to the same 401 body per token kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    InvalidCredentials,
    MissingToken(TokenKind),
    TokenExpired(TokenKind),
    TokenInvalid(TokenKind),
    TokenRevoked,
    Forbidden,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::InvalidCredentials => write!(f, "Email or password is invalid"),
            AuthError::MissingToken(TokenKind::Access) => write!(f, "Access token not found"),
            AuthError::MissingToken(TokenKind::Refresh) => write!(f, "Refresh token not found"),
            AuthError::TokenExpired(TokenKind::Access)
            | AuthError::TokenInvalid(TokenKind::Access) => {
                write!(f, "Access token invalid or expired")
            }
            AuthError::TokenExpired(TokenKind::Refresh)
            | AuthError::TokenInvalid(TokenKind::Refresh) => {
                write!(f, "Refresh token invalid or expired")
            }
            AuthError::TokenRevoked => write!(f, "Access token revoked"),
            AuthError::Forbidden => write!(f, "Access denied"),
        }
    }
}

impl StdError for AuthError {}

impl AuthError {
    /// Stable machine-readable code, included in the response body where the
    /// contract requires clients to distinguish the rejection (revocation).
    fn code(&self) -> Option<&'static str> {
        match self {
            AuthError::TokenRevoked => Some("AccessTokenRevoked"),
            _ => None,
        }
    }
}

/// Persistent store errors
#[derive(Debug)]
pub enum StoreError {
    Backend(String),
    Serialization(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Backend(msg) => write!(f, "store error: {}", msg),
            StoreError::Serialization(msg) => write!(f, "store record error: {}", msg),
        }
    }
}

impl StdError for StoreError {}

impl From<sled::Error> for StoreError {
    fn from(err: sled::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Central error type that all handler and middleware errors map to
#[derive(Debug)]
pub enum AppError {
    Validation(ValidationError),
    Conflict(&'static str),
    Auth(AuthError),
    Store(StoreError),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(e) => write!(f, "{}", e),
            AppError::Conflict(msg) => write!(f, "{}", msg),
            AppError::Auth(e) => write!(f, "{}", e),
            AppError::Store(e) => write!(f, "{}", e),
            AppError::Internal(msg) => write!(f, "{}", msg),
        }
    }
}

impl StdError for AppError {}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Auth(err)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Store(err)
    }
}

/// JSON error body: `{"message": ...}` plus a `code` where clients need to
/// tell rejections apart (revoked access tokens).
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Auth(AuthError::Forbidden) => StatusCode::FORBIDDEN,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Store(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Store(e) => {
                tracing::error!(error = %e, "store failure");
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "internal failure");
            }
            AppError::Auth(e) => {
                tracing::warn!(error = %e, "request rejected");
            }
            AppError::Validation(e) => {
                tracing::warn!(error = %e, "invalid request input");
            }
            AppError::Conflict(msg) => {
                tracing::warn!(error = %msg, "conflicting request");
            }
        }

        let code = match self {
            AppError::Auth(e) => e.code(),
            _ => None,
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            message: self.to_string(),
            code,
        })
    }
}
