//! Boundary error model: every failure a handler can produce maps to one
//! `{"error": <message>}` JSON body with an appropriate status code.

#![forbid(unsafe_code)]

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use std::fmt;

use tableside_archive::{ArchiveError, ArchiveErrorCode};
use tableside_auth::{AuthError, AuthErrorCode};
use tableside_db::{DbError, DbErrorCode};
use tableside_model::InvalidDate;

pub const CRATE_NAME: &str = "tableside-api";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ApiErrorCode {
    Validation,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    PayloadTooLarge,
    Internal,
}

impl ApiErrorCode {
    #[must_use]
    pub const fn status(self) -> StatusCode {
        match self {
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict => StatusCode::CONFLICT,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
    /// Extra machine-readable code in the body, e.g. `HAS_ORDERS`.
    pub detail_code: Option<&'static str>,
}

impl ApiError {
    #[must_use]
    pub fn new(code: ApiErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            detail_code: None,
        }
    }

    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::Validation, message)
    }

    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::NotFound, message)
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::Internal, message)
    }

    #[must_use]
    pub fn body(&self) -> Value {
        match self.detail_code {
            Some(code) => json!({"error": self.message, "code": code}),
            None => json!({"error": self.message}),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self.body())).into_response()
    }
}

impl From<InvalidDate> for ApiError {
    fn from(err: InvalidDate) -> Self {
        Self::validation(err.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let code = match err.code {
            AuthErrorCode::Internal => ApiErrorCode::Internal,
            _ => ApiErrorCode::Unauthorized,
        };
        let message = match err.code {
            AuthErrorCode::MissingCredential => "Missing Bearer token".to_string(),
            AuthErrorCode::Expired => "Token expired".to_string(),
            AuthErrorCode::Internal => err.message,
            _ => "Invalid token".to_string(),
        };
        Self::new(code, message)
    }
}

impl From<ArchiveError> for ApiError {
    fn from(err: ArchiveError) -> Self {
        let code = match err.code {
            ArchiveErrorCode::NotFound => ApiErrorCode::NotFound,
            ArchiveErrorCode::BodyTooLarge => ApiErrorCode::PayloadTooLarge,
            ArchiveErrorCode::EmptyBody
            | ArchiveErrorCode::InvalidPayload
            | ArchiveErrorCode::MissingDate => ApiErrorCode::Validation,
            ArchiveErrorCode::Io => ApiErrorCode::Internal,
            _ => ApiErrorCode::Internal,
        };
        Self::new(code, err.message)
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        let code = match err.code {
            DbErrorCode::NotFound => ApiErrorCode::NotFound,
            DbErrorCode::Conflict => ApiErrorCode::Conflict,
            DbErrorCode::Forbidden => ApiErrorCode::Forbidden,
            DbErrorCode::Validation => ApiErrorCode::Validation,
            DbErrorCode::Internal => ApiErrorCode::Internal,
            _ => ApiErrorCode::Internal,
        };
        Self {
            code,
            message: err.message,
            detail_code: err.detail_code,
        }
    }
}
