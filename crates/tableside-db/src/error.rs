use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum DbErrorCode {
    NotFound,
    Conflict,
    Forbidden,
    Validation,
    Internal,
}

impl DbErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Forbidden => "forbidden",
            Self::Validation => "validation_error",
            Self::Internal => "internal_error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbError {
    pub code: DbErrorCode,
    pub message: String,
    /// Wire-level detail code, e.g. `HAS_ORDERS` on the staff-delete conflict.
    pub detail_code: Option<&'static str>,
}

impl DbError {
    #[must_use]
    pub fn new(code: DbErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            detail_code: None,
        }
    }

    #[must_use]
    pub fn with_detail_code(mut self, detail_code: &'static str) -> Self {
        self.detail_code = Some(detail_code);
        self
    }

    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(DbErrorCode::NotFound, message)
    }
}

impl fmt::Display for DbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for DbError {}

impl From<rusqlite::Error> for DbError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::QueryReturnedNoRows => Self::new(DbErrorCode::NotFound, "not found"),
            other => Self::new(DbErrorCode::Internal, other.to_string()),
        }
    }
}
