use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ArchiveErrorCode {
    NotFound,
    EmptyBody,
    BodyTooLarge,
    InvalidPayload,
    MissingDate,
    Io,
}

impl ArchiveErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::EmptyBody => "empty_body",
            Self::BodyTooLarge => "body_too_large",
            Self::InvalidPayload => "invalid_payload",
            Self::MissingDate => "missing_date",
            Self::Io => "io_error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveError {
    pub code: ArchiveErrorCode,
    pub message: String,
}

impl ArchiveError {
    #[must_use]
    pub fn new(code: ArchiveErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn io(err: &std::io::Error) -> Self {
        Self::new(ArchiveErrorCode::Io, err.to_string())
    }
}

impl fmt::Display for ArchiveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for ArchiveError {}
