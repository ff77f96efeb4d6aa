use std::fmt;
use std::io;

/// Coarse classification of store failures, stable enough for a boundary layer to map onto
/// its own status semantics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Session, page or avatar is absent.
    NotFound,
    /// Duplicate session name, page id or page title.
    Conflict,
    /// A required field is missing or a name is not a safe path segment.
    InvalidInput,
    /// Any other filesystem or serialization failure.
    Internal,
}

impl ErrorCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorCode::NotFound => "not_found",
            ErrorCode::Conflict => "conflict",
            ErrorCode::InvalidInput => "invalid_input",
            ErrorCode::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code}: {message}")]
pub struct StoreError {
    pub code: ErrorCode,
    pub message: String,
}

impl StoreError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.code == ErrorCode::NotFound
    }

    pub fn is_conflict(&self) -> bool {
        self.code == ErrorCode::Conflict
    }
}

pub type SessionResult<T> = Result<T, StoreError>;

pub(crate) fn not_found(what: impl fmt::Display) -> StoreError {
    StoreError::new(ErrorCode::NotFound, format!("{what} not found"))
}

pub(crate) fn conflict(message: impl Into<String>) -> StoreError {
    StoreError::new(ErrorCode::Conflict, message)
}

pub(crate) fn invalid_argument(message: impl Into<String>) -> StoreError {
    StoreError::new(ErrorCode::InvalidInput, message)
}

pub(crate) fn serde_error(err: serde_json::Error) -> StoreError {
    StoreError::new(ErrorCode::Internal, err.to_string())
}

/// Maps an I/O failure, keeping "not found" and "already exists" distinguishable.
pub(crate) fn io_error(err: io::Error, context: impl fmt::Display) -> StoreError {
    let code = match err.kind() {
        io::ErrorKind::NotFound => ErrorCode::NotFound,
        io::ErrorKind::AlreadyExists => ErrorCode::Conflict,
        _ => ErrorCode::Internal,
    };
    StoreError::new(code, format!("{context}: {err}"))
}
