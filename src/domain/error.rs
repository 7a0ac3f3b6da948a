use color_eyre::eyre::Report;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LeaveAPIError {
    #[error("Not authorised")]
    AuthorizationError(#[from] AuthorizationError),
    #[error("Leave already exists for {name} on {date}")]
    ConflictError { date: chrono::NaiveDate, name: String },
    #[error("Leave for {name} on {date} was changed by another request")]
    StaleUpdateError { date: chrono::NaiveDate, name: String },
    #[error("Not found: {0}")]
    NotFoundError(String),
    #[error("Storage unavailable")]
    StorageUnavailableError(#[source] Report),
    #[error("Unexpected error")]
    UnexpectedError(#[source] Report),
    #[error("Validation error")]
    ValidationError(#[from] ValidationError),
}

/// Why a caller may not act on a leave record.
#[derive(Debug, Error, PartialEq)]
pub enum AuthorizationError {
    #[error("LINE account is not registered")]
    NotRegistered,
    #[error("Not permitted to act for {0}")]
    NotPermitted(String),
}

impl AuthorizationError {
    pub fn code(&self) -> &'static str {
        match self {
            AuthorizationError::NotRegistered => "NOT_REGISTERED",
            AuthorizationError::NotPermitted(_) => "NOT_PERMITTED",
        }
    }
}

#[derive(Debug, Error, PartialEq, Clone)]
#[error("Validation error: {0}")]
pub struct ValidationError(String);

impl ValidationError {
    pub fn new(message: String) -> Self {
        Self(message)
    }
}

impl AsRef<str> for ValidationError {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
