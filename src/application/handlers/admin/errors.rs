use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::EventLogError;

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("Confirmation phrase does not match")]
    ConfirmationMismatch,

    #[error("Either session_id or prolific_pid is required")]
    MissingIdentifier,

    #[error("No records found for participant {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(#[from] EventLogError),
}

impl AdminError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AdminError::ConfirmationMismatch => ErrorCode::ConfirmationMismatch,
            AdminError::MissingIdentifier => ErrorCode::ValidationFailed,
            AdminError::NotFound(_) => ErrorCode::NotFound,
            AdminError::Storage(_) => ErrorCode::StorageError,
        }
    }
}

impl From<AdminError> for DomainError {
    fn from(err: AdminError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}
