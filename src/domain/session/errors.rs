//! Session-specific error types.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, SessionId, ValidationError};
use crate::ports::EventLogError;

/// Errors raised by session commands.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Session id is not in the index.
    #[error("Session not found: {0}")]
    NotFound(SessionId),

    /// The participant already finished the study.
    #[error("Session {0} is already complete")]
    AlreadyComplete(SessionId),

    /// Request data failed validation.
    #[error("Validation failed for '{field}': {message}")]
    ValidationFailed { field: String, message: String },

    /// Event log read or append failed.
    #[error("Storage error: {0}")]
    Storage(#[from] EventLogError),
}

impl SessionError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        SessionError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            SessionError::NotFound(_) => ErrorCode::SessionNotFound,
            SessionError::AlreadyComplete(_) => ErrorCode::SessionAlreadyComplete,
            SessionError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            SessionError::Storage(_) => ErrorCode::StorageError,
        }
    }
}

impl From<ValidationError> for SessionError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::EmptyField { field } => SessionError::ValidationFailed {
                message: "must not be empty".to_string(),
                field,
            },
            ValidationError::InvalidFormat { field, reason } => SessionError::ValidationFailed {
                field,
                message: reason,
            },
        }
    }
}

impl From<SessionError> for DomainError {
    fn from(err: SessionError) -> Self {
        let code = err.code();
        let message = err.to_string();
        match err {
            SessionError::NotFound(id) | SessionError::AlreadyComplete(id) => {
                DomainError::new(code, message).with_detail("session_id", id.to_string())
            }
            SessionError::ValidationFailed { field, .. } => {
                DomainError::new(code, message).with_detail("field", field)
            }
            SessionError::Storage(_) => DomainError::new(code, message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_session_not_found() {
        let err = SessionError::NotFound(SessionId::new("s1").unwrap());
        assert_eq!(err.code(), ErrorCode::SessionNotFound);
        assert_eq!(err.to_string(), "Session not found: s1");
    }

    #[test]
    fn validation_error_converts_with_field() {
        let err: SessionError = ValidationError::empty_field("session_id").into();
        let domain: DomainError = err.into();
        assert_eq!(domain.code, ErrorCode::ValidationFailed);
        assert_eq!(domain.details.get("field"), Some(&"session_id".to_string()));
    }

    #[test]
    fn already_complete_carries_session_detail() {
        let domain: DomainError =
            SessionError::AlreadyComplete(SessionId::new("s9").unwrap()).into();
        assert_eq!(domain.code, ErrorCode::SessionAlreadyComplete);
        assert_eq!(domain.details.get("session_id"), Some(&"s9".to_string()));
    }
}
