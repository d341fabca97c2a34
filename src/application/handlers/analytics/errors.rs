use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::EventLogError;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("Storage error: {0}")]
    Storage(#[from] EventLogError),

    #[error("Unknown export table: {0}")]
    UnknownTable(String),
}

impl AnalyticsError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AnalyticsError::Storage(_) => ErrorCode::StorageError,
            AnalyticsError::UnknownTable(_) => ErrorCode::NotFound,
        }
    }
}

impl From<AnalyticsError> for DomainError {
    fn from(err: AnalyticsError) -> Self {
        let code = err.code();
        match &err {
            AnalyticsError::UnknownTable(table) => {
                DomainError::new(code, err.to_string()).with_detail("table", table.clone())
            }
            AnalyticsError::Storage(_) => DomainError::new(code, err.to_string()),
        }
    }
}
