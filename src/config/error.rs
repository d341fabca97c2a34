//! Configuration error types

use thiserror::Error;

use crate::domain::scoring::AnswerKeyError;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    #[error("Cannot read answer key {path}: {source}")]
    AnswerKeyIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Answer key {path} is invalid: {source}")]
    AnswerKeyInvalid {
        path: String,
        #[source]
        source: AnswerKeyError,
    },
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid bind address {0}")]
    InvalidBindAddress(String),

    #[error("At least one condition is required")]
    NoConditions,

    #[error("Condition {0} is listed twice")]
    DuplicateCondition(String),

    #[error("{field} names unknown condition {value}")]
    UnknownCondition { field: &'static str, value: String },

    #[error("Block size {block_size} is not a positive multiple of {conditions} conditions")]
    InvalidBlockSize { block_size: usize, conditions: usize },

    #[error("Histogram bin width must be positive")]
    InvalidHistogramBin,

    #[error("Histogram must allow at least one bin")]
    InvalidHistogramMaxBins,

    #[error("Page order cannot be empty")]
    EmptyPageOrder,

    #[error("Export key must be at least {0} characters in production")]
    ExportKeyTooShort(usize),
}
