//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, timestamps, error codes, and the permissive JSON
//! readers used to interpret records written by older clients.

mod errors;
mod ids;
pub mod lenient;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::SessionId;
pub use timestamp::Timestamp;
