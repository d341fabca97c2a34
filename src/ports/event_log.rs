//! Event Log Port - Append-only, per-category record store.
//!
//! Every session fact and tracked event is one JSON object in one category.
//! The log is the durable source of truth; the session index and every
//! aggregate are rebuilt from it.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::session::EventCategory;

/// Errors that can occur during event log operations
#[derive(Debug, Error)]
pub enum EventLogError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize {category} record: {source}")]
    Serialization {
        category: EventCategory,
        #[source]
        source: serde_json::Error,
    },
}

impl EventLogError {
    pub fn io(path: impl std::fmt::Display, source: std::io::Error) -> Self {
        EventLogError::Io {
            path: path.to_string(),
            source,
        }
    }
}

impl From<EventLogError> for DomainError {
    fn from(err: EventLogError) -> Self {
        DomainError::new(ErrorCode::StorageError, err.to_string())
    }
}

/// Filter applied by [`EventLog::retain_all`]; returns `true` to keep a record.
pub type RecordFilter<'a> = dyn Fn(EventCategory, &Map<String, Value>) -> bool + Send + Sync + 'a;

/// Port for the append-only record store.
///
/// # Contract
///
/// Implementations must:
/// - Stamp every appended record with a server-side `_written_at`
/// - Preserve append order within a category
/// - Skip unparseable stored records on read instead of failing
/// - Run `retain_all` / `delete_*` with exclusive access, never
///   interleaved with appends
#[async_trait]
pub trait EventLog: Send + Sync {
    /// Appends one record to a category and returns it as stored.
    async fn append(
        &self,
        category: EventCategory,
        record: Map<String, Value>,
    ) -> Result<Map<String, Value>, EventLogError>;

    /// Every readable record of a category, in write order.
    ///
    /// A category that was never written reads as empty.
    async fn read_all(&self, category: EventCategory)
        -> Result<Vec<Map<String, Value>>, EventLogError>;

    /// Rewrites every category keeping only records the filter accepts.
    ///
    /// Returns the number of removed records per category; categories with
    /// nothing removed are left untouched and omitted.
    async fn retain_all(
        &self,
        keep: &RecordFilter<'_>,
    ) -> Result<BTreeMap<EventCategory, usize>, EventLogError>;

    /// Drops one category entirely.
    async fn delete_category(&self, category: EventCategory) -> Result<(), EventLogError>;

    /// Drops every category.
    async fn delete_all(&self) -> Result<(), EventLogError>;
}
