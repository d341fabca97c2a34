//! SessionIndex - in-memory cache of the latest known state per session.
//!
//! Built once at startup from the event log and then kept current by the
//! session command handlers. It serves the low-latency paths (existence
//! checks, progress, resume, condition history). Exports and stats never
//! read it; they recompute the merged view from the log.

use serde_json::{Map, Value};
use std::collections::HashMap;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::domain::foundation::{lenient, Timestamp};
use crate::domain::session::{
    apply_patch, fields, merge_sessions, EventCategory, SessionRecord, UpcasterRegistry,
};
use crate::ports::{EventLog, EventLogError};

/// One cached session.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedSession {
    pub session_id: String,
    /// Creation order; later sessions have larger values.
    pub seq: u64,
    pub fields: Map<String, Value>,
    pub last_written: Timestamp,
}

impl IndexedSession {
    pub fn record(&self) -> SessionRecord {
        SessionRecord::from_fields(self.fields.clone())
    }

    pub fn is_complete(&self) -> bool {
        self.fields
            .get(fields::IS_COMPLETE)
            .and_then(lenient::as_bool)
            .unwrap_or(false)
    }

    pub fn prolific_pid(&self) -> Option<String> {
        self.fields
            .get(fields::PROLIFIC_PID)
            .and_then(lenient::as_string)
    }
}

#[derive(Debug, Default)]
struct IndexState {
    entries: HashMap<String, IndexedSession>,
    next_seq: u64,
}

#[derive(Debug, Default)]
pub struct SessionIndex {
    state: RwLock<IndexState>,
    /// Held shared by every log-then-cache write and exclusively by the
    /// administrative rewrites, so the log and the cache change together.
    writes: RwLock<()>,
}

impl SessionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared access for a handler that appends to the log and then updates
    /// the cache. Hold it across both steps.
    pub async fn write_access(&self) -> RwLockReadGuard<'_, ()> {
        self.writes.read().await
    }

    /// Exclusive access for rewrites that must change the log and the cache
    /// with no session write in between.
    pub async fn exclusive_access(&self) -> RwLockWriteGuard<'_, ()> {
        self.writes.write().await
    }

    /// Replaces the cache with the merged view of the log.
    ///
    /// Only ids with a creation record are indexed; updates for unknown ids
    /// are ignored. Returns the number of indexed sessions.
    pub async fn load(
        &self,
        log: &dyn EventLog,
        upcasters: &UpcasterRegistry,
    ) -> Result<usize, EventLogError> {
        let creations = log.read_all(EventCategory::Sessions).await?;
        let updates = log.read_all(EventCategory::SessionUpdates).await?;

        let mut last_written: HashMap<String, Timestamp> = HashMap::new();
        for record in creations.iter().chain(updates.iter()) {
            let (Some(id), Some(written)) = (
                record.get(fields::SESSION_ID).and_then(lenient::as_string),
                record
                    .get(fields::WRITTEN_AT)
                    .and_then(Value::as_str)
                    .and_then(Timestamp::parse),
            ) else {
                continue;
            };
            last_written
                .entry(id)
                .and_modify(|ts| {
                    if ts.is_before(&written) {
                        *ts = written;
                    }
                })
                .or_insert(written);
        }

        let merged = merge_sessions(
            upcast_records(creations, upcasters),
            upcast_records(updates, upcasters),
        );

        let mut state = self.state.write().await;
        state.entries.clear();
        state.next_seq = 0;
        let now = Timestamp::now();
        for record in merged {
            let Some(id) = record.get(fields::SESSION_ID).and_then(lenient::as_string) else {
                continue;
            };
            let seq = state.next_seq;
            state.next_seq += 1;
            let written = last_written.get(&id).copied().unwrap_or(now);
            state.entries.insert(
                id.clone(),
                IndexedSession {
                    session_id: id,
                    seq,
                    fields: record,
                    last_written: written,
                },
            );
        }
        Ok(state.entries.len())
    }

    pub async fn get(&self, session_id: &str) -> Option<IndexedSession> {
        self.state.read().await.entries.get(session_id).cloned()
    }

    pub async fn contains(&self, session_id: &str) -> bool {
        self.state.read().await.entries.contains_key(session_id)
    }

    /// Shallow-merges `patch` into the cached record, creating it if needed.
    pub async fn upsert(&self, session_id: &str, patch: &Map<String, Value>) {
        let mut state = self.state.write().await;
        let now = Timestamp::now();
        if let Some(entry) = state.entries.get_mut(session_id) {
            apply_patch(&mut entry.fields, patch);
            entry.last_written = now;
            return;
        }

        let seq = state.next_seq;
        state.next_seq += 1;
        let mut values = Map::new();
        values.insert(
            fields::SESSION_ID.to_string(),
            Value::String(session_id.to_string()),
        );
        apply_patch(&mut values, patch);
        state.entries.insert(
            session_id.to_string(),
            IndexedSession {
                session_id: session_id.to_string(),
                seq,
                fields: values,
                last_written: now,
            },
        );
    }

    /// Applies `patch` only while the cached session is not complete.
    ///
    /// Returns whether the patch was applied.
    pub async fn upsert_unless_complete(&self, session_id: &str, patch: &Map<String, Value>) -> bool {
        let mut state = self.state.write().await;
        match state.entries.get_mut(session_id) {
            Some(entry) if !entry.is_complete() => {
                apply_patch(&mut entry.fields, patch);
                entry.last_written = Timestamp::now();
                true
            }
            _ => false,
        }
    }

    pub async fn remove(&self, session_id: &str) -> Option<IndexedSession> {
        self.state.write().await.entries.remove(session_id)
    }

    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        state.entries.clear();
        state.next_seq = 0;
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Snapshot of every entry in creation order.
    pub async fn all(&self) -> Vec<IndexedSession> {
        let mut entries: Vec<IndexedSession> =
            self.state.read().await.entries.values().cloned().collect();
        entries.sort_by_key(|e| e.seq);
        entries
    }

    /// Most recently created session of an external participant.
    pub async fn latest_for_participant(&self, prolific_pid: &str) -> Option<IndexedSession> {
        self.state
            .read()
            .await
            .entries
            .values()
            .filter(|e| e.prolific_pid().as_deref() == Some(prolific_pid))
            .max_by_key(|e| e.seq)
            .cloned()
    }
}

/// Brings stored records to the current schema; a record that cannot be
/// upcast is kept in its stored shape.
pub(crate) fn upcast_records(
    records: Vec<Map<String, Value>>,
    upcasters: &UpcasterRegistry,
) -> Vec<Map<String, Value>> {
    records
        .into_iter()
        .map(|record| {
            upcasters
                .upcast_to_current(record.clone())
                .unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "Record upcast failed, using stored shape");
                    record
                })
        })
        .collect()
}
