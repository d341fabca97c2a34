//! Session command and query handlers.

mod complete_session;
mod create_session;
mod give_consent;
mod resume_session;
mod save_progress;
mod save_snapshot;

pub use complete_session::{CompleteSessionCommand, CompleteSessionHandler, CompleteSessionResult};
pub use create_session::{CreateSessionCommand, CreateSessionHandler, CreateSessionResult};
pub use give_consent::{GiveConsentCommand, GiveConsentHandler};
pub use resume_session::{ResumeOutcome, ResumeSessionHandler, ResumeSessionQuery, ResumeState};
pub use save_progress::{SaveProgressCommand, SaveProgressHandler};
pub use save_snapshot::{SaveSnapshotCommand, SaveSnapshotHandler, SaveSnapshotResult};

use serde_json::{Map, Value};

use crate::application::SessionIndex;
use crate::domain::foundation::SessionId;
use crate::domain::session::{EventCategory, SessionError, SessionPatch, UpdateKind};
use crate::ports::EventLog;

/// Rejects ids the index has never seen; nothing is written for them.
async fn require_known(index: &SessionIndex, session_id: &SessionId) -> Result<(), SessionError> {
    if index.contains(session_id.as_str()).await {
        Ok(())
    } else {
        Err(SessionError::NotFound(session_id.clone()))
    }
}

/// Appends an update record and returns the patched fields for the cache.
async fn append_update(
    log: &dyn EventLog,
    session_id: &SessionId,
    patch: SessionPatch,
    kind: UpdateKind,
) -> Result<Map<String, Value>, SessionError> {
    let values = patch.fields().clone();
    log.append(
        EventCategory::SessionUpdates,
        patch.into_update_record(session_id, kind),
    )
    .await?;
    Ok(values)
}
