//! SaveSnapshotHandler - interim behavioral aggregates.
//!
//! Participants who submit the application but leave during the post-task
//! survey never send a completion. The snapshot taken at submission keeps
//! their procedure data usable.

use serde_json::{Map, Value};
use std::sync::Arc;

use crate::application::SessionIndex;
use crate::domain::foundation::SessionId;
use crate::domain::session::{SessionError, SessionPatch, UpdateKind};
use crate::ports::EventLog;

use super::{append_update, require_known};

#[derive(Debug, Clone)]
pub struct SaveSnapshotCommand {
    pub session_id: SessionId,
    pub summary: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveSnapshotResult {
    /// False when the cached session was already complete; the record is
    /// still appended to the log.
    pub applied: bool,
}

pub struct SaveSnapshotHandler {
    log: Arc<dyn EventLog>,
    index: Arc<SessionIndex>,
}

impl SaveSnapshotHandler {
    pub fn new(log: Arc<dyn EventLog>, index: Arc<SessionIndex>) -> Self {
        Self { log, index }
    }

    pub async fn handle(&self, cmd: SaveSnapshotCommand) -> Result<SaveSnapshotResult, SessionError> {
        let _writer = self.index.write_access().await;
        require_known(&self.index, &cmd.session_id).await?;

        let patch = SessionPatch::snapshot(cmd.summary);
        let values = append_update(self.log.as_ref(), &cmd.session_id, patch, UpdateKind::Snapshot).await?;
        let applied = self
            .index
            .upsert_unless_complete(cmd.session_id.as_str(), &values)
            .await;

        tracing::debug!(session_id = %cmd.session_id, applied, "Snapshot saved");
        Ok(SaveSnapshotResult { applied })
    }
}
