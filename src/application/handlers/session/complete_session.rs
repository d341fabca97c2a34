//! CompleteSessionHandler - final behavioral summary.

use serde_json::{Map, Value};
use std::sync::Arc;

use crate::application::SessionIndex;
use crate::domain::foundation::{SessionId, Timestamp};
use crate::domain::session::{SessionError, SessionPatch, UpdateKind};
use crate::ports::EventLog;

use super::{append_update, require_known};

#[derive(Debug, Clone)]
pub struct CompleteSessionCommand {
    pub session_id: SessionId,
    pub summary: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompleteSessionResult {
    pub completed_at: Timestamp,
}

/// Completion always wins over any earlier snapshot in the cache.
pub struct CompleteSessionHandler {
    log: Arc<dyn EventLog>,
    index: Arc<SessionIndex>,
}

impl CompleteSessionHandler {
    pub fn new(log: Arc<dyn EventLog>, index: Arc<SessionIndex>) -> Self {
        Self { log, index }
    }

    pub async fn handle(&self, cmd: CompleteSessionCommand) -> Result<CompleteSessionResult, SessionError> {
        let _writer = self.index.write_access().await;
        require_known(&self.index, &cmd.session_id).await?;

        let completed_at = Timestamp::now();
        let patch = SessionPatch::completion(cmd.summary, completed_at);
        let values = append_update(self.log.as_ref(), &cmd.session_id, patch, UpdateKind::Complete).await?;
        self.index.upsert(cmd.session_id.as_str(), &values).await;

        tracing::info!(session_id = %cmd.session_id, "Session completed");
        Ok(CompleteSessionResult { completed_at })
    }
}
