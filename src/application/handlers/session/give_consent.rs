//! GiveConsentHandler - records informed consent.

use std::sync::Arc;

use crate::application::SessionIndex;
use crate::domain::foundation::SessionId;
use crate::domain::session::{SessionError, SessionPatch, UpdateKind};
use crate::ports::EventLog;

use super::{append_update, require_known};

#[derive(Debug, Clone)]
pub struct GiveConsentCommand {
    pub session_id: SessionId,
}

/// Idempotent: a repeated consent appends a duplicate fact that the merge
/// folds away.
pub struct GiveConsentHandler {
    log: Arc<dyn EventLog>,
    index: Arc<SessionIndex>,
}

impl GiveConsentHandler {
    pub fn new(log: Arc<dyn EventLog>, index: Arc<SessionIndex>) -> Self {
        Self { log, index }
    }

    pub async fn handle(&self, cmd: GiveConsentCommand) -> Result<(), SessionError> {
        let _writer = self.index.write_access().await;
        require_known(&self.index, &cmd.session_id).await?;

        let values = append_update(
            self.log.as_ref(),
            &cmd.session_id,
            SessionPatch::consent(),
            UpdateKind::Consent,
        )
        .await?;
        self.index.upsert(cmd.session_id.as_str(), &values).await;

        tracing::debug!(session_id = %cmd.session_id, "Consent recorded");
        Ok(())
    }
}
