//! SaveProgressHandler - page-transition checkpoint.
//!
//! Called on every page change, so it does one append and one cache write.

use serde_json::Value;
use std::sync::Arc;

use crate::application::SessionIndex;
use crate::domain::foundation::SessionId;
use crate::domain::session::{SessionError, SessionPatch, UpdateKind};
use crate::ports::EventLog;

use super::{append_update, require_known};

#[derive(Debug, Clone)]
pub struct SaveProgressCommand {
    pub session_id: SessionId,
    pub page_index: u64,
    pub page_id: Option<String>,
    pub form_data: Value,
}

pub struct SaveProgressHandler {
    log: Arc<dyn EventLog>,
    index: Arc<SessionIndex>,
}

impl SaveProgressHandler {
    pub fn new(log: Arc<dyn EventLog>, index: Arc<SessionIndex>) -> Self {
        Self { log, index }
    }

    pub async fn handle(&self, cmd: SaveProgressCommand) -> Result<(), SessionError> {
        let _writer = self.index.write_access().await;
        require_known(&self.index, &cmd.session_id).await?;

        let patch = SessionPatch::progress(cmd.page_index, cmd.page_id, cmd.form_data);
        let values = append_update(self.log.as_ref(), &cmd.session_id, patch, UpdateKind::Progress).await?;
        self.index.upsert(cmd.session_id.as_str(), &values).await;

        tracing::debug!(
            session_id = %cmd.session_id,
            page_index = cmd.page_index,
            "Progress saved"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::session::test_support::seeded;
    use crate::domain::session::EventCategory;
    use serde_json::json;

    fn progress(page_index: u64, form_data: Value) -> SaveProgressCommand {
        SaveProgressCommand {
            session_id: SessionId::new("s1").unwrap(),
            page_index,
            page_id: Some("personal_info".to_string()),
            form_data,
        }
    }

    #[tokio::test]
    async fn progress_replaces_cached_position_and_form_data() {
        let (log, index) = seeded().await;
        let handler = SaveProgressHandler::new(log.clone(), index.clone());

        handler.handle(progress(2, json!({"a": "x", "b": "y"}))).await.unwrap();
        handler.handle(progress(3, json!({"a": "z"}))).await.unwrap();

        let cached = index.get("s1").await.unwrap();
        assert_eq!(cached.fields["currentPageIndex"], 3);
        assert_eq!(cached.fields["currentPageId"], "personal_info");
        assert_eq!(cached.fields["formData"], json!({"a": "z"}));
        assert_eq!(cached.fields["condition_code"], "A");

        let stored = log.read_all(EventCategory::SessionUpdates).await.unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[1]["_update"], "progress");
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let (log, index) = seeded().await;
        let handler = SaveProgressHandler::new(log, index);

        let mut cmd = progress(1, json!({}));
        cmd.session_id = SessionId::new("ghost").unwrap();

        assert!(matches!(
            handler.handle(cmd).await,
            Err(SessionError::NotFound(_))
        ));
    }
}
