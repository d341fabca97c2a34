//! DeleteAllDataHandler - wipes every category and the session index.

use std::sync::Arc;

use crate::application::SessionIndex;
use crate::ports::EventLog;

use super::AdminError;

#[derive(Debug, Clone)]
pub struct DeleteAllDataCommand {
    pub confirmation: String,
}

pub struct DeleteAllDataHandler {
    log: Arc<dyn EventLog>,
    index: Arc<SessionIndex>,
    phrase: String,
}

impl DeleteAllDataHandler {
    pub fn new(log: Arc<dyn EventLog>, index: Arc<SessionIndex>, phrase: impl Into<String>) -> Self {
        Self {
            log,
            index,
            phrase: phrase.into(),
        }
    }

    /// The confirmation must equal the configured phrase exactly.
    ///
    /// Session writes wait until both the log and the index are cleared.
    pub async fn handle(&self, cmd: DeleteAllDataCommand) -> Result<(), AdminError> {
        if cmd.confirmation != self.phrase {
            tracing::warn!("Delete-all rejected: confirmation phrase mismatch");
            return Err(AdminError::ConfirmationMismatch);
        }

        let _exclusive = self.index.exclusive_access().await;
        let sessions = self.index.len().await;
        self.log.delete_all().await?;
        self.index.clear().await;

        tracing::info!(sessions, "All study data deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::InMemoryEventLog;
    use crate::domain::session::EventCategory;
    use serde_json::Map;

    async fn setup() -> (Arc<InMemoryEventLog>, Arc<SessionIndex>, DeleteAllDataHandler) {
        let log = Arc::new(InMemoryEventLog::new());
        log.append(EventCategory::Sessions, Map::new()).await.unwrap();
        log.append(EventCategory::Clicks, Map::new()).await.unwrap();
        let index = Arc::new(SessionIndex::new());
        index.upsert("s1", &Map::new()).await;
        let handler = DeleteAllDataHandler::new(log.clone(), index.clone(), "DELETE ALL DATA");
        (log, index, handler)
    }

    #[tokio::test]
    async fn wrong_phrase_touches_nothing() {
        let (log, index, handler) = setup().await;

        for attempt in ["", "delete all data", "DELETE ALL DATA "] {
            let result = handler
                .handle(DeleteAllDataCommand {
                    confirmation: attempt.to_string(),
                })
                .await;
            assert!(matches!(result, Err(AdminError::ConfirmationMismatch)));
        }

        assert_eq!(log.count(EventCategory::Sessions).await, 1);
        assert_eq!(index.len().await, 1);
    }

    #[tokio::test]
    async fn exact_phrase_clears_log_and_index() {
        let (log, index, handler) = setup().await;

        handler
            .handle(DeleteAllDataCommand {
                confirmation: "DELETE ALL DATA".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(log.count(EventCategory::Sessions).await, 0);
        assert_eq!(log.count(EventCategory::Clicks).await, 0);
        assert!(index.is_empty().await);
    }

    #[tokio::test]
    async fn waits_for_in_flight_session_writes() {
        let (log, index, handler) = setup().await;
        let handler = Arc::new(handler);

        let writer = index.write_access().await;
        let wipe = {
            let handler = handler.clone();
            tokio::spawn(async move {
                handler
                    .handle(DeleteAllDataCommand {
                        confirmation: "DELETE ALL DATA".to_string(),
                    })
                    .await
            })
        };
        tokio::task::yield_now().await;
        assert_eq!(log.count(EventCategory::Sessions).await, 1);
        assert_eq!(index.len().await, 1);

        drop(writer);
        wipe.await.unwrap().unwrap();
        assert_eq!(log.count(EventCategory::Sessions).await, 0);
        assert!(index.is_empty().await);
    }
}
