//! RecordEventBatchHandler - routes a client batch of tracked events to
//! their categories.

use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::foundation::SessionId;
use crate::domain::session::{fields, EventCategory};
use crate::ports::{EventLog, EventLogError};

#[derive(Debug, Clone)]
pub struct RecordEventBatchCommand {
    pub session_id: SessionId,
    pub events: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordEventBatchResult {
    pub stored: usize,
    /// Entries that were not JSON objects.
    pub skipped: usize,
    pub by_category: BTreeMap<EventCategory, usize>,
}

pub struct RecordEventBatchHandler {
    log: Arc<dyn EventLog>,
}

impl RecordEventBatchHandler {
    pub fn new(log: Arc<dyn EventLog>) -> Self {
        Self { log }
    }

    /// Each event is stamped with the batch's session id, overriding any id
    /// the client put on the event itself.
    pub async fn handle(&self, cmd: RecordEventBatchCommand) -> Result<RecordEventBatchResult, EventLogError> {
        let mut result = RecordEventBatchResult::default();

        for event in cmd.events {
            let Value::Object(mut record) = event else {
                result.skipped += 1;
                continue;
            };
            let category = EventCategory::for_event_type(
                record.get("type").and_then(Value::as_str).unwrap_or_default(),
            );
            record.insert(
                fields::SESSION_ID.to_string(),
                Value::String(cmd.session_id.to_string()),
            );
            self.log.append(category, record).await?;
            result.stored += 1;
            *result.by_category.entry(category).or_insert(0) += 1;
        }

        tracing::debug!(
            session_id = %cmd.session_id,
            stored = result.stored,
            skipped = result.skipped,
            "Event batch recorded"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::InMemoryEventLog;
    use serde_json::json;

    #[tokio::test]
    async fn events_route_by_type_with_fallback() {
        let log = Arc::new(InMemoryEventLog::new());
        let handler = RecordEventBatchHandler::new(log.clone());

        let result = handler
            .handle(RecordEventBatchCommand {
                session_id: SessionId::new("s1").unwrap(),
                events: vec![
                    json!({"type": "page_enter", "pageId": "intro"}),
                    json!({"type": "doc_open", "docId": "id_card", "session_id": "spoofed"}),
                    json!({"type": "hover"}),
                    json!({"no_type": true}),
                    json!("not an object"),
                ],
            })
            .await
            .unwrap();

        assert_eq!(result.stored, 4);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.by_category[&EventCategory::OtherEvents], 2);

        let docs = log.read_all(EventCategory::DocumentEvents).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0]["session_id"], "s1");
        assert_eq!(log.count(EventCategory::PageEvents).await, 1);
    }

    #[tokio::test]
    async fn empty_batch_is_a_no_op() {
        let log = Arc::new(InMemoryEventLog::new());
        let handler = RecordEventBatchHandler::new(log);

        let result = handler
            .handle(RecordEventBatchCommand {
                session_id: SessionId::new("s1").unwrap(),
                events: Vec::new(),
            })
            .await
            .unwrap();

        assert_eq!(result, RecordEventBatchResult::default());
    }
}
