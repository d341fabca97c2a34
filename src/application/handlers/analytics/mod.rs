//! Read-side handlers: stats, dashboard, and exports.
//!
//! All of them recompute the merged view from the event log; the session
//! index is never consulted here.

mod errors;
mod export_data;
mod get_dashboard;
mod get_study_stats;
mod merged_sessions;

pub use errors::AnalyticsError;
pub use export_data::ExportDataHandler;
pub use get_dashboard::{DashboardView, GetDashboardHandler};
pub use get_study_stats::GetStudyStatsHandler;
pub use merged_sessions::MergedSessionsReader;

#[cfg(test)]
pub(crate) mod test_support {
    use serde_json::{json, Map, Value};
    use std::sync::Arc;

    use crate::adapters::storage::InMemoryEventLog;
    use crate::domain::session::{EventCategory, UpcasterRegistry};

    use super::MergedSessionsReader;

    pub fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(m) => m,
            _ => panic!("expected object"),
        }
    }

    /// One complete session, one legacy partial session, and an orphan update.
    pub async fn study_log() -> Arc<InMemoryEventLog> {
        let log = Arc::new(InMemoryEventLog::new());
        log.seed(
            EventCategory::Sessions,
            vec![
                map(json!({"session_id": "s1", "_schema": 2, "condition_code": "A", "consent_given": false})),
                map(json!({"session_id": "s2", "condition": "B", "consent": true, "status": "partial"})),
            ],
        )
        .await;
        log.seed(
            EventCategory::SessionUpdates,
            vec![
                map(json!({"session_id": "s1", "_schema": 2, "_update": "consent", "consent_given": true})),
                map(json!({
                    "session_id": "s1",
                    "_schema": 2,
                    "_update": "complete",
                    "is_complete": true,
                    "applicationDurationMs": 300000,
                    "formResponses": {"personal_info": {"last_name": "durand", "first_name": "Camille"}}
                })),
                map(json!({"session_id": "ghost", "_schema": 2, "is_complete": true})),
            ],
        )
        .await;
        log.seed(
            EventCategory::PageEvents,
            vec![map(json!({"session_id": "s1", "type": "page_enter", "pageId": "intro"}))],
        )
        .await;
        log
    }

    pub fn reader(log: Arc<InMemoryEventLog>) -> MergedSessionsReader {
        MergedSessionsReader::new(log, Arc::new(UpcasterRegistry::standard()))
    }
}
