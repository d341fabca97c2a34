//! Request and response bodies for the tracked-event batch endpoint.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::application::handlers::events::RecordEventBatchResult;
use crate::domain::foundation::lenient;
use crate::domain::session::EventCategory;

/// Body of `POST /api/events/batch`.
///
/// `events` is kept as raw JSON so a non-array payload can be rejected with
/// a readable message instead of a generic deserialization error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventBatchRequest {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub session_id: Option<String>,

    #[serde(default)]
    pub events: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventBatchResponse {
    pub success: bool,
    pub stored: usize,
    pub skipped: usize,
    pub by_category: BTreeMap<EventCategory, usize>,
}

impl From<RecordEventBatchResult> for EventBatchResponse {
    fn from(result: RecordEventBatchResult) -> Self {
        Self {
            success: true,
            stored: result.stored,
            skipped: result.skipped,
            by_category: result.by_category,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn response_keys_categories_by_file_name() {
        let mut by_category = BTreeMap::new();
        by_category.insert(EventCategory::PageEvents, 2);
        let response = EventBatchResponse::from(RecordEventBatchResult {
            stored: 2,
            skipped: 0,
            by_category,
        });

        let body = serde_json::to_value(response).unwrap();
        assert_eq!(body["by_category"], json!({"page_events": 2}));
    }
}
