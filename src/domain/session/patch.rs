//! Write-side records: the creation fact and partial-update patches.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;

use crate::domain::foundation::{SessionId, Timestamp};

use super::record::fields;
use super::upcaster::CURRENT_SCHEMA_VERSION;

/// Which command produced an update record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateKind {
    Consent,
    Progress,
    Snapshot,
    Complete,
}

impl UpdateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateKind::Consent => "consent",
            UpdateKind::Progress => "progress",
            UpdateKind::Snapshot => "snapshot",
            UpdateKind::Complete => "complete",
        }
    }
}

impl fmt::Display for UpdateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The one-time creation fact for a session.
#[derive(Debug, Clone)]
pub struct SessionCreation {
    pub session_id: SessionId,
    pub prolific_pid: Option<String>,
    pub study_id: Option<String>,
    pub condition_code: String,
    pub condition_forced: bool,
    pub device_info: Map<String, Value>,
    pub started_at: Timestamp,
}

impl SessionCreation {
    /// Renders the creation record with every lifecycle flag cleared.
    pub fn into_record(self) -> Map<String, Value> {
        let mut record = Map::new();
        let mut put = |key: &str, value: Value| {
            record.insert(key.to_string(), value);
        };
        put(fields::SESSION_ID, Value::String(self.session_id.to_string()));
        put(fields::PROLIFIC_PID, json!(self.prolific_pid));
        put(fields::STUDY_ID, json!(self.study_id));
        put(fields::CONDITION_CODE, Value::String(self.condition_code));
        put(fields::CONDITION_FORCED, Value::Bool(self.condition_forced));
        put(fields::CONSENT_GIVEN, Value::Bool(false));
        put(fields::IS_COMPLETE, Value::Bool(false));
        put(fields::STARTED_AT, Value::String(self.started_at.to_rfc3339()));
        put(fields::COMPLETED_AT, Value::Null);
        put(fields::CURRENT_PAGE_INDEX, json!(0));
        put(fields::CURRENT_PAGE_ID, Value::Null);
        put(fields::FORM_DATA, Value::Object(Map::new()));
        put(fields::DEVICE_INFO, Value::Object(self.device_info));
        put(fields::SCHEMA, json!(CURRENT_SCHEMA_VERSION));
        record
    }
}

/// A partial update keyed by session id.
///
/// Identity keys and `_`-prefixed metadata are stripped on construction, so a
/// patch can never rewrite who a session belongs to or which condition it got.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionPatch {
    fields: Map<String, Value>,
}

impl SessionPatch {
    pub fn consent() -> Self {
        let mut values = Map::new();
        values.insert(fields::CONSENT_GIVEN.to_string(), Value::Bool(true));
        Self { fields: values }
    }

    pub fn progress(page_index: u64, page_id: Option<String>, form_data: Value) -> Self {
        let mut values = Map::new();
        values.insert(fields::CURRENT_PAGE_INDEX.to_string(), json!(page_index));
        values.insert(
            fields::CURRENT_PAGE_ID.to_string(),
            page_id.map(Value::String).unwrap_or(Value::Null),
        );
        let form_data = match form_data {
            Value::Object(_) => form_data,
            _ => Value::Object(Map::new()),
        };
        values.insert(fields::FORM_DATA.to_string(), form_data);
        Self { fields: values }
    }

    /// Behavioral aggregates so far. A snapshot can never mark completion.
    pub fn snapshot(summary: Map<String, Value>) -> Self {
        let mut patch = Self::sanitized(summary);
        patch.fields.remove(fields::IS_COMPLETE);
        patch.fields.remove(fields::COMPLETED_AT);
        patch
    }

    /// Final behavioral summary plus the completion flags.
    pub fn completion(summary: Map<String, Value>, completed_at: Timestamp) -> Self {
        let mut patch = Self::sanitized(summary);
        patch
            .fields
            .insert(fields::IS_COMPLETE.to_string(), Value::Bool(true));
        patch.fields.insert(
            fields::COMPLETED_AT.to_string(),
            Value::String(completed_at.to_rfc3339()),
        );
        patch
    }

    fn sanitized(mut summary: Map<String, Value>) -> Self {
        summary.retain(|key, _| !fields::IDENTITY.contains(&key.as_str()) && !key.starts_with('_'));
        Self { fields: summary }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Renders the update record as appended to the log.
    pub fn into_update_record(self, session_id: &SessionId, kind: UpdateKind) -> Map<String, Value> {
        let mut record = Map::new();
        record.insert(
            fields::SESSION_ID.to_string(),
            Value::String(session_id.to_string()),
        );
        record.insert(
            fields::UPDATE_KIND.to_string(),
            Value::String(kind.as_str().to_string()),
        );
        record.insert(
            fields::SCHEMA.to_string(),
            Value::from(CURRENT_SCHEMA_VERSION),
        );
        record.extend(self.fields);
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(m) => m,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn creation_record_starts_with_cleared_flags() {
        let record = SessionCreation {
            session_id: SessionId::new("s1").unwrap(),
            prolific_pid: Some("pid-1".to_string()),
            study_id: None,
            condition_code: "A".to_string(),
            condition_forced: false,
            device_info: map(json!({"screenWidth": 1280})),
            started_at: Timestamp::parse("2024-03-01T09:00:00Z").unwrap(),
        }
        .into_record();

        assert_eq!(record["session_id"], "s1");
        assert_eq!(record["prolific_pid"], "pid-1");
        assert_eq!(record["consent_given"], false);
        assert_eq!(record["is_complete"], false);
        assert!(record["completed_at"].is_null());
        assert_eq!(record["started_at"], "2024-03-01T09:00:00.000Z");
        assert_eq!(record["device_info"]["screenWidth"], 1280);
        assert_eq!(record["_schema"], CURRENT_SCHEMA_VERSION);
    }

    #[test]
    fn snapshot_strips_identity_and_completion() {
        let patch = SessionPatch::snapshot(map(json!({
            "session_id": "other",
            "condition_code": "B",
            "is_complete": true,
            "_written_at": "x",
            "totalErrors": 3
        })));

        assert_eq!(patch.fields().len(), 1);
        assert_eq!(patch.fields()["totalErrors"], 3);
    }

    #[test]
    fn completion_sets_flags() {
        let ts = Timestamp::parse("2024-03-01T10:00:00Z").unwrap();
        let patch = SessionPatch::completion(map(json!({"totalErrors": 1})), ts);
        assert_eq!(patch.fields()["is_complete"], true);
        assert_eq!(patch.fields()["completed_at"], "2024-03-01T10:00:00.000Z");
    }

    #[test]
    fn progress_replaces_non_object_form_data() {
        let patch = SessionPatch::progress(3, None, json!("junk"));
        assert_eq!(patch.fields()["currentPageIndex"], 3);
        assert!(patch.fields()["currentPageId"].is_null());
        assert_eq!(patch.fields()["formData"], json!({}));
    }

    #[test]
    fn update_record_carries_id_and_kind() {
        let id = SessionId::new("s1").unwrap();
        let record = SessionPatch::consent().into_update_record(&id, UpdateKind::Consent);
        assert_eq!(record["session_id"], "s1");
        assert_eq!(record["_update"], "consent");
        assert_eq!(record["consent_given"], true);
        assert_eq!(record["_schema"], CURRENT_SCHEMA_VERSION);
    }
}
