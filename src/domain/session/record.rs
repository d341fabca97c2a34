//! Typed, read-only view of a merged session.
//!
//! The log stores sessions as loose JSON objects; [`SessionRecord`] reads one
//! permissively so the analytics code never has to special-case missing or
//! oddly-typed fields. Unknown keys are preserved in `extra` and survive a
//! serialize round trip.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::domain::foundation::lenient;

/// Record keys shared by the write path, the index, and the merge.
pub mod fields {
    pub const SESSION_ID: &str = "session_id";
    pub const PROLIFIC_PID: &str = "prolific_pid";
    pub const STUDY_ID: &str = "study_id";
    pub const CONDITION_CODE: &str = "condition_code";
    pub const CONDITION_FORCED: &str = "condition_forced";
    pub const CONSENT_GIVEN: &str = "consent_given";
    pub const IS_COMPLETE: &str = "is_complete";
    pub const STARTED_AT: &str = "started_at";
    pub const COMPLETED_AT: &str = "completed_at";
    pub const CURRENT_PAGE_INDEX: &str = "currentPageIndex";
    pub const CURRENT_PAGE_ID: &str = "currentPageId";
    pub const FORM_DATA: &str = "formData";
    pub const FORM_RESPONSES: &str = "formResponses";
    pub const DEVICE_INFO: &str = "device_info";
    pub const WRITTEN_AT: &str = "_written_at";
    pub const UPDATE_KIND: &str = "_update";
    pub const SCHEMA: &str = "_schema";

    /// Keys fixed at creation; update patches may never carry them.
    pub const IDENTITY: [&str; 6] = [
        SESSION_ID,
        PROLIFIC_PID,
        STUDY_ID,
        CONDITION_CODE,
        CONDITION_FORCED,
        STARTED_AT,
    ];
}

/// One visit to one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageTiming {
    #[serde(rename = "pageId")]
    pub page_id: String,
    #[serde(rename = "enterTime", default, deserialize_with = "lenient::opt_f64")]
    pub enter_time: Option<f64>,
    #[serde(rename = "exitTime", default, deserialize_with = "lenient::opt_f64")]
    pub exit_time: Option<f64>,
    #[serde(rename = "durationMs", default, deserialize_with = "lenient::opt_u64")]
    pub duration_ms: Option<u64>,
}

impl PageTiming {
    /// Recorded duration, or exit minus enter when the client omitted it.
    pub fn effective_duration_ms(&self) -> u64 {
        if let Some(ms) = self.duration_ms {
            return ms;
        }
        match (self.enter_time, self.exit_time) {
            (Some(enter), Some(exit)) if exit >= enter => (exit - enter).round() as u64,
            _ => 0,
        }
    }
}

/// One open/close cycle of a supporting document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocInteraction {
    #[serde(rename = "docId")]
    pub doc_id: String,
    #[serde(rename = "pageId", default, deserialize_with = "lenient::opt_string")]
    pub page_id: Option<String>,
    #[serde(rename = "openTime", default, deserialize_with = "lenient::opt_f64")]
    pub open_time: Option<f64>,
    #[serde(rename = "closeTime", default, deserialize_with = "lenient::opt_f64")]
    pub close_time: Option<f64>,
    #[serde(rename = "durationMs", default, deserialize_with = "lenient::u64_or_zero")]
    pub duration_ms: u64,
}

/// Per-document totals for a single session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DocTotals {
    pub opens: u64,
    pub total_ms: u64,
}

/// Merged state of one participant run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    #[serde(default)]
    pub session_id: String,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub prolific_pid: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub study_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub condition_code: Option<String>,
    #[serde(default, deserialize_with = "lenient::bool_or_false")]
    pub condition_forced: bool,
    #[serde(default, deserialize_with = "lenient::bool_or_false")]
    pub consent_given: bool,
    #[serde(default, deserialize_with = "lenient::bool_or_false")]
    pub is_complete: bool,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub started_at: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub completed_at: Option<String>,
    #[serde(rename = "currentPageIndex", default, deserialize_with = "lenient::opt_u64")]
    pub current_page_index: Option<u64>,
    #[serde(rename = "currentPageId", default, deserialize_with = "lenient::opt_string")]
    pub current_page_id: Option<String>,
    #[serde(rename = "formData", default, deserialize_with = "lenient::object_or_empty")]
    pub form_data: Map<String, Value>,
    #[serde(rename = "formResponses", default, deserialize_with = "lenient::object_or_empty")]
    pub form_responses: Map<String, Value>,
    #[serde(rename = "pageTimings", default, deserialize_with = "lenient::vec_skip_invalid")]
    pub page_timings: Vec<PageTiming>,
    #[serde(rename = "docInteractions", default, deserialize_with = "lenient::vec_skip_invalid")]
    pub doc_interactions: Vec<DocInteraction>,
    #[serde(rename = "errorCountsByPage", default, deserialize_with = "lenient::count_map")]
    pub error_counts_by_page: BTreeMap<String, u64>,
    #[serde(rename = "errorCountsByField", default, deserialize_with = "lenient::count_map")]
    pub error_counts_by_field: BTreeMap<String, u64>,
    #[serde(rename = "totalErrors", default, deserialize_with = "lenient::u64_or_zero")]
    pub total_errors: u64,
    #[serde(rename = "totalDocTimeMs", default, deserialize_with = "lenient::u64_or_zero")]
    pub total_doc_time_ms: u64,
    #[serde(rename = "totalDocOpens", default, deserialize_with = "lenient::u64_or_zero")]
    pub total_doc_opens: u64,
    #[serde(rename = "totalDurationMs", default, deserialize_with = "lenient::opt_u64")]
    pub total_duration_ms: Option<u64>,
    #[serde(rename = "applicationDurationMs", default, deserialize_with = "lenient::opt_u64")]
    pub application_duration_ms: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SessionRecord {
    /// Reads a merged JSON object. Never fails: a record that cannot be
    /// interpreted at all keeps only its id.
    pub fn from_fields(fields: Map<String, Value>) -> Self {
        let session_id = fields
            .get(fields::SESSION_ID)
            .and_then(lenient::as_string)
            .unwrap_or_default();
        serde_json::from_value(Value::Object(fields)).unwrap_or_else(|_| SessionRecord {
            session_id,
            ..Default::default()
        })
    }

    /// All answered fields across every page, `formResponses` winning over
    /// `formData`. Non-object page entries are treated as top-level fields.
    pub fn flattened_responses(&self) -> Map<String, Value> {
        let mut flat = Map::new();
        for source in [&self.form_data, &self.form_responses] {
            for (key, value) in source {
                match value {
                    Value::Object(page_fields) => {
                        for (field, answer) in page_fields {
                            flat.insert(field.clone(), answer.clone());
                        }
                    }
                    other => {
                        flat.insert(key.clone(), other.clone());
                    }
                }
            }
        }
        flat
    }

    /// Total time per page for this session, summed across revisits.
    pub fn page_durations(&self) -> BTreeMap<String, u64> {
        let mut totals = BTreeMap::new();
        for timing in &self.page_timings {
            let total = totals.entry(timing.page_id.clone()).or_insert(0u64);
            *total = total.saturating_add(timing.effective_duration_ms());
        }
        totals
    }

    /// Opens and dwell time per document for this session.
    pub fn doc_totals(&self) -> BTreeMap<String, DocTotals> {
        let mut totals: BTreeMap<String, DocTotals> = BTreeMap::new();
        for interaction in &self.doc_interactions {
            let entry = totals.entry(interaction.doc_id.clone()).or_default();
            entry.opens = entry.opens.saturating_add(1);
            entry.total_ms = entry.total_ms.saturating_add(interaction.duration_ms);
        }
        totals
    }

    /// True when a timing entry exists for the page.
    pub fn visited(&self, page_id: &str) -> bool {
        self.page_timings.iter().any(|t| t.page_id == page_id)
    }

    /// Condition code, or the supplied default for records that predate assignment.
    pub fn condition_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.condition_code.as_deref().unwrap_or(default)
    }
}
