//! Request and response bodies for the participant-facing session endpoints.
//!
//! Field names follow what the study front end sends (`currentPageIndex`,
//! `formData`, ...). Identifier fields are read leniently so a numeric id or
//! an empty string does not turn into a deserialization failure.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::application::handlers::session::{CreateSessionResult, ResumeState};
use crate::domain::foundation::lenient;

// ════════════════════════════════════════════════════════════════════════════
// Requests
// ════════════════════════════════════════════════════════════════════════════

/// Body of `POST /api/session/create`.
///
/// Anything not named here is treated as device/browser metadata.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(
        default,
        alias = "PROLIFIC_PID",
        alias = "pid",
        deserialize_with = "lenient::opt_string"
    )]
    pub prolific_pid: Option<String>,

    #[serde(default, alias = "STUDY_ID", deserialize_with = "lenient::opt_string")]
    pub study_id: Option<String>,

    #[serde(default, alias = "condition_code", deserialize_with = "lenient::opt_string")]
    pub condition: Option<String>,

    #[serde(
        default,
        alias = "deviceInfo",
        deserialize_with = "lenient::object_or_empty"
    )]
    pub device_info: Map<String, Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CreateSessionRequest {
    /// Explicit `device_info` entries win over loose top-level metadata.
    pub fn device_metadata(self) -> Map<String, Value> {
        let mut metadata = self.extra;
        metadata.extend(self.device_info);
        metadata
    }
}

/// Body of `POST /api/session/consent`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConsentRequest {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub session_id: Option<String>,
}

/// Body of `POST /api/session/progress`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SaveProgressRequest {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub session_id: Option<String>,

    #[serde(rename = "currentPageIndex", default, deserialize_with = "lenient::opt_u64")]
    pub current_page_index: Option<u64>,

    #[serde(rename = "currentPageId", default, deserialize_with = "lenient::opt_string")]
    pub current_page_id: Option<String>,

    #[serde(rename = "formData", default)]
    pub form_data: Value,
}

/// Body of `POST /api/session/snapshot` and `POST /api/session/complete`.
///
/// Everything besides the id is the behavioural summary.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionSummaryRequest {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub session_id: Option<String>,

    #[serde(flatten)]
    pub summary: Map<String, Value>,
}

/// Query of `GET /api/session/resume`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResumeParams {
    pub pid: Option<String>,
    pub sid: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════
// Responses
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateSessionResponse {
    pub session_id: String,
    pub condition: String,
    pub resumed: bool,
}

impl From<CreateSessionResult> for CreateSessionResponse {
    fn from(result: CreateSessionResult) -> Self {
        Self {
            session_id: result.session_id.to_string(),
            condition: result.condition,
            resumed: result.resumed,
        }
    }
}

/// Plain acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AckResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
}

impl AckResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            completed_at: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SnapshotResponse {
    pub success: bool,
    /// False when the session was already complete and the cache kept the
    /// final summary.
    pub applied: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResumeResponse {
    pub found: bool,
    #[serde(flatten)]
    pub state: Option<ResumeBody>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResumeBody {
    pub session_id: String,
    pub condition: Option<String>,
    #[serde(rename = "currentPageIndex")]
    pub current_page_index: u64,
    #[serde(rename = "currentPageId")]
    pub current_page_id: Option<String>,
    #[serde(rename = "formData")]
    pub form_data: Map<String, Value>,
    pub consent_given: bool,
    pub is_complete: bool,
}

impl ResumeResponse {
    pub fn not_found() -> Self {
        Self {
            found: false,
            state: None,
        }
    }

    pub fn found(state: ResumeState) -> Self {
        Self {
            found: true,
            state: Some(ResumeBody {
                session_id: state.session_id,
                condition: state.condition,
                current_page_index: state.current_page_index,
                current_page_id: state.current_page_id,
                form_data: state.form_data,
                consent_given: state.consent_given,
                is_complete: state.is_complete,
            }),
        }
    }
}
