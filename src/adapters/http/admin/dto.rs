//! Request and response bodies for operator maintenance.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::application::handlers::admin::RemoveParticipantResult;
use crate::domain::foundation::lenient;
use crate::domain::session::EventCategory;

/// Body of `POST /api/admin/delete-all-data`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeleteAllDataRequest {
    #[serde(default, alias = "confirmation")]
    pub confirm: Option<String>,
}

/// Body of `POST /api/admin/remove-participant`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemoveParticipantRequest {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub session_id: Option<String>,

    #[serde(
        default,
        alias = "PROLIFIC_PID",
        alias = "pid",
        deserialize_with = "lenient::opt_string"
    )]
    pub prolific_pid: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeleteAllDataResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemoveParticipantResponse {
    pub success: bool,
    pub session_ids: Vec<String>,
    pub removed_records: BTreeMap<EventCategory, usize>,
}

impl From<RemoveParticipantResult> for RemoveParticipantResponse {
    fn from(result: RemoveParticipantResult) -> Self {
        Self {
            success: true,
            session_ids: result.session_ids,
            removed_records: result.removed_records,
        }
    }
}
