//! ResumeSessionHandler - page-refresh recovery and duplicate-participation
//! check.

use serde_json::{Map, Value};
use std::sync::Arc;

use crate::application::{IndexedSession, SessionIndex};

#[derive(Debug, Clone, Default)]
pub struct ResumeSessionQuery {
    pub prolific_pid: Option<String>,
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResumeState {
    pub session_id: String,
    pub condition: Option<String>,
    pub current_page_index: u64,
    pub current_page_id: Option<String>,
    pub form_data: Map<String, Value>,
    pub consent_given: bool,
    pub is_complete: bool,
}

impl From<&IndexedSession> for ResumeState {
    fn from(entry: &IndexedSession) -> Self {
        let record = entry.record();
        Self {
            session_id: entry.session_id.clone(),
            condition: record.condition_code,
            current_page_index: record.current_page_index.unwrap_or(0),
            current_page_id: record.current_page_id,
            form_data: record.form_data,
            consent_given: record.consent_given,
            is_complete: record.is_complete,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResumeOutcome {
    NotFound,
    AlreadyComplete(ResumeState),
    Resumable(ResumeState),
}

pub struct ResumeSessionHandler {
    index: Arc<SessionIndex>,
}

impl ResumeSessionHandler {
    pub fn new(index: Arc<SessionIndex>) -> Self {
        Self { index }
    }

    /// The participant id wins; the session id is only a fallback.
    pub async fn handle(&self, query: ResumeSessionQuery) -> ResumeOutcome {
        let by_pid = match non_blank(query.prolific_pid.as_deref()) {
            Some(pid) => self.index.latest_for_participant(pid).await,
            None => None,
        };
        let entry = match by_pid {
            Some(entry) => Some(entry),
            None => match non_blank(query.session_id.as_deref()) {
                Some(sid) => self.index.get(sid).await,
                None => None,
            },
        };

        match entry {
            None => ResumeOutcome::NotFound,
            Some(entry) => {
                let state = ResumeState::from(&entry);
                if state.is_complete {
                    ResumeOutcome::AlreadyComplete(state)
                } else {
                    ResumeOutcome::Resumable(state)
                }
            }
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
