//! RemoveParticipantHandler - erases one participant from every category.

use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::application::SessionIndex;
use crate::domain::foundation::lenient;
use crate::domain::session::{fields, EventCategory};
use crate::ports::EventLog;

use super::AdminError;

/// Keys under which clients have stored the external participant id.
const PID_KEYS: [&str; 3] = [fields::PROLIFIC_PID, "PROLIFIC_PID", "pid"];

#[derive(Debug, Clone, Default)]
pub struct RemoveParticipantCommand {
    pub session_id: Option<String>,
    pub prolific_pid: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoveParticipantResult {
    pub session_ids: Vec<String>,
    pub removed_records: BTreeMap<EventCategory, usize>,
}

pub struct RemoveParticipantHandler {
    log: Arc<dyn EventLog>,
    index: Arc<SessionIndex>,
}

impl RemoveParticipantHandler {
    pub fn new(log: Arc<dyn EventLog>, index: Arc<SessionIndex>) -> Self {
        Self { log, index }
    }

    pub async fn handle(&self, cmd: RemoveParticipantCommand) -> Result<RemoveParticipantResult, AdminError> {
        let session_id = non_blank(cmd.session_id);
        let prolific_pid = non_blank(cmd.prolific_pid);
        let label = match (&session_id, &prolific_pid) {
            (Some(sid), _) => sid.clone(),
            (None, Some(pid)) => pid.clone(),
            (None, None) => return Err(AdminError::MissingIdentifier),
        };

        let _exclusive = self.index.exclusive_access().await;
        let mut ids: BTreeSet<String> = session_id.into_iter().collect();
        if let Some(pid) = &prolific_pid {
            for entry in self.index.all().await {
                if entry.prolific_pid().as_deref() == Some(pid.as_str()) {
                    ids.insert(entry.session_id);
                }
            }
            for record in self.log.read_all(EventCategory::Sessions).await? {
                if matches_pid(&record, pid) {
                    if let Some(id) = record.get(fields::SESSION_ID).and_then(lenient::as_string) {
                        ids.insert(id.trim().to_string());
                    }
                }
            }
        }

        let keep = |_: EventCategory, record: &Map<String, Value>| {
            let by_id = record
                .get(fields::SESSION_ID)
                .and_then(lenient::as_string)
                .is_some_and(|id| ids.contains(id.trim()));
            let by_pid = prolific_pid
                .as_deref()
                .is_some_and(|pid| matches_pid(record, pid));
            !(by_id || by_pid)
        };
        let removed_records = self.log.retain_all(&keep).await?;

        let mut dropped_from_index = 0;
        for id in &ids {
            if self.index.remove(id).await.is_some() {
                dropped_from_index += 1;
            }
        }

        if removed_records.is_empty() && dropped_from_index == 0 {
            return Err(AdminError::NotFound(label));
        }

        let total: usize = removed_records.values().sum();
        tracing::info!(
            participant = %label,
            sessions = ids.len(),
            records = total,
            "Participant removed"
        );

        Ok(RemoveParticipantResult {
            session_ids: ids.into_iter().collect(),
            removed_records,
        })
    }
}

fn matches_pid(record: &Map<String, Value>, pid: &str) -> bool {
    PID_KEYS.iter().any(|key| {
        record
            .get(*key)
            .and_then(lenient::as_string)
            .is_some_and(|value| value.trim() == pid)
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
