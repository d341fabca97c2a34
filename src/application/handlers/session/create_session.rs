//! CreateSessionHandler - Command handler for starting a participant run.

use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::application::{IndexedSession, SessionIndex};
use crate::domain::condition::BlockRandomizer;
use crate::domain::foundation::{SessionId, Timestamp};
use crate::domain::session::{CompletionRules, EventCategory, SessionCreation, SessionError};
use crate::ports::EventLog;

/// Command to create a new session.
#[derive(Debug, Clone, Default)]
pub struct CreateSessionCommand {
    pub prolific_pid: Option<String>,
    pub study_id: Option<String>,
    /// Explicit condition; honoured only when it names a configured condition.
    pub requested_condition: Option<String>,
    pub device_info: Map<String, Value>,
}

/// Result of session creation.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateSessionResult {
    pub session_id: SessionId,
    pub condition: String,
    pub condition_forced: bool,
    /// True when an unfinished session of the same participant was returned.
    pub resumed: bool,
}

/// Handler for creating sessions.
///
/// Assignment, the creation append, and the index upsert run under one lock
/// so concurrent creates always see each other's conditions.
pub struct CreateSessionHandler {
    log: Arc<dyn EventLog>,
    index: Arc<SessionIndex>,
    randomizer: Mutex<BlockRandomizer>,
    rules: CompletionRules,
    abandoned_after_minutes: Option<u64>,
}

impl CreateSessionHandler {
    pub fn new(
        log: Arc<dyn EventLog>,
        index: Arc<SessionIndex>,
        randomizer: BlockRandomizer,
        rules: CompletionRules,
    ) -> Self {
        Self {
            log,
            index,
            randomizer: Mutex::new(randomizer),
            rules,
            abandoned_after_minutes: None,
        }
    }

    /// Excludes stale, unfinished sessions from the balance bookkeeping.
    pub fn with_abandoned_after(mut self, minutes: Option<u64>) -> Self {
        self.abandoned_after_minutes = minutes;
        self
    }

    pub async fn handle(&self, cmd: CreateSessionCommand) -> Result<CreateSessionResult, SessionError> {
        let mut randomizer = self.randomizer.lock().await;
        let _writer = self.index.write_access().await;

        let prolific_pid = non_blank(cmd.prolific_pid);
        if let Some(pid) = &prolific_pid {
            if let Some(existing) = self.index.latest_for_participant(pid).await {
                return self.existing_session(existing);
            }
        }

        let forced = non_blank(cmd.requested_condition).and_then(|requested| {
            randomizer
                .conditions()
                .iter()
                .find(|c| c.eq_ignore_ascii_case(&requested))
                .cloned()
        });
        let (condition, condition_forced) = match forced {
            Some(code) => (code, true),
            None => {
                let history = self.condition_history().await;
                (randomizer.assign(&history), false)
            }
        };

        let session_id = SessionId::generate();
        let record = SessionCreation {
            session_id: session_id.clone(),
            prolific_pid,
            study_id: non_blank(cmd.study_id),
            condition_code: condition.clone(),
            condition_forced,
            device_info: cmd.device_info,
            started_at: Timestamp::now(),
        }
        .into_record();

        let stored = self.log.append(EventCategory::Sessions, record).await?;
        self.index.upsert(session_id.as_str(), &stored).await;

        tracing::info!(
            session_id = %session_id,
            condition = %condition,
            forced = condition_forced,
            "Session created"
        );

        Ok(CreateSessionResult {
            session_id,
            condition,
            condition_forced,
            resumed: false,
        })
    }

    fn existing_session(&self, existing: IndexedSession) -> Result<CreateSessionResult, SessionError> {
        let session_id = SessionId::new(existing.session_id.clone())?;
        if existing.is_complete() {
            return Err(SessionError::AlreadyComplete(session_id));
        }
        let record = existing.record();
        tracing::info!(session_id = %session_id, "Returning unfinished session for known participant");
        Ok(CreateSessionResult {
            session_id,
            condition: record.condition_code.unwrap_or_default(),
            condition_forced: record.condition_forced,
            resumed: true,
        })
    }

    /// Organic assignments in creation order.
    async fn condition_history(&self) -> Vec<String> {
        let cutoff = self
            .abandoned_after_minutes
            .map(|minutes| Timestamp::now().minus_minutes(minutes as i64));

        self.index
            .all()
            .await
            .into_iter()
            .filter_map(|entry| {
                let record = entry.record();
                if record.condition_forced {
                    return None;
                }
                if let Some(cutoff) = &cutoff {
                    let stale = entry.last_written.is_before(cutoff);
                    if stale && !self.rules.status(&record).is_exploitable() {
                        return None;
                    }
                }
                record.condition_code
            })
            .collect()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
