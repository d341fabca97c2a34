//! StudyStats - the aggregate behind the stats endpoint and the dashboard.
//!
//! Timing, document, and quality figures are computed over exploitable
//! sessions only (`complete` + `submitted`). Including sessions that stopped
//! early would pull timing averages down.

use serde::Serialize;

use crate::domain::session::CompletionStatus;

use super::documents::{document_stats, DocumentStats};
use super::drop_off::{drop_off, DropOff};
use super::pages::{page_stats, PageStats};
use super::quality::{quality_summary, QualitySummary};
use super::session_analysis::{AnalysisSettings, AnalyzedSession};
use super::statistics::{histogram, HistogramBin, Summary};
use super::time_estimation::{time_estimation, TimeEstimation};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub complete: usize,
    pub submitted: usize,
    pub ineligible: usize,
    pub dropped: usize,
    pub incomplete: usize,
}

impl StatusCounts {
    pub fn record(&mut self, status: CompletionStatus) {
        match status {
            CompletionStatus::Complete => self.complete += 1,
            CompletionStatus::Submitted => self.submitted += 1,
            CompletionStatus::Ineligible => self.ineligible += 1,
            CompletionStatus::Dropped => self.dropped += 1,
            CompletionStatus::Incomplete => self.incomplete += 1,
        }
    }

    pub fn exploitable(&self) -> usize {
        self.complete + self.submitted
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionSummary {
    pub condition: String,
    pub sessions: usize,
    pub forced: usize,
    pub exploitable: usize,
    pub statuses: StatusCounts,
    pub application_duration_ms: Summary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyStats {
    pub total_sessions: usize,
    pub exploitable_sessions: usize,
    pub statuses: StatusCounts,
    pub application_duration_ms: Summary,
    pub duration_histogram: Vec<HistogramBin>,
    pub histogram_bin_secs: u64,
    /// Live validation errors per session.
    pub validation_errors: Summary,
    pub document_time_ms: Summary,
    pub document_opens: Summary,
    pub pages: Vec<PageStats>,
    pub documents: Vec<DocumentStats>,
    pub drop_off: DropOff,
    pub quality: QualitySummary,
    pub time_estimation: TimeEstimation,
    pub conditions: Vec<ConditionSummary>,
}

impl StudyStats {
    pub fn compute(sessions: &[AnalyzedSession], settings: &AnalysisSettings) -> Self {
        let mut statuses = StatusCounts::default();
        for session in sessions {
            statuses.record(session.status);
        }

        let exploitable: Vec<&AnalyzedSession> = sessions
            .iter()
            .filter(|s| s.status.is_exploitable())
            .collect();

        let durations: Vec<f64> = exploitable
            .iter()
            .filter_map(|s| s.application_duration_ms())
            .map(|ms| ms as f64)
            .collect();
        let duration_secs: Vec<f64> = durations.iter().map(|ms| ms / 1000.0).collect();

        let metric = |f: fn(&AnalyzedSession) -> f64| -> Summary {
            let values: Vec<f64> = exploitable.iter().map(|s| f(s)).collect();
            Summary::of(&values)
        };

        Self {
            total_sessions: sessions.len(),
            exploitable_sessions: exploitable.len(),
            statuses,
            application_duration_ms: Summary::of(&durations),
            duration_histogram: histogram(
                &duration_secs,
                settings.histogram_bin_secs,
                settings.histogram_max_bins,
            ),
            histogram_bin_secs: settings.histogram_bin_secs,
            validation_errors: metric(|s| s.record.total_errors as f64),
            document_time_ms: metric(|s| s.doc_time_ms() as f64),
            document_opens: metric(|s| {
                if s.record.total_doc_opens > 0 {
                    s.record.total_doc_opens as f64
                } else {
                    s.record.doc_interactions.len() as f64
                }
            }),
            pages: page_stats(&exploitable, &settings.rules.page_order),
            documents: document_stats(&exploitable),
            drop_off: drop_off(sessions),
            quality: quality_summary(&exploitable, &settings.answer_key),
            time_estimation: time_estimation(&exploitable, settings),
            conditions: condition_summaries(sessions, settings),
        }
    }
}

/// Configured conditions first, then any other code seen in the data.
fn condition_summaries(
    sessions: &[AnalyzedSession],
    settings: &AnalysisSettings,
) -> Vec<ConditionSummary> {
    let mut codes: Vec<String> = settings.conditions.clone();
    for session in sessions {
        let code = session.condition(settings);
        if !codes.iter().any(|c| c == code) {
            codes.push(code.to_string());
        }
    }

    codes
        .into_iter()
        .map(|condition| {
            let members: Vec<&AnalyzedSession> = sessions
                .iter()
                .filter(|s| s.condition(settings) == condition)
                .collect();
            let mut statuses = StatusCounts::default();
            for member in &members {
                statuses.record(member.status);
            }
            let durations: Vec<f64> = members
                .iter()
                .filter(|s| s.status.is_exploitable())
                .filter_map(|s| s.application_duration_ms())
                .map(|ms| ms as f64)
                .collect();
            ConditionSummary {
                sessions: members.len(),
                forced: members.iter().filter(|s| s.record.condition_forced).count(),
                exploitable: statuses.exploitable(),
                statuses,
                application_duration_ms: Summary::of(&durations),
                condition,
            }
        })
        .collect()
}

/// One dashboard roster line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub session_id: String,
    pub prolific_pid: Option<String>,
    pub condition: String,
    pub condition_forced: bool,
    pub status: CompletionStatus,
    pub last_page: String,
    pub started_at: Option<String>,
    pub completed_at: Option<String>,
    pub application_duration_ms: Option<u64>,
    pub quality_errors: usize,
}

pub fn roster(sessions: &[AnalyzedSession], settings: &AnalysisSettings) -> Vec<RosterEntry> {
    sessions
        .iter()
        .map(|s| RosterEntry {
            session_id: s.record.session_id.clone(),
            prolific_pid: s.record.prolific_pid.clone(),
            condition: s.condition(settings).to_string(),
            condition_forced: s.record.condition_forced,
            status: s.status,
            last_page: s.last_page.clone(),
            started_at: s.record.started_at.clone(),
            completed_at: s.record.completed_at.clone(),
            application_duration_ms: s.application_duration_ms(),
            quality_errors: s.quality.total_errors,
        })
        .collect()
}

#[cfg(test)]
#[path = "study_stats_test.rs"]
mod study_stats_test;
