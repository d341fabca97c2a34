//! Per-session derived values shared by the stats engine and the exports.

use serde_json::{Map, Value};

use crate::domain::foundation::lenient;
use crate::domain::scoring::{permit_answer_key, AnswerKey, QualityReport};
use crate::domain::session::{CompletionRules, CompletionStatus, SessionRecord};

/// Everything the analytics need to know about the study layout.
#[derive(Debug, Clone)]
pub struct AnalysisSettings {
    pub rules: CompletionRules,
    pub answer_key: AnswerKey,
    pub conditions: Vec<String>,
    pub default_condition: String,
    /// Condition whose participants estimated their own duration.
    pub self_estimation_condition: Option<String>,
    /// Response field holding the time estimate, in minutes.
    pub time_estimate_field: String,
    pub histogram_bin_secs: u64,
    pub histogram_max_bins: usize,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            rules: CompletionRules::default(),
            answer_key: permit_answer_key(),
            conditions: vec!["A".to_string(), "B".to_string()],
            default_condition: "A".to_string(),
            self_estimation_condition: Some("B".to_string()),
            time_estimate_field: "time_estimate_minutes".to_string(),
            histogram_bin_secs: 60,
            histogram_max_bins: 120,
        }
    }
}

/// A merged session with its status, last page, and quality score.
#[derive(Debug, Clone)]
pub struct AnalyzedSession {
    pub record: SessionRecord,
    pub status: CompletionStatus,
    pub last_page: String,
    pub responses: Map<String, Value>,
    pub quality: QualityReport,
}

impl AnalyzedSession {
    pub fn analyze(record: SessionRecord, settings: &AnalysisSettings) -> Self {
        let status = settings.rules.status(&record);
        let last_page = settings.rules.last_page(&record);
        let responses = record.flattened_responses();
        let quality = settings.answer_key.score(&responses);
        Self {
            record,
            status,
            last_page,
            responses,
            quality,
        }
    }

    pub fn analyze_all(
        records: impl IntoIterator<Item = SessionRecord>,
        settings: &AnalysisSettings,
    ) -> Vec<Self> {
        records
            .into_iter()
            .map(|record| Self::analyze(record, settings))
            .collect()
    }

    pub fn condition<'a>(&'a self, settings: &'a AnalysisSettings) -> &'a str {
        self.record.condition_or(&settings.default_condition)
    }

    /// Time spent on the application itself, falling back to the whole run.
    pub fn application_duration_ms(&self) -> Option<u64> {
        self.record
            .application_duration_ms
            .or(self.record.total_duration_ms)
    }

    /// Total document dwell time; derived from the interactions when the
    /// client did not report a total.
    pub fn doc_time_ms(&self) -> u64 {
        if self.record.total_doc_time_ms > 0 {
            return self.record.total_doc_time_ms;
        }
        self.record
            .doc_interactions
            .iter()
            .fold(0u64, |acc, d| acc.saturating_add(d.duration_ms))
    }

    /// Self-reported duration, converted from minutes to milliseconds.
    pub fn time_estimate_ms(&self, field: &str) -> Option<f64> {
        self.responses
            .get(field)
            .filter(|v| !lenient::is_blank(v))
            .and_then(lenient::as_f64)
            .filter(|minutes| *minutes >= 0.0)
            .map(|minutes| minutes * 60_000.0)
    }
}
