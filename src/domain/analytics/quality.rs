//! Rejection rate and over-documentation across exploitable sessions.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::scoring::AnswerKey;

use super::session_analysis::AnalyzedSession;
use super::statistics::{rate, Summary};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldErrorRate {
    pub field: String,
    pub sessions_with_error: usize,
    pub rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverDocumentationSummary {
    pub sessions: usize,
    pub rate: f64,
    pub extra_count: Summary,
    /// How many sessions selected each unrequired item.
    pub extra_items: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QualitySummary {
    pub scored_sessions: usize,
    pub rejected_sessions: usize,
    pub rejection_rate: f64,
    pub errors: Summary,
    /// One entry per answer-key field, in key order.
    pub by_field: Vec<FieldErrorRate>,
    pub over_documentation: OverDocumentationSummary,
}

pub fn quality_summary(sessions: &[&AnalyzedSession], key: &AnswerKey) -> QualitySummary {
    let scored = sessions.len();
    let rejected = sessions.iter().filter(|s| s.quality.would_reject).count();
    let error_counts: Vec<f64> = sessions
        .iter()
        .map(|s| s.quality.total_errors as f64)
        .collect();

    let by_field = key
        .rules()
        .map(|(field, _)| {
            let erred = sessions
                .iter()
                .filter(|s| s.quality.errors.iter().any(|e| &e.field == field))
                .count();
            FieldErrorRate {
                field: field.clone(),
                sessions_with_error: erred,
                rate: rate(erred, scored),
            }
        })
        .collect();

    let over_documenting: Vec<&&AnalyzedSession> = sessions
        .iter()
        .filter(|s| !s.quality.over_documentation.is_empty())
        .collect();
    let mut extra_items: BTreeMap<String, usize> = BTreeMap::new();
    for session in &over_documenting {
        for item in &session.quality.over_documentation.extra_docs {
            *extra_items.entry(item.clone()).or_insert(0) += 1;
        }
    }
    let extra_counts: Vec<f64> = sessions
        .iter()
        .map(|s| s.quality.over_documentation.extra_count as f64)
        .collect();

    QualitySummary {
        scored_sessions: scored,
        rejected_sessions: rejected,
        rejection_rate: rate(rejected, scored),
        errors: Summary::of(&error_counts),
        by_field,
        over_documentation: OverDocumentationSummary {
            sessions: over_documenting.len(),
            rate: rate(over_documenting.len(), scored),
            extra_count: Summary::of(&extra_counts),
            extra_items,
        },
    }
}
