//! Perceived versus actual duration.
//!
//! Two separate analyses:
//!
//! - between groups: each condition's estimates against the actual duration
//!   across all exploitable sessions
//! - within subject: for the self-estimation condition, each participant's
//!   estimate against their own actual duration
//!
//! Group means can hide individual miscalibration that cancels out, so both
//! are reported.

use serde::Serialize;
use std::collections::BTreeMap;

use super::session_analysis::{AnalysisSettings, AnalyzedSession};
use super::statistics::{mean, median, rate, Summary};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionEstimate {
    pub condition: String,
    pub estimate_ms: Summary,
    /// Mean estimate over mean actual duration; `None` without actual data.
    pub mean_ratio: Option<f64>,
    pub median_ratio: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithinSubjectAccuracy {
    pub condition: String,
    pub n: usize,
    /// Estimate minus actual; positive means overestimation.
    pub mean_signed_error_ms: f64,
    pub mean_absolute_error_ms: f64,
    pub median_absolute_error_ms: f64,
    pub overestimate_rate: f64,
    pub underestimate_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEstimation {
    pub actual_ms: Summary,
    pub by_condition: Vec<ConditionEstimate>,
    pub within_subject: Option<WithinSubjectAccuracy>,
}

pub fn time_estimation(sessions: &[&AnalyzedSession], settings: &AnalysisSettings) -> TimeEstimation {
    let field = settings.time_estimate_field.as_str();

    let actual: Vec<f64> = sessions
        .iter()
        .filter_map(|s| s.application_duration_ms())
        .map(|ms| ms as f64)
        .collect();
    let actual_ms = Summary::of(&actual);

    let mut estimates: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for session in sessions {
        if let Some(estimate) = session.time_estimate_ms(field) {
            estimates
                .entry(session.condition(settings))
                .or_default()
                .push(estimate);
        }
    }

    let by_condition = estimates
        .into_iter()
        .map(|(condition, values)| {
            let estimate_ms = Summary::of(&values);
            ConditionEstimate {
                condition: condition.to_string(),
                mean_ratio: ratio(estimate_ms.mean, actual_ms.mean, actual_ms.n),
                median_ratio: ratio(estimate_ms.median, actual_ms.median, actual_ms.n),
                estimate_ms,
            }
        })
        .collect();

    let within_subject = settings
        .self_estimation_condition
        .as_deref()
        .and_then(|condition| within_subject(sessions, settings, condition));

    TimeEstimation {
        actual_ms,
        by_condition,
        within_subject,
    }
}

fn ratio(estimate: f64, actual: f64, actual_n: usize) -> Option<f64> {
    (actual_n > 0 && actual > 0.0).then(|| estimate / actual)
}

fn within_subject(
    sessions: &[&AnalyzedSession],
    settings: &AnalysisSettings,
    condition: &str,
) -> Option<WithinSubjectAccuracy> {
    let signed: Vec<f64> = sessions
        .iter()
        .filter(|s| s.condition(settings) == condition)
        .filter_map(|s| {
            let estimate = s.time_estimate_ms(&settings.time_estimate_field)?;
            let actual = s.application_duration_ms()?;
            Some(estimate - actual as f64)
        })
        .collect();
    if signed.is_empty() {
        return None;
    }

    let absolute: Vec<f64> = signed.iter().map(|e| e.abs()).collect();
    let over = signed.iter().filter(|e| **e > 0.0).count();
    let under = signed.iter().filter(|e| **e < 0.0).count();

    Some(WithinSubjectAccuracy {
        condition: condition.to_string(),
        n: signed.len(),
        mean_signed_error_ms: mean(&signed),
        mean_absolute_error_ms: mean(&absolute),
        median_absolute_error_ms: median(&absolute),
        overestimate_rate: rate(over, signed.len()),
        underestimate_rate: rate(under, signed.len()),
    })
}
