//! CompletionStatus - derived classification of a merged session.
//!
//! Status is never stored; it is recomputed from the merged record on every
//! read by [`CompletionRules::status`]. The checks run in a fixed order and
//! the first match wins:
//!
//! 1. `ineligible` - eligibility answer equals the "not eligible" sentinel
//! 2. `complete` - `is_complete` is set
//! 3. `submitted` - the submission page was reached
//! 4. `dropped` - consent given, nothing more
//! 5. `incomplete` - everything else
//!
//! Ineligibility goes first: an ineligible participant is routed to the end
//! of the procedure, so their page index reads as "past submission".

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::lenient;

use super::record::SessionRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionStatus {
    Complete,
    Submitted,
    Ineligible,
    Dropped,
    Incomplete,
}

impl CompletionStatus {
    pub const ALL: [CompletionStatus; 5] = [
        CompletionStatus::Complete,
        CompletionStatus::Submitted,
        CompletionStatus::Ineligible,
        CompletionStatus::Dropped,
        CompletionStatus::Incomplete,
    ];

    /// Finished the core procedure, with or without the post-task survey.
    pub fn is_exploitable(&self) -> bool {
        matches!(self, CompletionStatus::Complete | CompletionStatus::Submitted)
    }

    /// Consented or not, gave up before submission.
    pub fn stopped_early(&self) -> bool {
        matches!(self, CompletionStatus::Dropped | CompletionStatus::Incomplete)
    }

    /// Three-state label used by the earlier record generation.
    pub fn legacy_label(&self) -> &'static str {
        match self {
            CompletionStatus::Complete => "complete",
            CompletionStatus::Submitted | CompletionStatus::Dropped => "partial",
            CompletionStatus::Ineligible | CompletionStatus::Incomplete => "incomplete",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CompletionStatus::Complete => "complete",
            CompletionStatus::Submitted => "submitted",
            CompletionStatus::Ineligible => "ineligible",
            CompletionStatus::Dropped => "dropped",
            CompletionStatus::Incomplete => "incomplete",
        }
    }
}

impl fmt::Display for CompletionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Procedure layout needed to classify sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRules {
    pub eligibility_field: String,
    pub ineligible_value: String,
    /// Page shown once the application is submitted.
    pub submission_page_id: String,
    /// Any page from the submission page onward.
    pub post_submission_pages: Vec<String>,
    /// Last-resort signal for sessions without page tracking. `None` disables it.
    pub submitted_index_threshold: Option<u64>,
    pub completion_page_id: String,
    pub page_order: Vec<String>,
}

pub const DEFAULT_PAGE_ORDER: [&str; 19] = [
    "welcome",
    "consent",
    "instructions",
    "eligibility",
    "applicant_identity",
    "applicant_address",
    "vehicle_details",
    "insurance_details",
    "supporting_documents",
    "permit_options",
    "payment",
    "declaration",
    "review",
    "submit",
    "confirmation",
    "time_estimation",
    "post_task_survey",
    "debrief",
    "completion",
];

pub const DEFAULT_POST_SUBMISSION_PAGES: [&str; 5] = [
    "confirmation",
    "time_estimation",
    "post_task_survey",
    "debrief",
    "completion",
];

impl Default for CompletionRules {
    fn default() -> Self {
        Self {
            eligibility_field: "is_eligible".to_string(),
            ineligible_value: "no".to_string(),
            submission_page_id: "confirmation".to_string(),
            post_submission_pages: DEFAULT_POST_SUBMISSION_PAGES
                .iter()
                .map(|p| p.to_string())
                .collect(),
            submitted_index_threshold: Some(14),
            completion_page_id: "completion".to_string(),
            page_order: DEFAULT_PAGE_ORDER.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl CompletionRules {
    pub fn status(&self, session: &SessionRecord) -> CompletionStatus {
        if self.is_ineligible(session) {
            CompletionStatus::Ineligible
        } else if session.is_complete {
            CompletionStatus::Complete
        } else if self.reached_submission(session) {
            CompletionStatus::Submitted
        } else if session.consent_given {
            CompletionStatus::Dropped
        } else {
            CompletionStatus::Incomplete
        }
    }

    /// Where the participant was last seen.
    pub fn last_page(&self, session: &SessionRecord) -> String {
        if session.is_complete {
            return self.completion_page_id.clone();
        }
        if let Some(timing) = session.page_timings.last() {
            return timing.page_id.clone();
        }
        let index = session.current_page_index.unwrap_or(0);
        usize::try_from(index)
            .ok()
            .and_then(|i| self.page_order.get(i))
            .cloned()
            .unwrap_or_else(|| format!("page_{}", index))
    }

    fn is_ineligible(&self, session: &SessionRecord) -> bool {
        session
            .flattened_responses()
            .get(&self.eligibility_field)
            .and_then(lenient::as_string)
            .map(|answer| {
                answer
                    .trim()
                    .eq_ignore_ascii_case(self.ineligible_value.trim())
            })
            .unwrap_or(false)
    }

    fn reached_submission(&self, session: &SessionRecord) -> bool {
        if session.visited(&self.submission_page_id) {
            return true;
        }
        if let Some(page) = session.current_page_id.as_deref() {
            if self.post_submission_pages.iter().any(|p| p == page) {
                return true;
            }
        }
        match (self.submitted_index_threshold, session.current_page_index) {
            (Some(threshold), Some(index)) => index >= threshold,
            _ => false,
        }
    }
}
