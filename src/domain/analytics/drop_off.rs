//! Where participants who stopped early gave up.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::session::CompletionStatus;

use super::session_analysis::AnalyzedSession;
use super::statistics::rate;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DropOffPoint {
    pub page_id: String,
    pub count: usize,
    /// Share of all stopped-early sessions.
    pub share: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DropOff {
    pub stopped_early: usize,
    pub dropped: usize,
    pub incomplete: usize,
    /// Most common last page first.
    pub by_page: Vec<DropOffPoint>,
}

/// Tabulates the last page of `dropped` and `incomplete` sessions only.
pub fn drop_off(sessions: &[AnalyzedSession]) -> DropOff {
    let stopped: Vec<&AnalyzedSession> = sessions
        .iter()
        .filter(|s| s.status.stopped_early())
        .collect();

    let mut by_page: BTreeMap<&str, usize> = BTreeMap::new();
    for session in &stopped {
        *by_page.entry(session.last_page.as_str()).or_insert(0) += 1;
    }

    let mut points: Vec<DropOffPoint> = by_page
        .into_iter()
        .map(|(page_id, count)| DropOffPoint {
            page_id: page_id.to_string(),
            count,
            share: rate(count, stopped.len()),
        })
        .collect();
    points.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.page_id.cmp(&b.page_id)));

    DropOff {
        stopped_early: stopped.len(),
        dropped: stopped
            .iter()
            .filter(|s| s.status == CompletionStatus::Dropped)
            .count(),
        incomplete: stopped
            .iter()
            .filter(|s| s.status == CompletionStatus::Incomplete)
            .count(),
        by_page: points,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analytics::AnalysisSettings;
    use crate::domain::session::SessionRecord;
    use serde_json::{json, Value};

    fn analyzed(value: Value) -> AnalyzedSession {
        let record = match value {
            Value::Object(map) => SessionRecord::from_fields(map),
            _ => panic!("expected object"),
        };
        AnalyzedSession::analyze(record, &AnalysisSettings::default())
    }

    #[test]
    fn only_stopped_early_sessions_are_tabulated() {
        let sessions = vec![
            analyzed(json!({"session_id": "a", "consent_given": true, "currentPageIndex": 10})),
            analyzed(json!({"session_id": "b", "consent_given": true, "pageTimings": [{"pageId": "payment"}]})),
            analyzed(json!({"session_id": "c", "currentPageIndex": 0})),
            analyzed(json!({"session_id": "d", "is_complete": true})),
            analyzed(json!({"session_id": "e", "formResponses": {"is_eligible": "no"}})),
        ];

        let result = drop_off(&sessions);
        assert_eq!(result.stopped_early, 3);
        assert_eq!(result.dropped, 2);
        assert_eq!(result.incomplete, 1);
        assert_eq!(result.by_page[0].page_id, "payment");
        assert_eq!(result.by_page[0].count, 2);
        assert_eq!(result.by_page[1].page_id, "welcome");
    }
}
