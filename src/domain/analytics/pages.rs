//! Per-page timing and error statistics.
//!
//! Each session first collapses its visits to a page into one total; only
//! then are sessions averaged. A participant who backtracks contributes one
//! data point per page, like everyone else, and sessions that never reached
//! a page are not in that page's denominator.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use super::session_analysis::AnalyzedSession;
use super::statistics::Summary;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageStats {
    pub page_id: String,
    /// Sessions that reached the page.
    pub sessions: usize,
    pub time_ms: Summary,
    pub errors: Summary,
    pub total_errors: u64,
}

pub fn page_stats(sessions: &[&AnalyzedSession], page_order: &[String]) -> Vec<PageStats> {
    let mut times: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    let mut errors: BTreeMap<String, Vec<f64>> = BTreeMap::new();

    for session in sessions {
        let durations = session.record.page_durations();
        let error_counts = &session.record.error_counts_by_page;

        let reached: BTreeSet<&String> = durations.keys().chain(error_counts.keys()).collect();
        for page in reached {
            if let Some(ms) = durations.get(page) {
                times.entry(page.clone()).or_default().push(*ms as f64);
            }
            let count = error_counts.get(page).copied().unwrap_or(0);
            errors.entry(page.clone()).or_default().push(count as f64);
        }
    }

    ordered_pages(errors.keys(), page_order)
        .into_iter()
        .map(|page_id| {
            let page_errors = errors.get(&page_id).map(Vec::as_slice).unwrap_or(&[]);
            let page_times = times.get(&page_id).map(Vec::as_slice).unwrap_or(&[]);
            PageStats {
                sessions: page_errors.len(),
                time_ms: Summary::of(page_times),
                errors: Summary::of(page_errors),
                total_errors: page_errors.iter().sum::<f64>() as u64,
                page_id,
            }
        })
        .collect()
}

/// Pages in procedure order, then any unlisted pages alphabetically.
fn ordered_pages<'a>(
    observed: impl Iterator<Item = &'a String>,
    page_order: &[String],
) -> Vec<String> {
    let observed: BTreeSet<&String> = observed.collect();
    let mut ordered: Vec<String> = page_order
        .iter()
        .filter(|page| observed.contains(page))
        .cloned()
        .collect();
    ordered.extend(
        observed
            .into_iter()
            .filter(|page| !page_order.contains(page))
            .cloned(),
    );
    ordered
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
    fn revisits_are_summed_before_averaging() {
        let a = analyzed(json!({
            "session_id": "a",
            "pageTimings": [
                {"pageId": "P", "durationMs": 3000},
                {"pageId": "P", "durationMs": 4000}
            ]
        }));
        let b = analyzed(json!({
            "session_id": "b",
            "pageTimings": [{"pageId": "P", "durationMs": 5000}]
        }));

        let stats = page_stats(&[&a, &b], &[]);
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].sessions, 2);
        assert_eq!(stats[0].time_ms.mean, 6000.0);
    }

    #[test]
    fn unvisited_pages_do_not_dilute_averages() {
        let a = analyzed(json!({
            "session_id": "a",
            "pageTimings": [{"pageId": "P", "durationMs": 1000}, {"pageId": "Q", "durationMs": 9000}],
            "errorCountsByPage": {"Q": 4}
        }));
        let b = analyzed(json!({
            "session_id": "b",
            "pageTimings": [{"pageId": "P", "durationMs": 3000}]
        }));

        let stats = page_stats(&[&a, &b], &[]);
        let q = stats.iter().find(|s| s.page_id == "Q").unwrap();
        assert_eq!(q.sessions, 1);
        assert_eq!(q.time_ms.mean, 9000.0);
        assert_eq!(q.errors.mean, 4.0);

        let p = stats.iter().find(|s| s.page_id == "P").unwrap();
        assert_eq!(p.errors.mean, 0.0);
        assert_eq!(p.time_ms.median, 2000.0);
    }

    #[test]
    fn pages_follow_procedure_order_then_alphabetical() {
        let a = analyzed(json!({
            "session_id": "a",
            "pageTimings": [{"pageId": "zeta"}, {"pageId": "second"}, {"pageId": "alpha"}, {"pageId": "first"}]
        }));
        let order = vec!["first".to_string(), "second".to_string()];

        let ids: Vec<_> = page_stats(&[&a], &order).into_iter().map(|s| s.page_id).collect();
        assert_eq!(ids, vec!["first", "second", "alpha", "zeta"]);
    }
}
