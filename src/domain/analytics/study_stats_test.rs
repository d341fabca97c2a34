use serde_json::{json, Value};

use super::*;
use crate::domain::session::SessionRecord;

fn analyzed_all(values: Vec<Value>) -> Vec<AnalyzedSession> {
    let settings = AnalysisSettings::default();
    values
        .into_iter()
        .map(|value| match value {
            Value::Object(map) => AnalyzedSession::analyze(SessionRecord::from_fields(map), &settings),
            _ => panic!("expected object"),
        })
        .collect()
}

fn sample() -> Vec<AnalyzedSession> {
    analyzed_all(vec![
        json!({
            "session_id": "complete-a",
            "condition_code": "A",
            "consent_given": true,
            "is_complete": true,
            "applicationDurationMs": 120_000,
            "totalErrors": 2,
            "pageTimings": [{"pageId": "payment", "durationMs": 3000}, {"pageId": "payment", "durationMs": 4000}]
        }),
        json!({
            "session_id": "submitted-b",
            "condition_code": "B",
            "condition_forced": true,
            "consent_given": true,
            "applicationDurationMs": 60_000,
            "totalErrors": 0,
            "pageTimings": [{"pageId": "payment", "durationMs": 5000}, {"pageId": "confirmation", "durationMs": 100}]
        }),
        json!({
            "session_id": "dropped-a",
            "condition_code": "A",
            "consent_given": true,
            "applicationDurationMs": 1000,
            "currentPageIndex": 4,
            "pageTimings": [{"pageId": "payment", "durationMs": 1}]
        }),
        json!({
            "session_id": "ineligible-b",
            "condition_code": "B",
            "consent_given": true,
            "is_complete": true,
            "formResponses": {"eligibility": {"is_eligible": "no"}}
        }),
        json!({"session_id": "legacy-no-condition"}),
    ])
}

#[test]
fn counts_every_status() {
    let stats = StudyStats::compute(&sample(), &AnalysisSettings::default());

    assert_eq!(stats.total_sessions, 5);
    assert_eq!(stats.exploitable_sessions, 2);
    assert_eq!(
        stats.statuses,
        StatusCounts {
            complete: 1,
            submitted: 1,
            ineligible: 1,
            dropped: 1,
            incomplete: 1,
        }
    );
}

#[test]
fn timing_uses_exploitable_sessions_only() {
    let stats = StudyStats::compute(&sample(), &AnalysisSettings::default());

    assert_eq!(stats.application_duration_ms.n, 2);
    assert_eq!(stats.application_duration_ms.mean, 90_000.0);
    assert_eq!(stats.application_duration_ms.median, 90_000.0);
    assert_eq!(stats.validation_errors.mean, 1.0);

    let payment = stats.pages.iter().find(|p| p.page_id == "payment").unwrap();
    assert_eq!(payment.sessions, 2);
    assert_eq!(payment.time_ms.mean, 6000.0);
}

#[test]
fn histogram_covers_exploitable_durations() {
    let stats = StudyStats::compute(&sample(), &AnalysisSettings::default());

    assert_eq!(stats.histogram_bin_secs, 60);
    assert_eq!(stats.duration_histogram.len(), 3);
    assert_eq!(stats.duration_histogram[1].count, 1);
    assert_eq!(stats.duration_histogram[2].count, 1);
}

#[test]
fn drop_off_only_counts_stopped_early() {
    let stats = StudyStats::compute(&sample(), &AnalysisSettings::default());

    assert_eq!(stats.drop_off.stopped_early, 2);
    assert_eq!(stats.drop_off.dropped, 1);
    assert_eq!(stats.drop_off.incomplete, 1);
}

#[test]
fn condition_summary_defaults_missing_codes() {
    let stats = StudyStats::compute(&sample(), &AnalysisSettings::default());

    let a = stats.conditions.iter().find(|c| c.condition == "A").unwrap();
    assert_eq!(a.sessions, 3);
    assert_eq!(a.exploitable, 1);
    assert_eq!(a.application_duration_ms.mean, 120_000.0);

    let b = stats.conditions.iter().find(|c| c.condition == "B").unwrap();
    assert_eq!(b.forced, 1);
    assert_eq!(b.statuses.ineligible, 1);
}

#[test]
fn empty_study_yields_zeroed_stats() {
    let stats = StudyStats::compute(&[], &AnalysisSettings::default());

    assert_eq!(stats.total_sessions, 0);
    assert_eq!(stats.application_duration_ms, Summary::default());
    assert!(stats.duration_histogram.is_empty());
    assert!(stats.pages.is_empty());
    assert_eq!(stats.conditions.len(), 2);
}

#[test]
fn stats_serialize_camel_case() {
    let stats = StudyStats::compute(&sample(), &AnalysisSettings::default());
    let json = serde_json::to_value(&stats).unwrap();

    assert!(json.get("exploitableSessions").is_some());
    assert!(json["dropOff"].get("byPage").is_some());
    assert!(json["quality"].get("rejectionRate").is_some());
}

#[test]
fn roster_lists_every_session_with_status() {
    let settings = AnalysisSettings::default();
    let entries = roster(&sample(), &settings);

    assert_eq!(entries.len(), 5);
    assert_eq!(entries[0].status, CompletionStatus::Complete);
    assert_eq!(entries[0].last_page, "completion");
    assert_eq!(entries[4].condition, "A");
}

#[test]
fn runaway_client_durations_stay_bounded() {
    let sessions = analyzed_all(vec![
        json!({
            "session_id": "steady",
            "condition_code": "A",
            "consent_given": true,
            "is_complete": true,
            "applicationDurationMs": 600_000
        }),
        json!({
            "session_id": "clock-bug",
            "condition_code": "B",
            "consent_given": true,
            "is_complete": true,
            "applicationDurationMs": 1_700_000_000_000u64,
            "pageTimings": [
                {"pageId": "payment", "durationMs": 1.8e19},
                {"pageId": "payment", "durationMs": 1.8e19}
            ],
            "docInteractions": [
                {"docId": "lease", "durationMs": 1.8e19},
                {"docId": "lease", "durationMs": 1.8e19}
            ]
        }),
    ]);
    let settings = AnalysisSettings::default();

    let stats = StudyStats::compute(&sessions, &settings);

    assert_eq!(stats.duration_histogram.len(), settings.histogram_max_bins);
    assert_eq!(stats.duration_histogram[10].count, 1);
    assert_eq!(stats.duration_histogram.last().unwrap().count, 1);
    let lease = stats.documents.iter().find(|d| d.doc_id == "lease").unwrap();
    assert_eq!(lease.opens, 2);
    assert_eq!(lease.total_ms, u64::MAX);
}
