//! Supporting-document viewing statistics.

use serde::Serialize;
use std::collections::BTreeMap;

use super::session_analysis::AnalyzedSession;
use super::statistics::rate;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStats {
    pub doc_id: String,
    pub opens: u64,
    pub total_ms: u64,
    pub avg_ms_per_open: f64,
    /// Distinct sessions that opened the document at least once.
    pub sessions_viewed: usize,
    /// `sessions_viewed` over all sessions considered.
    pub view_rate: f64,
}

pub fn document_stats(sessions: &[&AnalyzedSession]) -> Vec<DocumentStats> {
    #[derive(Default)]
    struct Acc {
        opens: u64,
        total_ms: u64,
        viewers: usize,
    }

    let mut docs: BTreeMap<String, Acc> = BTreeMap::new();
    for session in sessions {
        for (doc_id, totals) in session.record.doc_totals() {
            let acc = docs.entry(doc_id).or_default();
            acc.opens = acc.opens.saturating_add(totals.opens);
            acc.total_ms = acc.total_ms.saturating_add(totals.total_ms);
            acc.viewers += 1;
        }
    }

    docs.into_iter()
        .map(|(doc_id, acc)| DocumentStats {
            doc_id,
            opens: acc.opens,
            total_ms: acc.total_ms,
            avg_ms_per_open: if acc.opens == 0 {
                0.0
            } else {
                acc.total_ms as f64 / acc.opens as f64
            },
            sessions_viewed: acc.viewers,
            view_rate: rate(acc.viewers, sessions.len()),
        })
        .collect()
}
