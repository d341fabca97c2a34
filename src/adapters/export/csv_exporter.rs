//! One-row-per-session CSV export.
//!
//! Column groups, in order:
//! 1. identity, status, and timing fields
//! 2. `time_<page>_ms` and `errors_<page>` for every observed page
//! 3. `doc_<doc>_opens` and `doc_<doc>_totalMs` for every observed document
//! 4. `form_<field>` for every observed response field
//! 5. quality scoring and over-documentation
//!
//! Observed columns are the union over all exported sessions, so every row
//! has the same shape; cells a session never produced stay empty.

use serde_json::Value;
use std::collections::BTreeSet;

use crate::domain::analytics::AnalyzedSession;

const BASE_COLUMNS: [&str; 19] = [
    "session_id",
    "prolific_pid",
    "study_id",
    "condition_code",
    "condition_forced",
    "completion_status",
    "legacy_status",
    "last_page",
    "consent_given",
    "is_complete",
    "started_at",
    "completed_at",
    "currentPageIndex",
    "currentPageId",
    "applicationDurationMs",
    "totalDurationMs",
    "totalErrors",
    "totalDocTimeMs",
    "totalDocOpens",
];

const QUALITY_COLUMNS: [&str; 5] = [
    "quality_total_errors",
    "quality_would_reject",
    "quality_error_fields",
    "over_documentation_count",
    "over_documentation_items",
];

/// Separator for list values packed into a single cell.
const LIST_SEPARATOR: &str = ";";

#[derive(Debug, Clone, Default)]
pub struct SessionCsvExporter {
    page_order: Vec<String>,
}

impl SessionCsvExporter {
    /// `page_order` fixes the order of known page columns; unknown pages
    /// follow alphabetically.
    pub fn new(page_order: Vec<String>) -> Self {
        Self { page_order }
    }

    pub fn render(&self, sessions: &[AnalyzedSession]) -> String {
        let pages = self.observed_pages(sessions);
        let docs: BTreeSet<String> = sessions
            .iter()
            .flat_map(|s| s.record.doc_totals().into_keys())
            .collect();
        let form_fields: BTreeSet<String> = sessions
            .iter()
            .flat_map(|s| s.responses.keys().cloned())
            .collect();

        let mut header: Vec<String> = BASE_COLUMNS.iter().map(|c| c.to_string()).collect();
        for page in &pages {
            header.push(format!("time_{}_ms", page));
        }
        for page in &pages {
            header.push(format!("errors_{}", page));
        }
        for doc in &docs {
            header.push(format!("doc_{}_opens", doc));
            header.push(format!("doc_{}_totalMs", doc));
        }
        for field in &form_fields {
            header.push(format!("form_{}", field));
        }
        header.extend(QUALITY_COLUMNS.iter().map(|c| c.to_string()));

        let mut out = String::new();
        push_row(&mut out, &header);

        for session in sessions {
            let record = &session.record;
            let mut row: Vec<String> = vec![
                record.session_id.clone(),
                opt(&record.prolific_pid),
                opt(&record.study_id),
                opt(&record.condition_code),
                record.condition_forced.to_string(),
                session.status.as_str().to_string(),
                session.status.legacy_label().to_string(),
                session.last_page.clone(),
                record.consent_given.to_string(),
                record.is_complete.to_string(),
                opt(&record.started_at),
                opt(&record.completed_at),
                opt_num(record.current_page_index),
                opt(&record.current_page_id),
                opt_num(session.application_duration_ms()),
                opt_num(record.total_duration_ms),
                record.total_errors.to_string(),
                session.doc_time_ms().to_string(),
                record.total_doc_opens.to_string(),
            ];

            let durations = record.page_durations();
            for page in &pages {
                row.push(opt_num(durations.get(page).copied()));
            }
            for page in &pages {
                row.push(opt_num(record.error_counts_by_page.get(page).copied()));
            }

            let doc_totals = record.doc_totals();
            for doc in &docs {
                match doc_totals.get(doc) {
                    Some(totals) => {
                        row.push(totals.opens.to_string());
                        row.push(totals.total_ms.to_string());
                    }
                    None => {
                        row.push(String::new());
                        row.push(String::new());
                    }
                }
            }

            for field in &form_fields {
                row.push(session.responses.get(field).map(cell).unwrap_or_default());
            }

            let quality = &session.quality;
            row.push(quality.total_errors.to_string());
            row.push(quality.would_reject.to_string());
            row.push(quality.error_fields().join(LIST_SEPARATOR));
            row.push(quality.over_documentation.extra_count.to_string());
            row.push(quality.over_documentation.extra_docs.join(LIST_SEPARATOR));

            push_row(&mut out, &row);
        }
        out
    }

    fn observed_pages(&self, sessions: &[AnalyzedSession]) -> Vec<String> {
        let observed: BTreeSet<String> = sessions
            .iter()
            .flat_map(|s| {
                s.record
                    .page_timings
                    .iter()
                    .map(|t| t.page_id.clone())
                    .chain(s.record.error_counts_by_page.keys().cloned())
            })
            .filter(|p| !p.is_empty())
            .collect();

        let mut pages: Vec<String> = self
            .page_order
            .iter()
            .filter(|p| observed.contains(*p))
            .cloned()
            .collect();
        pages.extend(observed.into_iter().filter(|p| !self.page_order.contains(p)));
        pages
    }
}

/// Quotes a value containing a comma, quote, or line break, doubling
/// embedded quotes.
pub fn escape_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn push_row(out: &mut String, cells: &[String]) {
    let line: Vec<String> = cells.iter().map(|c| escape_field(c)).collect();
    out.push_str(&line.join(","));
    out.push('\n');
}

fn opt(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn opt_num(value: Option<u64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(cell).collect::<Vec<_>>().join(LIST_SEPARATOR),
        other => other.to_string(),
    }
}
