//! Application quality scoring.
//!
//! Judges a session's flattened responses against an [`AnswerKey`]. Fields
//! the participant never filled in are skipped, not counted as wrong.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

use crate::domain::foundation::lenient;

use super::answer_key::{AnswerKey, FieldRule, Normalization};

/// One substantive mistake.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityError {
    pub field: String,
    pub submitted: Value,
    pub expected: String,
    pub description: String,
}

/// Items selected beyond what a multi-select field required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverDocumentation {
    pub extra_docs: Vec<String>,
    pub extra_count: usize,
}

impl OverDocumentation {
    pub fn is_empty(&self) -> bool {
        self.extra_docs.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityReport {
    pub total_errors: usize,
    pub errors: Vec<QualityError>,
    /// Any substantive error rejects the application.
    pub would_reject: bool,
    pub over_documentation: OverDocumentation,
}

impl QualityReport {
    pub fn error_fields(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.field.as_str()).collect()
    }
}

enum Verdict {
    Correct,
    Wrong(String),
}

impl AnswerKey {
    pub fn score(&self, responses: &Map<String, Value>) -> QualityReport {
        let mut errors = Vec::new();
        let mut extras: BTreeSet<String> = BTreeSet::new();

        for (field, rule) in self.rules() {
            let Some(submitted) = responses.get(field) else {
                continue;
            };
            if lenient::is_blank(submitted) {
                continue;
            }

            if let FieldRule::IncludesAll { required } = rule {
                extras.extend(beyond_required(submitted, required));
            }

            if let Verdict::Wrong(description) = judge(rule, submitted) {
                errors.push(QualityError {
                    field: field.clone(),
                    submitted: submitted.clone(),
                    expected: expected_display(rule),
                    description,
                });
            }
        }

        let extra_docs: Vec<String> = extras.into_iter().collect();
        QualityReport {
            total_errors: errors.len(),
            would_reject: !errors.is_empty(),
            errors,
            over_documentation: OverDocumentation {
                extra_count: extra_docs.len(),
                extra_docs,
            },
        }
    }
}

fn judge(rule: &FieldRule, submitted: &Value) -> Verdict {
    match rule {
        FieldRule::Exact { expected, normalize } => {
            let actual = scalar_text(submitted);
            if normalize.apply(&actual) == normalize.apply(expected) {
                Verdict::Correct
            } else {
                Verdict::Wrong("value does not match".to_string())
            }
        }
        FieldRule::Date { expected } => {
            if same_date(&scalar_text(submitted), expected) {
                Verdict::Correct
            } else {
                Verdict::Wrong("date does not match".to_string())
            }
        }
        FieldRule::IncludesAll { required } => {
            let selected = selections(submitted);
            let missing: Vec<&str> = required
                .iter()
                .filter(|item| !selected.contains(&Normalization::Text.apply(item)))
                .map(String::as_str)
                .collect();
            if missing.is_empty() {
                Verdict::Correct
            } else {
                Verdict::Wrong(format!(
                    "missing required document(s): {}",
                    missing.join(", ")
                ))
            }
        }
        FieldRule::OneOf { allowed } => {
            let actual = Normalization::Text.apply(&scalar_text(submitted));
            if allowed
                .iter()
                .any(|choice| Normalization::Text.apply(choice) == actual)
            {
                Verdict::Correct
            } else {
                Verdict::Wrong("invalid choice".to_string())
            }
        }
        FieldRule::Custom {
            description,
            matches,
            ..
        } => {
            if matches(submitted) {
                Verdict::Correct
            } else {
                Verdict::Wrong(description.clone())
            }
        }
    }
}

fn expected_display(rule: &FieldRule) -> String {
    match rule {
        FieldRule::Exact { expected, .. }
        | FieldRule::Date { expected }
        | FieldRule::Custom { expected, .. } => expected.clone(),
        FieldRule::IncludesAll { required } => required.join(", "),
        FieldRule::OneOf { allowed } => allowed.join(" | "),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(scalar_text)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Normalised selections of a multi-select answer. A plain string counts as
/// one selection.
fn selections(value: &Value) -> BTreeSet<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter(|item| !lenient::is_blank(item))
            .map(|item| Normalization::Text.apply(&scalar_text(item)))
            .collect(),
        other => std::iter::once(Normalization::Text.apply(&scalar_text(other))).collect(),
    }
}

fn beyond_required(submitted: &Value, required: &[String]) -> Vec<String> {
    let required: BTreeSet<String> = required
        .iter()
        .map(|item| Normalization::Text.apply(item))
        .collect();
    let raw_items: Vec<String> = match submitted {
        Value::Array(items) => items
            .iter()
            .filter(|item| !lenient::is_blank(item))
            .map(scalar_text)
            .collect(),
        other => vec![scalar_text(other)],
    };
    raw_items
        .into_iter()
        .filter(|item| !required.contains(&Normalization::Text.apply(item)))
        .map(|item| item.trim().to_string())
        .collect()
}

/// Formats a date answer is accepted in; `%m`/`%d` also accept one digit.
const DATE_FORMATS: [&str; 3] = ["%m/%d/%Y", "%Y-%m-%d", "%m-%d-%Y"];

/// Calendar dates compare as dates, so "12/6/1990" equals "1990-12-06".
/// Anything chrono cannot read falls back to a component-wise comparison.
fn same_date(submitted: &str, expected: &str) -> bool {
    if let (Some(a), Some(b)) = (parse_date(submitted), parse_date(expected)) {
        return a == b;
    }
    match (date_components(submitted), date_components(expected)) {
        (Some(a), Some(b)) => a == b,
        _ => Normalization::Text.apply(submitted) == Normalization::Text.apply(expected),
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
}

fn date_components(raw: &str) -> Option<Vec<u32>> {
    let parts: Vec<&str> = raw
        .split(|c: char| !c.is_ascii_digit())
        .filter(|part| !part.is_empty())
        .collect();
    if parts.len() != 3 {
        return None;
    }
    parts.iter().map(|part| part.parse::<u32>().ok()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    fn responses(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(m) => m,
            _ => panic!("expected object"),
        }
    }

    fn documents_key() -> AnswerKey {
        AnswerKey::new().with_rule(
            "eligibility_documents",
            FieldRule::IncludesAll {
                required: vec![
                    "vehicle_registration".to_string(),
                    "insurance_certificate".to_string(),
                    "technical_inspection".to_string(),
                ],
            },
        )
    }

    #[test]
    fn identifier_match_ignores_case_and_whitespace() {
        let key = AnswerKey::new().with_rule(
            "national_id",
            FieldRule::Exact {
                expected: "id-458921".to_string(),
                normalize: Normalization::Identifier,
            },
        );

        let report = key.score(&responses(json!({"national_id": " ID-458921 "})));
        assert_eq!(report.total_errors, 0);
        assert!(!report.would_reject);
    }

    #[test]
    fn blank_answers_are_never_errors() {
        let key = AnswerKey::new()
            .with_rule(
                "a",
                FieldRule::Exact {
                    expected: "x".to_string(),
                    normalize: Normalization::Text,
                },
            )
            .with_rule("b", FieldRule::OneOf { allowed: vec!["y".to_string()] });

        let report = key.score(&responses(json!({"a": "", "b": null})));
        assert_eq!(report.total_errors, 0);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn missing_required_items_yield_one_error_naming_them() {
        let report = documents_key().score(&responses(json!({
            "eligibility_documents": ["vehicle_registration"]
        })));

        assert_eq!(report.total_errors, 1);
        assert_eq!(
            report.errors[0].description,
            "missing required document(s): insurance_certificate, technical_inspection"
        );
        assert!(report.would_reject);
    }

    #[test]
    fn extra_selections_are_over_documentation_not_errors() {
        let report = documents_key().score(&responses(json!({
            "eligibility_documents": [
                "vehicle_registration",
                "insurance_certificate",
                "technical_inspection",
                "water_bill"
            ]
        })));

        assert_eq!(report.total_errors, 0);
        assert_eq!(report.over_documentation.extra_docs, vec!["water_bill"]);
        assert_eq!(report.over_documentation.extra_count, 1);
        let serialized = serde_json::to_value(&report).unwrap();
        assert_eq!(serialized["overDocumentation"]["extraDocs"], json!(["water_bill"]));
    }

    #[test]
    fn dates_ignore_leading_zeros() {
        let key = AnswerKey::new().with_rule(
            "date_of_birth",
            FieldRule::Date {
                expected: "12/06/1990".to_string(),
            },
        );

        assert_eq!(key.score(&responses(json!({"date_of_birth": "12/6/1990"}))).total_errors, 0);
        assert_eq!(key.score(&responses(json!({"date_of_birth": "6/12/1990"}))).total_errors, 1);
        assert_eq!(key.score(&responses(json!({"date_of_birth": "1990-12-06"}))).total_errors, 0);
    }

    #[test]
    fn one_of_reports_invalid_choice() {
        let key = AnswerKey::new().with_rule(
            "permit_duration",
            FieldRule::OneOf {
                allowed: vec!["12_months".to_string()],
            },
        );

        let report = key.score(&responses(json!({"permit_duration": "6_months"})));
        assert_eq!(report.errors[0].description, "invalid choice");
        assert_eq!(report.errors[0].submitted, json!("6_months"));
        assert_eq!(report.errors[0].expected, "12_months");
    }

    #[test]
    fn custom_comparator_is_applied() {
        let key = AnswerKey::new().with_rule(
            "vehicle_weight_kg",
            FieldRule::Custom {
                expected: "under 3500".to_string(),
                description: "vehicle too heavy".to_string(),
                matches: Arc::new(|v: &Value| lenient::as_f64(v).map(|kg| kg < 3500.0).unwrap_or(false)),
            },
        );

        assert_eq!(key.score(&responses(json!({"vehicle_weight_kg": "1200"}))).total_errors, 0);
        let report = key.score(&responses(json!({"vehicle_weight_kg": 4000})));
        assert_eq!(report.error_fields(), vec!["vehicle_weight_kg"]);
    }

    #[test]
    fn unanswered_fields_are_skipped() {
        let report = documents_key().score(&Map::new());
        assert_eq!(report, QualityReport::default());
    }
}
