//! Built-in answer key for the simulated vehicle permit application.
//!
//! The participant works from a fictional applicant file; these are the
//! values that file supports. Deployments can replace the key with a YAML
//! file (see [`AnswerKey::from_yaml_str`]).

use super::answer_key::{AnswerKey, FieldRule, Normalization};

pub const REQUIRED_DOCUMENTS: [&str; 3] = [
    "vehicle_registration",
    "insurance_certificate",
    "technical_inspection",
];

pub fn permit_answer_key() -> AnswerKey {
    let exact = |expected: &str, normalize: Normalization| FieldRule::Exact {
        expected: expected.to_string(),
        normalize,
    };

    AnswerKey::new()
        .with_rule("last_name", exact("Durand", Normalization::Text))
        .with_rule("first_name", exact("Camille", Normalization::Text))
        .with_rule("national_id", exact("id-458921", Normalization::Identifier))
        .with_rule(
            "date_of_birth",
            FieldRule::Date {
                expected: "12/06/1990".to_string(),
            },
        )
        .with_rule("postal_code", exact("69003", Normalization::Identifier))
        .with_rule("license_plate", exact("GH-417-KP", Normalization::Identifier))
        .with_rule(
            "vehicle_category",
            FieldRule::OneOf {
                allowed: vec!["passenger_car".to_string()],
            },
        )
        .with_rule(
            "permit_duration",
            FieldRule::OneOf {
                allowed: vec!["12_months".to_string()],
            },
        )
        .with_rule(
            "eligibility_documents",
            FieldRule::IncludesAll {
                required: REQUIRED_DOCUMENTS.iter().map(|d| d.to_string()).collect(),
            },
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map, Value};

    fn responses(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(m) => m,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn correct_application_has_no_errors() {
        let report = permit_answer_key().score(&responses(json!({
            "last_name": "DURAND",
            "first_name": "camille",
            "national_id": " id-458921 ",
            "date_of_birth": "12/6/1990",
            "postal_code": "69 003",
            "license_plate": "gh-417-kp",
            "vehicle_category": "passenger_car",
            "permit_duration": "12_months",
            "eligibility_documents": REQUIRED_DOCUMENTS
        })));

        assert_eq!(report.total_errors, 0, "{:?}", report.errors);
        assert!(report.over_documentation.is_empty());
    }

    #[test]
    fn wrong_fields_are_all_reported() {
        let report = permit_answer_key().score(&responses(json!({
            "national_id": "id-458912",
            "permit_duration": "24_months"
        })));

        assert_eq!(report.error_fields(), vec!["national_id", "permit_duration"]);
        assert!(report.would_reject);
    }
}
