//! Answer key: the expected value and comparison rule per scored field.

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// How an exact-match field is normalised before comparing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// Trim, lowercase, collapse internal whitespace.
    #[default]
    Text,
    /// Lowercase, drop all whitespace.
    Identifier,
    /// Compare verbatim.
    None,
}

impl Normalization {
    pub fn apply(&self, raw: &str) -> String {
        match self {
            Normalization::Text => raw
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
                .to_lowercase(),
            Normalization::Identifier => raw
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect::<String>()
                .to_lowercase(),
            Normalization::None => raw.to_string(),
        }
    }
}

/// Comparator for [`FieldRule::Custom`].
pub type Comparator = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Rule used to judge one field.
#[derive(Clone)]
pub enum FieldRule {
    Exact {
        expected: String,
        normalize: Normalization,
    },
    /// Day/month/year compared component-wise, ignoring leading zeros.
    Date { expected: String },
    /// Multi-select that must contain every required item.
    IncludesAll { required: Vec<String> },
    /// Single choice among accepted values.
    OneOf { allowed: Vec<String> },
    Custom {
        expected: String,
        description: String,
        matches: Comparator,
    },
}

impl fmt::Debug for FieldRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldRule::Exact { expected, normalize } => f
                .debug_struct("Exact")
                .field("expected", expected)
                .field("normalize", normalize)
                .finish(),
            FieldRule::Date { expected } => {
                f.debug_struct("Date").field("expected", expected).finish()
            }
            FieldRule::IncludesAll { required } => f
                .debug_struct("IncludesAll")
                .field("required", required)
                .finish(),
            FieldRule::OneOf { allowed } => {
                f.debug_struct("OneOf").field("allowed", allowed).finish()
            }
            FieldRule::Custom {
                expected,
                description,
                ..
            } => f
                .debug_struct("Custom")
                .field("expected", expected)
                .field("description", description)
                .finish_non_exhaustive(),
        }
    }
}

/// Rule as written in the answer key file.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum RuleSpec {
    Exact {
        expected: String,
        #[serde(default)]
        normalize: Normalization,
    },
    Date {
        expected: String,
    },
    IncludesAll {
        required: Vec<String>,
    },
    OneOf {
        allowed: Vec<String>,
    },
}

impl From<RuleSpec> for FieldRule {
    fn from(spec: RuleSpec) -> Self {
        match spec {
            RuleSpec::Exact { expected, normalize } => FieldRule::Exact { expected, normalize },
            RuleSpec::Date { expected } => FieldRule::Date { expected },
            RuleSpec::IncludesAll { required } => FieldRule::IncludesAll { required },
            RuleSpec::OneOf { allowed } => FieldRule::OneOf { allowed },
        }
    }
}

#[derive(Debug, Deserialize)]
struct AnswerKeyFile {
    fields: BTreeMap<String, RuleSpec>,
}

#[derive(Debug, Error)]
pub enum AnswerKeyError {
    #[error("invalid answer key: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("answer key has no fields")]
    Empty,
}

/// Field name to rule, iterated in field-name order.
#[derive(Debug, Clone, Default)]
pub struct AnswerKey {
    rules: BTreeMap<String, FieldRule>,
}

impl AnswerKey {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rule(mut self, field: impl Into<String>, rule: FieldRule) -> Self {
        self.rules.insert(field.into(), rule);
        self
    }

    /// Parses a YAML answer key:
    ///
    /// ```yaml
    /// fields:
    ///   national_id: { kind: exact, expected: "id-458921", normalize: identifier }
    ///   date_of_birth: { kind: date, expected: "12/06/1990" }
    /// ```
    pub fn from_yaml_str(yaml: &str) -> Result<Self, AnswerKeyError> {
        let file: AnswerKeyFile = serde_yaml::from_str(yaml)?;
        if file.fields.is_empty() {
            return Err(AnswerKeyError::Empty);
        }
        Ok(Self {
            rules: file
                .fields
                .into_iter()
                .map(|(field, spec)| (field, spec.into()))
                .collect(),
        })
    }

    pub fn rules(&self) -> impl Iterator<Item = (&String, &FieldRule)> {
        self.rules.iter()
    }

    pub fn get(&self, field: &str) -> Option<&FieldRule> {
        self.rules.get(field)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_normalization_collapses_case_and_spacing() {
        assert_eq!(Normalization::Text.apply("  Rue   de la  Paix "), "rue de la paix");
        assert_eq!(Normalization::Identifier.apply(" ID - 458 921 "), "id-458921");
        assert_eq!(Normalization::None.apply(" X "), " X ");
    }

    #[test]
    fn parses_every_rule_kind_from_yaml() {
        let key = AnswerKey::from_yaml_str(
            r#"
fields:
  national_id: { kind: exact, expected: "id-458921", normalize: identifier }
  last_name: { kind: exact, expected: "Durand" }
  date_of_birth: { kind: date, expected: "12/06/1990" }
  eligibility_documents:
    kind: includes_all
    required: [vehicle_registration, insurance_certificate]
  permit_duration: { kind: one_of, allowed: ["12_months"] }
"#,
        )
        .unwrap();

        assert_eq!(key.len(), 5);
        assert!(matches!(
            key.get("national_id"),
            Some(FieldRule::Exact {
                normalize: Normalization::Identifier,
                ..
            })
        ));
        assert!(matches!(
            key.get("last_name"),
            Some(FieldRule::Exact {
                normalize: Normalization::Text,
                ..
            })
        ));
        assert!(matches!(key.get("eligibility_documents"), Some(FieldRule::IncludesAll { required }) if required.len() == 2));
    }

    #[test]
    fn rejects_unknown_kinds_and_empty_keys() {
        assert!(matches!(
            AnswerKey::from_yaml_str("fields:\n  x: { kind: regex, expected: a }\n"),
            Err(AnswerKeyError::Parse(_))
        ));
        assert!(matches!(
            AnswerKey::from_yaml_str("fields: {}\n"),
            Err(AnswerKeyError::Empty)
        ));
    }
}
