//! Study design: conditions, randomization, procedure layout, and scoring

use serde::Deserialize;
use std::collections::HashSet;
use std::path::PathBuf;

use crate::domain::analytics::AnalysisSettings;
use crate::domain::condition::{BlockRandomizer, RandomizerError};
use crate::domain::scoring::{permit_answer_key, AnswerKey};
use crate::domain::session::{CompletionRules, DEFAULT_PAGE_ORDER, DEFAULT_POST_SUBMISSION_PAGES};

use super::error::{ConfigError, ValidationError};

#[derive(Debug, Clone, Deserialize)]
pub struct StudyConfig {
    #[serde(default = "default_conditions")]
    pub conditions: Vec<String>,

    /// Used for records that predate condition assignment
    #[serde(default = "default_condition")]
    pub default_condition: String,

    /// Permuted-block size, a positive multiple of the condition count
    #[serde(default = "default_block_size")]
    pub block_size: usize,

    /// Sessions idle this long without submitting stop counting toward balance
    #[serde(default)]
    pub abandoned_after_minutes: Option<u64>,

    /// Condition asked to estimate its own duration; empty disables the
    /// within-subject analysis
    #[serde(default = "default_self_estimation_condition")]
    pub self_estimation_condition: String,

    #[serde(default = "default_time_estimate_field")]
    pub time_estimate_field: String,

    #[serde(default = "default_histogram_bin_secs")]
    pub histogram_bin_secs: u64,

    /// Upper bound on the duration histogram; longer durations land in the
    /// last bin
    #[serde(default = "default_histogram_max_bins")]
    pub histogram_max_bins: usize,

    #[serde(default = "default_eligibility_field")]
    pub eligibility_field: String,

    #[serde(default = "default_ineligible_value")]
    pub ineligible_value: String,

    #[serde(default = "default_submission_page_id")]
    pub submission_page_id: String,

    #[serde(default = "default_post_submission_pages")]
    pub post_submission_pages: Vec<String>,

    /// Page index treated as "past submission" when nothing better is known;
    /// 0 disables the fallback
    #[serde(default = "default_submitted_index_threshold")]
    pub submitted_index_threshold: u64,

    #[serde(default = "default_completion_page_id")]
    pub completion_page_id: String,

    #[serde(default = "default_page_order")]
    pub page_order: Vec<String>,

    /// YAML answer key replacing the built-in one
    #[serde(default)]
    pub answer_key_path: Option<PathBuf>,
}

impl StudyConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.conditions.is_empty() {
            return Err(ValidationError::NoConditions);
        }
        let mut seen = HashSet::new();
        for condition in &self.conditions {
            if !seen.insert(condition.as_str()) {
                return Err(ValidationError::DuplicateCondition(condition.clone()));
            }
        }
        if !self.is_condition(&self.default_condition) {
            return Err(ValidationError::UnknownCondition {
                field: "default_condition",
                value: self.default_condition.clone(),
            });
        }
        if let Some(condition) = self.self_estimation() {
            if !self.is_condition(&condition) {
                return Err(ValidationError::UnknownCondition {
                    field: "self_estimation_condition",
                    value: condition,
                });
            }
        }
        if self.block_size == 0 || self.block_size % self.conditions.len() != 0 {
            return Err(ValidationError::InvalidBlockSize {
                block_size: self.block_size,
                conditions: self.conditions.len(),
            });
        }
        if self.histogram_bin_secs == 0 {
            return Err(ValidationError::InvalidHistogramBin);
        }
        if self.histogram_max_bins == 0 {
            return Err(ValidationError::InvalidHistogramMaxBins);
        }
        if self.page_order.is_empty() {
            return Err(ValidationError::EmptyPageOrder);
        }
        Ok(())
    }

    fn is_condition(&self, code: &str) -> bool {
        self.conditions.iter().any(|c| c == code)
    }

    fn self_estimation(&self) -> Option<String> {
        let condition = self.self_estimation_condition.trim();
        (!condition.is_empty()).then(|| condition.to_string())
    }

    pub fn completion_rules(&self) -> CompletionRules {
        CompletionRules {
            eligibility_field: self.eligibility_field.clone(),
            ineligible_value: self.ineligible_value.clone(),
            submission_page_id: self.submission_page_id.clone(),
            post_submission_pages: self.post_submission_pages.clone(),
            submitted_index_threshold: (self.submitted_index_threshold > 0)
                .then_some(self.submitted_index_threshold),
            completion_page_id: self.completion_page_id.clone(),
            page_order: self.page_order.clone(),
        }
    }

    pub fn randomizer(&self) -> Result<BlockRandomizer, RandomizerError> {
        BlockRandomizer::new(self.conditions.clone(), self.block_size)
    }

    /// The configured YAML key, or the built-in permit key.
    pub fn load_answer_key(&self) -> Result<AnswerKey, ConfigError> {
        let Some(path) = &self.answer_key_path else {
            return Ok(permit_answer_key());
        };
        let display = path.display().to_string();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::AnswerKeyIo {
            path: display.clone(),
            source,
        })?;
        AnswerKey::from_yaml_str(&yaml).map_err(|source| ConfigError::AnswerKeyInvalid {
            path: display,
            source,
        })
    }

    pub fn analysis_settings(&self, answer_key: AnswerKey) -> AnalysisSettings {
        AnalysisSettings {
            rules: self.completion_rules(),
            answer_key,
            conditions: self.conditions.clone(),
            default_condition: self.default_condition.clone(),
            self_estimation_condition: self.self_estimation(),
            time_estimate_field: self.time_estimate_field.clone(),
            histogram_bin_secs: self.histogram_bin_secs,
            histogram_max_bins: self.histogram_max_bins,
        }
    }
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            conditions: default_conditions(),
            default_condition: default_condition(),
            block_size: default_block_size(),
            abandoned_after_minutes: None,
            self_estimation_condition: default_self_estimation_condition(),
            time_estimate_field: default_time_estimate_field(),
            histogram_bin_secs: default_histogram_bin_secs(),
            histogram_max_bins: default_histogram_max_bins(),
            eligibility_field: default_eligibility_field(),
            ineligible_value: default_ineligible_value(),
            submission_page_id: default_submission_page_id(),
            post_submission_pages: default_post_submission_pages(),
            submitted_index_threshold: default_submitted_index_threshold(),
            completion_page_id: default_completion_page_id(),
            page_order: default_page_order(),
            answer_key_path: None,
        }
    }
}

fn default_conditions() -> Vec<String> {
    vec!["A".to_string(), "B".to_string()]
}

fn default_condition() -> String {
    "A".to_string()
}

fn default_block_size() -> usize {
    4
}

fn default_self_estimation_condition() -> String {
    "B".to_string()
}

fn default_time_estimate_field() -> String {
    "time_estimate_minutes".to_string()
}

fn default_histogram_bin_secs() -> u64 {
    60
}

fn default_histogram_max_bins() -> usize {
    120
}

fn default_eligibility_field() -> String {
    "is_eligible".to_string()
}

fn default_ineligible_value() -> String {
    "no".to_string()
}

fn default_submission_page_id() -> String {
    "confirmation".to_string()
}

fn default_post_submission_pages() -> Vec<String> {
    DEFAULT_POST_SUBMISSION_PAGES.iter().map(|p| p.to_string()).collect()
}

fn default_submitted_index_threshold() -> u64 {
    14
}

fn default_completion_page_id() -> String {
    "completion".to_string()
}

fn default_page_order() -> Vec<String> {
    DEFAULT_PAGE_ORDER.iter().map(|p| p.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_built_in_rules() {
        let config = StudyConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.completion_rules(), CompletionRules::default());

        let settings = config.analysis_settings(permit_answer_key());
        assert_eq!(settings.self_estimation_condition.as_deref(), Some("B"));
        assert_eq!(settings.histogram_bin_secs, 60);
    }

    #[test]
    fn zero_threshold_disables_index_fallback() {
        let config = StudyConfig {
            submitted_index_threshold: 0,
            ..Default::default()
        };
        assert_eq!(config.completion_rules().submitted_index_threshold, None);
    }

    #[test]
    fn block_size_must_fit_conditions() {
        let config = StudyConfig {
            conditions: vec!["A".into(), "B".into(), "C".into()],
            block_size: 4,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidBlockSize {
                block_size: 4,
                conditions: 3
            })
        );
    }

    #[test]
    fn condition_references_must_exist() {
        let config = StudyConfig {
            default_condition: "C".into(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::UnknownCondition { field: "default_condition", .. })
        ));

        let config = StudyConfig {
            conditions: vec!["A".into(), "A".into()],
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::DuplicateCondition("A".into()))
        );
    }

    #[test]
    fn blank_self_estimation_condition_disables_analysis() {
        let config = StudyConfig {
            self_estimation_condition: " ".into(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert!(config
            .analysis_settings(permit_answer_key())
            .self_estimation_condition
            .is_none());
    }

    #[test]
    fn answer_key_loads_from_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "fields:\n  national_id: {{ kind: exact, expected: \"X-1\", normalize: identifier }}"
        )
        .unwrap();

        let config = StudyConfig {
            answer_key_path: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        let key = config.load_answer_key().unwrap();
        assert_eq!(key.len(), 1);
        assert!(key.get("national_id").is_some());
    }

    #[test]
    fn missing_answer_key_file_is_an_error() {
        let config = StudyConfig {
            answer_key_path: Some(PathBuf::from("/nonexistent/answer-key.yaml")),
            ..Default::default()
        };
        assert!(matches!(
            config.load_answer_key(),
            Err(ConfigError::AnswerKeyIo { .. })
        ));
    }
}
