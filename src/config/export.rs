//! Export and maintenance access

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;

const MIN_PRODUCTION_KEY_LEN: usize = 16;

/// Shared secret guarding exports, stats, and maintenance endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    /// Compared against the `key` query parameter
    pub key: SecretString,

    /// Exact phrase required by delete-all
    #[serde(default = "default_delete_confirmation")]
    pub delete_confirmation: String,
}

impl ExportConfig {
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        let key = self.key.expose_secret();
        if key.trim().is_empty() {
            return Err(ValidationError::MissingRequired("EXPORT__KEY"));
        }
        if *environment == Environment::Production && key.len() < MIN_PRODUCTION_KEY_LEN {
            return Err(ValidationError::ExportKeyTooShort(MIN_PRODUCTION_KEY_LEN));
        }
        if self.delete_confirmation.trim().is_empty() {
            return Err(ValidationError::MissingRequired("EXPORT__DELETE_CONFIRMATION"));
        }
        Ok(())
    }
}

fn default_delete_confirmation() -> String {
    "DELETE ALL DATA".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(key: &str) -> ExportConfig {
        ExportConfig {
            key: SecretString::new(key.to_string()),
            delete_confirmation: default_delete_confirmation(),
        }
    }

    #[test]
    fn blank_key_is_rejected() {
        assert_eq!(
            config("  ").validate(&Environment::Development),
            Err(ValidationError::MissingRequired("EXPORT__KEY"))
        );
    }

    #[test]
    fn short_key_only_allowed_outside_production() {
        assert!(config("dev").validate(&Environment::Development).is_ok());
        assert_eq!(
            config("dev").validate(&Environment::Production),
            Err(ValidationError::ExportKeyTooShort(16))
        );
        assert!(config("a-much-longer-shared-secret")
            .validate(&Environment::Production)
            .is_ok());
    }

    #[test]
    fn key_is_redacted_in_debug_output() {
        let rendered = format!("{:?}", config("super-secret-value"));
        assert!(!rendered.contains("super-secret-value"));
    }
}
