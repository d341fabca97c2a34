//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `PERMIT_STUDY` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use permit_study::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Event log in {}", config.storage.data_dir.display());
//! ```

mod error;
mod export;
mod server;
mod storage;
mod study;

pub use error::{ConfigError, ValidationError};
pub use export::ExportConfig;
pub use server::{Environment, ServerConfig};
pub use storage::StorageConfig;
pub use study::StudyConfig;

use serde::Deserialize;

/// Keys whose values are comma-separated lists in the environment
const LIST_KEYS: [&str; 4] = [
    "server.cors_origins",
    "study.conditions",
    "study.post_submission_pages",
    "study.page_order",
];

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Event log location
    #[serde(default)]
    pub storage: StorageConfig,

    /// Conditions, procedure layout, and scoring
    #[serde(default)]
    pub study: StudyConfig,

    /// Shared secret for exports and maintenance
    pub export: ExportConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `PERMIT_STUDY` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `PERMIT_STUDY__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `PERMIT_STUDY__STUDY__CONDITIONS=A,B,C` -> `study.conditions = ["A", "B", "C"]`
    /// - `PERMIT_STUDY__EXPORT__KEY=...` -> `export.key = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Required environment variables are missing
    /// - Values cannot be parsed into expected types
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let mut environment = config::Environment::default()
            .prefix("PERMIT_STUDY")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
            .list_separator(",");
        for key in LIST_KEYS {
            environment = environment.with_list_parse_key(key);
        }

        let config = config::Config::builder()
            .add_source(environment)
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.storage.validate()?;
        self.study.validate()?;
        self.export.validate(&self.server.environment)?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: [&str; 6] = [
        "PERMIT_STUDY__EXPORT__KEY",
        "PERMIT_STUDY__SERVER__PORT",
        "PERMIT_STUDY__SERVER__ENVIRONMENT",
        "PERMIT_STUDY__STUDY__CONDITIONS",
        "PERMIT_STUDY__STUDY__BLOCK_SIZE",
        "PERMIT_STUDY__STORAGE__DATA_DIR",
    ];

    fn set_minimal_env() {
        env::set_var("PERMIT_STUDY__EXPORT__KEY", "export-secret");
    }

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.export.key.expose_secret(), "export-secret");
        assert_eq!(config.export.delete_confirmation, "DELETE ALL DATA");
        assert_eq!(config.study.conditions, vec!["A", "B"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_export_key_fails() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        assert!(AppConfig::load().is_err());
    }

    #[test]
    fn test_server_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.environment, Environment::Development);
    }

    #[test]
    fn test_is_production() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("PERMIT_STUDY__SERVER__ENVIRONMENT", "production");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.is_production());
        // "export-secret" is too short for production
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_study_lists_and_numbers_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("PERMIT_STUDY__STUDY__CONDITIONS", "A,B,C");
        env::set_var("PERMIT_STUDY__STUDY__BLOCK_SIZE", "6");
        env::set_var("PERMIT_STUDY__SERVER__PORT", "3000");
        env::set_var("PERMIT_STUDY__STORAGE__DATA_DIR", "/var/lib/permit-study");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.study.conditions, vec!["A", "B", "C"]);
        assert_eq!(config.study.block_size, 6);
        assert_eq!(config.server.port, 3000);
        assert_eq!(
            config.storage.data_dir,
            std::path::PathBuf::from("/var/lib/permit-study")
        );
        assert!(config.validate().is_ok());
    }
}
