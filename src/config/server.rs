//! HTTP listener settings.

use serde::Deserialize;
use std::net::{AddrParseError, SocketAddr};

use super::error::ValidationError;

/// Longest request timeout accepted; a study page never waits this long.
const MAX_REQUEST_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Production switches logs to JSON and enforces a strong export key
    #[serde(default)]
    pub environment: Environment,

    /// `EnvFilter` directive, used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Origins the participant front end is served from; empty allows any
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Configured origins with blanks dropped.
    pub fn allowed_origins(&self) -> impl Iterator<Item = &str> {
        self.cors_origins
            .iter()
            .map(|origin| origin.trim())
            .filter(|origin| !origin.is_empty())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        if !(1..=MAX_REQUEST_TIMEOUT_SECS).contains(&self.request_timeout_secs) {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.socket_addr().is_err() {
            return Err(ValidationError::InvalidBindAddress(self.host.clone()));
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: Environment::default(),
            log_level: default_log_level(),
            request_timeout_secs: default_request_timeout(),
            cors_origins: Vec::new(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info,permit_study=debug,tower_http=info".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_listen_on_every_interface() {
        let config = ServerConfig::default();
        assert_eq!(config.socket_addr().unwrap().to_string(), "0.0.0.0:8080");
        assert!(!config.is_production());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn blank_origins_are_dropped() {
        let config = ServerConfig {
            cors_origins: vec![
                " https://study.example.org".to_string(),
                "".to_string(),
                "http://localhost:5173".to_string(),
            ],
            ..Default::default()
        };
        let origins: Vec<&str> = config.allowed_origins().collect();
        assert_eq!(origins, ["https://study.example.org", "http://localhost:5173"]);
    }

    #[test]
    fn rejects_unusable_listener_settings() {
        let bad_host = ServerConfig {
            host: "not an address".to_string(),
            ..Default::default()
        };
        assert_eq!(
            bad_host.validate(),
            Err(ValidationError::InvalidBindAddress("not an address".to_string()))
        );

        for (port, timeout) in [(0, 30), (8080, 0), (8080, MAX_REQUEST_TIMEOUT_SECS + 1)] {
            let config = ServerConfig {
                port,
                request_timeout_secs: timeout,
                ..Default::default()
            };
            assert!(config.validate().is_err(), "port {port} timeout {timeout}");
        }
    }
}
