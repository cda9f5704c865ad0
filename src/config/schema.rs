//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files and
//! carry defaults so a minimal (or absent) config file works.

use serde::{Deserialize, Serialize};

/// Root configuration for the service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address, limits).
    pub listener: ListenerConfig,

    /// Hosting environment; controls error-response verbosity.
    pub environment: Environment,

    /// Request-logging settings.
    pub logging: LogConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g. "0.0.0.0:8080").
    pub bind_address: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Maximum accepted request body size in bytes.
    pub max_request_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
            max_request_bytes: 2 * 1024 * 1024,
        }
    }
}

/// Hosting environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    #[default]
    Production,
}

impl Environment {
    pub fn is_development(self) -> bool {
        matches!(self, Self::Development)
    }
}

/// Request-logging settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LogConfig {
    /// Emit one structured record per HTTP request; also gates body capture.
    pub http_request_logging: bool,

    /// Level for per-request records.
    pub request_log_level: RequestLogLevel,

    /// Upper bound for request bodies buffered for logging.
    pub max_body_bytes: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            http_request_logging: false,
            request_log_level: RequestLogLevel::Debug,
            max_body_bytes: 64 * 1024,
        }
    }
}

/// Level for per-request records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RequestLogLevel {
    Error,
    Warn,
    Info,
    #[default]
    Debug,
    Trace,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_allow_an_empty_config() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.environment, Environment::Production);
        assert!(!config.logging.http_request_logging);
        assert_eq!(config.logging.request_log_level, RequestLogLevel::Debug);
    }

    #[test]
    fn partial_config_overrides_only_named_fields() {
        let config: AppConfig = toml::from_str(
            r#"
            environment = "development"

            [logging]
            http_request_logging = true
            request_log_level = "info"
            "#,
        )
        .unwrap();

        assert!(config.environment.is_development());
        assert!(config.logging.http_request_logging);
        assert_eq!(config.logging.request_log_level, RequestLogLevel::Info);
        assert_eq!(config.logging.max_body_bytes, 64 * 1024);
    }
}
