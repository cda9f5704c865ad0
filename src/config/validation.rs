//! Configuration validation.
//!
//! Serde handles the syntactic checks; this module covers the semantic ones
//! and reports every violation, not just the first.

use std::fmt;
use std::net::SocketAddr;

use super::schema::AppConfig;

/// A single semantic validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    InvalidBindAddress(String),
    ZeroRequestTimeout,
    ZeroRequestBodyLimit,
    ZeroLoggedBodyLimit,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBindAddress(addr) => {
                write!(f, "bind address {addr:?} is not a valid socket address")
            }
            Self::ZeroRequestTimeout => write!(f, "request timeout must be a positive value"),
            Self::ZeroRequestBodyLimit => {
                write!(f, "maximum request body size must be a positive value")
            }
            Self::ZeroLoggedBodyLimit => {
                write!(f, "maximum logged body size must be a positive value")
            }
        }
    }
}

/// Pure check of a parsed configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.listener.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if config.listener.max_request_bytes == 0 {
        errors.push(ValidationError::ZeroRequestBodyLimit);
    }

    if config.logging.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroLoggedBodyLimit);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(validate_config(&AppConfig::default()), Ok(()));
    }

    #[test]
    fn all_violations_are_reported_together() {
        let mut config = AppConfig::default();
        config.listener.bind_address = "not-an-address".to_owned();
        config.listener.request_timeout_secs = 0;
        config.logging.max_body_bytes = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::ZeroRequestTimeout));
        assert!(errors.contains(&ValidationError::ZeroLoggedBodyLimit));
    }
}
