//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the network name and address are usable
//! - Check the log level is one tracing understands
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Zero timeouts are legal; they are the caller's choice

use thiserror::Error;

use crate::config::schema::ServerConfig;
use crate::net::Network;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("unknown network {0:?}")]
    UnknownNetwork(String),

    #[error("listener address must not be empty")]
    EmptyAddress,

    #[error("unknown log level {0:?}")]
    UnknownLogLevel(String),
}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.network.parse::<Network>().is_err() {
        errors.push(ValidationError::UnknownNetwork(
            config.listener.network.clone(),
        ));
    }

    if config.listener.address.trim().is_empty() {
        errors.push(ValidationError::EmptyAddress);
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(
            config.observability.log_level.clone(),
        ));
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
    fn test_default_is_valid() {
        assert!(validate_config(&ServerConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ServerConfig::default();
        config.listener.network = "sctp".into();
        config.listener.address = "  ".into();
        config.observability.log_level = "loud".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::UnknownNetwork("sctp".into()),
                ValidationError::EmptyAddress,
                ValidationError::UnknownLogLevel("loud".into()),
            ]
        );
    }

    #[test]
    fn test_zero_timeouts_allowed() {
        let mut config = ServerConfig::default();
        config.timeouts.read_ms = 0;
        config.timeouts.write_ms = 0;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_error_display() {
        let err = ValidationError::UnknownNetwork("udp".into());
        assert_eq!(err.to_string(), "unknown network \"udp\"");
    }
}
