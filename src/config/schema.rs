//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML and every
//! field has a default, so an empty file is a valid configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::net::Timeouts;

/// Root configuration for the echo server.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Where to listen.
    pub listener: ListenerConfig,

    /// Per-operation I/O timeouts.
    pub timeouts: TimeoutConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Network type: "tcp", "tcp4", "tcp6" or "unix".
    pub network: String,

    /// Address in the network's format ("host:port" or a socket path).
    pub address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            network: "tcp".to_string(),
            address: "127.0.0.1:7070".to_string(),
        }
    }
}

/// Timeouts applied to every single read and write of an accepted
/// connection. Zero means every call starts already expired.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Read timeout in milliseconds.
    pub read_ms: u64,

    /// Write timeout in milliseconds.
    pub write_ms: u64,
}

impl TimeoutConfig {
    pub fn timeouts(&self) -> Timeouts {
        Timeouts::new(
            Duration::from_millis(self.read_ms),
            Duration::from_millis(self.write_ms),
        )
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            read_ms: 30_000,
            write_ms: 30_000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
