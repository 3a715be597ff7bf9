//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! net::listener / net::async_stream
//!     → tracing events (bind at debug, accept at trace)
//!     → logging.rs subscriber (fmt layer, EnvFilter)
//! ```
//!
//! # Design Decisions
//! - Structured fields (peer_addr, timeouts) rather than formatted strings
//! - I/O errors are returned to callers, never logged by the library

pub mod logging;
