//! Per-operation I/O deadlines for stream listeners and their connections.
//!
//! Wrap a listener (or open one with [`net::listen_timed`]) and every
//! accepted connection bounds each individual read and write by a fixed
//! timeout, measured from the moment that call starts.

pub mod config;
pub mod net;
pub mod observability;

pub use config::ServerConfig;
pub use net::{
    bind_timed, is_timeout, listen_timed, Connection, Listener, TimedConnection, TimedListener,
    TimedStream, TimedTcpListener, Timeouts,
};
