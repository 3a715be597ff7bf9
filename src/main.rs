//! Echo server with per-operation read/write deadlines.
//!
//! # Architecture Overview
//!
//! ```text
//!     config (TOML + CLI overrides)
//!         │
//!         ▼
//!     listen_timed(network, address, read, write)
//!         │
//!         ▼  accept loop (one thread per connection)
//!     TimedConnection ── read ──▶ echo ──▶ write ──┐
//!         ▲                                        │
//!         └────────────────────────────────────────┘
//! ```
//!
//! A peer that stays silent for longer than the read timeout, or stops
//! draining its socket for longer than the write timeout, is disconnected.

use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::thread;

use clap::Parser;

use net_timeout::config::{load_config, validate_config, ServerConfig};
use net_timeout::net::{is_timeout, listen_timed, Connection, Listener, NetStream, TimedConnection};
use net_timeout::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "net-timeout")]
#[command(about = "Echo server that enforces a deadline on every read and write", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Network type (tcp, tcp4, tcp6, unix).
    #[arg(long)]
    network: Option<String>,

    /// Listen address ("host:port" or socket path).
    #[arg(short, long)]
    address: Option<String>,

    /// Read timeout in milliseconds.
    #[arg(long)]
    read_timeout_ms: Option<u64>,

    /// Write timeout in milliseconds.
    #[arg(long)]
    write_timeout_ms: Option<u64>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn into_config(self) -> Result<ServerConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => ServerConfig::default(),
        };

        if let Some(network) = self.network {
            config.listener.network = network;
        }
        if let Some(address) = self.address {
            config.listener.address = address;
        }
        if let Some(ms) = self.read_timeout_ms {
            config.timeouts.read_ms = ms;
        }
        if let Some(ms) = self.write_timeout_ms {
            config.timeouts.write_ms = ms;
        }
        if let Some(level) = self.log_level {
            config.observability.log_level = level;
        }

        // Overrides can break an otherwise valid file.
        if let Err(errors) = validate_config(&config) {
            let joined: Vec<String> = errors.iter().map(ToString::to_string).collect();
            return Err(format!("invalid configuration: {}", joined.join(", ")).into());
        }
        Ok(config)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::parse().into_config()?;

    init_logging(&config.observability.log_level)?;

    tracing::info!("net-timeout v{} starting", env!("CARGO_PKG_VERSION"));

    let timeouts = config.timeouts.timeouts();
    if timeouts.read.is_zero() || timeouts.write.is_zero() {
        tracing::warn!(
            read_timeout_ms = config.timeouts.read_ms,
            write_timeout_ms = config.timeouts.write_ms,
            "Zero timeout configured; every such call starts already expired"
        );
    }

    let listener = listen_timed(
        &config.listener.network,
        &config.listener.address,
        timeouts.read,
        timeouts.write,
    )?;
    let local_addr = listener.local_addr()?;

    tracing::info!(
        network = %config.listener.network,
        address = %local_addr,
        read_timeout_ms = config.timeouts.read_ms,
        write_timeout_ms = config.timeouts.write_ms,
        "Listening for connections"
    );

    loop {
        match listener.accept() {
            Ok((conn, peer)) => {
                thread::spawn(move || {
                    let peer = peer.to_string();
                    match echo(conn) {
                        Ok(bytes) => {
                            tracing::debug!(peer_addr = %peer, bytes, "Connection closed");
                        }
                        Err(e) if is_timeout(&e) => {
                            tracing::info!(peer_addr = %peer, "Connection timed out");
                        }
                        Err(e) => {
                            tracing::warn!(peer_addr = %peer, error = %e, "Connection failed");
                        }
                    }
                });
            }
            // Transient accept failures (e.g. EMFILE, aborted handshakes)
            // must not take the server down.
            Err(e) => {
                tracing::warn!(error = %e, "Accept failed");
            }
        }
    }
}

/// Echo until EOF; returns the number of bytes echoed.
fn echo(mut conn: TimedConnection<NetStream>) -> io::Result<u64> {
    let mut buf = [0u8; 4096];
    let mut total = 0u64;
    loop {
        let n = conn.read(&mut buf)?;
        if n == 0 {
            if let Err(e) = conn.shutdown(std::net::Shutdown::Both) {
                tracing::debug!(error = %e, "Shutdown after EOF failed");
            }
            return Ok(total);
        }
        conn.write_all(&buf[..n])?;
        total += n as u64;
    }
}
