//! Listener decorator that hands out timed connections.
//!
//! # Responsibilities
//! - Accept from the wrapped listener
//! - Wrap every accepted connection in a `TimedConnection`
//! - Open a listening socket already wrapped (`listen_timed`)
//!
//! # Design Decisions
//! - Accept errors are returned unchanged; retry policy belongs to the caller
//! - No accepted connection escapes unwrapped
//! - Closing is dropping; nothing else is intercepted

use std::io;
use std::time::Duration;

use super::connection::TimedConnection;
use super::deadline::{millis, Timeouts};
use super::stream::{NetListener, Network};
use super::Listener;

/// A listener whose connections apply per-call read and write deadlines.
#[derive(Debug)]
pub struct TimedListener<L> {
    inner: L,
    timeouts: Timeouts,
}

impl<L: Listener> TimedListener<L> {
    /// Wrap a listener obtained elsewhere.
    pub fn new(inner: L, timeouts: Timeouts) -> Self {
        Self { inner, timeouts }
    }

    pub fn read_timeout(&self) -> Duration {
        self.timeouts.read
    }

    pub fn write_timeout(&self) -> Duration {
        self.timeouts.write
    }

    pub fn timeouts(&self) -> Timeouts {
        self.timeouts
    }

    pub fn get_ref(&self) -> &L {
        &self.inner
    }

    pub fn into_inner(self) -> L {
        self.inner
    }

    /// Iterator over accepted connections, like `TcpListener::incoming`.
    pub fn incoming(&self) -> Incoming<'_, L> {
        Incoming { listener: self }
    }
}

impl<L: Listener> Listener for TimedListener<L> {
    type Conn = TimedConnection<L::Conn>;
    type Addr = L::Addr;

    fn accept(&self) -> io::Result<(TimedConnection<L::Conn>, L::Addr)> {
        let (conn, addr) = self.inner.accept()?;

        tracing::trace!(
            peer_addr = ?addr,
            read_timeout_ms = millis(self.timeouts.read),
            write_timeout_ms = millis(self.timeouts.write),
            "Connection accepted"
        );

        Ok((TimedConnection::new(conn, self.timeouts), addr))
    }

    fn local_addr(&self) -> io::Result<L::Addr> {
        self.inner.local_addr()
    }
}

/// Endless iterator returned by [`TimedListener::incoming`].
#[derive(Debug)]
pub struct Incoming<'a, L> {
    listener: &'a TimedListener<L>,
}

impl<L: Listener> Iterator for Incoming<'_, L> {
    type Item = io::Result<TimedConnection<L::Conn>>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.listener.accept().map(|(conn, _)| conn))
    }
}

/// Open a listening socket and wrap it so every accepted connection gets the
/// given per-call timeouts.
///
/// `network` is one of `"tcp"`, `"tcp4"`, `"tcp6"` or (on Unix) `"unix"`;
/// `address` is `host:port` or a socket path respectively. Bind failures are
/// returned unchanged.
///
/// A zero timeout is not rejected: each call then starts with a deadline that
/// has already passed.
pub fn listen_timed(
    network: &str,
    address: &str,
    read_timeout: Duration,
    write_timeout: Duration,
) -> io::Result<TimedListener<NetListener>> {
    let network: Network = network.parse()?;
    let listener = NetListener::bind(network, address)?;
    let local_addr = listener.local_addr()?;

    tracing::debug!(
        %network,
        address = %local_addr,
        read_timeout_ms = millis(read_timeout),
        write_timeout_ms = millis(write_timeout),
        "Timed listener bound"
    );

    Ok(TimedListener::new(
        listener,
        Timeouts::new(read_timeout, write_timeout),
    ))
}
