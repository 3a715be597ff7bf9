//! Shared utilities for the end-to-end deadline tests.

use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

use net_timeout::net::{listen_timed, Listener, NetListener, NetStream, TimedConnection, TimedListener};

/// Deadline used by the loopback scenarios.
pub const TIMEOUT: Duration = Duration::from_millis(50);

/// Bind a timed loopback listener on an ephemeral port.
pub fn timed_loopback(read: Duration, write: Duration) -> (TimedListener<NetListener>, SocketAddr) {
    let listener = listen_timed("tcp", "127.0.0.1:0", read, write).unwrap();
    let addr = listener.local_addr().unwrap().as_inet().unwrap();
    (listener, addr)
}

/// Connect a client and accept the matching server side.
pub fn connected_pair(
    listener: &TimedListener<NetListener>,
    addr: SocketAddr,
) -> (TcpStream, TimedConnection<NetStream>) {
    let client = TcpStream::connect(addr).unwrap();
    let (server, _) = listener.accept().unwrap();
    (client, server)
}
