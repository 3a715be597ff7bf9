//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! listen_timed(network, address, read, write)
//!     → stream.rs (bind NetListener for tcp/tcp4/tcp6/unix)
//!     → listener.rs (TimedListener: wrap every accepted connection)
//!     → connection.rs (TimedConnection: arm deadline, then read/write)
//!     → underlying socket enforces the deadline
//!
//! Per call:
//!     read(buf)  → set_read_deadline(now + read)   → inner.read(buf)
//!     write(buf) → set_write_deadline(now + write) → inner.write(buf)
//! ```
//!
//! # Design Decisions
//! - Decoration by composition over the `Connection` / `Listener` traits
//! - Deadlines are rearmed on every call, never carried across calls
//! - Errors from the transport are returned untouched
//! - The tokio flavour lives in async_stream.rs and keeps the same policy

pub mod async_stream;
pub mod connection;
pub mod deadline;
pub mod listener;
pub mod stream;

#[cfg(test)]
pub(crate) mod testing;

use std::fmt::Debug;
use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::time::Instant;

pub use async_stream::{bind_timed, TimedStream, TimedTcpListener};
pub use connection::TimedConnection;
pub use deadline::{is_timeout, Timeouts};
pub use listener::{listen_timed, TimedListener};
pub use stream::{NetAddr, NetListener, NetStream, Network};
#[cfg(unix)]
pub use stream::UnixSocketListener;

/// A bidirectional byte stream whose reads and writes can be bounded by
/// absolute deadlines.
///
/// `None` clears a deadline. Read and write deadlines are independent.
pub trait Connection: Read + Write {
    /// Address type reported for either end of the connection.
    type Addr: Debug;

    fn set_read_deadline(&self, deadline: Option<Instant>) -> io::Result<()>;

    fn set_write_deadline(&self, deadline: Option<Instant>) -> io::Result<()>;

    /// Set both deadlines at once.
    fn set_deadline(&self, deadline: Option<Instant>) -> io::Result<()> {
        self.set_read_deadline(deadline)?;
        self.set_write_deadline(deadline)
    }

    fn local_addr(&self) -> io::Result<Self::Addr>;

    fn peer_addr(&self) -> io::Result<Self::Addr>;

    fn shutdown(&self, how: Shutdown) -> io::Result<()>;
}

/// A source of accepted connections. Dropping the listener closes it.
pub trait Listener {
    type Conn: Connection;
    type Addr: Debug;

    /// Block until a connection arrives.
    fn accept(&self) -> io::Result<(Self::Conn, Self::Addr)>;

    fn local_addr(&self) -> io::Result<Self::Addr>;
}

impl Connection for TcpStream {
    type Addr = SocketAddr;

    fn set_read_deadline(&self, deadline: Option<Instant>) -> io::Result<()> {
        self.set_read_timeout(deadline::socket_timeout(deadline))
    }

    fn set_write_deadline(&self, deadline: Option<Instant>) -> io::Result<()> {
        self.set_write_timeout(deadline::socket_timeout(deadline))
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        TcpStream::local_addr(self)
    }

    fn peer_addr(&self) -> io::Result<SocketAddr> {
        TcpStream::peer_addr(self)
    }

    fn shutdown(&self, how: Shutdown) -> io::Result<()> {
        TcpStream::shutdown(self, how)
    }
}

impl Listener for TcpListener {
    type Conn = TcpStream;
    type Addr = SocketAddr;

    fn accept(&self) -> io::Result<(TcpStream, SocketAddr)> {
        TcpListener::accept(self)
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        TcpListener::local_addr(self)
    }
}

#[cfg(unix)]
mod unix {
    use std::io;
    use std::net::Shutdown;
    use std::os::unix::net::{SocketAddr, UnixListener, UnixStream};
    use std::time::Instant;

    use super::{deadline, Connection, Listener};

    impl Connection for UnixStream {
        type Addr = SocketAddr;

        fn set_read_deadline(&self, deadline: Option<Instant>) -> io::Result<()> {
            self.set_read_timeout(deadline::socket_timeout(deadline))
        }

        fn set_write_deadline(&self, deadline: Option<Instant>) -> io::Result<()> {
            self.set_write_timeout(deadline::socket_timeout(deadline))
        }

        fn local_addr(&self) -> io::Result<SocketAddr> {
            UnixStream::local_addr(self)
        }

        fn peer_addr(&self) -> io::Result<SocketAddr> {
            UnixStream::peer_addr(self)
        }

        fn shutdown(&self, how: Shutdown) -> io::Result<()> {
            UnixStream::shutdown(self, how)
        }
    }

    impl Listener for UnixListener {
        type Conn = UnixStream;
        type Addr = SocketAddr;

        fn accept(&self) -> io::Result<(UnixStream, SocketAddr)> {
            UnixListener::accept(self)
        }

        fn local_addr(&self) -> io::Result<SocketAddr> {
            UnixListener::local_addr(self)
        }
    }
}
