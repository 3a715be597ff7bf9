//! Blocking socket transport selected by network name.
//!
//! # Responsibilities
//! - Parse network names ("tcp", "tcp4", "tcp6", "unix")
//! - Bind a listener for a network/address pair
//! - Expose TCP and Unix sockets behind one `Connection`/`Listener` type

use std::fmt;
use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::str::FromStr;
use std::time::Instant;

#[cfg(unix)]
use std::os::unix::net::{UnixListener, UnixStream};
#[cfg(unix)]
use std::path::PathBuf;

use super::{Connection, Listener};

/// Network family accepted by [`listen_timed`](super::listen_timed).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    /// IPv4 or IPv6, whichever the address resolves to first. An empty host
    /// prefers the dual-stack `[::]` and falls back to `0.0.0.0`.
    Tcp,
    /// IPv4 only.
    Tcp4,
    /// IPv6 only.
    Tcp6,
    /// Unix domain stream socket at a filesystem path.
    #[cfg(unix)]
    Unix,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Tcp => "tcp",
            Network::Tcp4 => "tcp4",
            Network::Tcp6 => "tcp6",
            #[cfg(unix)]
            Network::Unix => "unix",
        }
    }

    fn accepts(&self, addr: &SocketAddr) -> bool {
        match self {
            Network::Tcp4 => addr.is_ipv4(),
            Network::Tcp6 => addr.is_ipv6(),
            _ => true,
        }
    }

    /// Resolve a `host:port` address, filling in the unspecified address for
    /// an empty host (`":8080"`).
    fn resolve(&self, address: &str) -> io::Result<Vec<SocketAddr>> {
        let resolved: Vec<SocketAddr> = match address.strip_prefix(':') {
            Some(port) => {
                let hosts: &[&str] = match self {
                    Network::Tcp4 => &["0.0.0.0"],
                    Network::Tcp6 => &["[::]"],
                    _ => &["[::]", "0.0.0.0"],
                };
                let mut addrs = Vec::with_capacity(hosts.len());
                for host in hosts {
                    addrs.extend(format!("{host}:{port}").to_socket_addrs()?);
                }
                addrs
            }
            None => address.to_socket_addrs()?.collect(),
        };

        let candidates: Vec<SocketAddr> = resolved.into_iter().filter(|a| self.accepts(a)).collect();
        if candidates.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("no {} address found for {:?}", self, address),
            ));
        }
        Ok(candidates)
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = io::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tcp" => Ok(Network::Tcp),
            "tcp4" => Ok(Network::Tcp4),
            "tcp6" => Ok(Network::Tcp6),
            #[cfg(unix)]
            "unix" => Ok(Network::Unix),
            other => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("unknown network {:?}", other),
            )),
        }
    }
}

/// Address of either end of a [`NetStream`] or of a [`NetListener`].
#[derive(Debug, Clone)]
pub enum NetAddr {
    Inet(SocketAddr),
    #[cfg(unix)]
    Unix(std::os::unix::net::SocketAddr),
}

impl NetAddr {
    pub fn as_inet(&self) -> Option<SocketAddr> {
        match self {
            NetAddr::Inet(addr) => Some(*addr),
            #[cfg(unix)]
            NetAddr::Unix(_) => None,
        }
    }
}

impl fmt::Display for NetAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetAddr::Inet(addr) => write!(f, "{}", addr),
            #[cfg(unix)]
            NetAddr::Unix(addr) => match addr.as_pathname() {
                Some(path) => write!(f, "{}", path.display()),
                None => f.write_str("(unnamed)"),
            },
        }
    }
}

/// Connected socket of any supported network.
#[derive(Debug)]
pub enum NetStream {
    Tcp(TcpStream),
    #[cfg(unix)]
    Unix(UnixStream),
}

impl Read for NetStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            NetStream::Tcp(s) => s.read(buf),
            #[cfg(unix)]
            NetStream::Unix(s) => s.read(buf),
        }
    }
}

impl Write for NetStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            NetStream::Tcp(s) => s.write(buf),
            #[cfg(unix)]
            NetStream::Unix(s) => s.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            NetStream::Tcp(s) => s.flush(),
            #[cfg(unix)]
            NetStream::Unix(s) => s.flush(),
        }
    }
}

impl Read for &NetStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match *self {
            NetStream::Tcp(s) => (&*s).read(buf),
            #[cfg(unix)]
            NetStream::Unix(s) => (&*s).read(buf),
        }
    }
}

impl Write for &NetStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match *self {
            NetStream::Tcp(s) => (&*s).write(buf),
            #[cfg(unix)]
            NetStream::Unix(s) => (&*s).write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match *self {
            NetStream::Tcp(s) => (&*s).flush(),
            #[cfg(unix)]
            NetStream::Unix(s) => (&*s).flush(),
        }
    }
}

impl Connection for NetStream {
    type Addr = NetAddr;

    fn set_read_deadline(&self, deadline: Option<Instant>) -> io::Result<()> {
        match self {
            NetStream::Tcp(s) => s.set_read_deadline(deadline),
            #[cfg(unix)]
            NetStream::Unix(s) => s.set_read_deadline(deadline),
        }
    }

    fn set_write_deadline(&self, deadline: Option<Instant>) -> io::Result<()> {
        match self {
            NetStream::Tcp(s) => s.set_write_deadline(deadline),
            #[cfg(unix)]
            NetStream::Unix(s) => s.set_write_deadline(deadline),
        }
    }

    fn local_addr(&self) -> io::Result<NetAddr> {
        match self {
            NetStream::Tcp(s) => s.local_addr().map(NetAddr::Inet),
            #[cfg(unix)]
            NetStream::Unix(s) => s.local_addr().map(NetAddr::Unix),
        }
    }

    fn peer_addr(&self) -> io::Result<NetAddr> {
        match self {
            NetStream::Tcp(s) => s.peer_addr().map(NetAddr::Inet),
            #[cfg(unix)]
            NetStream::Unix(s) => s.peer_addr().map(NetAddr::Unix),
        }
    }

    fn shutdown(&self, how: Shutdown) -> io::Result<()> {
        match self {
            NetStream::Tcp(s) => s.shutdown(how),
            #[cfg(unix)]
            NetStream::Unix(s) => s.shutdown(how),
        }
    }
}

/// Listening socket of any supported network.
#[derive(Debug)]
pub enum NetListener {
    Tcp(TcpListener),
    #[cfg(unix)]
    Unix(UnixSocketListener),
}

/// Unix listener that unlinks its socket file on drop if it created it.
#[cfg(unix)]
#[derive(Debug)]
pub struct UnixSocketListener {
    inner: UnixListener,
    path: Option<PathBuf>,
}

#[cfg(unix)]
impl UnixSocketListener {
    /// Bind at `path`; the file is removed when the listener is dropped.
    pub fn bind(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let inner = UnixListener::bind(&path)?;
        Ok(Self {
            inner,
            path: Some(path),
        })
    }

    pub fn get_ref(&self) -> &UnixListener {
        &self.inner
    }
}

#[cfg(unix)]
impl From<UnixListener> for UnixSocketListener {
    /// Wrap a listener bound elsewhere; its socket file is left alone.
    fn from(inner: UnixListener) -> Self {
        Self { inner, path: None }
    }
}

#[cfg(unix)]
impl Drop for UnixSocketListener {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            if let Err(e) = std::fs::remove_file(&path) {
                tracing::debug!(path = %path.display(), error = %e, "Failed to remove socket file");
            }
        }
    }
}

impl NetListener {
    /// Bind and listen on `address` for the given network.
    ///
    /// For TCP every resolved candidate is tried in order; the last bind
    /// error is returned if none succeeds.
    pub fn bind(network: Network, address: &str) -> io::Result<Self> {
        match network {
            #[cfg(unix)]
            Network::Unix => UnixSocketListener::bind(address).map(NetListener::Unix),
            _ => {
                let candidates = network.resolve(address)?;
                TcpListener::bind(&candidates[..]).map(NetListener::Tcp)
            }
        }
    }
}

impl From<TcpListener> for NetListener {
    fn from(listener: TcpListener) -> Self {
        NetListener::Tcp(listener)
    }
}

#[cfg(unix)]
impl From<UnixListener> for NetListener {
    fn from(listener: UnixListener) -> Self {
        NetListener::Unix(listener.into())
    }
}

impl Listener for NetListener {
    type Conn = NetStream;
    type Addr = NetAddr;

    fn accept(&self) -> io::Result<(NetStream, NetAddr)> {
        match self {
            NetListener::Tcp(l) => l
                .accept()
                .map(|(s, addr)| (NetStream::Tcp(s), NetAddr::Inet(addr))),
            #[cfg(unix)]
            NetListener::Unix(l) => l
                .inner
                .accept()
                .map(|(s, addr)| (NetStream::Unix(s), NetAddr::Unix(addr))),
        }
    }

    fn local_addr(&self) -> io::Result<NetAddr> {
        match self {
            NetListener::Tcp(l) => l.local_addr().map(NetAddr::Inet),
            #[cfg(unix)]
            NetListener::Unix(l) => l.inner.local_addr().map(NetAddr::Unix),
        }
    }
}
