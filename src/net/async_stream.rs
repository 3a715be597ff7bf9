//! Tokio flavour of the per-operation deadline policy.
//!
//! Tokio sockets have no deadline setter, so each direction carries its own
//! `Sleep`. The timer is reset when an operation starts (first poll after the
//! previous one completed) and polled only while the inner stream is pending.
//!
//! # Design Decisions
//! - One timer per direction; a pending write never shortens a read
//! - An operation that completes, successfully or not, disarms its timer
//! - Expiry surfaces as `io::ErrorKind::TimedOut`; inner results pass through

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::time::{sleep_until, Instant, Sleep};

use super::deadline::{millis, Timeouts};

/// Stand-in deadline for timeouts too large to add to `Instant::now()`.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// Deadline for one direction of a [`TimedStream`].
#[derive(Debug, Default)]
struct OpDeadline {
    // Created lazily so a stream can be built outside a runtime.
    sleep: Option<Pin<Box<Sleep>>>,
    armed: bool,
}

impl OpDeadline {
    /// Start a new operation: deadline = now + timeout.
    fn arm(&mut self, timeout: Duration) {
        let now = Instant::now();
        let deadline = now.checked_add(timeout).unwrap_or(now + FAR_FUTURE);
        match self.sleep.as_mut() {
            Some(sleep) => sleep.as_mut().reset(deadline),
            None => self.sleep = Some(Box::pin(sleep_until(deadline))),
        }
        self.armed = true;
    }

    fn disarm(&mut self) {
        self.armed = false;
    }

    /// Poll an operation, arming the deadline first if it is just starting.
    fn poll_op<T>(
        &mut self,
        timeout: Duration,
        cx: &mut Context<'_>,
        op: impl FnOnce(&mut Context<'_>) -> Poll<io::Result<T>>,
    ) -> Poll<io::Result<T>> {
        if !self.armed {
            self.arm(timeout);
        }

        if let Poll::Ready(result) = op(cx) {
            self.disarm();
            return Poll::Ready(result);
        }

        let expired = match self.sleep.as_mut() {
            Some(sleep) => sleep.as_mut().poll(cx).is_ready(),
            None => false,
        };
        if expired {
            self.disarm();
            return Poll::Ready(Err(io::ErrorKind::TimedOut.into()));
        }
        Poll::Pending
    }
}

/// Async stream whose reads and writes each expire after a fixed timeout.
#[derive(Debug)]
pub struct TimedStream<S> {
    inner: S,
    timeouts: Timeouts,
    read_deadline: OpDeadline,
    write_deadline: OpDeadline,
}

impl<S> TimedStream<S> {
    pub fn new(inner: S, timeouts: Timeouts) -> Self {
        Self {
            inner,
            timeouts,
            read_deadline: OpDeadline::default(),
            write_deadline: OpDeadline::default(),
        }
    }

    pub fn timeouts(&self) -> Timeouts {
        self.timeouts
    }

    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: AsyncRead + Unpin> AsyncRead for TimedStream<S> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let inner = &mut this.inner;
        this.read_deadline
            .poll_op(this.timeouts.read, cx, |cx| Pin::new(inner).poll_read(cx, buf))
    }
}

impl<S: AsyncWrite + Unpin> AsyncWrite for TimedStream<S> {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        let inner = &mut this.inner;
        this.write_deadline
            .poll_op(this.timeouts.write, cx, |cx| Pin::new(inner).poll_write(cx, buf))
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_shutdown(cx)
    }
}

/// Tokio TCP listener whose accepted streams are wrapped in [`TimedStream`].
#[derive(Debug)]
pub struct TimedTcpListener {
    inner: TcpListener,
    timeouts: Timeouts,
}

impl TimedTcpListener {
    pub fn new(inner: TcpListener, timeouts: Timeouts) -> Self {
        Self { inner, timeouts }
    }

    /// Accept the next connection; errors are returned unchanged.
    pub async fn accept(&self) -> io::Result<(TimedStream<TcpStream>, SocketAddr)> {
        let (stream, addr) = self.inner.accept().await?;

        tracing::trace!(peer_addr = %addr, "Connection accepted");

        Ok((TimedStream::new(stream, self.timeouts), addr))
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.inner.local_addr()
    }

    pub fn timeouts(&self) -> Timeouts {
        self.timeouts
    }

    pub fn into_inner(self) -> TcpListener {
        self.inner
    }
}

/// Bind a tokio TCP listener and wrap it with the given timeouts.
pub async fn bind_timed<A: ToSocketAddrs>(
    addr: A,
    read_timeout: Duration,
    write_timeout: Duration,
) -> io::Result<TimedTcpListener> {
    let listener = TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;

    tracing::debug!(
        address = %local_addr,
        read_timeout_ms = millis(read_timeout),
        write_timeout_ms = millis(write_timeout),
        "Timed listener bound"
    );

    Ok(TimedTcpListener::new(
        listener,
        Timeouts::new(read_timeout, write_timeout),
    ))
}
