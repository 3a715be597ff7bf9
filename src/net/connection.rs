//! Connection decorator that bounds every read and write by a deadline.
//!
//! # Responsibilities
//! - Arm the read deadline immediately before each read
//! - Arm the write deadline immediately before each write
//! - Forward everything else to the wrapped connection unchanged
//!
//! # Design Decisions
//! - The deadline is recomputed from "now" on every call, so each call gets
//!   the full timeout and idle gaps between calls never count against it
//! - A failed deadline-set aborts the call before any I/O happens
//! - Transport errors, including its own timeout errors, pass through as-is

use std::io::{self, Read, Write};
use std::net::Shutdown;
use std::time::{Duration, Instant};

use super::deadline::{deadline_after, Timeouts};
use super::Connection;

/// A connection whose reads and writes each expire after a fixed timeout.
#[derive(Debug)]
pub struct TimedConnection<C> {
    inner: C,
    timeouts: Timeouts,
}

impl<C: Connection> TimedConnection<C> {
    /// Wrap an existing connection. It should not be used directly afterwards.
    pub fn new(inner: C, timeouts: Timeouts) -> Self {
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

    /// The wrapped connection.
    pub fn get_ref(&self) -> &C {
        &self.inner
    }

    /// Unwrap, giving up the per-call deadlines.
    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<C: Connection> Read for TimedConnection<C> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.set_read_deadline(deadline_after(self.timeouts.read))?;
        self.inner.read(buf)
    }
}

impl<C: Connection> Write for TimedConnection<C> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.set_write_deadline(deadline_after(self.timeouts.write))?;
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

// Shared-reference I/O, for transports like `TcpStream` that allow one thread
// to read while another writes.
impl<'a, C> Read for &'a TimedConnection<C>
where
    C: Connection,
    &'a C: Read,
{
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let this: &'a TimedConnection<C> = *self;
        this.inner.set_read_deadline(deadline_after(this.timeouts.read))?;
        (&this.inner).read(buf)
    }
}

impl<'a, C> Write for &'a TimedConnection<C>
where
    C: Connection,
    &'a C: Write,
{
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let this: &'a TimedConnection<C> = *self;
        this.inner.set_write_deadline(deadline_after(this.timeouts.write))?;
        (&this.inner).write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let this: &'a TimedConnection<C> = *self;
        (&this.inner).flush()
    }
}

impl<C: Connection> Connection for TimedConnection<C> {
    type Addr = C::Addr;

    fn set_read_deadline(&self, deadline: Option<Instant>) -> io::Result<()> {
        self.inner.set_read_deadline(deadline)
    }

    fn set_write_deadline(&self, deadline: Option<Instant>) -> io::Result<()> {
        self.inner.set_write_deadline(deadline)
    }

    fn local_addr(&self) -> io::Result<C::Addr> {
        self.inner.local_addr()
    }

    fn peer_addr(&self) -> io::Result<C::Addr> {
        self.inner.peer_addr()
    }

    fn shutdown(&self, how: Shutdown) -> io::Result<()> {
        self.inner.shutdown(how)
    }
}
