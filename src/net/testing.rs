//! Scripted in-memory connection and listener for unit tests.

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::net::Shutdown;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use super::{Connection, Listener};

/// Calls observed on a [`MockConnection`], in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    SetReadDeadline(Option<Instant>),
    SetWriteDeadline(Option<Instant>),
    Read,
    Write(Vec<u8>),
    Flush,
    Shutdown(Shutdown),
}

/// Shared record of calls, kept by the test after the mock is wrapped.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    pub fn push(&self, call: Call) {
        self.0.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().clone()
    }

    pub fn read_deadlines(&self) -> Vec<Instant> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::SetReadDeadline(Some(at)) => Some(at),
                _ => None,
            })
            .collect()
    }
}

/// Connection whose results are scripted per call.
///
/// Reads pop from `reads` (returning EOF when empty). Writes accept the
/// whole buffer unless a result is queued in `writes`.
#[derive(Debug, Default)]
pub struct MockConnection {
    pub log: CallLog,
    pub reads: Mutex<VecDeque<io::Result<Vec<u8>>>>,
    pub writes: Mutex<VecDeque<io::Result<usize>>>,
    pub read_deadline_error: Option<io::ErrorKind>,
    pub write_deadline_error: Option<io::ErrorKind>,
}

impl MockConnection {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }

    pub fn with_reads(self, reads: Vec<io::Result<Vec<u8>>>) -> Self {
        *self.reads.lock().unwrap() = reads.into();
        self
    }

    pub fn with_writes(self, writes: Vec<io::Result<usize>>) -> Self {
        *self.writes.lock().unwrap() = writes.into();
        self
    }
}

impl Read for MockConnection {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.log.push(Call::Read);
        match self.reads.lock().unwrap().pop_front() {
            Some(Ok(data)) => {
                let n = data.len().min(buf.len());
                buf[..n].copy_from_slice(&data[..n]);
                Ok(n)
            }
            Some(Err(e)) => Err(e),
            None => Ok(0),
        }
    }
}

impl Write for MockConnection {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.log.push(Call::Write(buf.to_vec()));
        self.writes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(buf.len()))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.log.push(Call::Flush);
        Ok(())
    }
}

impl Connection for MockConnection {
    type Addr = &'static str;

    fn set_read_deadline(&self, deadline: Option<Instant>) -> io::Result<()> {
        if let Some(kind) = self.read_deadline_error {
            return Err(io::Error::new(kind, "read deadline rejected"));
        }
        self.log.push(Call::SetReadDeadline(deadline));
        Ok(())
    }

    fn set_write_deadline(&self, deadline: Option<Instant>) -> io::Result<()> {
        if let Some(kind) = self.write_deadline_error {
            return Err(io::Error::new(kind, "write deadline rejected"));
        }
        self.log.push(Call::SetWriteDeadline(deadline));
        Ok(())
    }

    fn local_addr(&self) -> io::Result<&'static str> {
        Ok("mock-local")
    }

    fn peer_addr(&self) -> io::Result<&'static str> {
        Ok("mock-peer")
    }

    fn shutdown(&self, how: Shutdown) -> io::Result<()> {
        self.log.push(Call::Shutdown(how));
        Ok(())
    }
}

/// Listener handing out scripted accept results.
#[derive(Debug, Default)]
pub struct MockListener {
    pub accepts: Mutex<VecDeque<io::Result<MockConnection>>>,
}

impl MockListener {
    pub fn new(accepts: Vec<io::Result<MockConnection>>) -> Self {
        Self {
            accepts: Mutex::new(accepts.into()),
        }
    }
}

impl Listener for MockListener {
    type Conn = MockConnection;
    type Addr = &'static str;

    fn accept(&self) -> io::Result<(MockConnection, &'static str)> {
        match self.accepts.lock().unwrap().pop_front() {
            Some(result) => result.map(|conn| (conn, "mock-peer")),
            None => Err(io::Error::new(io::ErrorKind::Other, "listener closed")),
        }
    }

    fn local_addr(&self) -> io::Result<&'static str> {
        Ok("mock-local")
    }
}
