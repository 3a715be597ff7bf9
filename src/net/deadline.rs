//! Deadline arithmetic shared by the blocking and async transports.

use std::io;
use std::time::{Duration, Instant};

/// Smallest timeout the std socket setters accept; they reject `Duration::ZERO`.
const MIN_SOCKET_TIMEOUT: Duration = Duration::from_nanos(1);

/// Read and write timeouts applied to every operation of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Timeouts {
    /// Time allowed for each individual read.
    pub read: Duration,
    /// Time allowed for each individual write.
    pub write: Duration,
}

impl Timeouts {
    pub fn new(read: Duration, write: Duration) -> Self {
        Self { read, write }
    }

    /// Same timeout for both directions.
    pub fn symmetric(timeout: Duration) -> Self {
        Self::new(timeout, timeout)
    }
}

/// Absolute deadline for an operation starting now.
///
/// `None` when `now + timeout` is not representable; such a timeout never
/// expires in practice and is applied as "no deadline".
pub fn deadline_after(timeout: Duration) -> Option<Instant> {
    Instant::now().checked_add(timeout)
}

/// Milliseconds for log fields, saturating at `u64::MAX`.
pub(crate) fn millis(timeout: Duration) -> u64 {
    u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX)
}

/// Converts an absolute deadline into the relative timeout expected by
/// `set_read_timeout` / `set_write_timeout`.
///
/// A deadline that has already passed maps to the smallest accepted timeout,
/// so the next blocking call expires immediately instead of blocking forever.
pub fn socket_timeout(deadline: Option<Instant>) -> Option<Duration> {
    deadline.map(|at| {
        at.saturating_duration_since(Instant::now())
            .max(MIN_SOCKET_TIMEOUT)
    })
}

/// Whether `err` is the transport reporting an expired deadline.
///
/// Blocking sockets report an expired `SO_RCVTIMEO`/`SO_SNDTIMEO` as
/// `WouldBlock` on Unix and `TimedOut` on Windows.
pub fn is_timeout(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_timeout_clears_without_deadline() {
        assert_eq!(socket_timeout(None), None);
    }

    #[test]
    fn test_socket_timeout_remaining() {
        let timeout = socket_timeout(deadline_after(Duration::from_secs(5))).unwrap();
        assert!(timeout <= Duration::from_secs(5));
        assert!(timeout > Duration::from_secs(4));
    }

    #[test]
    fn test_socket_timeout_expired_is_never_zero() {
        let past = Instant::now();
        std::thread::sleep(Duration::from_millis(2));
        assert_eq!(socket_timeout(Some(past)), Some(MIN_SOCKET_TIMEOUT));
    }

    #[test]
    fn test_deadline_after_max_is_unbounded() {
        assert_eq!(deadline_after(Duration::MAX), None);
        assert!(deadline_after(Duration::ZERO).is_some());
    }

    #[test]
    fn test_millis_saturates() {
        assert_eq!(millis(Duration::from_millis(1500)), 1500);
        assert_eq!(millis(Duration::MAX), u64::MAX);
    }

    #[test]
    fn test_is_timeout() {
        assert!(is_timeout(&io::ErrorKind::TimedOut.into()));
        assert!(is_timeout(&io::ErrorKind::WouldBlock.into()));
        assert!(!is_timeout(&io::ErrorKind::ConnectionReset.into()));
    }

    #[test]
    fn test_symmetric_timeouts() {
        let t = Timeouts::symmetric(Duration::from_millis(50));
        assert_eq!(t.read, t.write);
        assert_eq!(t, Timeouts::new(Duration::from_millis(50), Duration::from_millis(50)));
    }
}
