//! TCP transport layer for TOYOPUC communication.
//!
//! This module provides the [`Transport`] trait the client sends frames
//! through, and [`TcpTransport`], its TCP implementation. The transport only
//! knows about sockets and frame boundaries; it never interprets function
//! codes or payloads.
//!
//! # Connection Lifecycle
//!
//! - The socket is dialed lazily by the first exchange (or eagerly by
//!   [`TcpTransport::connect`]); dialing an open connection is a no-op.
//! - One lock guards the socket, so exchanges from concurrent callers are
//!   strictly serialized. There is no pipelining.
//! - Every exchange runs under a deadline of `timeout` from its start.
//! - After `idle_timeout` without an exchange a background watcher closes the
//!   socket. The watcher takes the same lock, so it never closes a socket in
//!   the middle of an exchange.
//! - A failed write or read, a timeout included, drops the socket instead of
//!   keeping it for reuse, so a late reply on it can never be read as the
//!   answer to a newer request. The next exchange dials a fresh one. Nothing
//!   is retried.
//! - A bad length field is a framing error. The unread octets are drained and
//!   the socket is kept.
//!
//! # Example
//!
//! ```no_run
//! use toyopuc::{TcpTransport, Transport};
//! use std::time::Duration;
//!
//! let transport = TcpTransport::new("192.168.1.10:1025")
//!     .with_timeout(Duration::from_secs(3))
//!     .with_idle_timeout(Duration::from_secs(30));
//!
//! let request = [0x00, 0x00, 0x03, 0x00, 0x20, 0x00, 0x20];
//! let response = transport.send(&request)?;
//! # Ok::<(), toyopuc::ToyopucError>(())
//! ```

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tracing::{debug, trace, warn};

use crate::command::MAX_EXPANSION_BYTE_QUANTITY;
use crate::error::{Result, ToyopucError};
use crate::header::{FrameHeader, HEADER_SIZE};
use crate::utils::format_frame;

/// Default per-exchange timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default idle time after which the connection is closed.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Default maximum size of a response frame, header included.
///
/// Fits the largest reply in the catalog: a 1024-octet expansion byte read
/// after the header and function code.
pub const MAX_FRAME_SIZE: usize = HEADER_SIZE + 1 + MAX_EXPANSION_BYTE_QUANTITY;

/// Sends one request frame and returns the matching response frame.
///
/// Implementations must return the complete response frame, header included.
pub trait Transport {
    /// Performs one request/response exchange.
    fn send(&self, request: &[u8]) -> Result<Vec<u8>>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: &[u8]) -> Result<Vec<u8>> {
        (**self).send(request)
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(&self, request: &[u8]) -> Result<Vec<u8>> {
        (**self).send(request)
    }
}

struct State {
    stream: Option<TcpStream>,
    last_activity: Instant,
    watcher_running: bool,
    shutdown: bool,
}

struct Shared {
    state: Mutex<State>,
    wake: Condvar,
}

/// TCP transport owning a single connection to one PLC.
pub struct TcpTransport {
    address: String,
    timeout: Duration,
    connect_timeout: Option<Duration>,
    idle_timeout: Duration,
    max_frame_size: usize,
    shared: Arc<Shared>,
}

impl TcpTransport {
    /// Creates a disconnected transport for `address` (`host:port`) with
    /// default timeouts.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: None,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            max_frame_size: MAX_FRAME_SIZE,
            shared: Arc::new(Shared {
                state: Mutex::new(State {
                    stream: None,
                    last_activity: Instant::now(),
                    watcher_running: false,
                    shutdown: false,
                }),
                wake: Condvar::new(),
            }),
        }
    }

    /// Sets the per-exchange timeout. Zero disables the deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the dial timeout. Defaults to the exchange timeout; zero dials
    /// without a timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets the idle time after which the connection is closed. Zero keeps
    /// idle connections open.
    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// Sets the largest accepted response frame, header included.
    pub fn with_max_frame_size(mut self, max_frame_size: usize) -> Self {
        self.max_frame_size = max_frame_size;
        self
    }

    /// Returns the configured `host:port`.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Returns whether a socket is currently open.
    pub fn is_connected(&self) -> bool {
        self.shared.state.lock().stream.is_some()
    }

    /// Dials the PLC if not already connected.
    ///
    /// # Errors
    ///
    /// Returns `ToyopucError::Connection` if the dial fails.
    pub fn connect(&self) -> Result<()> {
        let mut state = self.shared.state.lock();
        self.connect_locked(&mut state)
    }

    /// Closes the connection. Closing a disconnected transport is a no-op.
    pub fn close(&self) -> Result<()> {
        let mut state = self.shared.state.lock();
        let result = close_locked(&mut state);
        self.shared.wake.notify_all();
        result.map_err(ToyopucError::from)
    }

    fn connect_locked(&self, state: &mut State) -> Result<()> {
        if state.stream.is_some() {
            return Ok(());
        }

        let connect_timeout = self.connect_timeout.unwrap_or(self.timeout);
        let stream = dial(&self.address, connect_timeout)?;
        // Frames are small request/response pairs.
        if let Err(e) = stream.set_nodelay(true) {
            debug!(error = %e, "failed to set TCP_NODELAY");
        }
        debug!(address = %self.address, "connected");
        state.stream = Some(stream);
        Ok(())
    }

    fn start_idle_watcher(&self, state: &mut State) {
        if self.idle_timeout.is_zero() || state.watcher_running {
            return;
        }

        let shared = Arc::clone(&self.shared);
        let idle_timeout = self.idle_timeout;
        let spawned = thread::Builder::new()
            .name("toyopuc-idle".into())
            .spawn(move || watch_idle(&shared, idle_timeout));
        match spawned {
            Ok(_) => state.watcher_running = true,
            Err(e) => warn!(error = %e, "failed to start idle watcher"),
        }
    }
}

impl Transport for TcpTransport {
    fn send(&self, request: &[u8]) -> Result<Vec<u8>> {
        let mut state = self.shared.state.lock();
        self.connect_locked(&mut state)?;

        state.last_activity = Instant::now();
        self.start_idle_watcher(&mut state);
        let deadline = (!self.timeout.is_zero()).then(|| state.last_activity + self.timeout);

        let Some(stream) = state.stream.as_mut() else {
            return Err(ToyopucError::from(io::Error::from(io::ErrorKind::NotConnected)));
        };

        trace!(frame = %format_frame(request), "sending");
        let result = exchange(stream, request, deadline, self.max_frame_size);
        match &result {
            Ok(response) => trace!(frame = %format_frame(response), "received"),
            Err(ToyopucError::Transport(e)) => {
                debug!(error = %e, "dropping connection after transport error");
                state.stream = None;
            }
            Err(_) => {}
        }
        result
    }
}

impl Drop for TcpTransport {
    fn drop(&mut self) {
        let mut state = self.shared.state.lock();
        state.shutdown = true;
        let _ = close_locked(&mut state);
        self.shared.wake.notify_all();
    }
}

impl std::fmt::Debug for TcpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TcpTransport")
            .field("address", &self.address)
            .field("timeout", &self.timeout)
            .field("idle_timeout", &self.idle_timeout)
            .field("connected", &self.is_connected())
            .finish()
    }
}

fn dial(address: &str, timeout: Duration) -> Result<TcpStream> {
    let connection_error = |source: io::Error| ToyopucError::Connection {
        address: address.to_string(),
        source,
    };

    if timeout.is_zero() {
        return TcpStream::connect(address).map_err(connection_error);
    }

    let mut last_error = None;
    for addr in address.to_socket_addrs().map_err(connection_error)? {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => last_error = Some(e),
        }
    }
    Err(connection_error(last_error.unwrap_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "address resolved to nothing")
    })))
}

/// Time left before `deadline`, `None` when there is no deadline.
fn remaining(deadline: Option<Instant>) -> io::Result<Option<Duration>> {
    match deadline {
        None => Ok(None),
        Some(deadline) => {
            let left = deadline.saturating_duration_since(Instant::now());
            if left.is_zero() {
                Err(io::Error::new(io::ErrorKind::TimedOut, "deadline exceeded"))
            } else {
                Ok(Some(left))
            }
        }
    }
}

fn exchange(
    stream: &mut TcpStream,
    request: &[u8],
    deadline: Option<Instant>,
    max_frame_size: usize,
) -> Result<Vec<u8>> {
    stream.set_write_timeout(remaining(deadline)?)?;
    stream.write_all(request)?;

    let mut frame = vec![0u8; HEADER_SIZE];
    stream.set_read_timeout(remaining(deadline)?)?;
    stream.read_exact(&mut frame)?;

    let length = FrameHeader::from_bytes(&frame)?.length as usize;
    if length == 0 {
        drain(stream);
        warn!("response header declares zero length");
        return Err(ToyopucError::framing(
            "length in response header must not be zero",
        ));
    }
    let max_length = max_frame_size.saturating_sub(HEADER_SIZE);
    if length > max_length {
        drain(stream);
        warn!(length, max_length, "response header declares oversized frame");
        return Err(ToyopucError::framing(format!(
            "length in response header {} must not be greater than {}",
            length, max_length
        )));
    }

    frame.resize(HEADER_SIZE + length, 0);
    stream.set_read_timeout(remaining(deadline)?)?;
    stream.read_exact(&mut frame[HEADER_SIZE..])?;
    Ok(frame)
}

/// Discards whatever is already buffered on the socket without blocking.
fn drain(stream: &mut TcpStream) {
    if stream.set_nonblocking(true).is_err() {
        return;
    }
    let mut scratch = [0u8; 256];
    let mut drained = 0usize;
    while let Ok(n) = stream.read(&mut scratch) {
        if n == 0 {
            break;
        }
        drained += n;
    }
    if drained > 0 {
        debug!(bytes = drained, "drained pending bytes");
    }
    let _ = stream.set_nonblocking(false);
}

fn close_locked(state: &mut State) -> io::Result<()> {
    let Some(stream) = state.stream.take() else {
        return Ok(());
    };
    debug!("closing connection");
    match stream.shutdown(Shutdown::Both) {
        Err(e) if e.kind() != io::ErrorKind::NotConnected => Err(e),
        _ => Ok(()),
    }
}

/// Closes the connection once no exchange has started for `idle_timeout`.
///
/// Waiting on the condvar releases the lock, so exchanges proceed while the
/// watcher sleeps; every exchange pushes `last_activity` forward.
fn watch_idle(shared: &Shared, idle_timeout: Duration) {
    let mut state = shared.state.lock();
    loop {
        if state.shutdown || state.stream.is_none() {
            break;
        }
        let idle = state.last_activity.elapsed();
        if idle >= idle_timeout {
            debug!(idle_ms = idle.as_millis() as u64, "closing connection due to idle timeout");
            if let Err(e) = close_locked(&mut state) {
                debug!(error = %e, "error while closing idle connection");
            }
            break;
        }
        shared.wake.wait_for(&mut state, idle_timeout - idle);
    }
    state.watcher_running = false;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    fn unused_address() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        addr.to_string()
    }

    #[test]
    fn test_default_constants() {
        assert_eq!(DEFAULT_TIMEOUT, Duration::from_secs(10));
        assert_eq!(DEFAULT_IDLE_TIMEOUT, Duration::from_secs(60));
        assert_eq!(MAX_FRAME_SIZE, 0x405);
    }

    #[test]
    fn test_transport_starts_disconnected() {
        let transport = TcpTransport::new("127.0.0.1:1025");
        assert!(!transport.is_connected());
        assert_eq!(transport.address(), "127.0.0.1:1025");
    }

    #[test]
    fn test_close_when_disconnected_is_noop() {
        let transport = TcpTransport::new("127.0.0.1:1025");
        assert!(transport.close().is_ok());
        assert!(transport.close().is_ok());
    }

    #[test]
    fn test_connect_is_idempotent() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let transport = TcpTransport::new(listener.local_addr().unwrap().to_string());

        transport.connect().unwrap();
        transport.connect().unwrap();
        assert!(transport.is_connected());

        // Only one connection was dialed.
        listener.set_nonblocking(true).unwrap();
        assert!(listener.accept().is_ok());
        assert!(listener.accept().is_err());

        transport.close().unwrap();
        assert!(!transport.is_connected());
    }

    #[test]
    fn test_dial_failure_is_connection_error() {
        let transport =
            TcpTransport::new(unused_address()).with_connect_timeout(Duration::from_millis(500));
        let err = transport.send(&[0x00, 0x00, 0x01, 0x00, 0x20]).unwrap_err();
        assert!(matches!(err, ToyopucError::Connection { .. }));
        assert!(!transport.is_connected());
    }

    #[test]
    fn test_remaining_without_deadline() {
        assert_eq!(remaining(None).unwrap(), None);
    }

    #[test]
    fn test_remaining_after_deadline() {
        let past = Instant::now() - Duration::from_millis(1);
        let err = remaining(Some(past)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
    }

    #[test]
    fn test_transport_debug() {
        let transport = TcpTransport::new("127.0.0.1:1025");
        let debug_str = format!("{:?}", transport);
        assert!(debug_str.contains("TcpTransport"));
        assert!(debug_str.contains("127.0.0.1:1025"));
    }
}
