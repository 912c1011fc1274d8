//! The NVDA Remote connection: state machine, transport and session.
//!
//! [`ConnectionManager`] implements [`RemoteLink`] for a real socket.
//!
//! # Lifecycle
//!
//! ```text
//!              open()                         handshake written
//! Disconnected ──────► Connecting ──────────────────────────────► Connected
//!      ▲                   │ any failure                              │
//!      │◄──────────────────┘ (process stopped, state reset)          │ begin_close()
//!      │                                                              ▼
//!      └───────────────────────── close() ◄─────────────────── Disconnecting
//! ```
//!
//! Opening launches NVDA, connects with retries (NVDA Remote needs a moment
//! to start listening), upgrades the stream, starts the reader task and then
//! writes the two handshake lines.  All writes go through one async mutex so
//! every message reaches the peer as one whole line.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use nvda_core::protocol::messages::handshake;
use nvda_core::{encode_message, OutboundMessage};
use tokio::io::{AsyncWriteExt, WriteHalf};
use tokio::net::TcpStream;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::process::{shutdown_process, ProcessLauncher, TargetProcess};
use super::reader::run_reader;
use super::tls::{BoxedStream, StreamUpgrader};
use crate::application::RemoteLink;
use crate::domain::{ConnectionConfig, RemoteEvent};
use crate::error::DriverError;

const EVENT_CAPACITY: usize = 256;
const WRITER_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);

/// Where the connection is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Disconnecting,
}

/// Everything owned by one live connection.
struct Session {
    writer: WriteHalf<BoxedStream>,
    cancel: CancellationToken,
    reader: JoinHandle<()>,
    process: Option<Box<dyn TargetProcess>>,
}

/// A [`RemoteLink`] over TCP (normally TLS) to a locally launched NVDA.
pub struct ConnectionManager {
    config: ConnectionConfig,
    exit_grace: Duration,
    launcher: Arc<dyn ProcessLauncher>,
    upgrader: Arc<dyn StreamUpgrader>,
    state: Mutex<ConnectionState>,
    session: tokio::sync::Mutex<Option<Session>>,
    writable: Arc<AtomicBool>,
    events: broadcast::Sender<RemoteEvent>,
}

impl ConnectionManager {
    pub fn new(
        config: ConnectionConfig,
        exit_grace: Duration,
        launcher: Arc<dyn ProcessLauncher>,
        upgrader: Arc<dyn StreamUpgrader>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            config,
            exit_grace,
            launcher,
            upgrader,
            state: Mutex::new(ConnectionState::Disconnected),
            session: tokio::sync::Mutex::new(None),
            writable: Arc::new(AtomicBool::new(false)),
            events,
        }
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, next: ConnectionState) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        debug!(from = ?*state, to = ?next, "connection state");
        *state = next;
    }

    /// Atomically moves `from` to `to`.  Returns `false` if the state was
    /// something else.
    fn transition(&self, from: ConnectionState, to: ConnectionState) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if *state != from {
            return false;
        }
        debug!(from = ?from, to = ?to, "connection state");
        *state = to;
        true
    }

    async fn establish(&self) -> Result<Session, DriverError> {
        let mut process = self.launcher.launch().await?;
        match self.open_stream().await {
            Ok((writer, cancel, reader)) => Ok(Session {
                writer,
                cancel,
                reader,
                process: Some(process),
            }),
            Err(e) => {
                if let Err(kill_error) = process.kill().await {
                    debug!("could not stop NVDA after a failed connect: {kill_error}");
                }
                Err(e)
            }
        }
    }

    async fn open_stream(&self) -> Result<(WriteHalf<BoxedStream>, CancellationToken, JoinHandle<()>), DriverError> {
        let tcp = connect_with_retry(
            &self.config.host,
            self.config.port,
            self.config.connect_timeout(),
            self.config.retry_delay(),
        )
        .await?;
        let stream = self.upgrader.upgrade(tcp).await?;
        let (read_half, mut writer) = tokio::io::split(stream);

        self.writable.store(true, Ordering::SeqCst);
        let cancel = CancellationToken::new();
        let reader = tokio::spawn(run_reader(
            read_half,
            self.events.clone(),
            Arc::clone(&self.writable),
            cancel.clone(),
        ));

        if let Err(e) = write_handshake(&mut writer).await {
            cancel.cancel();
            if let Err(join_error) = reader.await {
                warn!("reader task ended abnormally: {join_error}");
            }
            return Err(e);
        }
        Ok((writer, cancel, reader))
    }
}

async fn write_handshake(writer: &mut WriteHalf<BoxedStream>) -> Result<(), DriverError> {
    for message in handshake() {
        let line = encode_message(&message)?;
        writer.write_all(line.as_bytes()).await?;
    }
    writer.flush().await?;
    debug!("handshake sent");
    Ok(())
}

#[async_trait]
impl RemoteLink for ConnectionManager {
    async fn open(&self) -> Result<(), DriverError> {
        if !self.transition(ConnectionState::Disconnected, ConnectionState::Connecting) {
            return Err(DriverError::AlreadyConnected);
        }

        match self.establish().await {
            Ok(session) => {
                *self.session.lock().await = Some(session);
                self.set_state(ConnectionState::Connected);
                info!(host = %self.config.host, port = self.config.port, "NVDA Remote session open");
                Ok(())
            }
            Err(e) => {
                warn!("connect failed: {e}");
                self.writable.store(false, Ordering::SeqCst);
                self.set_state(ConnectionState::Disconnected);
                Err(e)
            }
        }
    }

    fn begin_close(&self) -> bool {
        self.transition(ConnectionState::Connected, ConnectionState::Disconnecting)
    }

    async fn close(&self) -> Result<(), DriverError> {
        let session = self.session.lock().await.take();
        self.writable.store(false, Ordering::SeqCst);

        let mut result = Ok(());
        if let Some(mut session) = session {
            session.cancel.cancel();
            if let Err(e) = session.reader.await {
                warn!("reader task ended abnormally: {e}");
            }
            match tokio::time::timeout(WRITER_SHUTDOWN_TIMEOUT, session.writer.shutdown()).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => debug!("stream shutdown failed: {e}"),
                Err(_) => debug!("stream shutdown timed out"),
            }
            if let Some(mut process) = session.process.take() {
                result = shutdown_process(process.as_mut(), self.exit_grace).await;
            }
        }

        self.set_state(ConnectionState::Disconnected);
        info!("NVDA Remote session closed");
        result
    }

    fn check_connectivity(&self) -> Result<(), DriverError> {
        let live = matches!(
            self.state(),
            ConnectionState::Connected | ConnectionState::Disconnecting
        );
        if live && self.writable.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(DriverError::NotConnected)
        }
    }

    async fn send(&self, message: &OutboundMessage) -> Result<(), DriverError> {
        self.check_connectivity()?;
        let line = encode_message(message)?;

        let mut guard = self.session.lock().await;
        let session = guard.as_mut().ok_or(DriverError::NotConnected)?;
        let written = async {
            session.writer.write_all(line.as_bytes()).await?;
            session.writer.flush().await
        }
        .await;
        if let Err(e) = written {
            warn!("write to NVDA Remote failed: {e}");
            self.writable.store(false, Ordering::SeqCst);
            return Err(e.into());
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<RemoteEvent> {
        self.events.subscribe()
    }
}

// ── Connect with retry ────────────────────────────────────────────────────────

/// Connects to `host:port`, retrying transient failures every `retry_delay`
/// until `timeout` has elapsed.
///
/// # Errors
///
/// Returns the last attempt's error once `timeout` is used up, or the first
/// error that retrying cannot fix.
pub async fn connect_with_retry(
    host: &str,
    port: u16,
    timeout: Duration,
    retry_delay: Duration,
) -> std::io::Result<TcpStream> {
    let deadline = Instant::now() + timeout;
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;
        let remaining = deadline.saturating_duration_since(Instant::now());
        let result = match tokio::time::timeout(remaining, TcpStream::connect((host, port))).await {
            Ok(result) => result,
            Err(_) => Err(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                format!("no connection within {} ms", timeout.as_millis()),
            )),
        };

        match result {
            Ok(stream) => {
                debug!(attempt, "TCP connected to {host}:{port}");
                return Ok(stream);
            }
            Err(e) if is_transient(&e) && Instant::now() + retry_delay < deadline => {
                debug!(attempt, "connect to {host}:{port} failed: {e}; retrying");
                tokio::time::sleep(retry_delay).await;
            }
            Err(e) => {
                warn!(attempt, "could not connect to {host}:{port}: {e}");
                return Err(e);
            }
        }
    }
}

fn is_transient(error: &std::io::Error) -> bool {
    use std::io::ErrorKind;
    matches!(
        error.kind(),
        ErrorKind::ConnectionRefused
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::NotConnected
            | ErrorKind::TimedOut
            | ErrorKind::AddrNotAvailable
    )
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::process::mock::MockProcessLauncher;
    use crate::infrastructure::tls::PlainUpgrader;
    use std::sync::atomic::Ordering;

    /// A port nothing is listening on.
    async fn closed_port() -> u16 {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        port
    }

    fn manager(port: u16, launcher: Arc<MockProcessLauncher>) -> ConnectionManager {
        let config = ConnectionConfig {
            port,
            connect_timeout_ms: 300,
            retry_delay_ms: 50,
            ..ConnectionConfig::default()
        };
        ConnectionManager::new(config, Duration::from_millis(10), launcher, Arc::new(PlainUpgrader))
    }

    #[tokio::test]
    async fn test_connect_with_retry_times_out_on_closed_port() {
        // Arrange
        let port = closed_port().await;
        let started = std::time::Instant::now();

        // Act
        let result =
            connect_with_retry("127.0.0.1", port, Duration::from_millis(300), Duration::from_millis(50)).await;

        // Assert: the last refusal is surfaced as-is
        let error = result.unwrap_err();
        assert_eq!(error.kind(), std::io::ErrorKind::ConnectionRefused);
        assert!(started.elapsed() >= Duration::from_millis(200));
    }

    #[tokio::test]
    async fn test_connect_with_retry_succeeds_once_server_starts_listening() {
        // Arrange: the listener comes up 200 ms after the first attempt
        let port = closed_port().await;
        let server = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await.unwrap();
            let _ = listener.accept().await;
        });

        // Act
        let result =
            connect_with_retry("127.0.0.1", port, Duration::from_secs(3), Duration::from_millis(50)).await;

        // Assert
        assert!(result.is_ok());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_not_connected_before_open() {
        let link = manager(closed_port().await, Arc::new(MockProcessLauncher::new()));

        assert_eq!(link.state(), ConnectionState::Disconnected);
        assert!(matches!(link.check_connectivity(), Err(DriverError::NotConnected)));
        assert!(!link.begin_close());
        let result = link.send(&OutboundMessage::key(nvda_core::Key::A, true)).await;
        assert!(matches!(result, Err(DriverError::NotConnected)));
    }

    #[tokio::test]
    async fn test_failed_launch_resets_to_disconnected() {
        // Arrange
        let launcher = Arc::new(MockProcessLauncher {
            should_fail: true,
            ..MockProcessLauncher::default()
        });
        let link = manager(closed_port().await, Arc::clone(&launcher));

        // Act
        let first = link.open().await;
        let second = link.open().await;

        // Assert: both attempts reached the launcher
        assert!(matches!(first, Err(DriverError::Process(_))));
        assert!(matches!(second, Err(DriverError::Process(_))));
        assert_eq!(launcher.launches.load(Ordering::SeqCst), 2);
        assert_eq!(link.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_failed_connect_stops_launched_process() {
        // Arrange
        let launcher = Arc::new(MockProcessLauncher::new());
        let link = manager(closed_port().await, Arc::clone(&launcher));

        // Act
        let result = link.open().await;

        // Assert
        assert!(matches!(&result, Err(DriverError::Io(e)) if e.kind() == std::io::ErrorKind::ConnectionRefused));
        assert!(launcher.last_process().unwrap().killed.load(Ordering::SeqCst));
        assert_eq!(link.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_open_during_connecting_is_already_connected() {
        // Arrange: hold the manager in Connecting
        let link = manager(closed_port().await, Arc::new(MockProcessLauncher::new()));
        assert!(link.transition(ConnectionState::Disconnected, ConnectionState::Connecting));

        // Act
        let result = link.open().await;

        // Assert
        assert!(matches!(result, Err(DriverError::AlreadyConnected)));
    }

    /// A stream whose reads wait forever and whose writes always fail.
    struct WriteFailingStream {
        inner: tokio::io::DuplexStream,
        dropped: Arc<AtomicBool>,
    }

    impl Drop for WriteFailingStream {
        fn drop(&mut self) {
            self.dropped.store(true, Ordering::SeqCst);
        }
    }

    impl tokio::io::AsyncRead for WriteFailingStream {
        fn poll_read(
            mut self: std::pin::Pin<&mut Self>,
            cx: &mut std::task::Context<'_>,
            buf: &mut tokio::io::ReadBuf<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            std::pin::Pin::new(&mut self.inner).poll_read(cx, buf)
        }
    }

    impl tokio::io::AsyncWrite for WriteFailingStream {
        fn poll_write(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
            _buf: &[u8],
        ) -> std::task::Poll<std::io::Result<usize>> {
            std::task::Poll::Ready(Err(std::io::ErrorKind::BrokenPipe.into()))
        }

        fn poll_flush(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            std::task::Poll::Ready(Ok(()))
        }

        fn poll_shutdown(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            std::task::Poll::Ready(Ok(()))
        }
    }

    struct WriteFailingUpgrader {
        dropped: Arc<AtomicBool>,
        // Keeps the other end open so the reader never sees EOF on its own.
        peer: Mutex<Option<tokio::io::DuplexStream>>,
    }

    #[async_trait]
    impl StreamUpgrader for WriteFailingUpgrader {
        async fn upgrade(&self, _tcp: TcpStream) -> Result<BoxedStream, DriverError> {
            let (inner, peer) = tokio::io::duplex(64);
            *self.peer.lock().unwrap() = Some(peer);
            Ok(Box::new(WriteFailingStream {
                inner,
                dropped: Arc::clone(&self.dropped),
            }))
        }
    }

    #[tokio::test]
    async fn test_failed_handshake_write_joins_reader_before_returning() {
        // Arrange: TCP connects, but the upgraded stream rejects every write
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = tokio::spawn(async move { listener.accept().await.map(|(socket, _)| socket) });
        let dropped = Arc::new(AtomicBool::new(false));
        let upgrader = Arc::new(WriteFailingUpgrader {
            dropped: Arc::clone(&dropped),
            peer: Mutex::new(None),
        });
        let config = ConnectionConfig {
            port,
            connect_timeout_ms: 1_000,
            retry_delay_ms: 50,
            ..ConnectionConfig::default()
        };
        let launcher = Arc::new(MockProcessLauncher::new());
        let link = ConnectionManager::new(config, Duration::from_millis(10), Arc::clone(&launcher) as _, upgrader);

        // Act
        let result = link.open().await;

        // Assert: the reader's half was released before open returned
        assert!(matches!(&result, Err(DriverError::Io(e)) if e.kind() == std::io::ErrorKind::BrokenPipe));
        assert!(dropped.load(Ordering::SeqCst), "reader task must not outlive a failed connect");
        assert_eq!(link.state(), ConnectionState::Disconnected);
        assert!(launcher.last_process().unwrap().killed.load(Ordering::SeqCst));
        drop(server);
    }

    #[test]
    fn test_refused_and_reset_are_transient() {
        use std::io::{Error, ErrorKind};
        assert!(is_transient(&Error::from(ErrorKind::ConnectionRefused)));
        assert!(is_transient(&Error::from(ErrorKind::ConnectionReset)));
        assert!(!is_transient(&Error::from(ErrorKind::PermissionDenied)));
        assert!(!is_transient(&Error::from(ErrorKind::InvalidInput)));
    }
}
