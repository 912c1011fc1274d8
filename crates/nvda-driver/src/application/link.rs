//! The seam between driver logic and the transport.

use async_trait::async_trait;
use nvda_core::OutboundMessage;
use tokio::sync::broadcast;

use crate::domain::RemoteEvent;
use crate::error::DriverError;

/// A connection to NVDA Remote as seen by the application layer.
///
/// Implementations own the connection state machine
/// (`Disconnected → Connecting → Connected → Disconnecting → Disconnected`).
#[async_trait]
pub trait RemoteLink: Send + Sync {
    /// Starts NVDA, connects, performs the handshake and starts reading.
    ///
    /// # Errors
    ///
    /// [`DriverError::AlreadyConnected`] unless the link is disconnected;
    /// otherwise process or transport errors as they occurred.
    async fn open(&self) -> Result<(), DriverError>;

    /// Moves a connected link to disconnecting.  Returns `false` when there
    /// is no live connection to tear down.
    fn begin_close(&self) -> bool;

    /// Stops the reader, releases the transport and stops NVDA.
    async fn close(&self) -> Result<(), DriverError>;

    /// # Errors
    ///
    /// [`DriverError::NotConnected`] if the transport is absent or no
    /// longer writable.
    fn check_connectivity(&self) -> Result<(), DriverError>;

    /// Writes one message as a single line.
    async fn send(&self, message: &OutboundMessage) -> Result<(), DriverError>;

    /// Subscribes to events published from now on.
    fn subscribe(&self) -> broadcast::Receiver<RemoteEvent>;
}

// ── Test double ───────────────────────────────────────────────────────────────
