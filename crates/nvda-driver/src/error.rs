//! Error type shared by every driver operation.

use nvda_core::{CommandError, ProtocolError};
use thiserror::Error;

use crate::infrastructure::storage::config::ConfigError;

/// Errors returned by [`crate::NvdaDriver`] and its collaborators.
#[derive(Debug, Error)]
pub enum DriverError {
    /// `connect` was called while a connection is live or being set up.
    #[error("the driver is already connected to NVDA")]
    AlreadyConnected,

    /// The operation needs a live, writable connection.
    #[error("the driver is not connected to NVDA")]
    NotConnected,

    /// The command has no usable key combinations for the active layout.
    #[error("invalid command: {0}")]
    InvalidCommand(#[from] CommandError),

    /// NVDA did not speak, or did not confirm a cancel, in time.
    #[error("timed out: {0}")]
    Timeout(String),

    /// The driver has been disposed and accepts no further operations.
    #[error("the driver has been disposed")]
    Disposed,

    /// Socket or file system failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The TLS handshake with NVDA Remote failed.
    #[error("TLS error: {0}")]
    Tls(#[from] native_tls::Error),

    /// A message could not be encoded.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The NVDA process could not be prepared, started or stopped.
    #[error("NVDA process error: {0}")]
    Process(String),

    /// The configuration file could not be read or written.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

// ── Tests ─────────────────────────────────────────────────────────────────────
