//! Background task that turns the inbound byte stream into [`RemoteEvent`]s.
//!
//! # Streaming (for beginners)
//!
//! A single `read()` may return half a line or several lines at once.  The
//! [`LineFramer`] keeps partial lines until their newline arrives.  Complete
//! lines are collected while reads keep filling the whole buffer, and once a
//! read comes back short (or a full read ends exactly on a line boundary)
//! the batch is published as:
//!
//! 1. one [`RemoteEvent::Data`] with the raw lines joined by `\n`, then
//! 2. one typed event per line that decodes to a speak or cancel message.
//!
//! Unknown message types and malformed lines are dropped with a debug log.
//! When the peer closes the stream, or a read fails, the connection is marked
//! unwritable so later sends fail fast with `NotConnected`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use nvda_core::{decode_text, LineFramer};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::RemoteEvent;

const READ_CHUNK: usize = 4096;

/// Reads until EOF, a read error or `cancel` fires.
pub async fn run_reader<R>(
    mut reader: R,
    events: broadcast::Sender<RemoteEvent>,
    writable: Arc<AtomicBool>,
    cancel: CancellationToken,
) where
    R: AsyncRead + Unpin,
{
    let mut framer = LineFramer::new();
    let mut read_tmp = vec![0u8; READ_CHUNK];
    // Complete lines waiting to be published as one batch.
    let mut batch: Vec<String> = Vec::new();

    loop {
        let n = tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                debug!("reader cancelled");
                return;
            }
            read = reader.read(&mut read_tmp) => match read {
                Ok(0) => {
                    info!("NVDA Remote closed the connection");
                    break;
                }
                Ok(n) => n,
                Err(e) => {
                    warn!("read from NVDA Remote failed: {e}");
                    break;
                }
            },
        };

        batch.extend(framer.push(&read_tmp[..n]));
        let boundary = if n < READ_CHUNK {
            // A short read means the peer has paused; a last object sent
            // without its newline is complete by now.
            batch.extend(framer.take_complete_remainder());
            true
        } else {
            // A full buffer may be followed by more of the same burst.
            framer.pending() == 0
        };
        if boundary && !batch.is_empty() {
            publish(&events, &batch.join("\n"));
            batch.clear();
        }
    }

    // Lines held back behind a full read still reach subscribers.
    batch.extend(framer.take_complete_remainder());
    if !batch.is_empty() {
        publish(&events, &batch.join("\n"));
    }
    writable.store(false, Ordering::SeqCst);
}

fn publish(events: &broadcast::Sender<RemoteEvent>, text: &str) {
    // `send` only fails when nobody is subscribed, which is normal.
    let _ = events.send(RemoteEvent::Data(text.to_string()));
    for event in decode_text(text) {
        debug!(?event, "inbound event");
        let _ = events.send(RemoteEvent::from(event));
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
