//! Speech waits: utterance aggregation and the stop-speaking handshake.
//!
//! Both functions consume a broadcast subscription taken *before* the action
//! that provokes NVDA, so no event published in between is missed.
//!
//! # Utterance aggregation
//!
//! NVDA often says one logical thing as several `speak` messages ("Notepad",
//! then "Untitled", then "edit").  [`wait_for_next_utterance`] collects them
//! until NVDA has been quiet for `quiet_period` after the latest fragment:
//!
//! ```text
//! trigger ─┬─ speak "a" ── 300 ms ── speak "b" ── 500 ms of silence ──► "a\nb"
//!          └──────────────── overall timeout bounds the whole wait ────────┘
//! ```

use std::future::Future;
use std::time::Duration;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use crate::domain::RemoteEvent;
use crate::error::DriverError;

/// Waits for the next utterance on `subscription`.
///
/// If `trigger` is given it is awaited first and the timeout starts when it
/// completes.  Fragments are joined with `\n`; whitespace-only fragments are
/// ignored.
///
/// # Errors
///
/// - [`DriverError::Timeout`] if nothing was said within `timeout`.
/// - [`DriverError::NotConnected`] if the event channel closed before any
///   speech arrived.
/// - Any error returned by `trigger`.
pub async fn wait_for_next_utterance<Fut>(
    mut subscription: broadcast::Receiver<RemoteEvent>,
    trigger: Option<Fut>,
    timeout: Duration,
    quiet_period: Duration,
) -> Result<String, DriverError>
where
    Fut: Future<Output = Result<(), DriverError>>,
{
    if let Some(trigger) = trigger {
        trigger.await?;
    }

    let deadline = Instant::now() + timeout;
    let mut quiet_deadline: Option<Instant> = None;
    let mut text = String::new();

    loop {
        let wake_at = match quiet_deadline {
            Some(quiet) => quiet.min(deadline),
            None => deadline,
        };

        tokio::select! {
            _ = time::sleep_until(wake_at) => break,
            received = subscription.recv() => match received {
                Ok(RemoteEvent::Speak(fragment)) => {
                    if fragment.trim().is_empty() {
                        continue;
                    }
                    debug!(fragment = %fragment, "speech fragment");
                    if !text.is_empty() {
                        text.push('\n');
                    }
                    text.push_str(&fragment);
                    quiet_deadline = Some(Instant::now() + quiet_period);
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "speech subscriber lagged; events were dropped");
                }
                Err(RecvError::Closed) => {
                    if text.is_empty() {
                        return Err(DriverError::NotConnected);
                    }
                    break;
                }
            },
        }
    }

    if text.is_empty() {
        return Err(DriverError::Timeout(format!(
            "no speech within {} ms",
            timeout.as_millis()
        )));
    }
    Ok(text)
}

/// Silences NVDA and waits for it to confirm.
///
/// Calls `send_control` once, then again on every `poll_interval` tick until
/// a [`RemoteEvent::Cancel`] arrives or `timeout` elapses.
///
/// # Errors
///
/// - [`DriverError::Timeout`] if no cancel was seen in time.
/// - [`DriverError::NotConnected`] if the event channel closed.
/// - Any error returned by `send_control`.
pub async fn stop_speaking<F, Fut>(
    mut subscription: broadcast::Receiver<RemoteEvent>,
    mut send_control: F,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<(), DriverError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), DriverError>>,
{
    send_control().await?;

    let deadline = time::sleep(timeout);
    tokio::pin!(deadline);

    let mut ticks = time::interval_at(Instant::now() + poll_interval, poll_interval);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;

            received = subscription.recv() => match received {
                Ok(RemoteEvent::Cancel) => {
                    debug!("speech cancelled");
                    return Ok(());
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "stop-speaking subscriber lagged; events were dropped");
                }
                Err(RecvError::Closed) => return Err(DriverError::NotConnected),
            },
            _ = &mut deadline => {
                return Err(DriverError::Timeout(format!(
                    "speech not cancelled within {} ms",
                    timeout.as_millis()
                )));
            }
            _ = ticks.tick() => {
                send_control().await?;
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
