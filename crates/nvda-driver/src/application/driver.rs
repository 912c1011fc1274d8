//! [`NvdaDriver`]: the public facade every caller talks to.
//!
//! Each method is one tracked operation.  Once [`NvdaDriver::dispose`] has
//! been called, new operations fail with [`DriverError::Disposed`], calls
//! already running finish normally, and the connection is shut down after the
//! last of them returns.

use std::sync::Arc;
use std::time::Duration;

use nvda_core::commands;
use nvda_core::{Command, Key, KeyCombination, KeyboardLayout};
use tokio::sync::broadcast;
use tracing::{info, warn};

use super::dispatch;
use super::link::RemoteLink;
use super::speech;
use super::tracker::TaskTracker;
use crate::domain::{RemoteEvent, SpeechConfig};
use crate::error::DriverError;

struct Inner {
    link: Arc<dyn RemoteLink>,
    tracker: TaskTracker,
    layout: KeyboardLayout,
    speech: SpeechConfig,
}

impl Inner {
    /// Sends the quit command if the link is still writable, then closes it.
    async fn shut_down(&self) -> Result<(), DriverError> {
        if !self.link.begin_close() {
            return Ok(());
        }
        if self.link.check_connectivity().is_ok() {
            if let Err(e) = dispatch::dispatch(self.link.as_ref(), commands::quit_nvda(), self.layout).await {
                warn!("could not send the quit command: {e}");
            }
        }
        self.link.close().await
    }
}

/// A client of a local NVDA Remote server.
///
/// Cheap to clone; clones share one connection.  All methods take `&self`,
/// but key messages from concurrent calls are interleaved line by line, so
/// drive one NVDA instance from one task at a time.
#[derive(Clone)]
pub struct NvdaDriver {
    inner: Arc<Inner>,
}

impl NvdaDriver {
    pub fn new(link: Arc<dyn RemoteLink>, layout: KeyboardLayout, speech: SpeechConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                link,
                tracker: TaskTracker::new(),
                layout,
                speech,
            }),
        }
    }

    /// The layout whose bindings [`NvdaDriver::send_command`] uses.
    pub fn layout(&self) -> KeyboardLayout {
        self.inner.layout
    }

    /// Subscribes to raw data, speech and cancel events from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<RemoteEvent> {
        self.inner.link.subscribe()
    }

    /// Launches NVDA, connects and performs the handshake.
    ///
    /// # Errors
    ///
    /// [`DriverError::AlreadyConnected`] if a connection exists or is being
    /// set up or torn down.
    pub async fn connect(&self) -> Result<(), DriverError> {
        let inner = &self.inner;
        inner.tracker.track(inner.link.open()).await?;
        info!("connected to NVDA Remote");
        Ok(())
    }

    /// Quits NVDA and closes the connection.  Does nothing when not
    /// connected.
    pub async fn disconnect(&self) -> Result<(), DriverError> {
        let inner = &self.inner;
        inner.tracker.track(inner.shut_down()).await
    }

    /// # Errors
    ///
    /// [`DriverError::NotConnected`] unless the connection is writable.
    pub fn check_connectivity(&self) -> Result<(), DriverError> {
        let inner = &self.inner;
        inner.tracker.track_sync(|| inner.link.check_connectivity())
    }

    /// Holds `keys` down together, in order, then releases them in reverse.
    pub async fn send_keys(&self, keys: &[Key]) -> Result<(), DriverError> {
        let inner = &self.inner;
        let combination = KeyCombination::from(keys);
        inner
            .tracker
            .track(dispatch::send_combination(inner.link.as_ref(), &combination))
            .await
    }

    /// Types each combination in turn.
    pub async fn send_key_combinations(&self, combinations: &[KeyCombination]) -> Result<(), DriverError> {
        let inner = &self.inner;
        inner
            .tracker
            .track(dispatch::send_combinations(inner.link.as_ref(), combinations))
            .await
    }

    /// Taps each key on its own.
    pub async fn send_key_sequence(&self, keys: &[Key]) -> Result<(), DriverError> {
        let inner = &self.inner;
        inner
            .tracker
            .track(dispatch::send_key_sequence(inner.link.as_ref(), keys))
            .await
    }

    /// Sends a named command using the configured layout.
    ///
    /// # Errors
    ///
    /// [`DriverError::InvalidCommand`] if the command has no usable binding
    /// for the layout; nothing is written in that case.
    pub async fn send_command(&self, command: &Command) -> Result<(), DriverError> {
        let inner = &self.inner;
        inner
            .tracker
            .track(dispatch::dispatch(inner.link.as_ref(), command, inner.layout))
            .await
    }

    /// Waits for whatever NVDA says next.
    ///
    /// `timeout` and `quiet_period` default to the speech configuration.
    pub async fn wait_for_next_utterance(
        &self,
        timeout: Option<Duration>,
        quiet_period: Option<Duration>,
    ) -> Result<String, DriverError> {
        self.wait_for_next_utterance_with(std::future::ready(Ok(())), timeout, quiet_period)
            .await
    }

    /// Subscribes, awaits `trigger`, then waits for the utterance it
    /// provokes.  The timeout starts once `trigger` has completed.
    pub async fn wait_for_next_utterance_with<Fut>(
        &self,
        trigger: Fut,
        timeout: Option<Duration>,
        quiet_period: Option<Duration>,
    ) -> Result<String, DriverError>
    where
        Fut: std::future::Future<Output = Result<(), DriverError>>,
    {
        let inner = &self.inner;
        let speech_config = &inner.speech;
        inner
            .tracker
            .track(async {
                let subscription = inner.link.subscribe();
                inner.link.check_connectivity()?;
                speech::wait_for_next_utterance(
                    subscription,
                    Some(trigger),
                    timeout.unwrap_or_else(|| speech_config.utterance_timeout()),
                    quiet_period.unwrap_or_else(|| speech_config.quiet_period()),
                )
                .await
            })
            .await
    }

    /// Taps Control until NVDA reports that speech was cancelled.
    ///
    /// # Errors
    ///
    /// [`DriverError::Timeout`] if no cancel arrives within `timeout`
    /// (default: the configured stop-speaking timeout).
    pub async fn stop_speaking(&self, timeout: Option<Duration>) -> Result<(), DriverError> {
        let inner = &self.inner;
        inner
            .tracker
            .track(dispatch::stop_speaking(inner.link.as_ref(), &inner.speech, timeout))
            .await
    }

    /// Stops speech, presses `keys` together and returns the resulting
    /// utterance.
    ///
    /// `timeout` and `quiet_period` default to the speech configuration, as
    /// for every `*_and_get_spoken_text` method.
    pub async fn send_keys_and_get_spoken_text(
        &self,
        keys: &[Key],
        timeout: Option<Duration>,
        quiet_period: Option<Duration>,
    ) -> Result<String, DriverError> {
        let inner = &self.inner;
        let link = inner.link.as_ref();
        let combination = KeyCombination::from(keys);
        inner
            .tracker
            .track(dispatch::await_speech_after(link, &inner.speech, timeout, quiet_period, || {
                dispatch::send_combination(link, &combination)
            }))
            .await
    }

    /// Stops speech, types each combination and returns the resulting
    /// utterance.
    pub async fn send_key_combinations_and_get_spoken_text(
        &self,
        combinations: &[KeyCombination],
        timeout: Option<Duration>,
        quiet_period: Option<Duration>,
    ) -> Result<String, DriverError> {
        let inner = &self.inner;
        let link = inner.link.as_ref();
        inner
            .tracker
            .track(dispatch::await_speech_after(link, &inner.speech, timeout, quiet_period, || {
                dispatch::send_combinations(link, combinations)
            }))
            .await
    }

    /// Stops speech, taps each key and returns the resulting utterance.
    pub async fn send_key_sequence_and_get_spoken_text(
        &self,
        keys: &[Key],
        timeout: Option<Duration>,
        quiet_period: Option<Duration>,
    ) -> Result<String, DriverError> {
        let inner = &self.inner;
        let link = inner.link.as_ref();
        inner
            .tracker
            .track(dispatch::await_speech_after(link, &inner.speech, timeout, quiet_period, || {
                dispatch::send_key_sequence(link, keys)
            }))
            .await
    }

    /// Stops speech, sends `command` and returns the resulting utterance.
    ///
    /// # Errors
    ///
    /// [`DriverError::InvalidCommand`] before anything is written if the
    /// command has no usable binding; otherwise as
    /// [`NvdaDriver::stop_speaking`] and [`NvdaDriver::wait_for_next_utterance`].
    pub async fn send_command_and_get_spoken_text(
        &self,
        command: &Command,
        timeout: Option<Duration>,
        quiet_period: Option<Duration>,
    ) -> Result<String, DriverError> {
        let inner = &self.inner;
        inner
            .tracker
            .track(dispatch::dispatch_and_await_speech(
                inner.link.as_ref(),
                command,
                inner.layout,
                &inner.speech,
                timeout,
                quiet_period,
            ))
            .await
    }

    /// Rejects new operations, lets running ones finish, then disconnects.
    ///
    /// Resolves once the disconnect has run.  Calling it again is harmless.
    pub async fn dispose(&self) {
        let inner = Arc::clone(&self.inner);
        self.inner
            .tracker
            .begin_dispose(move || async move {
                if let Err(e) = inner.shut_down().await {
                    warn!("error while shutting down during dispose: {e}");
                }
                info!("driver disposed");
            })
            .await;
        self.inner.tracker.wait_finalized().await;
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.tracker.is_disposing()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
