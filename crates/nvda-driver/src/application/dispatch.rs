//! Turns commands and key combinations into key messages on a [`RemoteLink`].
//!
//! These are the un-tracked building blocks the [`NvdaDriver`] facade wraps.
//! Nested uses (a command sent as the trigger of a speech wait, the quit
//! command sent during disconnect) call them directly so they are not
//! counted twice by the disposal gate.
//!
//! [`NvdaDriver`]: crate::application::NvdaDriver

use std::time::Duration;

use nvda_core::{Command, Key, KeyCombination, KeyboardLayout, OutboundMessage};
use tracing::{debug, info};

use super::link::RemoteLink;
use super::speech;
use crate::domain::SpeechConfig;
use crate::error::DriverError;

/// Types one combination: every key down in order, then up in reverse.
pub async fn send_combination(link: &dyn RemoteLink, combination: &KeyCombination) -> Result<(), DriverError> {
    link.check_connectivity()?;
    for stroke in combination.strokes() {
        debug!(
            vk_code = stroke.key.vk_code,
            scan_code = stroke.key.scan_code,
            pressed = stroke.pressed,
            "key"
        );
        link.send(&OutboundMessage::from(stroke)).await?;
    }
    Ok(())
}

/// Types each combination in turn, skipping empty ones.
pub async fn send_combinations(link: &dyn RemoteLink, combinations: &[KeyCombination]) -> Result<(), DriverError> {
    link.check_connectivity()?;
    for combination in combinations.iter().filter(|c| !c.is_empty()) {
        send_combination(link, combination).await?;
    }
    Ok(())
}

/// Presses and releases each key on its own, in order.
pub async fn send_key_sequence(link: &dyn RemoteLink, keys: &[Key]) -> Result<(), DriverError> {
    link.check_connectivity()?;
    for &key in keys {
        send_combination(link, &KeyCombination::new([key])).await?;
    }
    Ok(())
}

/// Sends `command`'s binding for `layout`.
///
/// # Errors
///
/// [`DriverError::InvalidCommand`] before anything is written if the command
/// has no usable binding for `layout`.
pub async fn dispatch(link: &dyn RemoteLink, command: &Command, layout: KeyboardLayout) -> Result<(), DriverError> {
    let combinations = command.combinations_for(layout)?;
    info!(command = %command.name, %layout, "sending command");
    send_combinations(link, combinations).await
}

/// Silences NVDA by tapping Control until it reports a cancel.
pub async fn stop_speaking(
    link: &dyn RemoteLink,
    speech: &SpeechConfig,
    timeout: Option<Duration>,
) -> Result<(), DriverError> {
    link.check_connectivity()?;
    let subscription = link.subscribe();
    let control = KeyCombination::new([Key::CONTROL]);
    speech::stop_speaking(
        subscription,
        || send_combination(link, &control),
        timeout.unwrap_or_else(|| speech.stop_speaking_timeout()),
        speech.poll_interval(),
    )
    .await
}

/// Stops current speech, runs `trigger` and returns what NVDA says next.
///
/// `timeout` and `quiet_period` default to `speech_config`.
pub async fn await_speech_after<F, Fut>(
    link: &dyn RemoteLink,
    speech_config: &SpeechConfig,
    timeout: Option<Duration>,
    quiet_period: Option<Duration>,
    trigger: F,
) -> Result<String, DriverError>
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = Result<(), DriverError>>,
{
    stop_speaking(link, speech_config, None).await?;
    let subscription = link.subscribe();
    link.check_connectivity()?;
    speech::wait_for_next_utterance(
        subscription,
        Some(trigger()),
        timeout.unwrap_or_else(|| speech_config.utterance_timeout()),
        quiet_period.unwrap_or_else(|| speech_config.quiet_period()),
    )
    .await
}

/// Sends `command` and returns the utterance it provokes.
///
/// The binding is validated before speech is stopped, so an invalid command
/// writes nothing at all.
pub async fn dispatch_and_await_speech(
    link: &dyn RemoteLink,
    command: &Command,
    layout: KeyboardLayout,
    speech_config: &SpeechConfig,
    timeout: Option<Duration>,
    quiet_period: Option<Duration>,
) -> Result<String, DriverError> {
    let combinations = command.combinations_for(layout)?;
    info!(command = %command.name, %layout, "sending command and waiting for speech");
    await_speech_after(link, speech_config, timeout, quiet_period, || {
        send_combinations(link, combinations)
    })
    .await
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::link::mock::RecordingLink;
    use crate::domain::RemoteEvent;

    fn short_speech() -> SpeechConfig {
        SpeechConfig {
            utterance_timeout_ms: 1_000,
            quiet_period_ms: 100,
            poll_interval_ms: 50,
            stop_speaking_timeout_ms: 200,
        }
    }

    #[tokio::test]
    async fn test_combination_presses_in_order_and_releases_in_reverse() {
        // Arrange
        let link = RecordingLink::new();
        link.connect_now();

        // Act
        send_combination(&link, &KeyCombination::new([Key::NVDA, Key::T])).await.unwrap();

        // Assert
        assert_eq!(link.keys_sent(), vec![(45, true), (84, true), (84, false), (45, false)]);
    }

    #[tokio::test]
    async fn test_empty_combination_in_sequence_is_skipped() {
        let link = RecordingLink::new();
        link.connect_now();
        let combos = vec![KeyCombination::default(), KeyCombination::new([Key::TAB])];

        send_combinations(&link, &combos).await.unwrap();

        assert_eq!(link.keys_sent(), vec![(9, true), (9, false)]);
    }

    #[tokio::test]
    async fn test_key_sequence_taps_each_key_separately() {
        let link = RecordingLink::new();
        link.connect_now();

        send_key_sequence(&link, &[Key::H, Key::I]).await.unwrap();

        assert_eq!(link.keys_sent(), vec![(72, true), (72, false), (73, true), (73, false)]);
    }

    #[tokio::test]
    async fn test_send_without_connection_is_not_connected() {
        let link = RecordingLink::new();

        let result = send_combination(&link, &KeyCombination::new([Key::A])).await;

        assert!(matches!(result, Err(DriverError::NotConnected)));
        assert!(link.sent().is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_uses_layout_binding() {
        // Arrange
        let link = RecordingLink::new();
        link.connect_now();
        let command = Command::with_layouts(
            "ReportSelection",
            vec![KeyCombination::new([Key::NVDA, Key::END])],
            vec![KeyCombination::new([Key::NVDA, Key::SHIFT, Key::END])],
        );

        // Act
        dispatch(&link, &command, KeyboardLayout::Laptop).await.unwrap();

        // Assert
        let pressed: Vec<u8> = link.keys_sent().into_iter().filter(|(_, p)| *p).map(|(vk, _)| vk).collect();
        assert_eq!(pressed, vec![45, 160, 35]);
    }

    #[tokio::test]
    async fn test_dispatch_invalid_command_writes_nothing() {
        // Arrange: no laptop binding
        let link = RecordingLink::new();
        link.connect_now();
        let command = Command::with_layouts("DesktopOnly", vec![KeyCombination::new([Key::NVDA])], Vec::new());

        // Act
        let result = dispatch_and_await_speech(&link, &command, KeyboardLayout::Laptop, &short_speech(), None, None).await;

        // Assert
        assert!(matches!(result, Err(DriverError::InvalidCommand(_))));
        assert!(link.sent().is_empty());
    }

    #[tokio::test]
    async fn test_stop_speaking_sends_control_until_cancel() {
        let link = RecordingLink::nvda_like(0, "");
        link.connect_now();

        stop_speaking(&link, &short_speech(), None).await.unwrap();

        assert_eq!(link.keys_sent(), vec![(162, true), (162, false)]);
    }

    #[tokio::test]
    async fn test_dispatch_and_await_speech_returns_utterance() {
        // Arrange
        let link = RecordingLink::nvda_like(Key::T.vk_code, "Untitled - Notepad");
        link.connect_now();
        let command = Command::new("ReportTitle", vec![KeyCombination::new([Key::NVDA, Key::T])]);

        // Act
        let text = dispatch_and_await_speech(&link, &command, KeyboardLayout::Desktop, &short_speech(), None, None)
            .await
            .unwrap();

        // Assert
        assert_eq!(text, "Untitled - Notepad");
        assert_eq!(
            link.keys_sent(),
            vec![(162, true), (162, false), (45, true), (84, true), (84, false), (45, false)]
        );
    }

    #[tokio::test]
    async fn test_await_speech_propagates_stop_speaking_timeout() {
        // Arrange: a peer that never confirms the cancel
        let link = RecordingLink::new();
        link.connect_now();

        // Act
        let result = await_speech_after(&link, &short_speech(), None, None, || async { Ok(()) }).await;

        // Assert
        assert!(matches!(result, Err(DriverError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_speech_from_before_the_trigger_is_not_returned() {
        // Arrange: stale speech is published before the wait subscribes
        let link = RecordingLink::nvda_like(Key::T.vk_code, "fresh");
        link.connect_now();
        link.emit(RemoteEvent::Speak("stale".into()));

        let tap_t = KeyCombination::new([Key::T]);

        // Act
        let text = await_speech_after(&link, &short_speech(), None, None, || send_combination(&link, &tap_t))
        .await
        .unwrap();

        // Assert
        assert_eq!(text, "fresh");
    }

    #[tokio::test(start_paused = true)]
    async fn test_per_call_timeout_overrides_configured_timeout() {
        // Arrange: NVDA cancels on Control but never speaks
        let link = RecordingLink::nvda_like(0, "");
        link.connect_now();
        let command = Command::new("ReportTitle", vec![KeyCombination::new([Key::NVDA, Key::T])]);
        let started = tokio::time::Instant::now();

        // Act
        let result = dispatch_and_await_speech(
            &link,
            &command,
            KeyboardLayout::Desktop,
            &short_speech(),
            Some(Duration::from_secs(5)),
            None,
        )
        .await;

        // Assert: the 5 s override was used instead of the configured 1 s
        assert!(matches!(result, Err(DriverError::Timeout(_))));
        assert!(started.elapsed() >= Duration::from_secs(5));
    }
}
