//! Events published by the message reader loop.

use nvda_core::InboundEvent;

/// One notification on the driver's broadcast channel.
///
/// Every batch of complete lines read from the stream is published once as
/// [`RemoteEvent::Data`], followed by one typed event per decodable line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteEvent {
    /// Raw text of the lines received in one read cycle, joined with `\n`.
    Data(String),

    /// NVDA spoke; fragments are normalized and joined with `\n`.
    Speak(String),

    /// NVDA cancelled its current speech.
    Cancel,
}

impl From<InboundEvent> for RemoteEvent {
    fn from(event: InboundEvent) -> Self {
        match event {
            InboundEvent::Speak(text) => RemoteEvent::Speak(text),
            InboundEvent::Cancel => RemoteEvent::Cancel,
        }
    }
}
