//! Typed NVDA Remote messages.
//!
//! Outbound messages are what the driver (acting as the remote *master*)
//! sends; inbound events are the subset of what NVDA sends back that the
//! driver cares about.

use serde::{Deserialize, Serialize};

use crate::keymap::{Key, KeyStroke};

/// Protocol revision announced in the handshake.
pub const PROTOCOL_VERSION: u32 = 2;

/// Channel joined on the local relay.
pub const CHANNEL: &str = "NvdaRemote";

/// Role announced when joining: the master controls the NVDA instance.
pub const CONNECTION_TYPE: &str = "master";

/// Messages the driver writes to the remote server.
///
/// Serialized with an internal `type` tag, so `Key { .. }` becomes
/// `{"type": "key", "scan_code": .., ...}` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// First handshake line: negotiates the protocol revision.
    ProtocolVersion { version: u32 },

    /// Second handshake line: joins the relay channel as master.
    Join {
        connection_type: String,
        channel: String,
    },

    /// A single key transition to replay on the controlled machine.
    Key {
        scan_code: u16,
        extended: bool,
        vk_code: u8,
        pressed: bool,
    },
}

impl OutboundMessage {
    /// Builds the key message for `key` going down (`pressed`) or up.
    pub fn key(key: Key, pressed: bool) -> Self {
        OutboundMessage::Key {
            scan_code: key.scan_code,
            extended: key.extended,
            vk_code: key.vk_code,
            pressed,
        }
    }
}

impl From<KeyStroke> for OutboundMessage {
    fn from(stroke: KeyStroke) -> Self {
        OutboundMessage::key(stroke.key, stroke.pressed)
    }
}

/// The two handshake messages, in the order they must be written.
pub fn handshake() -> [OutboundMessage; 2] {
    [
        OutboundMessage::ProtocolVersion {
            version: PROTOCOL_VERSION,
        },
        OutboundMessage::Join {
            connection_type: CONNECTION_TYPE.to_string(),
            channel: CHANNEL.to_string(),
        },
    ]
}

/// Events decoded from the remote server's messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// NVDA spoke.  Fragments of one message are already normalized and
    /// joined with `\n`; the text is never empty.
    Speak(String),

    /// NVDA interrupted its current speech.
    Cancel,
}
