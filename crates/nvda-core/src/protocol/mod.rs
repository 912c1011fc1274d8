//! NVDA Remote wire protocol: message types, JSON codec, and line framing.
//!
//! Every message is a single JSON object terminated by `\n`, in both
//! directions.  The transport underneath (TLS over TCP) is a byte stream, so
//! the [`framing::LineFramer`] reassembles lines before the codec sees them.

pub mod codec;
pub mod framing;
pub mod messages;

pub use codec::{decode_line, decode_text, encode_message, sanitize_fragment, ProtocolError};
pub use framing::LineFramer;
pub use messages::{InboundEvent, OutboundMessage};
