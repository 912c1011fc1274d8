//! JSON line codec for the NVDA Remote protocol.
//!
//! Wire format, one object per line (UTF-8, `\n` terminated):
//! ```text
//! → {"type":"protocol_version","version":2}
//! → {"type":"join","connection_type":"master","channel":"NvdaRemote"}
//! → {"type":"key","scan_code":20,"extended":false,"vk_code":84,"pressed":true}
//! ← {"type":"speak","sequence":["Untitled - Notepad",{"type":"pitch"}],"priority":0}
//! ← {"type":"cancel"}
//! ```
//!
//! Decoding is deliberately forgiving.  NVDA Remote relays many message types
//! the driver has no use for (`set_braille_info`, `tone`, `client_joined`, …),
//! and a malformed line must never stop the reader, so everything that is not
//! a usable speak or cancel message decodes to `None`.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::protocol::messages::{InboundEvent, OutboundMessage};

/// Errors that can occur while encoding or decoding protocol lines.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The line is not valid JSON, or lacks a string `type` field.
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),

    /// `type` is `speak` but `sequence` is not an array.
    #[error("speak message without a sequence array")]
    MissingSequence,
}

/// Shape shared by every inbound message: a `type` tag plus optional payload.
#[derive(Debug, Deserialize)]
struct RawInbound {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    sequence: Option<Value>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Encodes an [`OutboundMessage`] as a single JSON line ending in `\n`.
///
/// # Errors
///
/// Returns [`ProtocolError::Malformed`] if serialization fails, which cannot
/// happen for the message types defined in this crate.
///
/// # Examples
///
/// ```rust
/// use nvda_core::{encode_message, Key, OutboundMessage};
///
/// let line = encode_message(&OutboundMessage::key(Key::T, true)).unwrap();
/// assert!(line.ends_with('\n'));
/// assert_eq!(line.lines().count(), 1);
/// ```
pub fn encode_message(msg: &OutboundMessage) -> Result<String, ProtocolError> {
    let mut line = serde_json::to_string(msg)?;
    line.push('\n');
    Ok(line)
}

/// Decodes one line, reporting why it was unusable.
///
/// Returns `Ok(None)` for well-formed messages the driver ignores (unknown
/// types, or speak messages with no text left after normalization).
///
/// # Errors
///
/// Returns [`ProtocolError`] when the line is not a JSON object with a string
/// `type`, or a speak message has no sequence array.
pub fn try_decode_line(line: &str) -> Result<Option<InboundEvent>, ProtocolError> {
    let raw: RawInbound = serde_json::from_str(line.trim())?;
    match raw.kind.as_str() {
        "cancel" => Ok(Some(InboundEvent::Cancel)),
        "speak" => match raw.sequence {
            Some(Value::Array(items)) => Ok(decode_speak_sequence(&items)),
            _ => Err(ProtocolError::MissingSequence),
        },
        _ => Ok(None),
    }
}

/// Decodes one line, dropping anything unusable.
///
/// # Examples
///
/// ```rust
/// use nvda_core::{decode_line, InboundEvent};
///
/// let event = decode_line(r#"{"type":"speak","sequence":["Hello","World"]}"#);
/// assert_eq!(event, Some(InboundEvent::Speak("Hello\nWorld".into())));
/// assert_eq!(decode_line("not json"), None);
/// ```
pub fn decode_line(line: &str) -> Option<InboundEvent> {
    match try_decode_line(line) {
        Ok(event) => event,
        Err(e) => {
            debug!("dropping inbound line: {e}");
            None
        }
    }
}

/// Decodes every non-blank line of an accumulated text block.
pub fn decode_text(text: &str) -> Vec<InboundEvent> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(decode_line)
        .collect()
}

/// Normalizes one spoken fragment.
///
/// Trims spaces, CR, LF and tabs from both ends, collapses every run of
/// whitespace into one space, then form-url-decodes the result (`+` becomes a
/// space, `%XX` escapes are decoded).  Text with an invalid escape is kept
/// as it was before decoding.
pub fn sanitize_fragment(fragment: &str) -> String {
    let trimmed = fragment.trim_matches(|c| matches!(c, ' ' | '\r' | '\n' | '\t'));
    let collapsed = trimmed.split_whitespace().collect::<Vec<_>>().join(" ");
    let plus_decoded = collapsed.replace('+', " ");
    match urlencoding::decode(&plus_decoded) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => plus_decoded,
    }
}

// ── Speak decoding ────────────────────────────────────────────────────────────

fn decode_speak_sequence(items: &[Value]) -> Option<InboundEvent> {
    if let [only] = items {
        if is_cancel_object(only) {
            return Some(InboundEvent::Cancel);
        }
    }

    let fragments: Vec<String> = items
        .iter()
        .filter_map(Value::as_str)
        .map(sanitize_fragment)
        .filter(|f| !f.is_empty())
        .collect();

    if fragments.is_empty() {
        None
    } else {
        Some(InboundEvent::Speak(fragments.join("\n")))
    }
}

fn is_cancel_object(value: &Value) -> bool {
    value
        .as_object()
        .and_then(|obj| obj.get("type"))
        .and_then(Value::as_str)
        == Some("cancel")
}

// ── Tests ─────────────────────────────────────────────────────────────────────
