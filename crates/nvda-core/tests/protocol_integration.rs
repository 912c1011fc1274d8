//! Integration tests for the nvda-core wire path.
//!
//! These tests drive the public API the way the driver does: a catalogued
//! command is turned into key strokes and encoded, and raw bytes arriving in
//! arbitrary chunks are framed and decoded into events.

use nvda_core::commands::{self, KeyboardLayout};
use nvda_core::{
    decode_line, decode_text, encode_message, InboundEvent, Key, KeyCombination, LineFramer,
    OutboundMessage,
};
use serde_json::Value;

/// Encodes every stroke of `command` for `layout` and parses the lines back
/// into JSON values.
fn wire_lines(command: &str, layout: KeyboardLayout) -> Vec<Value> {
    let cmd = commands::find(command).expect("command must be catalogued");
    cmd.combinations_for(layout)
        .expect("command must be dispatchable")
        .iter()
        .flat_map(|combo| combo.strokes())
        .map(|stroke| encode_message(&OutboundMessage::from(stroke)).unwrap())
        .map(|line| serde_json::from_str(line.trim_end()).unwrap())
        .collect()
}

fn key_json(key: Key, pressed: bool) -> Value {
    serde_json::json!({
        "scan_code": key.scan_code,
        "extended": key.extended,
        "vk_code": key.vk_code,
        "pressed": pressed,
        "type": "key",
    })
}

#[test]
fn test_report_title_wire_sequence() {
    let lines = wire_lines("ReportTitle", KeyboardLayout::Desktop);

    assert_eq!(
        lines,
        vec![
            key_json(Key::NVDA, true),
            key_json(Key::T, true),
            key_json(Key::T, false),
            key_json(Key::NVDA, false),
        ]
    );
}

#[test]
fn test_double_tap_command_sends_each_combination_in_turn() {
    // Arrange: ReportDate is NVDA+F12 pressed twice
    let lines = wire_lines("ReportDate", KeyboardLayout::Desktop);

    // Assert: two complete press/release cycles
    let single = vec![
        key_json(Key::NVDA, true),
        key_json(Key::F12, true),
        key_json(Key::F12, false),
        key_json(Key::NVDA, false),
    ];
    assert_eq!(lines.len(), 8);
    assert_eq!(&lines[..4], single.as_slice());
    assert_eq!(&lines[4..], single.as_slice());
}

#[test]
fn test_laptop_layout_selects_laptop_binding() {
    let lines = wire_lines("ReportStatusBar", KeyboardLayout::Laptop);

    assert_eq!(lines.len(), 6);
    assert_eq!(lines[1], key_json(Key::SHIFT, true));
    assert_eq!(lines[5], key_json(Key::NVDA, false));
}

#[test]
fn test_every_catalogued_command_is_dispatchable_on_both_layouts() {
    for (group, cmd) in commands::all() {
        for layout in [KeyboardLayout::Desktop, KeyboardLayout::Laptop] {
            assert!(
                cmd.combinations_for(layout).is_ok(),
                "{group} command {cmd} has no usable {layout} binding"
            );
        }
    }
}

#[test]
fn test_chunked_stream_decodes_to_events() {
    // Arrange: three messages split at awkward byte offsets
    let stream = concat!(
        r#"{"type":"speak","sequence":["Untitled - Notepad"],"priority":0}"#,
        "\n",
        r#"{"type":"client_joined","user_id":2}"#,
        "\n",
        r#"{"type":"cancel"}"#,
        "\n",
    )
    .as_bytes();
    let mut framer = LineFramer::new();

    // Act
    let mut lines = Vec::new();
    for chunk in stream.chunks(7) {
        lines.extend(framer.push(chunk));
    }
    let events = decode_text(&lines.join("\n"));

    // Assert
    assert_eq!(
        events,
        vec![
            InboundEvent::Speak("Untitled - Notepad".into()),
            InboundEvent::Cancel
        ]
    );
}

#[test]
fn test_hello_world_normalization() {
    let event = decode_line(r#"{"type":"speak","sequence":["  Hello ", "World%21"]}"#);
    assert_eq!(event, Some(InboundEvent::Speak("Hello\nWorld!".into())));
}
