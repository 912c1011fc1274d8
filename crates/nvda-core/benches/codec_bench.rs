//! Criterion benchmarks for the NVDA Remote JSON line codec.
//!
//! Measures key-message encoding (the hot path while dispatching commands)
//! and speak-line decoding (the hot path while NVDA reads a long document).
//!
//! Run with:
//! ```bash
//! cargo bench --package nvda-core --bench codec_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nvda_core::protocol::messages::handshake;
use nvda_core::{decode_line, decode_text, encode_message, Key, KeyCombination, LineFramer, OutboundMessage};

// ── Fixtures ──────────────────────────────────────────────────────────────────

const SHORT_SPEAK: &str = r#"{"type":"speak","sequence":["Untitled - Notepad"],"priority":0}"#;

const MIXED_SPEAK: &str = r#"{"type":"speak","sequence":[{"type":"pitch","offset":30},"  heading   level 2 ",{"type":"pitch","offset":0},"caf%C3%A9+menu","link"],"priority":0}"#;

const CANCEL: &str = r#"{"type":"cancel"}"#;

const UNKNOWN: &str = r#"{"type":"set_braille_info","name":"noBraille","cellCount":0}"#;

fn long_speak_line() -> String {
    let words: Vec<String> = (0..200).map(|i| format!("\"word {i}\"")).collect();
    format!(r#"{{"type":"speak","sequence":[{}],"priority":0}}"#, words.join(","))
}

// ── Benchmarks ────────────────────────────────────────────────────────────────

fn bench_encode(c: &mut Criterion) {
    let [version, join] = handshake();
    let messages: &[(&str, OutboundMessage)] = &[
        ("ProtocolVersion", version),
        ("Join", join),
        ("KeyDown", OutboundMessage::key(Key::NVDA, true)),
        ("KeyUp", OutboundMessage::key(Key::T, false)),
    ];

    let mut group = c.benchmark_group("encode_message");
    for (name, msg) in messages {
        group.bench_with_input(BenchmarkId::new("msg", name), msg, |b, msg| {
            b.iter(|| encode_message(black_box(msg)).expect("encode must succeed"))
        });
    }
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let long = long_speak_line();
    let lines: &[(&str, &str)] = &[
        ("ShortSpeak", SHORT_SPEAK),
        ("MixedSpeak", MIXED_SPEAK),
        ("LongSpeak", &long),
        ("Cancel", CANCEL),
        ("Unknown", UNKNOWN),
    ];

    let mut group = c.benchmark_group("decode_line");
    for (name, line) in lines {
        group.bench_with_input(BenchmarkId::new("line", name), line, |b, line| {
            b.iter(|| decode_line(black_box(line)))
        });
    }
    group.finish();
}

/// A full command dispatch: every stroke of NVDA+Shift+End encoded.
fn bench_dispatch_hot_path(c: &mut Criterion) {
    let combo: KeyCombination = "Nvda+Shift+End".parse().expect("valid combination");

    c.bench_function("encode_combination_strokes", |b| {
        b.iter(|| {
            black_box(&combo)
                .strokes()
                .map(|stroke| encode_message(&OutboundMessage::from(stroke)).unwrap())
                .collect::<Vec<_>>()
        })
    });
}

/// Framing plus decoding of one read holding several messages.
fn bench_read_path(c: &mut Criterion) {
    let chunk = format!("{CANCEL}\n{SHORT_SPEAK}\n{MIXED_SPEAK}\n{UNKNOWN}\n");

    c.bench_function("frame_and_decode_chunk", |b| {
        b.iter(|| {
            let mut framer = LineFramer::new();
            let lines = framer.push(black_box(chunk.as_bytes()));
            decode_text(&lines.join("\n"))
        })
    });
}

criterion_group!(
    benches,
    bench_encode,
    bench_decode,
    bench_dispatch_hot_path,
    bench_read_path
);
criterion_main!(benches);
