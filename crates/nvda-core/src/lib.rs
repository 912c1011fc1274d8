//! # nvda-core
//!
//! Shared library for the NVDA Remote driver containing the key catalogue,
//! the named screen-reader command tables, the line-delimited JSON wire codec,
//! and the settings graph written into NVDA's `nvda.ini`.
//!
//! This crate has zero dependencies on sockets, processes, or an async
//! runtime.  Everything here is plain data plus pure functions, which keeps it
//! trivially testable.
//!
//! # Architecture overview (for beginners)
//!
//! NVDA is a screen reader.  Its "NVDA Remote" add-on lets one machine (the
//! *master*) send keystrokes to another NVDA instance and receive the text it
//! speaks.  The driver built on top of this crate connects to a local NVDA as
//! a master so that automated accessibility tests can assert on what NVDA
//! says.
//!
//! This crate defines:
//!
//! - **`keymap`** – Windows virtual-key / scan-code pairs for every key the
//!   driver can press, plus [`KeyCombination`] for keys held down together.
//!
//! - **`commands`** – The catalogue of named NVDA commands (e.g. "report
//!   title" is NVDA+T), each with a desktop and a laptop keyboard binding.
//!
//! - **`protocol`** – How messages travel over the wire: one JSON object per
//!   line, in both directions.
//!
//! - **`settings`** – The NVDA configuration graph and its ini renderer.
//!
//! - **`text`** – [`text_contains`], the forgiving comparison tests use to
//!   assert on what NVDA said.

pub mod commands;
pub mod keymap;
pub mod protocol;
pub mod settings;
pub mod text;

// Re-export the most-used types at the crate root so callers can write
// `nvda_core::Key` instead of `nvda_core::keymap::keys::Key`.
pub use commands::{Command, CommandError, KeyboardLayout};
pub use keymap::{Key, KeyCombination, KeyParseError, KeyStroke};
pub use protocol::codec::{decode_line, decode_text, encode_message, ProtocolError};
pub use protocol::framing::LineFramer;
pub use protocol::messages::{InboundEvent, OutboundMessage};
pub use settings::{render_ini, NvdaSettings};
pub use text::text_contains;
