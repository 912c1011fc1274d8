//! Keyboard keys as NVDA Remote expects them on the wire.
//!
//! NVDA Remote replays keys on the controlled machine using the Windows
//! virtual-key code, the hardware scan code, and the "extended" flag that
//! distinguishes e.g. the navigation-cluster Home from numpad 7.  A [`Key`]
//! carries exactly those three values.

pub mod combination;
pub mod keys;
pub mod names;

pub use combination::{KeyCombination, KeyParseError, KeyStroke};
pub use keys::Key;
