//! Name ↔ key lookup table.
//!
//! `NAMED_KEYS` lists each catalogued key once under its canonical name.
//! Where two names denote the same physical key (`Nvda` and `Insert`) the
//! first entry wins for [`name_of`].

use super::keys::Key;

/// Canonical names, in the order used for reverse lookup.
const NAMED_KEYS: &[(&str, Key)] = &[
    ("A", Key::A),
    ("B", Key::B),
    ("C", Key::C),
    ("D", Key::D),
    ("E", Key::E),
    ("F", Key::F),
    ("G", Key::G),
    ("H", Key::H),
    ("I", Key::I),
    ("J", Key::J),
    ("K", Key::K),
    ("L", Key::L),
    ("M", Key::M),
    ("N", Key::N),
    ("O", Key::O),
    ("P", Key::P),
    ("Q", Key::Q),
    ("R", Key::R),
    ("S", Key::S),
    ("T", Key::T),
    ("U", Key::U),
    ("V", Key::V),
    ("W", Key::W),
    ("X", Key::X),
    ("Y", Key::Y),
    ("Z", Key::Z),
    ("Ñ", Key::N_TILDE),
    ("D0", Key::D0),
    ("D1", Key::D1),
    ("D2", Key::D2),
    ("D3", Key::D3),
    ("D4", Key::D4),
    ("D5", Key::D5),
    ("D6", Key::D6),
    ("D7", Key::D7),
    ("D8", Key::D8),
    ("D9", Key::D9),
    ("F1", Key::F1),
    ("F2", Key::F2),
    ("F3", Key::F3),
    ("F4", Key::F4),
    ("F5", Key::F5),
    ("F6", Key::F6),
    ("F7", Key::F7),
    ("F8", Key::F8),
    ("F9", Key::F9),
    ("F10", Key::F10),
    ("F11", Key::F11),
    ("F12", Key::F12),
    ("Escape", Key::ESCAPE),
    ("Tab", Key::TAB),
    ("Backspace", Key::BACKSPACE),
    ("Enter", Key::ENTER),
    ("Space", Key::SPACE),
    ("PrintScreen", Key::PRINT_SCREEN),
    ("ScrollLock", Key::SCROLL_LOCK),
    ("Pause", Key::PAUSE),
    ("Application", Key::APPLICATION),
    ("Nvda", Key::NVDA),
    ("Insert", Key::INSERT),
    ("Home", Key::HOME),
    ("End", Key::END),
    ("PageUp", Key::PAGE_UP),
    ("PageDown", Key::PAGE_DOWN),
    ("Delete", Key::DELETE),
    ("UpArrow", Key::UP_ARROW),
    ("DownArrow", Key::DOWN_ARROW),
    ("LeftArrow", Key::LEFT_ARROW),
    ("RightArrow", Key::RIGHT_ARROW),
    ("NumPad0", Key::NUMPAD0),
    ("NumPad1", Key::NUMPAD1),
    ("NumPad2", Key::NUMPAD2),
    ("NumPad3", Key::NUMPAD3),
    ("NumPad4", Key::NUMPAD4),
    ("NumPad5", Key::NUMPAD5),
    ("NumPad6", Key::NUMPAD6),
    ("NumPad7", Key::NUMPAD7),
    ("NumPad8", Key::NUMPAD8),
    ("NumPad9", Key::NUMPAD9),
    ("NumPadDelete", Key::NUMPAD_DELETE),
    ("NumPadEnter", Key::NUMPAD_ENTER),
    ("NumPadPlus", Key::NUMPAD_PLUS),
    ("NumPadMinus", Key::NUMPAD_MINUS),
    ("NumPadMultiply", Key::NUMPAD_MULTIPLY),
    ("NumPadDivide", Key::NUMPAD_DIVIDE),
    ("Shift", Key::SHIFT),
    ("Control", Key::CONTROL),
    ("LeftAlt", Key::LEFT_ALT),
    ("RightAlt", Key::RIGHT_ALT),
    ("Windows", Key::WINDOWS),
    ("Oem1", Key::OEM1),
    ("Oem2", Key::OEM2),
    ("Oem4", Key::OEM4),
    ("Oem5", Key::OEM5),
    ("Oem6", Key::OEM6),
    ("Oem7", Key::OEM7),
    ("Oem102", Key::OEM102),
    ("OemComma", Key::OEM_COMMA),
    ("OemPeriod", Key::OEM_PERIOD),
    ("OemMinus", Key::OEM_MINUS),
    ("OemPlus", Key::OEM_PLUS),
];

/// Alternative spellings accepted by [`lookup`], mapped to canonical names.
const ALIASES: &[(&str, &str)] = &[
    ("ctrl", "Control"),
    ("alt", "LeftAlt"),
    ("altgr", "RightAlt"),
    ("win", "Windows"),
    ("windowskey", "Windows"),
    ("esc", "Escape"),
    ("return", "Enter"),
    ("del", "Delete"),
    ("ins", "Insert"),
    ("up", "UpArrow"),
    ("down", "DownArrow"),
    ("left", "LeftArrow"),
    ("right", "RightArrow"),
    ("pgup", "PageUp"),
    ("pgdn", "PageDown"),
    ("apps", "Application"),
    ("0", "D0"),
    ("1", "D1"),
    ("2", "D2"),
    ("3", "D3"),
    ("4", "D4"),
    ("5", "D5"),
    ("6", "D6"),
    ("7", "D7"),
    ("8", "D8"),
    ("9", "D9"),
];

/// Resolves a key name or alias, ignoring case.
pub fn lookup(name: &str) -> Option<Key> {
    let canonical = ALIASES
        .iter()
        .find(|(alias, _)| alias.eq_ignore_ascii_case(name))
        .map(|(_, canonical)| *canonical)
        .unwrap_or(name);

    NAMED_KEYS
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(canonical))
        .map(|(_, key)| *key)
}

/// Returns the first canonical name registered for `key`.
pub fn name_of(key: Key) -> Option<&'static str> {
    NAMED_KEYS
        .iter()
        .find(|(_, k)| *k == key)
        .map(|(n, _)| *n)
}

/// Iterates over every canonical `(name, key)` pair.
pub fn all() -> impl Iterator<Item = (&'static str, Key)> {
    NAMED_KEYS.iter().copied()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
