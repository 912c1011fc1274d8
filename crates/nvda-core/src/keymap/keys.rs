//! The [`Key`] value type and the catalogue of named keys.
//!
//! Reference: Windows Virtual-Key Codes (winuser.h) and the set-1 keyboard
//! scan codes.  Keys that live on the extended part of the keyboard (the
//! navigation cluster, arrows, the right-hand modifiers) set `extended`.

use std::fmt;

use super::names;

/// A single physical key: virtual-key code, scan code and extended flag.
///
/// Keys are pure data and compare structurally, so `Key::NVDA` and
/// `Key::INSERT` are the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key {
    /// Windows virtual-key code (`VK_*`).
    pub vk_code: u8,
    /// Hardware scan code.  Some synthetic keys use values above 255.
    pub scan_code: u16,
    /// Whether the key belongs to the extended key set.
    pub extended: bool,
}

impl Key {
    /// Creates a key from its raw codes.
    pub const fn new(vk_code: u8, scan_code: u16, extended: bool) -> Self {
        Self {
            vk_code,
            scan_code,
            extended,
        }
    }

    // ── Letters ───────────────────────────────────────────────────────────────

    pub const A: Key = Key::new(65, 30, false);
    pub const B: Key = Key::new(66, 48, false);
    pub const C: Key = Key::new(67, 46, false);
    pub const D: Key = Key::new(68, 32, false);
    pub const E: Key = Key::new(69, 18, false);
    pub const F: Key = Key::new(70, 33, false);
    pub const G: Key = Key::new(71, 34, false);
    pub const H: Key = Key::new(72, 35, false);
    pub const I: Key = Key::new(73, 23, false);
    pub const J: Key = Key::new(74, 36, false);
    pub const K: Key = Key::new(75, 37, false);
    pub const L: Key = Key::new(76, 38, false);
    pub const M: Key = Key::new(77, 50, false);
    pub const N: Key = Key::new(78, 49, false);
    pub const O: Key = Key::new(79, 24, false);
    pub const P: Key = Key::new(80, 25, false);
    pub const Q: Key = Key::new(81, 16, false);
    pub const R: Key = Key::new(82, 19, false);
    pub const S: Key = Key::new(83, 31, false);
    pub const T: Key = Key::new(84, 20, false);
    pub const U: Key = Key::new(85, 22, false);
    pub const V: Key = Key::new(86, 47, false);
    pub const W: Key = Key::new(87, 17, false);
    pub const X: Key = Key::new(88, 45, false);
    pub const Y: Key = Key::new(89, 21, false);
    pub const Z: Key = Key::new(90, 44, false);
    /// The Spanish-layout Ñ key (`VK_OEM_3` position).
    pub const N_TILDE: Key = Key::new(192, 39, false);

    // ── Digit row ─────────────────────────────────────────────────────────────

    pub const D0: Key = Key::new(48, 11, false);
    pub const D1: Key = Key::new(49, 2, false);
    pub const D2: Key = Key::new(50, 3, false);
    pub const D3: Key = Key::new(51, 4, false);
    pub const D4: Key = Key::new(52, 5, false);
    pub const D5: Key = Key::new(53, 6, false);
    pub const D6: Key = Key::new(54, 7, false);
    pub const D7: Key = Key::new(55, 8, false);
    pub const D8: Key = Key::new(56, 9, false);
    pub const D9: Key = Key::new(57, 10, false);

    // ── Function keys ─────────────────────────────────────────────────────────

    pub const F1: Key = Key::new(112, 59, false);
    pub const F2: Key = Key::new(113, 60, false);
    pub const F3: Key = Key::new(114, 61, false);
    pub const F4: Key = Key::new(115, 62, false);
    pub const F5: Key = Key::new(116, 63, false);
    pub const F6: Key = Key::new(117, 64, false);
    pub const F7: Key = Key::new(118, 65, false);
    pub const F8: Key = Key::new(119, 66, false);
    pub const F9: Key = Key::new(120, 67, false);
    pub const F10: Key = Key::new(121, 68, false);
    pub const F11: Key = Key::new(122, 87, false);
    pub const F12: Key = Key::new(123, 88, false);

    // ── Editing and system keys ───────────────────────────────────────────────

    pub const ESCAPE: Key = Key::new(27, 1, false);
    pub const TAB: Key = Key::new(9, 15, false);
    pub const BACKSPACE: Key = Key::new(8, 14, false);
    pub const ENTER: Key = Key::new(13, 28, false);
    pub const SPACE: Key = Key::new(32, 57, false);
    pub const PRINT_SCREEN: Key = Key::new(44, 55, true);
    pub const SCROLL_LOCK: Key = Key::new(145, 70, false);
    pub const PAUSE: Key = Key::new(19, 69, false);
    pub const APPLICATION: Key = Key::new(93, 93, true);

    // ── Navigation cluster (extended) ─────────────────────────────────────────

    /// Insert, which NVDA uses as its modifier key by default.
    pub const INSERT: Key = Key::new(45, 82, true);
    /// The NVDA modifier.  Same physical key as [`Key::INSERT`].
    pub const NVDA: Key = Key::INSERT;
    pub const HOME: Key = Key::new(36, 71, true);
    pub const END: Key = Key::new(35, 79, true);
    pub const PAGE_UP: Key = Key::new(33, 73, true);
    pub const PAGE_DOWN: Key = Key::new(34, 81, true);
    pub const DELETE: Key = Key::new(46, 83, true);
    pub const UP_ARROW: Key = Key::new(38, 72, true);
    pub const DOWN_ARROW: Key = Key::new(40, 80, true);
    pub const LEFT_ARROW: Key = Key::new(37, 75, true);
    pub const RIGHT_ARROW: Key = Key::new(39, 77, true);

    // ── Numeric keypad (num lock off) ─────────────────────────────────────────

    pub const NUMPAD0: Key = Key::new(45, 82, false);
    pub const NUMPAD1: Key = Key::new(35, 79, false);
    pub const NUMPAD2: Key = Key::new(40, 80, false);
    pub const NUMPAD3: Key = Key::new(34, 81, false);
    pub const NUMPAD4: Key = Key::new(37, 75, false);
    pub const NUMPAD5: Key = Key::new(12, 76, false);
    pub const NUMPAD6: Key = Key::new(39, 77, false);
    pub const NUMPAD7: Key = Key::new(36, 71, false);
    pub const NUMPAD8: Key = Key::new(38, 72, false);
    pub const NUMPAD9: Key = Key::new(33, 73, false);
    pub const NUMPAD_DELETE: Key = Key::new(46, 83, false);
    pub const NUMPAD_ENTER: Key = Key::new(13, 28, true);
    pub const NUMPAD_PLUS: Key = Key::new(107, 78, false);
    pub const NUMPAD_MINUS: Key = Key::new(109, 74, false);
    pub const NUMPAD_MULTIPLY: Key = Key::new(106, 55, false);
    pub const NUMPAD_DIVIDE: Key = Key::new(111, 53, true);

    // ── Modifiers ─────────────────────────────────────────────────────────────

    pub const SHIFT: Key = Key::new(160, 42, false);
    pub const CONTROL: Key = Key::new(162, 29, false);
    pub const LEFT_ALT: Key = Key::new(164, 56, false);
    /// AltGr as sent by NVDA Remote: left control VK with the synthetic 541 scan code.
    pub const RIGHT_ALT: Key = Key::new(162, 541, false);
    pub const WINDOWS: Key = Key::new(91, 91, true);

    // ── OEM punctuation keys (US layout positions) ────────────────────────────

    pub const OEM1: Key = Key::new(186, 26, false);
    pub const OEM2: Key = Key::new(191, 43, false);
    pub const OEM4: Key = Key::new(219, 12, false);
    pub const OEM5: Key = Key::new(220, 41, false);
    pub const OEM6: Key = Key::new(221, 13, false);
    pub const OEM7: Key = Key::new(222, 40, false);
    pub const OEM102: Key = Key::new(226, 86, false);
    pub const OEM_COMMA: Key = Key::new(188, 51, false);
    pub const OEM_PERIOD: Key = Key::new(190, 52, false);
    pub const OEM_MINUS: Key = Key::new(189, 53, false);
    pub const OEM_PLUS: Key = Key::new(187, 27, false);

    /// Looks a key up by name, ignoring ASCII case.
    ///
    /// Canonical names are the ones [`Key::name`] returns (`"Nvda"`,
    /// `"PageDown"`, `"NumPad5"`, …); common aliases such as `"ctrl"`,
    /// `"alt"`, `"win"`, `"esc"` and `"up"` are accepted too.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use nvda_core::Key;
    ///
    /// assert_eq!(Key::from_name("nvda"), Some(Key::NVDA));
    /// assert_eq!(Key::from_name("Ctrl"), Some(Key::CONTROL));
    /// assert_eq!(Key::from_name("Hyper"), None);
    /// ```
    pub fn from_name(name: &str) -> Option<Key> {
        names::lookup(name)
    }

    /// Returns the canonical catalogue name of this key, if it has one.
    pub fn name(&self) -> Option<&'static str> {
        names::name_of(*self)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None if self.extended => write!(f, "{}:{}:ext", self.vk_code, self.scan_code),
            None => write!(f, "{}:{}", self.vk_code, self.scan_code),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
