//! Keys held down together, and the press/release order used to send them.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::keys::Key;

/// Errors produced when parsing a [`KeyCombination`] from text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyParseError {
    /// A `+`-separated segment was empty (e.g. `"Nvda++T"`).
    #[error("empty key name in combination")]
    Empty,

    /// A segment did not name any catalogued key.
    #[error("unknown key name: {0}")]
    UnknownKey(String),
}

/// One half of a keystroke: a key going down or coming back up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyStroke {
    pub key: Key,
    pub pressed: bool,
}

/// An ordered set of keys considered pressed simultaneously.
///
/// The order only matters for sequencing: the first key goes down first and
/// comes up last, exactly as a person holding `Control+Shift+Home` would do.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeyCombination(Vec<Key>);

impl KeyCombination {
    /// Creates a combination from keys in press order.
    pub fn new(keys: impl Into<Vec<Key>>) -> Self {
        Self(keys.into())
    }

    /// Returns the keys in press order.
    pub fn keys(&self) -> &[Key] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the strokes that type this combination.
    ///
    /// Every key is pressed in listed order, then released in reverse order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use nvda_core::{Key, KeyCombination};
    ///
    /// let combo = KeyCombination::new([Key::NVDA, Key::T]);
    /// let order: Vec<_> = combo.strokes().map(|s| (s.key, s.pressed)).collect();
    /// assert_eq!(
    ///     order,
    ///     vec![(Key::NVDA, true), (Key::T, true), (Key::T, false), (Key::NVDA, false)]
    /// );
    /// ```
    pub fn strokes(&self) -> impl Iterator<Item = KeyStroke> + '_ {
        let downs = self.0.iter().map(|&key| KeyStroke { key, pressed: true });
        let ups = self.0.iter().rev().map(|&key| KeyStroke { key, pressed: false });
        downs.chain(ups)
    }
}

impl From<Vec<Key>> for KeyCombination {
    fn from(keys: Vec<Key>) -> Self {
        Self(keys)
    }
}

impl From<&[Key]> for KeyCombination {
    fn from(keys: &[Key]) -> Self {
        Self(keys.to_vec())
    }
}

impl FromStr for KeyCombination {
    type Err = KeyParseError;

    /// Parses `"Nvda+Shift+End"` style text.  Whitespace around names is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split('+')
            .map(str::trim)
            .map(|name| {
                if name.is_empty() {
                    return Err(KeyParseError::Empty);
                }
                Key::from_name(name).ok_or_else(|| KeyParseError::UnknownKey(name.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

impl fmt::Display for KeyCombination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, key) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("+")?;
            }
            write!(f, "{key}")?;
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
