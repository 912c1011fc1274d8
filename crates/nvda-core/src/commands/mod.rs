//! Named NVDA commands and the keyboard layout that selects their bindings.
//!
//! NVDA ships two keyboard conventions.  The *desktop* layout leans on the
//! numeric keypad; the *laptop* layout replaces those bindings with chords
//! reachable on keyboards without one.  Every [`Command`] therefore carries
//! one sequence of [`KeyCombination`]s per layout.  A sequence may hold
//! several combinations sent one after another, which is how double-tap
//! commands such as "report date" (NVDA+F12 twice) are expressed.

pub mod catalogue;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::keymap::KeyCombination;

pub use catalogue::{all, find, quit_nvda, CommandGroup};

/// Reasons a command cannot be dispatched for the active layout.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    /// The command has no combination sequence for the layout.
    #[error("command '{command}' has no key combinations for the {layout} layout")]
    MissingLayout {
        command: String,
        layout: KeyboardLayout,
    },

    /// The sequence exists but every combination in it is empty.
    #[error("command '{command}' has no keys to send for the {layout} layout")]
    NoKeys {
        command: String,
        layout: KeyboardLayout,
    },
}

/// NVDA keyboard convention.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyboardLayout {
    #[default]
    Desktop,
    Laptop,
}

impl KeyboardLayout {
    /// The value NVDA expects in the `keyboardLayout` ini key.
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyboardLayout::Desktop => "desktop",
            KeyboardLayout::Laptop => "laptop",
        }
    }
}

impl fmt::Display for KeyboardLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyboardLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "desktop" => Ok(KeyboardLayout::Desktop),
            "laptop" => Ok(KeyboardLayout::Laptop),
            other => Err(format!("unknown keyboard layout '{other}' (expected desktop or laptop)")),
        }
    }
}

/// A named NVDA command with a binding per keyboard layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub name: String,
    pub desktop: Vec<KeyCombination>,
    pub laptop: Vec<KeyCombination>,
}

impl Command {
    /// Creates a command whose laptop binding is the same as its desktop one.
    pub fn new(name: impl Into<String>, combinations: Vec<KeyCombination>) -> Self {
        Self {
            name: name.into(),
            laptop: combinations.clone(),
            desktop: combinations,
        }
    }

    /// Creates a command with distinct desktop and laptop bindings.
    pub fn with_layouts(
        name: impl Into<String>,
        desktop: Vec<KeyCombination>,
        laptop: Vec<KeyCombination>,
    ) -> Self {
        Self {
            name: name.into(),
            desktop,
            laptop,
        }
    }

    /// Returns the raw combination sequence for `layout` without validation.
    pub fn sequence(&self, layout: KeyboardLayout) -> &[KeyCombination] {
        match layout {
            KeyboardLayout::Desktop => &self.desktop,
            KeyboardLayout::Laptop => &self.laptop,
        }
    }

    /// Returns the combinations to send for `layout`.
    ///
    /// # Errors
    ///
    /// - [`CommandError::MissingLayout`] if the layout's sequence is empty.
    /// - [`CommandError::NoKeys`] if every combination in it is empty.
    pub fn combinations_for(&self, layout: KeyboardLayout) -> Result<&[KeyCombination], CommandError> {
        let sequence = self.sequence(layout);
        if sequence.is_empty() {
            return Err(CommandError::MissingLayout {
                command: self.name.clone(),
                layout,
            });
        }
        if sequence.iter().all(KeyCombination::is_empty) {
            return Err(CommandError::NoKeys {
                command: self.name.clone(),
                layout,
            });
        }
        Ok(sequence)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::Key;

    fn combo(keys: &[Key]) -> KeyCombination {
        KeyCombination::from(keys)
    }

    #[test]
    fn test_new_command_reuses_desktop_binding_for_laptop() {
        let cmd = Command::new("ReportTitle", vec![combo(&[Key::NVDA, Key::T])]);
        assert_eq!(cmd.desktop, cmd.laptop);
    }

    #[test]
    fn test_combinations_for_selects_layout() {
        // Arrange
        let cmd = Command::with_layouts(
            "ReportStatusBar",
            vec![combo(&[Key::NVDA, Key::END])],
            vec![combo(&[Key::NVDA, Key::SHIFT, Key::END])],
        );

        // Act
        let laptop = cmd.combinations_for(KeyboardLayout::Laptop).unwrap();

        // Assert
        assert_eq!(laptop, &[combo(&[Key::NVDA, Key::SHIFT, Key::END])]);
    }

    #[test]
    fn test_combinations_for_missing_layout_is_error() {
        let cmd = Command::with_layouts("DesktopOnly", vec![combo(&[Key::NVDA, Key::T])], vec![]);

        let err = cmd.combinations_for(KeyboardLayout::Laptop).unwrap_err();

        assert!(matches!(err, CommandError::MissingLayout { layout: KeyboardLayout::Laptop, .. }));
    }

    #[test]
    fn test_combinations_for_checks_the_selected_layout_not_desktop() {
        // Arrange: desktop is usable, laptop only holds empty combinations
        let cmd = Command::with_layouts(
            "Broken",
            vec![combo(&[Key::NVDA, Key::T])],
            vec![KeyCombination::default(), KeyCombination::default()],
        );

        // Act + Assert
        assert!(cmd.combinations_for(KeyboardLayout::Desktop).is_ok());
        assert!(matches!(
            cmd.combinations_for(KeyboardLayout::Laptop),
            Err(CommandError::NoKeys { .. })
        ));
    }

    #[test]
    fn test_keyboard_layout_parses_case_insensitively() {
        assert_eq!("Laptop".parse::<KeyboardLayout>(), Ok(KeyboardLayout::Laptop));
        assert_eq!(" desktop ".parse::<KeyboardLayout>(), Ok(KeyboardLayout::Desktop));
        assert!("tablet".parse::<KeyboardLayout>().is_err());
    }

    #[test]
    fn test_keyboard_layout_default_is_desktop() {
        assert_eq!(KeyboardLayout::default(), KeyboardLayout::Desktop);
    }
}
