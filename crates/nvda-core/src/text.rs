//! Comparing spoken text in test assertions.
//!
//! What NVDA says and what a test expects rarely match byte for byte: line
//! breaks land between fragments, spacing varies, and NVDA Remote sometimes
//! turns a hyphen into a space.  [`text_contains`] compares both sides after
//! flattening those differences.

/// Returns `true` if `text` contains `expected`, ignoring case, line breaks,
/// runs of whitespace and hyphens.
///
/// ```
/// assert!(nvda_core::text_contains("Untitled - Notepad\nedit", "untitled notepad edit"));
/// assert!(!nvda_core::text_contains("Untitled - Notepad", "WordPad"));
/// ```
pub fn text_contains(text: &str, expected: &str) -> bool {
    normalize(text).contains(&normalize(expected))
}

/// Hyphens become spaces, whitespace runs collapse to one space, and the
/// result is lowercased and trimmed.
fn normalize(text: &str) -> String {
    text.replace('-', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
