//! Reassembles newline-delimited lines from a byte stream.
//!
//! TCP (and TLS on top of it) is a *stream*: one read may return half a
//! message, or several messages at once.  The framer buffers raw bytes and
//! hands out complete lines only.  Splitting happens on the `\n` byte before
//! any UTF-8 decoding, and `\n` never occurs inside a multi-byte UTF-8
//! sequence, so a character cut in half by a read boundary stays in the
//! buffer until its remaining bytes arrive.

/// Accumulates bytes and yields complete lines.
#[derive(Debug, Default)]
pub struct LineFramer {
    buf: Vec<u8>,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `bytes` and returns every line completed by them.
    ///
    /// Line terminators (`\n`, and a `\r` before it) are stripped and blank
    /// lines are skipped.  Invalid UTF-8 inside a completed line is replaced
    /// with U+FFFD rather than rejected.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use nvda_core::LineFramer;
    ///
    /// let mut framer = LineFramer::new();
    /// assert!(framer.push(b"{\"type\":").is_empty());
    /// assert_eq!(framer.push(b"\"cancel\"}\n"), vec![r#"{"type":"cancel"}"#]);
    /// ```
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(bytes);

        let mut lines = Vec::new();
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            // `drain(..=pos)` shifts the remaining bytes to the front, which is
            // fine for the short lines NVDA Remote sends.
            let raw: Vec<u8> = self.buf.drain(..=pos).collect();
            let text = String::from_utf8_lossy(&raw[..raw.len() - 1]);
            let text = text.trim_end_matches('\r');
            if !text.trim().is_empty() {
                lines.push(text.to_string());
            }
        }
        lines
    }

    /// Takes the buffered partial line if it already forms a complete JSON
    /// object, for peers that omit the final newline.
    pub fn take_complete_remainder(&mut self) -> Option<String> {
        if self.buf.is_empty() {
            return None;
        }
        let text = std::str::from_utf8(&self.buf).ok()?;
        let value: serde_json::Value = serde_json::from_str(text).ok()?;
        if !value.is_object() {
            return None;
        }
        let line = text.trim().to_string();
        self.buf.clear();
        Some(line)
    }

    /// Number of buffered bytes that do not yet form a complete line.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_line_is_held_until_newline() {
        // Arrange
        let mut framer = LineFramer::new();

        // Act
        let first = framer.push(b"{\"type\":\"sp");
        let second = framer.push(b"eak\",\"sequence\":[\"a\"]}\n");

        // Assert
        assert!(first.is_empty());
        assert_eq!(second, vec![r#"{"type":"speak","sequence":["a"]}"#.to_string()]);
        assert_eq!(framer.pending(), 0);
    }

    #[test]
    fn test_two_lines_in_one_push_are_split() {
        let mut framer = LineFramer::new();
        let lines = framer.push(b"one\r\ntwo\nthr");
        assert_eq!(lines, vec!["one".to_string(), "two".to_string()]);
        assert_eq!(framer.pending(), 3);
    }

    #[test]
    fn test_multibyte_character_split_across_pushes_is_preserved() {
        // Arrange: "é" is 0xC3 0xA9; split it between two reads
        let mut framer = LineFramer::new();
        let bytes = "caf\u{e9}\n".as_bytes();
        let (head, tail) = bytes.split_at(4);

        // Act
        assert!(framer.push(head).is_empty());
        let lines = framer.push(tail);

        // Assert
        assert_eq!(lines, vec!["café".to_string()]);
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let mut framer = LineFramer::new();
        assert_eq!(framer.push(b"\n  \n\r\nx\n"), vec!["x".to_string()]);
    }

    #[test]
    fn test_invalid_utf8_is_replaced_not_rejected() {
        let mut framer = LineFramer::new();
        let lines = framer.push(b"a\xFFb\n");
        assert_eq!(lines, vec!["a\u{FFFD}b".to_string()]);
    }

    #[test]
    fn test_take_complete_remainder_only_returns_whole_objects() {
        let mut framer = LineFramer::new();

        framer.push(b"{\"type\":\"can");
        assert_eq!(framer.take_complete_remainder(), None);

        framer.push(b"cel\"}");
        assert_eq!(
            framer.take_complete_remainder(),
            Some(r#"{"type":"cancel"}"#.to_string())
        );
        assert_eq!(framer.pending(), 0);
    }
}
