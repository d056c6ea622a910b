//! Visible width of styled text.
//!
//! Dashboard lines carry SGR sequences; dividers must be measured in
//! terminal cells with those sequences removed. Handles:
//! - CSI sequences: `ESC [` ... final byte (0x40-0x7E)
//! - OSC sequences: `ESC ]` ... BEL (0x07) or ST (ESC \)
//! - Two-character sequences: `ESC` + single char

use std::borrow::Cow;

use unicode_width::UnicodeWidthStr;

/// Strip ANSI escape sequences from a string.
///
/// Returns `Cow::Borrowed` when no escape sequences are present.
pub fn strip_ansi(s: &str) -> Cow<'_, str> {
    if !s.as_bytes().contains(&0x1B) {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len());
    let bytes = s.as_bytes();
    let len = bytes.len();
    let mut i = 0;

    while i < len {
        if bytes[i] == 0x1B {
            i = skip_escape_sequence(bytes, i);
        } else {
            // ESC is a single ASCII byte, so slicing at it keeps UTF-8 intact.
            let start = i;
            while i < len && bytes[i] != 0x1B {
                i += 1;
            }
            result.push_str(&s[start..i]);
        }
    }

    Cow::Owned(result)
}

/// Skip an escape sequence starting at `pos` (which points to ESC byte).
fn skip_escape_sequence(bytes: &[u8], pos: usize) -> usize {
    let next = pos + 1;
    if next >= bytes.len() {
        return bytes.len();
    }

    match bytes[next] {
        b'[' => skip_csi(bytes, next + 1),
        b']' => skip_osc(bytes, next + 1),
        _ => next + 1,
    }
}

fn skip_csi(bytes: &[u8], pos: usize) -> usize {
    let mut i = pos;
    while i < bytes.len() {
        let b = bytes[i];
        if (0x40..=0x7E).contains(&b) {
            return i + 1;
        }
        if !(0x20..=0x7E).contains(&b) {
            return i;
        }
        i += 1;
    }
    bytes.len()
}

fn skip_osc(bytes: &[u8], pos: usize) -> usize {
    let len = bytes.len();
    let mut i = pos;
    while i < len {
        match bytes[i] {
            0x07 => return i + 1,
            0x1B if i + 1 < len && bytes[i + 1] == b'\\' => return i + 2,
            _ => i += 1,
        }
    }
    len
}

/// Display width in terminal cells, ignoring escape sequences.
pub fn visible_width(s: &str) -> usize {
    strip_ansi(s).width()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_ansi_borrows() {
        assert!(matches!(strip_ansi("hello"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_strip_sgr() {
        assert_eq!(strip_ansi("\x1b[1;33mStack\x1b[0m"), "Stack");
        assert_eq!(strip_ansi("\x1b[38;5;196mred\x1b[0m"), "red");
    }

    #[test]
    fn test_strip_screen_control() {
        assert_eq!(strip_ansi("\x1b[H\x1b[J\x1b[?1049htext"), "text");
    }

    #[test]
    fn test_strip_osc() {
        assert_eq!(strip_ansi("\x1b]8;;https://example.com\x07click\x1b]8;;\x07"), "click");
    }

    #[test]
    fn test_visible_width() {
        assert_eq!(visible_width("\x1b[36m───\x1b[0m"), 3);
        assert_eq!(visible_width("日本"), 4);
        assert_eq!(visible_width(""), 0);
    }
}
