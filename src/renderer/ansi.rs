//! ANSI escape sequences for dashboard output.
//!
//! This module provides the escape sequences the dashboard needs:
//! - SGR styling from parameter strings (`1;33`)
//! - Cursor home, screen and scrollback clearing
//! - Cursor visibility
//! - Alternate screen buffer

use std::io::Write;

use crate::types::ScreenOps;

// =============================================================================
// Constants
// =============================================================================

/// Control Sequence Introducer.
pub const CSI: &str = "\x1b[";

/// Reset all attributes and colors.
pub const RESET: &str = "\x1b[0m";

// =============================================================================
// Styling
// =============================================================================

/// Wrap `text` in an SGR sequence built from `params`, then reset.
pub fn styled(text: &str, params: &str) -> String {
    format!("{CSI}{params}m{text}{RESET}")
}

/// Reset all attributes and colors.
#[inline]
pub fn reset<W: Write>(w: &mut W) -> std::io::Result<()> {
    write!(w, "\x1b[0m")
}

// =============================================================================
// Cursor
// =============================================================================

/// Move cursor to the top-left corner.
#[inline]
pub fn cursor_home<W: Write>(w: &mut W) -> std::io::Result<()> {
    write!(w, "\x1b[H")
}

/// Hide cursor.
#[inline]
pub fn cursor_hide<W: Write>(w: &mut W) -> std::io::Result<()> {
    write!(w, "\x1b[?25l")
}

/// Show cursor.
#[inline]
pub fn cursor_show<W: Write>(w: &mut W) -> std::io::Result<()> {
    write!(w, "\x1b[?25h")
}

// =============================================================================
// Screen Control
// =============================================================================

/// Clear from cursor to end of screen.
#[inline]
pub fn erase_down<W: Write>(w: &mut W) -> std::io::Result<()> {
    write!(w, "\x1b[J")
}

/// Clear only scrollback buffer.
#[inline]
pub fn clear_scrollback<W: Write>(w: &mut W) -> std::io::Result<()> {
    write!(w, "\x1b[3J")
}

/// Enter alternate screen buffer.
#[inline]
pub fn enter_alt_screen<W: Write>(w: &mut W) -> std::io::Result<()> {
    write!(w, "\x1b[?1049h")
}

/// Exit alternate screen buffer.
#[inline]
pub fn exit_alt_screen<W: Write>(w: &mut W) -> std::io::Result<()> {
    write!(w, "\x1b[?1049l")
}

/// Emit the requested screen operations, in a fixed order.
pub fn screen_ops<W: Write>(w: &mut W, ops: ScreenOps) -> std::io::Result<()> {
    if ops.contains(ScreenOps::ALT_SCREEN) {
        enter_alt_screen(w)?;
    }
    if ops.contains(ScreenOps::HIDE_CURSOR) {
        cursor_hide(w)?;
    }
    if ops.contains(ScreenOps::CLEAR) {
        cursor_home(w)?;
        erase_down(w)?;
    }
    if ops.contains(ScreenOps::SCROLLBACK) {
        clear_scrollback(w)?;
    }
    Ok(())
}

/// Restore a terminal taken over by [`screen_ops`].
pub fn restore_terminal<W: Write>(w: &mut W) -> std::io::Result<()> {
    reset(w)?;
    cursor_show(w)?;
    exit_alt_screen(w)
}

// =============================================================================
// Testing Helpers
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn to_string<F: FnOnce(&mut Vec<u8>) -> std::io::Result<()>>(f: F) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_styled() {
        assert_eq!(styled("label", "1;33"), "\x1b[1;33mlabel\x1b[0m");
    }

    #[test]
    fn test_cursor_visibility() {
        assert_eq!(to_string(cursor_hide), "\x1b[?25l");
        assert_eq!(to_string(cursor_show), "\x1b[?25h");
    }

    #[test]
    fn test_screen_control() {
        assert_eq!(to_string(cursor_home), "\x1b[H");
        assert_eq!(to_string(clear_scrollback), "\x1b[3J");
        assert_eq!(to_string(enter_alt_screen), "\x1b[?1049h");
        assert_eq!(to_string(exit_alt_screen), "\x1b[?1049l");
    }

    #[test]
    fn test_screen_ops_order() {
        let all = ScreenOps::ALT_SCREEN | ScreenOps::HIDE_CURSOR | ScreenOps::CLEAR | ScreenOps::SCROLLBACK;
        assert_eq!(
            to_string(|w| screen_ops(w, all)),
            "\x1b[?1049h\x1b[?25l\x1b[H\x1b[J\x1b[3J"
        );
        assert_eq!(to_string(|w| screen_ops(w, ScreenOps::NONE)), "");
    }

    #[test]
    fn test_restore_terminal() {
        assert_eq!(to_string(restore_terminal), "\x1b[0m\x1b[?25h\x1b[?1049l");
    }
}
