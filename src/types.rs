//! Core types for the dashboard engine.
//!
//! These types are shared by every subsystem: the geometry a module renders
//! into, the output target a module or the whole dashboard writes to, and the
//! screen-control operations a destination needs before content is written.

use std::fmt;
use std::path::{Path, PathBuf};

// =============================================================================
// Geometry
// =============================================================================

/// Terminal geometry in character cells.
///
/// Height is optional: destinations that are not terminals only know the
/// width they inherit from the main console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub width: u16,
    pub height: Option<u16>,
}

impl Geometry {
    /// Used when neither the destination nor the main console can be queried.
    pub const DEFAULT: Self = Self {
        width: 80,
        height: Some(24),
    };

    pub const fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height: Some(height),
        }
    }

    /// Geometry with a known width only.
    pub const fn width_only(width: u16) -> Self {
        Self {
            width,
            height: None,
        }
    }

    /// Width as a `usize` for string arithmetic.
    #[inline]
    pub fn columns(&self) -> usize {
        self.width as usize
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// =============================================================================
// Output Target
// =============================================================================

/// A resolved destination for dashboard content.
///
/// `Console` is the host's own terminal stream. `Path` is a file or another
/// terminal device, opened for every write.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OutputTarget {
    Console,
    Path(PathBuf),
}

impl OutputTarget {
    /// Resolve a module-level override against the dashboard-level one.
    ///
    /// Module override wins, then the dashboard override, then the console.
    pub fn resolve(module: Option<&Path>, dashboard: Option<&Path>) -> Self {
        match module.or(dashboard) {
            Some(path) => Self::Path(path.to_path_buf()),
            None => Self::Console,
        }
    }

    #[inline]
    pub fn is_console(&self) -> bool {
        matches!(self, Self::Console)
    }
}

impl fmt::Display for OutputTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Console => write!(f, "(console)"),
            Self::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

// =============================================================================
// Screen Operations (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Screen-control sequences emitted ahead of a destination's content.
    ///
    /// Combine with bitwise OR: `ScreenOps::CLEAR | ScreenOps::SCROLLBACK`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ScreenOps: u8 {
        const NONE = 0;
        /// Cursor home and clear the visible screen.
        const CLEAR = 1 << 0;
        /// Discard the scrollback buffer as well.
        const SCROLLBACK = 1 << 1;
        /// Switch to the alternate screen buffer.
        const ALT_SCREEN = 1 << 2;
        /// Hide the cursor.
        const HIDE_CURSOR = 1 << 3;
    }
}

impl ScreenOps {
    /// Operations for a destination write.
    ///
    /// External destinations are always taken over; the console is only
    /// cleared when a redraw was explicitly requested.
    pub fn for_write(target: &OutputTarget, clear_console: bool, discard_scrollback: bool) -> Self {
        let mut ops = match target {
            OutputTarget::Path(_) => Self::ALT_SCREEN | Self::HIDE_CURSOR | Self::CLEAR,
            OutputTarget::Console if clear_console => Self::CLEAR,
            OutputTarget::Console => Self::NONE,
        };
        if ops.contains(Self::CLEAR) && discard_scrollback {
            ops |= Self::SCROLLBACK;
        }
        ops
    }
}

// =============================================================================
// Tests
// =============================================================================
