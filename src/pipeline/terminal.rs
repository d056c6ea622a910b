//! Destinations and terminal geometry.
//!
//! The main console is the host's own stream and stays open for the whole
//! session. Every other destination is a path (a regular file or another
//! terminal device) opened, written and closed once per render pass.
//!
//! Geometry is resolved per destination:
//! 1. the destination itself, when it is a terminal
//! 2. the main console
//! 3. [`Geometry::DEFAULT`]

use std::cell::RefCell;
use std::fs::{File, OpenOptions};
use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::rc::Rc;

use crate::error::OutputError;
use crate::renderer::ansi;
use crate::types::Geometry;

// =============================================================================
// Console
// =============================================================================

/// The host's main output stream.
pub trait Console {
    fn writer(&mut self) -> &mut dyn Write;

    /// Current size, when the console is a terminal.
    fn geometry(&self) -> Option<Geometry>;
}

/// Process stdout, sized through crossterm.
#[derive(Debug)]
pub struct StdoutConsole {
    stdout: io::Stdout,
}

impl StdoutConsole {
    pub fn new() -> Self {
        Self { stdout: io::stdout() }
    }
}

impl Default for StdoutConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for StdoutConsole {
    fn writer(&mut self) -> &mut dyn Write {
        &mut self.stdout
    }

    fn geometry(&self) -> Option<Geometry> {
        if !self.stdout.is_terminal() {
            return None;
        }
        crossterm::terminal::size()
            .ok()
            .filter(|&(width, _)| width > 0)
            .map(|(width, height)| Geometry::new(width, height))
    }
}

/// In-memory console with a fixed geometry.
///
/// Clones share the same buffer, so a clone kept outside the dashboard can
/// inspect what was written.
#[derive(Debug, Clone, Default)]
pub struct MemoryConsole {
    buffer: SharedBuffer,
    geometry: Option<Geometry>,
}

impl MemoryConsole {
    pub fn new(geometry: Option<Geometry>) -> Self {
        Self {
            buffer: SharedBuffer::default(),
            geometry,
        }
    }

    /// Everything written so far.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.0.borrow()).into_owned()
    }

    /// Drain and return everything written so far.
    pub fn take(&self) -> String {
        let bytes = std::mem::take(&mut *self.buffer.0.borrow_mut());
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Console for MemoryConsole {
    fn writer(&mut self) -> &mut dyn Write {
        &mut self.buffer
    }

    fn geometry(&self) -> Option<Geometry> {
        self.geometry
    }
}

#[derive(Debug, Clone, Default)]
struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// =============================================================================
// Path Destinations
// =============================================================================

/// Open a path destination for one write, creating a missing file.
pub fn open_destination(path: &Path) -> Result<File, OutputError> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .map_err(|source| OutputError::Open {
            path: path.to_path_buf(),
            source,
        })
}

/// Size of a destination, when it is a terminal.
#[cfg(unix)]
pub fn destination_geometry(file: &File) -> Option<Geometry> {
    use std::os::unix::io::AsRawFd;

    if !file.is_terminal() {
        return None;
    }
    let mut size: libc::winsize = unsafe { std::mem::zeroed() };
    if unsafe { libc::ioctl(file.as_raw_fd(), libc::TIOCGWINSZ, &mut size) } != 0 {
        return None;
    }
    if size.ws_col == 0 {
        return None;
    }
    Some(Geometry::new(size.ws_col, size.ws_row))
}

#[cfg(not(unix))]
pub fn destination_geometry(_file: &File) -> Option<Geometry> {
    None
}

/// Apply the fallback chain.
pub fn resolve_geometry(destination: Option<Geometry>, console: Option<Geometry>) -> Geometry {
    destination.or(console).unwrap_or(Geometry::DEFAULT)
}

/// Best-effort restore of a terminal destination taken over by a render.
pub fn reset_destination(path: &Path) -> Result<(), OutputError> {
    let mut file = OpenOptions::new()
        .write(true)
        .truncate(true)
        .open(path)
        .map_err(|source| OutputError::Open {
            path: path.to_path_buf(),
            source,
        })?;
    ansi::restore_terminal(&mut file)
        .and_then(|()| file.flush())
        .map_err(|source| OutputError::Write {
            target: path.display().to_string(),
            source,
        })
}

// =============================================================================
// Tests
// =============================================================================
