//! Output buffering for destination writes.
//!
//! Each destination receives its whole screen in a single write: the
//! pipeline accumulates screen operations, dividers and module lines here
//! and flushes once, so a failing destination never receives half a screen.

use std::io::{self, Write};

// =============================================================================
// OutputBuffer
// =============================================================================

/// A buffer that accumulates output for batch writing.
#[derive(Debug, Default)]
pub struct OutputBuffer {
    data: Vec<u8>,
}

impl OutputBuffer {
    /// Create a new output buffer with default capacity.
    pub fn new() -> Self {
        Self::with_capacity(4096)
    }

    /// Create a buffer with specific capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Write a string.
    #[inline]
    pub fn write_str(&mut self, s: &str) {
        self.data.extend_from_slice(s.as_bytes());
    }

    /// Write a string followed by a newline.
    #[inline]
    pub fn write_line(&mut self, s: &str) {
        self.write_str(s);
        self.data.push(b'\n');
    }

    /// Write every line, each followed by a newline.
    pub fn write_lines<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for line in lines {
            self.write_line(line.as_ref());
        }
    }

    /// Flush buffer to a writer.
    pub fn flush_to<W: Write + ?Sized>(&mut self, writer: &mut W) -> io::Result<()> {
        if self.data.is_empty() {
            return Ok(());
        }
        writer.write_all(&self.data)?;
        writer.flush()?;
        self.data.clear();
        Ok(())
    }
}

impl Write for OutputBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.data.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(()) // Buffering only - real flush via flush_to
    }
}

// =============================================================================
// Tests
// =============================================================================
