//! `OutputBuffer`: Single-syscall output buffer for ANSI sequences.
//!
//! The writer never addresses the screen absolutely; the line editor lives
//! at the bottom of the scrollback, so every motion here is relative to the
//! current cursor.

use std::io::Write;

/// Pre-allocated buffer for building ANSI escape sequences.
///
/// All output is accumulated here, then flushed in a single `write()` syscall
/// to prevent terminal flickering.
#[derive(Debug)]
pub struct OutputBuffer {
    data: Vec<u8>,
    /// SGR parameters currently in effect, as far as this buffer knows.
    style: String,
}

impl OutputBuffer {
    /// Create a new output buffer with the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            style: String::new(),
        }
    }

    /// Create a buffer sized for a typical terminal (4KB).
    pub fn new() -> Self {
        Self::with_capacity(4096)
    }

    /// Clear the buffer for reuse. The tracked style returns to default.
    #[inline]
    pub fn clear(&mut self) {
        self.data.clear();
        self.style.clear();
    }

    /// Get the buffer contents.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Get the buffer length.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if buffer is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Write a string.
    #[inline]
    pub fn write_str(&mut self, s: &str) {
        self.data.extend_from_slice(s.as_bytes());
    }

    /// Move the cursor up `n` lines. No-op for 0.
    #[inline]
    pub fn cursor_up(&mut self, n: usize) {
        if n > 0 {
            let _ = write!(self.data, "\x1b[{n}A");
        }
    }

    /// Move the cursor down `n` lines. No-op for 0.
    #[inline]
    pub fn cursor_down(&mut self, n: usize) {
        if n > 0 {
            let _ = write!(self.data, "\x1b[{n}B");
        }
    }

    /// Move the cursor right `n` columns. No-op for 0.
    #[inline]
    pub fn cursor_forward(&mut self, n: usize) {
        if n > 0 {
            let _ = write!(self.data, "\x1b[{n}C");
        }
    }

    /// Return to column 0.
    #[inline]
    pub fn carriage_return(&mut self) {
        self.data.push(b'\r');
    }

    /// Go to column 0 of the next line. Output post-processing is off in raw
    /// mode, so the carriage return is explicit.
    #[inline]
    pub fn newline(&mut self) {
        self.data.extend_from_slice(b"\r\n");
    }

    /// Erase from the cursor to the end of the line.
    #[inline]
    pub fn erase_line_right(&mut self) {
        self.data.extend_from_slice(b"\x1b[K");
    }

    /// Erase from the cursor to the end of the screen.
    #[inline]
    pub fn erase_below(&mut self) {
        self.data.extend_from_slice(b"\x1b[J");
    }

    /// Hide cursor.
    #[inline]
    pub fn cursor_hide(&mut self) {
        self.data.extend_from_slice(b"\x1b[?25l");
    }

    /// Show cursor.
    #[inline]
    pub fn cursor_show(&mut self) {
        self.data.extend_from_slice(b"\x1b[?25h");
    }

    /// Enable or disable automatic wrapping at the right margin.
    #[inline]
    pub fn autowrap(&mut self, on: bool) {
        self.data
            .extend_from_slice(if on { b"\x1b[?7h" } else { b"\x1b[?7l" });
    }

    /// Enable or disable bracketed paste reporting.
    #[inline]
    pub fn bracketed_paste(&mut self, on: bool) {
        self.data
            .extend_from_slice(if on { b"\x1b[?2004h" } else { b"\x1b[?2004l" });
    }

    /// Switch to the given SGR parameters, emitting nothing if they are
    /// already in effect.
    pub fn set_style(&mut self, sgr: &str) {
        if self.style != sgr {
            let _ = write!(self.data, "\x1b[0;{sgr}m");
            sgr.clone_into(&mut self.style);
        }
    }

    /// Flush to a writer in a single syscall.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    pub fn flush_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_all(&self.data)?;
        writer.flush()
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}
