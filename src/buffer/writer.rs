//! Writer: Reconcile committed buffers with the terminal.
//!
//! The writer remembers the last main buffer it committed and where it left
//! the cursor (that buffer's dot). A new commit:
//!
//! 1. Hides the cursor and rewinds to the first line of the previous frame
//! 2. On a full refresh, erases everything below and writes the notes
//! 3. Writes each line of the new frame, skipping unchanged lines and
//!    unchanged line prefixes when diffing
//! 4. Clears lines left over from a taller previous frame
//! 5. Moves the cursor to the new dot and shows it again
//!
//! All output is accumulated in one [`OutputBuffer`] and flushed with a
//! single write.

use super::cell::{cells_width, compare_cells, Cell};
use super::Buffer;
use crate::terminal::OutputBuffer;
use std::io::{self, Write};

/// Diffing writer over any byte sink.
#[derive(Debug)]
pub struct Writer<W: Write> {
    out: W,
    /// The main buffer shown on screen, if any.
    current: Option<Buffer>,
    /// Pre-allocated output buffer.
    output: OutputBuffer,
}

impl<W: Write> Writer<W> {
    /// Create a writer with nothing committed yet.
    pub fn new(out: W) -> Self {
        Self {
            out,
            current: None,
            output: OutputBuffer::new(),
        }
    }

    /// The last committed main buffer.
    #[inline]
    pub const fn current(&self) -> Option<&Buffer> {
        self.current.as_ref()
    }

    /// Forget the committed buffer. The next commit starts from the cursor's
    /// line as if the screen were blank below it.
    pub fn reset(&mut self) {
        self.current = None;
    }

    /// The underlying sink.
    #[inline]
    pub const fn get_ref(&self) -> &W {
        &self.out
    }

    /// The underlying sink, mutably.
    #[inline]
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.out
    }

    /// Write `main` to the terminal, preceded by `notes` if given.
    ///
    /// A full refresh happens when requested, when there are notes, when
    /// nothing has been committed, or when the width changed. Otherwise only
    /// the differing parts of each line are rewritten. Notes are written
    /// above the main buffer and then forgotten, so they end up in the
    /// scrollback.
    pub fn commit(&mut self, notes: Option<&Buffer>, main: &Buffer, full: bool) -> io::Result<()> {
        let prev = self.current.take();
        let full = full
            || notes.is_some()
            || prev.as_ref().map_or(true, |p| p.width != main.width);

        log::trace!(
            "writing {} lines (previous {}), full = {}",
            main.lines.len(),
            prev.as_ref().map_or(0, |p| p.lines.len()),
            full
        );

        let out = &mut self.output;
        out.clear();
        out.cursor_hide();

        // Back to the first line of what we drew last time.
        if let Some(p) = &prev {
            out.cursor_up(p.dot.line);
        }
        out.carriage_return();

        if full {
            out.erase_below();
            if let Some(notes) = notes {
                out.autowrap(true);
                for (i, line) in notes.lines.iter().enumerate() {
                    if i > 0 {
                        out.newline();
                    }
                    write_cells(out, line);
                }
                out.set_style("");
                out.newline();
                out.autowrap(false);
            }
        }

        let old_lines = prev.as_ref().filter(|_| !full).map(|p| p.lines.as_slice());
        for (i, line) in main.lines.iter().enumerate() {
            if i > 0 {
                out.newline();
            }
            let Some(old) = old_lines.and_then(|lines| lines.get(i)) else {
                write_cells(out, line);
                continue;
            };
            let Some(j) = compare_cells(line, old) else {
                continue;
            };
            out.cursor_forward(cells_width(&line[..j]));
            if j < old.len() {
                out.set_style("");
                out.erase_line_right();
            }
            write_cells(out, &line[j..]);
        }

        if old_lines.is_some_and(|old| old.len() > main.lines.len()) {
            // Clear the leftover lines, then come back up.
            out.set_style("");
            out.newline();
            out.erase_below();
            out.cursor_up(1);
        }

        out.set_style("");
        let end = main.lines.len().saturating_sub(1);
        let dot = main.dot;
        if dot.line < end {
            out.cursor_up(end - dot.line);
        } else {
            out.cursor_down(dot.line - end);
        }
        out.carriage_return();
        out.cursor_forward(dot.col);
        out.cursor_show();

        log::trace!("flushing {} bytes", out.len());
        out.flush_to(&mut self.out)?;
        self.current = Some(main.clone());
        Ok(())
    }
}

fn write_cells(out: &mut OutputBuffer, cells: &[Cell]) {
    for cell in cells {
        out.set_style(&cell.style);
        out.write_str(&cell.text);
    }
}
