//! `BufferBuilder`: Accumulates styled text into a [`Buffer`].
//!
//! The builder tracks the current column and wraps text at the buffer
//! width. Two wrapping modes exist:
//!
//! - **Lazy wrap** (default): a line wraps only when the next cell would
//!   overflow it.
//! - **Eager wrap**: a line wraps as soon as the column reaches the width,
//!   so the position after the last written cell is always a real cell.
//!   This keeps the cursor model exact when echoing user text.
//!
//! Wrapped continuation lines start with `indent` blank cells, unless the
//! indent would take more than half the width.

use super::buffer::{Buffer, Line};
use super::cell::{Cell, Pos};
use super::style::Text;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Mutable accumulator producing a [`Buffer`].
#[derive(Clone, Debug)]
pub struct BufferBuilder {
    width: usize,
    col: usize,
    indent: usize,
    eager_wrap: bool,
    lines: Vec<Line>,
    dot: Pos,
}

impl BufferBuilder {
    /// A builder for a buffer of the given width, starting with one empty
    /// line.
    pub fn new(width: usize) -> Self {
        Self {
            width,
            col: 0,
            indent: 0,
            eager_wrap: false,
            lines: vec![Vec::with_capacity(width)],
            dot: Pos::default(),
        }
    }

    /// The width being built for.
    #[inline]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// The current column.
    #[inline]
    pub const fn col(&self) -> usize {
        self.col
    }

    /// Number of lines so far.
    #[inline]
    pub fn height(&self) -> usize {
        self.lines.len()
    }

    /// The position where the next cell goes.
    pub fn cursor(&self) -> Pos {
        Pos::new(self.lines.len() - 1, self.col)
    }

    /// Set the indent of continuation lines.
    pub fn set_indent(&mut self, indent: usize) -> &mut Self {
        self.indent = indent;
        self
    }

    /// Use the current column as the indent of continuation lines.
    pub fn indent_here(&mut self) -> &mut Self {
        self.indent = self.col;
        self
    }

    /// Switch between eager and lazy wrapping.
    pub fn set_eager_wrap(&mut self, eager: bool) -> &mut Self {
        self.eager_wrap = eager;
        self
    }

    /// Mark the current position as the dot.
    pub fn set_dot_here(&mut self) -> &mut Self {
        self.dot = self.cursor();
        self
    }

    /// Start a new line, padded with the indent.
    pub fn newline(&mut self) -> &mut Self {
        self.lines.push(Vec::with_capacity(self.width));
        self.col = 0;
        if self.indent > 0 && self.indent * 2 <= self.width {
            for _ in 0..self.indent {
                self.push_cell(Cell::space());
            }
        }
        self
    }

    fn push_cell(&mut self, cell: Cell) {
        self.col += cell.width();
        if let Some(line) = self.lines.last_mut() {
            line.push(cell);
        }
    }

    /// Write one grapheme cluster. A newline starts a new line; control
    /// characters are shown in caret notation (`^A`) with reverse video.
    pub fn write_grapheme(&mut self, grapheme: &str, style: &str) -> &mut Self {
        if grapheme == "\n" || grapheme == "\r\n" {
            return self.newline();
        }
        let cell = match caret_notation(grapheme) {
            Some(text) => {
                let style = if style.is_empty() {
                    "7".to_string()
                } else {
                    format!("{style};7")
                };
                Cell::new(text, style)
            }
            None => Cell::new(grapheme, style),
        };
        // A cell wider than the whole line can never fit.
        let cell = if cell.text.width() > self.width {
            Cell::new("\u{FFFD}", cell.style)
        } else {
            cell
        };

        if self.col + cell.text.width() > self.width {
            self.newline();
            self.push_cell(cell);
        } else {
            self.push_cell(cell);
            if self.eager_wrap && self.col == self.width {
                self.newline();
            }
        }
        self
    }

    /// Write a string in one SGR style.
    pub fn write_str(&mut self, text: &str, style: &str) -> &mut Self {
        for g in text.graphemes(true) {
            self.write_grapheme(g, style);
        }
        self
    }

    /// Write unstyled text.
    pub fn write_plain(&mut self, text: &str) -> &mut Self {
        self.write_str(text, "")
    }

    /// Write `n` spaces in one style.
    pub fn write_spaces(&mut self, n: usize, style: &str) -> &mut Self {
        for _ in 0..n {
            self.write_grapheme(" ", style);
        }
        self
    }

    /// Write styled text.
    pub fn write_styled(&mut self, text: &Text) -> &mut Self {
        for seg in text.segments() {
            let style = seg.style.sgr();
            self.write_str(&seg.text, &style);
        }
        self
    }

    /// Finish, returning the buffer and leaving the builder empty.
    pub fn buffer(&mut self) -> Buffer {
        let lines = std::mem::replace(&mut self.lines, vec![Vec::with_capacity(self.width)]);
        let dot = std::mem::take(&mut self.dot);
        self.col = 0;
        Buffer {
            width: self.width,
            lines,
            dot,
        }
    }
}

/// `^X` for a lone C0 control character or DEL.
fn caret_notation(grapheme: &str) -> Option<String> {
    let mut chars = grapheme.chars();
    let c = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    let code = u32::from(c);
    if code < 0x20 || code == 0x7f {
        char::from_u32(code ^ 0x40).map(|r| format!("^{r}"))
    } else {
        None
    }
}
