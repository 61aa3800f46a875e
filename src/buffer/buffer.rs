//! Buffer: One frame of what should be on screen.
//!
//! A buffer is a list of lines of cells with a fixed width and a logical
//! cursor, the *dot*. Widgets render into buffers, composites stack them
//! vertically ([`Buffer::extend`]) or horizontally ([`Buffer::extend_right`]),
//! and the writer reconciles them with the terminal.

use super::cell::{cells_width, spacing, Cell, Pos};
use std::fmt::Write as _;
use unicode_width::UnicodeWidthStr;

/// One line of cells.
pub type Line = Vec<Cell>;

/// A frame: width, lines, and the position of the dot.
///
/// Every line fits within `width` columns. The dot addresses an existing
/// line; its column may equal the line's width, meaning "after the last
/// cell".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Buffer {
    /// Width in columns.
    pub width: usize,
    /// The lines, top to bottom.
    pub lines: Vec<Line>,
    /// The logical cursor.
    pub dot: Pos,
}

impl Buffer {
    /// A buffer holding one empty line, with the dot at its start.
    pub fn new(width: usize) -> Self {
        Self {
            width,
            lines: vec![Vec::with_capacity(width)],
            dot: Pos::default(),
        }
    }

    /// Number of lines.
    #[inline]
    pub fn height(&self) -> usize {
        self.lines.len()
    }

    /// Display width of the last line.
    pub fn col(&self) -> usize {
        self.lines.last().map_or(0, |l| cells_width(l))
    }

    /// Position just after the last cell of the last line.
    pub fn cursor(&self) -> Pos {
        Pos::new(self.lines.len().saturating_sub(1), self.col())
    }

    /// Keep only lines `low..high`, shifting the dot up accordingly. The
    /// range is clamped to the existing lines.
    pub fn trim_to_lines(&mut self, low: usize, high: usize) {
        let high = high.min(self.lines.len());
        let low = low.min(high);
        self.lines.truncate(high);
        self.lines.drain(..low);
        self.dot.line = self.dot.line.saturating_sub(low);
    }

    /// Keep at most `height` lines, preferring lines around the dot: all lines
    /// up to the dot and as many after it as fit, or else the `height` lines
    /// ending at the dot.
    pub fn truncate_to_height(&mut self, height: usize) {
        if self.lines.len() <= height {
            return;
        }
        if self.dot.line < height {
            self.trim_to_lines(0, height);
        } else {
            let low = self.dot.line + 1 - height;
            self.trim_to_lines(low, self.dot.line + 1);
        }
    }

    /// Append the lines of `other` below this buffer. With `move_dot`, the
    /// dot moves to where `other`'s dot ends up.
    pub fn extend(&mut self, other: Self, move_dot: bool) {
        if move_dot {
            self.dot = Pos::new(other.dot.line + self.lines.len(), other.dot.col);
        }
        self.lines.extend(other.lines);
    }

    /// Place `other` to the right of this buffer. Lines of this buffer are
    /// padded to its width first; extra lines of `other` are indented by it.
    /// The dot stays where it was.
    pub fn extend_right(&mut self, other: Self) {
        let w = self.width;
        self.width += other.width;
        let mut rest = other.lines.into_iter();
        for line in &mut self.lines {
            let Some(right) = rest.next() else { break };
            let used = cells_width(line);
            if used < w {
                line.extend(spacing(w - used));
            }
            line.extend(right);
        }
        for right in rest {
            let mut line = spacing(w);
            line.extend(right);
            self.lines.push(line);
        }
    }

    /// Render the buffer inside a box for debugging and test failures.
    /// Unused columns are shown as `$` followed by spaces.
    pub fn tty_string(&self) -> String {
        let mut sb = String::new();
        let _ = writeln!(
            sb,
            "Width = {}, Dot = ({}, {})",
            self.width, self.dot.line, self.dot.col
        );
        let _ = writeln!(sb, "┌{}┐", "─".repeat(self.width));
        for line in &self.lines {
            sb.push('│');
            let mut last_style = "";
            let mut used = 0;
            for cell in line {
                if cell.style != last_style {
                    match (last_style.is_empty(), cell.style.is_empty()) {
                        (true, _) => {
                            let _ = write!(sb, "\x1b[{}m", cell.style);
                        }
                        (false, true) => sb.push_str("\x1b[m"),
                        (false, false) => {
                            let _ = write!(sb, "\x1b[;{}m", cell.style);
                        }
                    }
                    last_style = cell.style.as_str();
                }
                sb.push_str(&cell.text);
                used += cell.text.width();
            }
            if !last_style.is_empty() {
                sb.push_str("\x1b[m");
            }
            if used < self.width {
                sb.push('$');
                sb.push_str(&" ".repeat(self.width - used - 1));
            }
            sb.push_str("│\n");
        }
        let _ = writeln!(sb, "└{}┘", "─".repeat(self.width));
        sb
    }
}
