//! Cell: The atomic unit of terminal display.
//!
//! A cell holds the text occupying one screen position (a grapheme cluster,
//! so combining marks stay with their base character) and the SGR parameter
//! string it is drawn with. Wide characters occupy a single cell that is two
//! columns wide.

use unicode_width::UnicodeWidthStr;

/// A single styled screen cell.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Cell {
    /// The grapheme shown in this cell.
    pub text: String,
    /// SGR parameters, e.g. `"1;31"`. Empty means the default style.
    pub style: String,
}

impl Cell {
    /// Create a cell from text and an SGR style string.
    pub fn new(text: impl Into<String>, style: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: style.into(),
        }
    }

    /// An unstyled single space.
    pub fn space() -> Self {
        Self::new(" ", "")
    }

    /// Display width of this cell in columns.
    #[inline]
    pub fn width(&self) -> usize {
        self.text.width()
    }
}

/// A position in a buffer: zero-based line and display column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pos {
    /// Line index.
    pub line: usize,
    /// Column, counted in display width.
    pub col: usize,
}

impl Pos {
    /// Create a position.
    #[inline]
    pub const fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

/// Total display width of a run of cells.
pub fn cells_width(cells: &[Cell]) -> usize {
    cells.iter().map(Cell::width).sum()
}

/// Compare two lines of cells.
///
/// Returns `None` if they are equal, or the index of the first cell that
/// differs. If one line is a prefix of the other, the index is the length of
/// the shorter one.
pub fn compare_cells(a: &[Cell], b: &[Cell]) -> Option<usize> {
    if let Some(i) = a.iter().zip(b).position(|(x, y)| x != y) {
        return Some(i);
    }
    (a.len() != b.len()).then(|| a.len().min(b.len()))
}

/// `n` unstyled spaces.
pub fn spacing(n: usize) -> Vec<Cell> {
    vec![Cell::space(); n]
}
