//! Column View Widget: Widgets side by side.
//!
//! Columns are separated by a one-column gap and share the remaining width
//! by weight. One column has focus: it gets events first and holds the dot.

use super::{run_bindings, Bindings, Widget};
use crate::buffer::{Buffer, Pos};
use crate::input::{Event, KeyCode, KeyEvent};
use std::fmt;

const COLUMN_GAP: usize = 1;

/// Several widgets arranged in columns.
pub struct ColumnView {
    columns: Vec<Box<dyn Widget>>,
    weights: Vec<usize>,
    focus: usize,
    bindings: Option<Box<dyn Bindings<Self>>>,
}

impl ColumnView {
    /// Columns of equal weight, with the first one focused.
    pub fn new(columns: Vec<Box<dyn Widget>>) -> Self {
        let weights = vec![1; columns.len()];
        Self {
            columns,
            weights,
            focus: 0,
            bindings: None,
        }
    }

    /// Use `weights` for the column widths. Missing weights count as 1.
    #[must_use]
    pub fn with_weights(mut self, weights: Vec<usize>) -> Self {
        self.weights = weights;
        self
    }

    /// Consult `bindings` before the focused column.
    #[must_use]
    pub fn with_bindings(mut self, bindings: impl Bindings<Self> + 'static) -> Self {
        self.bindings = Some(Box::new(bindings));
        self
    }

    /// Index of the focused column.
    #[inline]
    pub const fn focus_column(&self) -> usize {
        self.focus
    }

    /// Focus column `i`, clamped to the existing columns.
    pub fn set_focus_column(&mut self, i: usize) {
        self.focus = i.min(self.columns.len().saturating_sub(1));
    }

    /// The columns.
    pub fn columns(&self) -> &[Box<dyn Widget>] {
        &self.columns
    }

    /// The columns, mutably.
    pub fn columns_mut(&mut self) -> &mut Vec<Box<dyn Widget>> {
        &mut self.columns
    }

    /// Focus the column to the left.
    pub fn left(&mut self) {
        self.set_focus_column(self.focus.saturating_sub(1));
    }

    /// Focus the column to the right.
    pub fn right(&mut self) {
        self.set_focus_column(self.focus + 1);
    }

    /// Column widths, or `None` when too narrow to show every column.
    fn widths(&self, width: usize) -> Option<Vec<usize>> {
        let n = self.columns.len();
        if n == 0 || width < n {
            return None;
        }
        let weights: Vec<usize> = (0..n)
            .map(|i| self.weights.get(i).copied().unwrap_or(1))
            .collect();
        Some(distribute(width - (n - 1) * COLUMN_GAP, &weights))
    }
}

/// Split `total` by `weights`, spreading rounding error over the columns:
/// each column gets its share of what the previous ones left.
fn distribute(total: usize, weights: &[usize]) -> Vec<usize> {
    let mut remain_width = total;
    let mut remain_weight: usize = weights.iter().sum();
    weights
        .iter()
        .map(|&weight| {
            let w = if remain_weight == 0 {
                0
            } else {
                remain_width * weight / remain_weight
            };
            remain_width -= w;
            remain_weight -= weight;
            w
        })
        .collect()
}

impl fmt::Debug for ColumnView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnView")
            .field("columns", &self.columns.len())
            .field("weights", &self.weights)
            .field("focus", &self.focus)
            .finish_non_exhaustive()
    }
}

impl Widget for ColumnView {
    fn render(&self, width: usize, height: usize) -> Buffer {
        let Some(widths) = self.widths(width) else {
            return Buffer::new(width);
        };
        let mut buf: Option<Buffer> = None;
        let mut x = 0;
        for (i, (col, &w)) in self.columns.iter().zip(&widths).enumerate() {
            let b = col.render(w, height);
            let dot = b.dot;
            match buf.as_mut() {
                None => buf = Some(b),
                Some(acc) => {
                    acc.width += COLUMN_GAP;
                    x += COLUMN_GAP;
                    acc.extend_right(b);
                }
            }
            if i == self.focus {
                if let Some(acc) = buf.as_mut() {
                    acc.dot = Pos::new(dot.line, x + dot.col);
                }
            }
            x += w;
        }
        let mut buf = buf.unwrap_or_else(|| Buffer::new(width));
        buf.width = width;
        buf
    }

    fn handle(&mut self, event: &Event) -> bool {
        if run_bindings(self, |w| &mut w.bindings, event) {
            return true;
        }
        if let Some(col) = self.columns.get_mut(self.focus) {
            if col.handle(event) {
                return true;
            }
        }
        match *event {
            Event::Key(key) if key == KeyEvent::new(KeyCode::Left) => self.left(),
            Event::Key(key) if key == KeyEvent::new(KeyCode::Right) => self.right(),
            _ => return false,
        }
        true
    }

    fn max_height(&self, width: usize, height: usize) -> usize {
        let Some(widths) = self.widths(width) else {
            return 0;
        };
        self.columns
            .iter()
            .zip(widths)
            .map(|(col, w)| col.max_height(w, height))
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{BufferBuilder, Text};
    use crate::widget::testing::{assert_render, feed};
    use crate::widget::{CodeArea, CodeAreaState, CodeBuffer, Label, ListBox};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_distribute_spreads_rounding() {
        assert_eq!(distribute(9, &[1, 1, 1, 1, 1]), [1, 2, 2, 2, 2]);
        assert_eq!(distribute(10, &[1, 1]), [5, 5]);
        assert_eq!(distribute(10, &[1, 4]), [2, 8]);
    }

    #[test]
    fn test_render_columns_side_by_side() {
        let w = ColumnView::new(vec![
            Box::new(Label::new("ab\ncd")),
            Box::new(Label::new("xyz")),
        ]);
        let want = BufferBuilder::new(7)
            .write_plain("ab  xyz")
            .newline()
            .write_plain("cd")
            .buffer();
        assert_render(&w, 7, 10, &want);
        assert_eq!(w.max_height(7, 10), 2);
    }

    #[test]
    fn test_dot_in_focused_column() {
        let code = CodeArea::new().with_state(CodeAreaState {
            buffer: CodeBuffer::new("q"),
            ..Default::default()
        });
        let mut w = ColumnView::new(vec![Box::new(Label::new("left")), Box::new(code)]);
        w.set_focus_column(1);
        assert_eq!(w.render(9, 5).dot, Pos::new(0, 6));
    }

    #[test]
    fn test_too_narrow_renders_nothing() {
        let w = ColumnView::new(vec![Box::new(Label::new("a")), Box::new(Label::new("b"))]);
        assert_render(&w, 1, 5, &Buffer::new(1));
        assert_eq!(w.max_height(1, 5), 0);
    }

    #[test]
    fn test_focus_switching() {
        let list = ListBox::new(vec![Text::plain("1"), Text::plain("2")]);
        let mut w = ColumnView::new(vec![Box::new(list), Box::new(Label::new("x"))]);
        let left = Event::Key(KeyEvent::new(KeyCode::Left));
        let right = Event::Key(KeyEvent::new(KeyCode::Right));
        let down = Event::Key(KeyEvent::new(KeyCode::Down));

        assert_eq!(feed(&mut w, &[down, right, right]), [true, true, true]);
        assert_eq!(w.focus_column(), 1);
        // The label handles nothing, so Down falls through unhandled.
        assert!(!w.handle(&down));
        feed(&mut w, &[left, left]);
        assert_eq!(w.focus_column(), 0);
    }
}
