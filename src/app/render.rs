//! Laying out a session's frame: notes, and widgets stacked vertically.

use crate::buffer::{Buffer, BufferBuilder, Text};
use crate::widget::Widget;

/// Notes one per line. Notes are not limited by the terminal height; they
/// scroll away above the main buffer.
pub fn render_notes(notes: &[Text], width: usize) -> Buffer {
    let mut bb = BufferBuilder::new(width);
    for (i, note) in notes.iter().enumerate() {
        if i > 0 {
            bb.newline();
        }
        bb.write_styled(note);
    }
    bb.buffer()
}

/// Split `height` rows among `widgets`. Returns each widget's rows and the
/// index of the focused widget (the last one that wants focus).
///
/// When there are at least as many rows as widgets, rows are handed out in
/// order of each widget's maximum height: a widget gets its maximum if every
/// widget still waiting could get as much, else an even share of what is
/// left. Widgets with smaller maximums thus never get more rows than widgets
/// with larger ones. With fewer rows than widgets, the focused widget and
/// those below it get one row each first, then those above.
pub fn distribute_height(widgets: &[&dyn Widget], width: usize, height: usize) -> (Vec<usize>, usize) {
    let n = widgets.len();
    let focus = widgets.iter().rposition(|w| w.focus()).unwrap_or(0);
    let mut heights = vec![0; n];

    if height <= n {
        let below = focus..n;
        let above = (0..focus).rev();
        for i in below.chain(above).take(height) {
            heights[i] = 1;
        }
        return (heights, focus);
    }

    let max_heights: Vec<usize> = widgets.iter().map(|w| w.max_height(width, height)).collect();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by_key(|&i| max_heights[i]);

    let mut remain = height;
    for (rank, &i) in order.iter().enumerate() {
        let waiting = n - rank;
        heights[i] = if remain >= max_heights[i] * waiting {
            max_heights[i]
        } else {
            remain / waiting
        };
        remain -= heights[i];
    }
    (heights, focus)
}

/// Render `widgets` top to bottom within `height` rows, with the dot in the
/// focused widget. Widgets given no rows are left out.
pub fn render_stack(widgets: &[&dyn Widget], width: usize, height: usize) -> Buffer {
    let (heights, focus) = distribute_height(widgets, width, height);
    let mut buf: Option<Buffer> = None;
    for (i, (w, &h)) in widgets.iter().zip(&heights).enumerate() {
        if h == 0 {
            continue;
        }
        let b = w.render(width, h);
        match buf.as_mut() {
            None => buf = Some(b),
            Some(acc) => acc.extend(b, i == focus),
        }
    }
    buf.unwrap_or_else(|| Buffer::new(width))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Pos;
    use crate::input::Event;
    use pretty_assertions::assert_eq;

    /// Renders `lines` numbered lines, truncated to the height.
    struct Block {
        lines: usize,
        focus: bool,
    }

    impl Widget for Block {
        fn render(&self, width: usize, height: usize) -> Buffer {
            let text: Vec<String> = (0..self.lines.min(height)).map(|i| i.to_string()).collect();
            BufferBuilder::new(width).write_plain(&text.join("\n")).buffer()
        }

        fn handle(&mut self, _event: &Event) -> bool {
            false
        }

        fn max_height(&self, _width: usize, height: usize) -> usize {
            self.lines.min(height)
        }

        fn focus(&self) -> bool {
            self.focus
        }
    }

    fn block(lines: usize) -> Block {
        Block { lines, focus: true }
    }

    #[test]
    fn test_notes_one_per_line() {
        let notes = [Text::plain("first"), Text::plain("second")];
        let want = BufferBuilder::new(10).write_plain("first\nsecond").buffer();
        assert_eq!(render_notes(&notes, 10), want);
    }

    #[test]
    fn test_everything_fits() {
        let (a, b) = (block(2), block(3));
        assert_eq!(distribute_height(&[&a, &b], 10, 10), (vec![2, 3], 1));
    }

    #[test]
    fn test_scarce_rows_shared_by_max_height() {
        let (a, b, c) = (block(1), block(10), block(10));
        assert_eq!(distribute_height(&[&a, &b, &c], 10, 8), (vec![1, 3, 4], 2));

        let (a, b) = (block(10), block(2));
        assert_eq!(distribute_height(&[&a, &b], 10, 5), (vec![3, 2], 1));
    }

    #[test]
    fn test_fewer_rows_than_widgets_keeps_focus() {
        let a = block(3);
        let b = Block { lines: 3, focus: true };
        let c = Block { lines: 3, focus: false };
        assert_eq!(distribute_height(&[&a, &b, &c], 10, 2), (vec![0, 1, 1], 1));
        assert_eq!(distribute_height(&[&a, &b, &c], 10, 1), (vec![0, 1, 0], 1));
        assert_eq!(distribute_height(&[&a, &b, &c], 10, 3), (vec![1, 1, 1], 1));
    }

    #[test]
    fn test_render_stack_moves_dot_to_focus() {
        let a = block(2);
        let b = Block { lines: 1, focus: false };
        let c = block(1);
        let buf = render_stack(&[&a, &b, &c], 5, 10);
        assert_eq!(buf.height(), 4);
        assert_eq!(buf.dot, Pos::new(3, 0));

        let buf = render_stack(&[&a, &b, &c], 5, 1);
        let want = BufferBuilder::new(5).write_plain("0").buffer();
        assert_eq!(buf, want);
    }
}
