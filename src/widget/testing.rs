//! Helpers for table-testing widgets.
//!
//! ```
//! use linewheel::widget::testing::{assert_render, feed, keys};
//! use linewheel::widget::CodeArea;
//! use linewheel::BufferBuilder;
//!
//! let mut w = CodeArea::new();
//! feed(&mut w, &keys("hi"));
//! let want = BufferBuilder::new(10).write_plain("hi").set_dot_here().buffer();
//! assert_render(&w, 10, 24, &want);
//! ```

use super::Widget;
use crate::buffer::Buffer;
use crate::input::{Event, KeyEvent};

/// Render `widget` and compare against `want`, showing both buffers in
/// [`Buffer::tty_string`] form on mismatch.
///
/// # Panics
///
/// If the rendered buffer differs from `want`.
#[track_caller]
pub fn assert_render<W: Widget + ?Sized>(widget: &W, width: usize, height: usize, want: &Buffer) {
    let got = widget.render(width, height);
    assert!(
        got == *want,
        "render({width}, {height}) mismatch\ngot:\n{}want:\n{}",
        got.tty_string(),
        want.tty_string()
    );
}

/// Feed events to `widget` in order, returning whether each was handled.
pub fn feed<W: Widget + ?Sized>(widget: &mut W, events: &[Event]) -> Vec<bool> {
    events.iter().map(|e| widget.handle(e)).collect()
}

/// One plain key event per character of `s`.
pub fn keys(s: &str) -> Vec<Event> {
    s.chars().map(|c| Event::Key(KeyEvent::char(c))).collect()
}
