//! Combo Box Widget: A filter code area above a list box.
//!
//! Events go to the list first (so Up, Down and Enter move and accept the
//! selection), then to the filter. Whenever an edit changes the filter text
//! the filter callback gets to repopulate the list.

use super::{CodeArea, ListBox, Widget};
use crate::buffer::Buffer;
use crate::input::Event;
use std::fmt;

type FilterFn = Box<dyn FnMut(&mut ListBox, &str) + Send>;

/// A code area for typing a filter and a list box showing what matches.
pub struct ComboBox {
    code_area: CodeArea,
    list_box: ListBox,
    on_filter: Option<FilterFn>,
    last_filter: String,
}

impl ComboBox {
    /// Combine `code_area` and `list_box`. `on_filter` is called once now
    /// with the initial filter text and again whenever it changes.
    pub fn new(
        code_area: CodeArea,
        list_box: ListBox,
        on_filter: impl FnMut(&mut ListBox, &str) + Send + 'static,
    ) -> Self {
        let mut w = Self {
            code_area,
            list_box,
            on_filter: Some(Box::new(on_filter)),
            last_filter: String::new(),
        };
        w.refilter();
        w
    }

    /// The filter.
    #[inline]
    pub const fn code_area(&self) -> &CodeArea {
        &self.code_area
    }

    /// The filter, mutably. Call [`ComboBox::refilter`] after changing its
    /// content.
    #[inline]
    pub fn code_area_mut(&mut self) -> &mut CodeArea {
        &mut self.code_area
    }

    /// The list.
    #[inline]
    pub const fn list_box(&self) -> &ListBox {
        &self.list_box
    }

    /// The list, mutably.
    #[inline]
    pub fn list_box_mut(&mut self) -> &mut ListBox {
        &mut self.list_box
    }

    /// Run the filter callback with the current filter text.
    pub fn refilter(&mut self) {
        self.last_filter = self.code_area.content().to_string();
        if let Some(f) = self.on_filter.as_mut() {
            f(&mut self.list_box, &self.last_filter);
        }
    }
}

impl fmt::Debug for ComboBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComboBox")
            .field("code_area", &self.code_area)
            .field("list_box", &self.list_box)
            .finish_non_exhaustive()
    }
}

impl Widget for ComboBox {
    fn render(&self, width: usize, height: usize) -> Buffer {
        let mut b = self.code_area.render(width, height);
        let rest = height.saturating_sub(b.height());
        if rest > 0 {
            b.extend(self.list_box.render(width, rest), false);
        }
        b
    }

    fn handle(&mut self, event: &Event) -> bool {
        if self.list_box.handle(event) {
            return true;
        }
        if !self.code_area.handle(event) {
            return false;
        }
        if self.code_area.content() != self.last_filter {
            self.refilter();
        }
        true
    }

    fn max_height(&self, width: usize, height: usize) -> usize {
        self.code_area.max_height(width, height) + self.list_box.max_height(width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{BufferBuilder, Text};
    use crate::input::{KeyCode, KeyEvent};
    use crate::widget::testing::{assert_render, feed, keys};
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};

    const WORDS: [&str; 4] = ["apple", "banana", "apricot", "cherry"];

    fn filtering(calls: Arc<Mutex<Vec<String>>>) -> ComboBox {
        ComboBox::new(
            CodeArea::new().with_prompt(|| Text::plain("/")),
            ListBox::new(Vec::new()),
            move |list, filter| {
                calls.lock().unwrap().push(filter.to_string());
                let items = WORDS
                    .iter()
                    .filter(|w| w.contains(filter))
                    .map(|w| Text::plain(*w))
                    .collect();
                list.reset(items, 0);
            },
        )
    }

    #[test]
    fn test_filter_on_edit() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut w = filtering(Arc::clone(&calls));
        assert_eq!(w.list_box().items().len(), 4);

        feed(&mut w, &keys("ap"));
        let shown: Vec<String> = w.list_box().items().iter().map(Text::to_plain).collect();
        assert_eq!(shown, ["apple", "apricot"]);

        // Cursor motion does not change the filter.
        feed(&mut w, &[Event::Key(KeyEvent::new(KeyCode::Left))]);
        assert_eq!(*calls.lock().unwrap(), ["", "a", "ap"]);
    }

    #[test]
    fn test_list_handles_first() {
        let mut w = filtering(Arc::new(Mutex::new(Vec::new())));
        feed(&mut w, &[Event::Key(KeyEvent::new(KeyCode::Down))]);
        assert_eq!(w.list_box().selected(), 1);
        assert_eq!(w.code_area().content(), "");
        assert!(!w.handle(&Event::Key(KeyEvent::ctrl('X'))));
    }

    #[test]
    fn test_render_filter_above_list() {
        let mut w = filtering(Arc::new(Mutex::new(Vec::new())));
        feed(&mut w, &keys("ch"));
        let want = BufferBuilder::new(8)
            .write_plain("/ch")
            .set_dot_here()
            .newline()
            .write_str("cherry  ", "7")
            .buffer();
        assert_render(&w, 8, 5, &want);
        assert_eq!(w.max_height(8, 5), 2);
    }
}
