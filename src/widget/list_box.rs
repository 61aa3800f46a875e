//! List Box Widget: A scrolling list with one selected item.
//!
//! Items are single lines of styled text. When there are more items than
//! rows, the list shows a window around the selection, keeping a couple of
//! rows of context above and below it where possible and scrolling as little
//! as it can from the previous window.

use super::label::Label;
use super::{run_bindings, Bindings, Widget};
use crate::buffer::{Buffer, BufferBuilder, Modifiers, Text};
use crate::input::{Event, KeyCode, KeyEvent};
use std::cell::Cell;
use std::fmt;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Rows kept between the selection and the window edges.
const RESPECT_DISTANCE: usize = 2;

type ItemFn = Box<dyn FnMut(&[Text], usize) + Send>;

/// A list of items with a selection.
#[derive(Default)]
pub struct ListBox {
    items: Vec<Text>,
    selected: usize,
    /// First item shown by the last render.
    first: Cell<usize>,
    placeholder: Text,
    padding: usize,
    on_select: Option<ItemFn>,
    on_accept: Option<ItemFn>,
    bindings: Option<Box<dyn Bindings<Self>>>,
}

impl ListBox {
    /// A list of `items` with the first one selected.
    pub fn new(items: Vec<Text>) -> Self {
        Self {
            items,
            ..Self::default()
        }
    }

    /// Text shown when there are no items.
    #[must_use]
    pub fn with_placeholder(mut self, placeholder: impl Into<Text>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Blank columns on each side of every item.
    #[must_use]
    pub const fn with_padding(mut self, padding: usize) -> Self {
        self.padding = padding;
        self
    }

    /// Call `f` with the items and the new index whenever the selection
    /// changes.
    #[must_use]
    pub fn with_on_select(mut self, f: impl FnMut(&[Text], usize) + Send + 'static) -> Self {
        self.on_select = Some(Box::new(f));
        self
    }

    /// Call `f` with the items and the selected index on Enter.
    #[must_use]
    pub fn with_on_accept(mut self, f: impl FnMut(&[Text], usize) + Send + 'static) -> Self {
        self.on_accept = Some(Box::new(f));
        self
    }

    /// Consult `bindings` before the built-in keys.
    #[must_use]
    pub fn with_bindings(mut self, bindings: impl Bindings<Self> + 'static) -> Self {
        self.bindings = Some(Box::new(bindings));
        self
    }

    /// The items.
    #[inline]
    pub fn items(&self) -> &[Text] {
        &self.items
    }

    /// Index of the selected item.
    #[inline]
    pub const fn selected(&self) -> usize {
        self.selected
    }

    /// Replace the items and select `selected`. Triggers the select callback
    /// if the index is valid.
    pub fn reset(&mut self, items: Vec<Text>, selected: usize) {
        self.items = items;
        self.selected = selected;
        self.first.set(0);
        self.notify_select();
    }

    /// Select item `i`, clamped to the list. Triggers the select callback if
    /// the selection changed.
    pub fn select(&mut self, i: usize) {
        let i = i.min(self.items.len().saturating_sub(1));
        if i != self.selected {
            self.selected = i;
            self.notify_select();
        }
    }

    /// Select the previous item, if any.
    pub fn select_prev(&mut self) {
        self.select(self.selected.saturating_sub(1));
    }

    /// Select the next item, if any.
    pub fn select_next(&mut self) {
        self.select(self.selected.saturating_add(1));
    }

    /// Trigger the accept callback with the selected item.
    pub fn accept(&mut self) {
        if self.selected < self.items.len() {
            if let Some(f) = self.on_accept.as_mut() {
                f(&self.items, self.selected);
            }
        }
    }

    fn notify_select(&mut self) {
        if self.selected < self.items.len() {
            if let Some(f) = self.on_select.as_mut() {
                f(&self.items, self.selected);
            }
        }
    }

    /// First item to show in a window of `height` rows.
    ///
    /// The window always contains the selection and is filled as far as the
    /// items allow. Among the windows keeping the context rows, the one
    /// closest to the previous window wins.
    fn window(&self, height: usize) -> usize {
        let n = self.items.len();
        let selected = self.selected.min(n.saturating_sub(1));
        if height <= 1 {
            return selected;
        }
        let last_first = self.first.get();

        let budget = height - 1;
        let mut need_down = if budget >= 2 * RESPECT_DISTANCE {
            RESPECT_DISTANCE
        } else {
            budget / 2
        };
        let use_down = (n - 1 - selected).min(budget);
        need_down = need_down.min(use_down);

        let budget_up = budget - need_down;
        if budget_up == 0 {
            return selected;
        }
        let mut use_up = 0;
        for i in (0..selected).rev() {
            use_up += 1;
            if use_up >= budget_up {
                return i;
            }
            if i <= last_first && use_up >= RESPECT_DISTANCE && use_up + use_down >= budget {
                return i;
            }
        }
        0
    }

    fn render_item(&self, item: &Text, width: usize, selected: bool) -> Text {
        let inner = width.saturating_sub(2 * self.padding);
        let pad = " ".repeat(self.padding.min(width));
        let mut line = Text::plain(pad).concat(trim_width(item, inner));
        if selected {
            let used = line.width();
            line = line.concat(Text::plain(" ".repeat(width.saturating_sub(used))));
            line = reverse(&line);
        }
        line
    }
}

/// The longest prefix of `text` fitting in `width` columns.
fn trim_width(text: &Text, width: usize) -> Text {
    let mut out = Text::new();
    let mut used = 0;
    for seg in text.segments() {
        let mut end = 0;
        for (i, g) in seg.text.grapheme_indices(true) {
            let w = g.width();
            if used + w > width {
                out.push(&seg.text[..end], seg.style);
                return out;
            }
            used += w;
            end = i + g.len();
        }
        out.push(seg.text.clone(), seg.style);
    }
    out
}

fn reverse(text: &Text) -> Text {
    let mut out = Text::new();
    for seg in text.segments() {
        out.push(seg.text.clone(), seg.style.with(Modifiers::REVERSED));
    }
    out
}

impl fmt::Debug for ListBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListBox")
            .field("items", &self.items.len())
            .field("selected", &self.selected)
            .field("first", &self.first.get())
            .finish_non_exhaustive()
    }
}

impl Widget for ListBox {
    fn render(&self, width: usize, height: usize) -> Buffer {
        if self.items.is_empty() {
            self.first.set(0);
            return Label::new(self.placeholder.clone()).render(width, height);
        }
        let first = self.window(height);
        self.first.set(first);

        let mut bb = BufferBuilder::new(width);
        let last = self.items.len().min(first + height.max(1));
        for (i, item) in self.items[first..last].iter().enumerate() {
            if i > 0 {
                bb.newline();
            }
            let i = first + i;
            bb.write_styled(&self.render_item(item, width, i == self.selected));
        }
        bb.buffer()
    }

    fn handle(&mut self, event: &Event) -> bool {
        if run_bindings(self, |w| &mut w.bindings, event) {
            return true;
        }
        let Event::Key(key) = *event else {
            return false;
        };
        if key == KeyEvent::new(KeyCode::Up) {
            self.select_prev();
        } else if key == KeyEvent::new(KeyCode::Down) {
            self.select_next();
        } else if key == KeyEvent::new(KeyCode::Enter) {
            self.accept();
        } else {
            return false;
        }
        true
    }

    fn max_height(&self, _width: usize, height: usize) -> usize {
        self.items.len().min(height)
    }
}
