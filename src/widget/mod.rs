//! Widget module: The render/handle contract and the built-in widgets.
//!
//! A widget renders itself into a [`Buffer`] of a given width, trimmed to at
//! most a given height, and handles input events, reporting whether it did
//! anything with them. Widgets are driven from the event loop thread only;
//! ones shared with other threads (addons) sit behind a mutex.
//!
//! This module contains:
//! - [`CodeArea`]: prompt, editable code, right prompt and highlighter tips
//! - [`Label`]: static styled text
//! - [`ListBox`]: a scrolling list with a selection
//! - [`ComboBox`]: a filter code area above a list box
//! - [`ColumnView`]: widgets side by side with a focused column
//! - [`Bindings`]: key binding overlays consulted before built-in handling

mod code_area;
mod col_view;
mod combo_box;
mod label;
mod list_box;
pub mod testing;

pub use code_area::{CodeArea, CodeAreaState, CodeBuffer};
pub use col_view::ColumnView;
pub use combo_box::ComboBox;
pub use label::Label;
pub use list_box::ListBox;

use crate::buffer::Buffer;
use crate::input::{Event, KeyEvent};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

/// A UI component that can be rendered to a buffer and handle input.
pub trait Widget: Send {
    /// Render into a buffer `width` columns wide and at most `height` lines
    /// tall.
    fn render(&self, width: usize, height: usize) -> Buffer;

    /// Handle an event. Returns `true` if the event was consumed.
    fn handle(&mut self, event: &Event) -> bool;

    /// How many lines this widget would use if given `height`.
    fn max_height(&self, width: usize, height: usize) -> usize {
        self.render(width, height).height()
    }

    /// Whether the widget wants the dot when stacked with others.
    fn focus(&self) -> bool {
        true
    }
}

/// A widget shared between the event loop and other threads.
pub type SharedWidget = Arc<Mutex<dyn Widget>>;

/// Wrap a widget for sharing.
pub fn shared<W: Widget + 'static>(widget: W) -> SharedWidget {
    Arc::new(Mutex::new(widget))
}

/// Key bindings consulted by a widget before its built-in handling.
pub trait Bindings<W: ?Sized>: Send {
    /// Handle `event` on `widget`. Returns `true` if the event was consumed.
    fn handle(&mut self, widget: &mut W, event: &Event) -> bool;
}

impl<W: ?Sized, F> Bindings<W> for F
where
    F: FnMut(&mut W, &Event) -> bool + Send,
{
    fn handle(&mut self, widget: &mut W, event: &Event) -> bool {
        self(widget, event)
    }
}

type Action<W> = Box<dyn FnMut(&mut W) + Send>;

/// Bindings from keys to actions.
pub struct MapBindings<W: ?Sized> {
    map: HashMap<KeyEvent, Action<W>>,
}

impl<W: ?Sized> MapBindings<W> {
    /// No bindings.
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Bind `key` to `action`, replacing any earlier binding.
    #[must_use]
    pub fn bind(mut self, key: KeyEvent, action: impl FnMut(&mut W) + Send + 'static) -> Self {
        self.insert(key, action);
        self
    }

    /// Bind `key` to `action` in place.
    pub fn insert(&mut self, key: KeyEvent, action: impl FnMut(&mut W) + Send + 'static) {
        self.map.insert(key, Box::new(action));
    }

    /// Number of bound keys.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl<W: ?Sized> Default for MapBindings<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: ?Sized> fmt::Debug for MapBindings<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.map.keys()).finish()
    }
}

impl<W: ?Sized> Bindings<W> for MapBindings<W> {
    fn handle(&mut self, widget: &mut W, event: &Event) -> bool {
        let Event::Key(key) = event else {
            return false;
        };
        match self.map.get_mut(key) {
            Some(action) => {
                action(widget);
                true
            }
            None => false,
        }
    }
}

/// Run `bindings` (if any) on `widget`. The bindings are taken out of the
/// slot for the duration of the call so they can borrow the widget mutably.
pub(crate) fn run_bindings<W>(
    widget: &mut W,
    slot: impl Fn(&mut W) -> &mut Option<Box<dyn Bindings<W>>>,
    event: &Event,
) -> bool {
    let Some(mut bindings) = slot(widget).take() else {
        return false;
    };
    let handled = bindings.handle(widget, event);
    *slot(widget) = Some(bindings);
    handled
}
