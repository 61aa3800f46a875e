//! Label Widget: Static styled text.

use super::Widget;
use crate::buffer::{Buffer, BufferBuilder, Text};
use crate::input::Event;

/// A widget showing a fixed piece of styled text. It handles no events.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Label {
    /// The text shown.
    pub content: Text,
}

impl Label {
    /// A label showing `content`.
    pub fn new(content: impl Into<Text>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

impl Widget for Label {
    fn render(&self, width: usize, height: usize) -> Buffer {
        let mut b = BufferBuilder::new(width).write_styled(&self.content).buffer();
        b.truncate_to_height(height);
        b
    }

    fn handle(&mut self, _event: &Event) -> bool {
        false
    }
}
