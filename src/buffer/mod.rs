//! Buffer module: The screen model and the writer that puts it on screen.
//!
//! This module contains:
//! - [`Cell`]: One styled screen position
//! - [`Buffer`]: Lines of cells plus the logical cursor (the dot)
//! - [`BufferBuilder`]: Accumulates styled text with wrapping and indent
//! - [`Style`] and [`Text`]: Structured styling rendered to SGR strings
//! - [`Writer`]: Diffs committed buffers into minimal terminal output

mod cell;
#[allow(clippy::module_inception)]
mod buffer;
mod builder;
mod style;
pub mod writer;

pub use buffer::{Buffer, Line};
pub use builder::BufferBuilder;
pub use cell::{cells_width, compare_cells, spacing, Cell, Pos};
pub use style::{Color, Modifiers, Rgb, Segment, Style, Text};
pub use writer::Writer;
