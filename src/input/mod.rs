//! Input module: From terminal bytes to structured events.
//!
//! - [`ByteSource`]: where bytes come from (stdin, a channel, a slice)
//! - [`RuneReader`]: UTF-8 decoding with per-byte timeouts
//! - [`Decoder`]: escape-sequence parsing into [`Event`]s

mod decoder;
mod event;
mod source;

pub use decoder::{Decoder, DEFAULT_SEQ_TIMEOUT};
pub use event::{Event, KeyCode, KeyEvent, Mod, MouseEvent};
#[cfg(unix)]
pub use source::StdinSource;
pub use source::{ByteSource, ChannelSource, RuneReader, SliceSource};
