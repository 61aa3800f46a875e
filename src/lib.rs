//! # Linewheel
//!
//! An interactive line-editor engine for terminal shells.
//!
//! Linewheel reads one piece of code at a time from a terminal in raw mode:
//! it decodes key, mouse and paste events from the input bytes, lets widgets
//! edit and render the code, and repaints the screen by diffing against what
//! it painted last.
//!
//! ## Core Concepts
//!
//! - **Buffers**: Lines of styled cells plus a logical cursor, built by
//!   wrapping text at the terminal width
//! - **Diffing writer**: Only the changed suffix of each line is rewritten
//! - **Serial event loop**: Input, signals and redraw requests from any
//!   thread are handled one at a time, with redraws coalesced
//! - **Widgets**: A code area with prompts, plus addons such as lists
//!   stacked below it
//!
//! ## Example
//!
//! ```rust,no_run
//! use linewheel::{App, ConstPrompt, StdTty};
//!
//! let mut app = App::new(StdTty::new()).with_prompt(ConstPrompt::new("> "));
//! loop {
//!     match app.read_line() {
//!         Ok(code) => println!("got {code:?}"),
//!         Err(e) if e.is_end_of_input() => break,
//!         Err(e) => {
//!             eprintln!("{e}");
//!             break;
//!         }
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod app;
pub mod buffer;
pub mod error;
pub mod event_loop;
pub mod input;
pub mod terminal;
pub mod tty;
pub mod widget;

// Re-exports for convenience
pub use app::{App, AppConfig, AppHandle, ConstPrompt, Editor, Highlighter, Prompt};
pub use buffer::{Buffer, BufferBuilder, Cell, Color, Modifiers, Pos, Style, Text, Writer};
pub use error::{Error, Result};
pub use event_loop::{Action, Handler, Loop, LoopHandle, RedrawFlags};
pub use input::{Decoder, Event, KeyCode, KeyEvent, Mod, MouseEvent};
#[cfg(unix)]
pub use tty::StdTty;
pub use tty::{FakeTty, Signal, Tty, TtyCtrl};
pub use widget::{Bindings, CodeArea, MapBindings, Widget};
