//! TTY module: The boundary between a line-editing session and a terminal.
//!
//! - [`Tty`]: raw mode, size, decoded input, signals and buffer commits
//! - [`StdTty`]: the process's own terminal (unix)
//! - [`FakeTty`]: an in-memory terminal for tests, driven by [`TtyCtrl`]

pub mod fake;
#[cfg(unix)]
mod std_tty;

pub use fake::{FakeTty, TtyCtrl};
#[cfg(unix)]
pub use std_tty::StdTty;

use crate::buffer::Buffer;
use crate::error::Result;
use crate::input::Event;
use crossbeam_channel::Receiver;
use std::fmt;
use std::io;

/// Terminal signals a session reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    /// The terminal went away (SIGHUP).
    Hangup,
    /// The user asked to interrupt (SIGINT).
    Interrupt,
    /// The terminal was resized (SIGWINCH).
    WindowChange,
    /// Anything else, by number.
    Other(i32),
}

/// What a session needs from a terminal.
///
/// Methods take `&self`; implementations synchronize internally so the
/// session thread and its relays can share one terminal.
pub trait Tty: Send + Sync {
    /// Put the terminal into the mode line editing needs. The returned guard
    /// undoes it.
    fn setup(&self) -> Result<Restore>;

    /// Current size as `(rows, columns)`.
    fn size(&self) -> (usize, usize);

    /// Start decoding input. Events arrive on the returned channel, which
    /// disconnects if the input ends.
    fn start_input(&self) -> Result<Receiver<Event>>;

    /// Deliver the next `n` runes raw (`-1`: until set back to 0).
    fn set_raw_input(&self, n: i32);

    /// Stop decoding input. Nothing more arrives on the input channel once
    /// this returns.
    fn stop_input(&self);

    /// Start relaying signals.
    fn notify_signals(&self) -> Result<Receiver<Signal>>;

    /// Stop relaying signals. Nothing more arrives on the signal channel once
    /// this returns.
    fn stop_signals(&self);

    /// Show `main`, writing `notes` above it first.
    fn commit(&self, notes: Option<&Buffer>, main: &Buffer, full: bool) -> Result<()>;

    /// Forget what was committed, so the next commit starts from scratch.
    fn reset_buffer(&self);
}

type RestoreFn = Box<dyn FnOnce() -> io::Result<()> + Send>;

/// Undoes a [`Tty::setup`] when restored or dropped.
#[must_use = "dropping the guard restores the terminal immediately"]
pub struct Restore {
    f: Option<RestoreFn>,
}

impl Restore {
    /// A guard running `f` once.
    pub fn new(f: impl FnOnce() -> io::Result<()> + Send + 'static) -> Self {
        Self {
            f: Some(Box::new(f)),
        }
    }

    /// A guard that does nothing.
    pub const fn noop() -> Self {
        Self { f: None }
    }

    /// Restore now, reporting failure.
    pub fn restore(mut self) -> Result<()> {
        match self.f.take() {
            Some(f) => Ok(f()?),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for Restore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Restore")
            .field("pending", &self.f.is_some())
            .finish()
    }
}

impl Drop for Restore {
    fn drop(&mut self) {
        if let Some(f) = self.f.take() {
            if let Err(e) = f() {
                log::warn!("restoring terminal: {e}");
            }
        }
    }
}
