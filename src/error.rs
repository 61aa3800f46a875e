//! Error types shared across the crate.

use std::io;

/// Errors produced while reading a line from the terminal.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The terminal could not be put into raw mode. Nothing was started.
    #[error("terminal setup failed: {0}")]
    Setup(#[source] io::Error),

    /// The session ended without code: hang-up, explicit end-of-input, or
    /// the terminal closed its input.
    #[error("end of input")]
    EndOfInput,

    /// A rune did not arrive within the requested duration.
    #[error("read timed out")]
    Timeout,

    /// The byte source was stopped by its owner.
    #[error("input stopped")]
    Stopped,

    /// Any other I/O failure.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    /// Whether this error marks a normal end of the session rather than a
    /// failure.
    #[inline]
    pub const fn is_end_of_input(&self) -> bool {
        matches!(self, Self::EndOfInput)
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
