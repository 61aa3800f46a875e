//! Input events produced by the decoder.
//!
//! Events are plain values: they are compared by value in tests and are
//! cheap to copy between threads.

use crate::buffer::Pos;
use bitflags::bitflags;
use std::fmt;

/// Key codes for keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A character. Control characters never appear here; they are
    /// reported as the corresponding letter with [`Mod::CTRL`].
    Char(char),
    /// Function key (F1-F12).
    F(u8),
    /// Backspace key (DEL, 0x7f).
    Backspace,
    /// Enter/Return key.
    Enter,
    /// Tab key. Shift+Tab is `Tab` with [`Mod::SHIFT`].
    Tab,
    /// Left arrow.
    Left,
    /// Right arrow.
    Right,
    /// Up arrow.
    Up,
    /// Down arrow.
    Down,
    /// Home key.
    Home,
    /// End key.
    End,
    /// Page Up.
    PageUp,
    /// Page Down.
    PageDown,
    /// Delete key.
    Delete,
    /// Insert key.
    Insert,
}

bitflags! {
    /// Key modifiers. Meta is reported as Alt.
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Mod: u8 {
        /// Shift key held.
        const SHIFT = 0b0001;
        /// Alt (or Meta) key held.
        const ALT = 0b0010;
        /// Control key held.
        const CTRL = 0b0100;
    }
}

impl fmt::Debug for Mod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        bitflags::parser::to_writer(self, f)
    }
}

/// A key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    /// The key.
    pub code: KeyCode,
    /// Modifiers held during the key press.
    pub mods: Mod,
}

impl KeyEvent {
    /// An unmodified key.
    #[inline]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            mods: Mod::empty(),
        }
    }

    /// A key with modifiers.
    #[inline]
    pub const fn with(code: KeyCode, mods: Mod) -> Self {
        Self { code, mods }
    }

    /// An unmodified character key.
    #[inline]
    pub const fn char(c: char) -> Self {
        Self::new(KeyCode::Char(c))
    }

    /// A Ctrl-modified character key.
    #[inline]
    pub const fn ctrl(c: char) -> Self {
        Self::with(KeyCode::Char(c), Mod::CTRL)
    }

    /// An Alt-modified character key.
    #[inline]
    pub const fn alt(c: char) -> Self {
        Self::with(KeyCode::Char(c), Mod::ALT)
    }

    /// Add modifiers.
    #[inline]
    #[must_use]
    pub const fn plus(self, mods: Mod) -> Self {
        Self::with(self.code, self.mods.union(mods))
    }

    /// Whether this is a printable character with no modifiers, i.e.
    /// something a text widget should insert.
    pub fn is_plain_char(&self) -> bool {
        matches!(self.code, KeyCode::Char(c) if !c.is_control()) && self.mods.is_empty()
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.mods.contains(Mod::CTRL) {
            f.write_str("Ctrl-")?;
        }
        if self.mods.contains(Mod::ALT) {
            f.write_str("Alt-")?;
        }
        if self.mods.contains(Mod::SHIFT) {
            f.write_str("Shift-")?;
        }
        match self.code {
            KeyCode::Char(' ') => f.write_str("Space"),
            KeyCode::Char(c) => write!(f, "{c}"),
            KeyCode::F(n) => write!(f, "F{n}"),
            other => write!(f, "{other:?}"),
        }
    }
}

impl From<KeyCode> for KeyEvent {
    fn from(code: KeyCode) -> Self {
        Self::new(code)
    }
}

/// A mouse report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    /// Position as reported by the terminal (1-based line and column).
    pub pos: Pos,
    /// Whether the button was pressed (as opposed to released).
    pub down: bool,
    /// Button number 0-3; `None` for a legacy release report, which does not
    /// say which button was released.
    pub button: Option<u8>,
    /// Modifiers held.
    pub mods: Mod,
}

/// Events decoded from the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A key press.
    Key(KeyEvent),
    /// A mouse report.
    Mouse(MouseEvent),
    /// Start (`true`) or end (`false`) of a bracketed paste.
    Paste(bool),
    /// A cursor position report (1-based).
    CursorPosition {
        /// Row.
        row: usize,
        /// Column.
        col: usize,
    },
    /// A character read in raw mode, without escape-sequence parsing.
    Raw(char),
}

impl From<KeyEvent> for Event {
    fn from(k: KeyEvent) -> Self {
        Self::Key(k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_display() {
        assert_eq!(KeyEvent::char('a').to_string(), "a");
        assert_eq!(KeyEvent::ctrl('A').to_string(), "Ctrl-A");
        assert_eq!(KeyEvent::with(KeyCode::Tab, Mod::SHIFT).to_string(), "Shift-Tab");
        assert_eq!(
            KeyEvent::with(KeyCode::Up, Mod::CTRL | Mod::ALT).to_string(),
            "Ctrl-Alt-Up"
        );
        assert_eq!(KeyEvent::new(KeyCode::F(5)).to_string(), "F5");
        assert_eq!(KeyEvent::char(' ').to_string(), "Space");
    }

    #[test]
    fn test_is_plain_char() {
        assert!(KeyEvent::char('x').is_plain_char());
        assert!(!KeyEvent::alt('x').is_plain_char());
        assert!(!KeyEvent::new(KeyCode::Enter).is_plain_char());
    }
}
