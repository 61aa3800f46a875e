//! Style: Text styling and its SGR rendering.
//!
//! Cells carry their style as an opaque SGR parameter string (for example
//! `"1;31"`). [`Style`] is the structured way to build one, and [`Text`] is
//! a run of styled segments that widgets, prompts and highlighters exchange.

use bitflags::bitflags;
use std::fmt::Write as _;
use unicode_width::UnicodeWidthStr;

/// True-color RGB representation.
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Rgb {
    /// Red channel (0-255)
    pub r: u8,
    /// Green channel (0-255)
    pub g: u8,
    /// Blue channel (0-255)
    pub b: u8,
}

impl Rgb {
    /// Create a new RGB color.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Create from a 24-bit hex color (e.g., 0xFF5500).
    #[inline]
    pub const fn from_u32(hex: u32) -> Self {
        Self::new(
            ((hex >> 16) & 0xFF) as u8,
            ((hex >> 8) & 0xFF) as u8,
            (hex & 0xFF) as u8,
        )
    }
}

impl std::fmt::Debug for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl From<(u8, u8, u8)> for Rgb {
    #[inline]
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::new(r, g, b)
    }
}

/// A terminal color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    /// One of the 8 basic colors, 0 (black) through 7 (white).
    Basic(u8),
    /// One of the 8 bright colors, 0 through 7.
    Bright(u8),
    /// A color from the 256-color palette.
    Indexed(u8),
    /// A 24-bit color.
    Rgb(Rgb),
}

impl Color {
    /// Black.
    pub const BLACK: Self = Self::Basic(0);
    /// Red.
    pub const RED: Self = Self::Basic(1);
    /// Green.
    pub const GREEN: Self = Self::Basic(2);
    /// Yellow.
    pub const YELLOW: Self = Self::Basic(3);
    /// Blue.
    pub const BLUE: Self = Self::Basic(4);
    /// Magenta.
    pub const MAGENTA: Self = Self::Basic(5);
    /// Cyan.
    pub const CYAN: Self = Self::Basic(6);
    /// White.
    pub const WHITE: Self = Self::Basic(7);

    /// Appends the SGR parameters for this color. `base` is 30 for
    /// foreground and 40 for background.
    fn write_sgr(self, out: &mut String, base: u8) {
        let _ = match self {
            Self::Basic(n) => write!(out, "{}", base + (n & 7)),
            Self::Bright(n) => write!(out, "{}", base + 60 + (n & 7)),
            Self::Indexed(n) => write!(out, "{};5;{}", base + 8, n),
            Self::Rgb(c) => write!(out, "{};2;{};{};{}", base + 8, c.r, c.g, c.b),
        };
    }
}

bitflags! {
    /// Text style modifiers.
    ///
    /// These can be combined using bitwise OR.
    ///
    /// # Example
    /// ```
    /// use linewheel::Modifiers;
    /// let style = Modifiers::BOLD | Modifiers::ITALIC;
    /// ```
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        /// Bold text
        const BOLD = 0b0000_0001;
        /// Dim/faint text
        const DIM = 0b0000_0010;
        /// Italic text
        const ITALIC = 0b0000_0100;
        /// Underlined text
        const UNDERLINE = 0b0000_1000;
        /// Blinking text
        const BLINK = 0b0001_0000;
        /// Reversed colors (fg/bg swapped)
        const REVERSED = 0b0010_0000;
        /// Hidden/invisible text
        const HIDDEN = 0b0100_0000;
        /// Strikethrough text
        const STRIKETHROUGH = 0b1000_0000;
    }
}

impl std::fmt::Debug for Modifiers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        bitflags::parser::to_writer(self, f)
    }
}

/// SGR codes for each modifier, in emission order.
const MODIFIER_CODES: [(Modifiers, &str); 8] = [
    (Modifiers::BOLD, "1"),
    (Modifiers::DIM, "2"),
    (Modifiers::ITALIC, "3"),
    (Modifiers::UNDERLINE, "4"),
    (Modifiers::BLINK, "5"),
    (Modifiers::REVERSED, "7"),
    (Modifiers::HIDDEN, "8"),
    (Modifiers::STRIKETHROUGH, "9"),
];

/// Structured text style.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Style {
    /// Foreground color; `None` keeps the terminal default.
    pub fg: Option<Color>,
    /// Background color; `None` keeps the terminal default.
    pub bg: Option<Color>,
    /// Modifiers.
    pub modifiers: Modifiers,
}

impl Style {
    /// The default style, rendering as an empty SGR string.
    pub const PLAIN: Self = Self {
        fg: None,
        bg: None,
        modifiers: Modifiers::empty(),
    };

    /// Set the foreground color.
    #[inline]
    #[must_use]
    pub const fn fg(mut self, color: Color) -> Self {
        self.fg = Some(color);
        self
    }

    /// Set the background color.
    #[inline]
    #[must_use]
    pub const fn bg(mut self, color: Color) -> Self {
        self.bg = Some(color);
        self
    }

    /// Add modifiers.
    #[inline]
    #[must_use]
    pub const fn with(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = self.modifiers.union(modifiers);
        self
    }

    /// Render as an SGR parameter string: foreground, background, then
    /// modifiers, separated by `;`.
    pub fn sgr(&self) -> String {
        let mut out = String::new();
        if let Some(fg) = self.fg {
            fg.write_sgr(&mut out, 30);
        }
        if let Some(bg) = self.bg {
            if !out.is_empty() {
                out.push(';');
            }
            bg.write_sgr(&mut out, 40);
        }
        for (flag, code) in MODIFIER_CODES {
            if self.modifiers.contains(flag) {
                if !out.is_empty() {
                    out.push(';');
                }
                out.push_str(code);
            }
        }
        out
    }
}

/// A run of text sharing one style.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Segment {
    /// The text.
    pub text: String,
    /// Its style.
    pub style: Style,
}

/// Styled text: an ordered list of segments.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Text {
    segments: Vec<Segment>,
}

impl Text {
    /// Empty text.
    pub const fn new() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Unstyled text.
    pub fn plain(text: impl Into<String>) -> Self {
        Self::styled(text, Style::PLAIN)
    }

    /// Text in a single style.
    pub fn styled(text: impl Into<String>, style: Style) -> Self {
        let text = text.into();
        if text.is_empty() {
            return Self::new();
        }
        Self {
            segments: vec![Segment { text, style }],
        }
    }

    /// Append a segment. Empty strings are dropped.
    pub fn push(&mut self, text: impl Into<String>, style: Style) {
        let text = text.into();
        if !text.is_empty() {
            self.segments.push(Segment { text, style });
        }
    }

    /// Append all segments of another text.
    #[must_use]
    pub fn concat(mut self, other: Self) -> Self {
        self.segments.extend(other.segments);
        self
    }

    /// The segments.
    #[inline]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Whether there is no text at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.iter().all(|s| s.text.is_empty())
    }

    /// The text without styles.
    pub fn to_plain(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }

    /// Display width of the whole text.
    pub fn width(&self) -> usize {
        self.segments.iter().map(|s| s.text.width()).sum()
    }

    /// Split at a byte offset into the plain text. Offsets past the end
    /// put everything in the first half.
    pub fn split_at(&self, at: usize) -> (Self, Self) {
        let mut left = Self::new();
        let mut right = Self::new();
        let mut consumed = 0;
        for seg in &self.segments {
            let end = consumed + seg.text.len();
            if end <= at {
                left.push(seg.text.clone(), seg.style);
            } else if consumed >= at {
                right.push(seg.text.clone(), seg.style);
            } else {
                let mut mid = at - consumed;
                while !seg.text.is_char_boundary(mid) {
                    mid -= 1;
                }
                left.push(&seg.text[..mid], seg.style);
                right.push(&seg.text[mid..], seg.style);
            }
            consumed = end;
        }
        (left, right)
    }
}

impl From<&str> for Text {
    fn from(s: &str) -> Self {
        Self::plain(s)
    }
}

impl From<String> for Text {
    fn from(s: String) -> Self {
        Self::plain(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sgr_plain_is_empty() {
        assert_eq!(Style::PLAIN.sgr(), "");
    }

    #[test]
    fn test_sgr_order() {
        let style = Style::PLAIN
            .with(Modifiers::BOLD | Modifiers::REVERSED)
            .fg(Color::RED)
            .bg(Color::Indexed(236));
        assert_eq!(style.sgr(), "31;48;5;236;1;7");
    }

    #[test]
    fn test_sgr_bright_and_rgb() {
        let style = Style::PLAIN
            .fg(Color::Bright(2))
            .bg(Color::Rgb(Rgb::from_u32(0xFF5500)));
        assert_eq!(style.sgr(), "92;48;2;255;85;0");
    }

    #[test]
    fn test_split_at_inside_segment() {
        let red = Style::PLAIN.fg(Color::RED);
        let text = Text::plain("ab").concat(Text::styled("cde", red));
        let (left, right) = text.split_at(3);
        assert_eq!(left, Text::plain("ab").concat(Text::styled("c", red)));
        assert_eq!(right, Text::styled("de", red));
    }

    #[test]
    fn test_split_at_respects_char_boundary() {
        let text = Text::plain("a好");
        let (left, right) = text.split_at(2);
        assert_eq!(left.to_plain(), "a");
        assert_eq!(right.to_plain(), "好");
    }

    #[test]
    fn test_width_counts_wide_chars() {
        assert_eq!(Text::plain("a好").width(), 3);
    }
}
