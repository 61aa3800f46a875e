//! Code Area Widget: Prompt, editable code and right prompt.
//!
//! The code is shown after the prompt, highlighted if a highlighter is set,
//! with the dot at the editing position. Continuation lines are indented to
//! line up with the code when the prompt is short enough. The right prompt
//! goes at the end of the last line if there is room for it, and highlighter
//! tips (such as errors) follow on lines of their own.

use super::{run_bindings, Bindings, Widget};
use crate::buffer::{Buffer, BufferBuilder, Text};
use crate::input::{Event, KeyCode, KeyEvent, Mod};
use std::fmt;

/// The code and the dot (a byte offset into it).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CodeBuffer {
    /// The code.
    pub content: String,
    /// Editing position, as a byte index into `content`.
    pub dot: usize,
}

impl CodeBuffer {
    /// A buffer with the dot at the end.
    pub fn new(content: impl Into<String>) -> Self {
        let content = content.into();
        let dot = content.len();
        Self { content, dot }
    }

    /// Insert text at the dot, moving the dot after it.
    pub fn insert_at_dot(&mut self, text: &str) {
        self.content.insert_str(self.dot, text);
        self.dot += text.len();
    }

    fn prev_boundary(&self) -> Option<usize> {
        self.content[..self.dot].char_indices().last().map(|(i, _)| i)
    }

    fn next_boundary(&self) -> Option<usize> {
        self.content[self.dot..]
            .chars()
            .next()
            .map(|c| self.dot + c.len_utf8())
    }

    /// Delete the character before the dot.
    pub fn backspace(&mut self) -> bool {
        let Some(prev) = self.prev_boundary() else {
            return false;
        };
        self.content.replace_range(prev..self.dot, "");
        self.dot = prev;
        true
    }

    /// Delete the character at the dot.
    pub fn delete(&mut self) -> bool {
        let Some(next) = self.next_boundary() else {
            return false;
        };
        self.content.replace_range(self.dot..next, "");
        true
    }

    /// Move the dot one character left.
    pub fn left(&mut self) {
        if let Some(prev) = self.prev_boundary() {
            self.dot = prev;
        }
    }

    /// Move the dot one character right.
    pub fn right(&mut self) {
        if let Some(next) = self.next_boundary() {
            self.dot = next;
        }
    }

    /// Move the dot to the start of its line.
    pub fn home(&mut self) {
        self.dot = self.content[..self.dot].rfind('\n').map_or(0, |i| i + 1);
    }

    /// Move the dot to the end of its line.
    pub fn end(&mut self) {
        self.dot = self.content[self.dot..]
            .find('\n')
            .map_or(self.content.len(), |i| self.dot + i);
    }
}

/// Mutable state of a [`CodeArea`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CodeAreaState {
    /// The code being edited.
    pub buffer: CodeBuffer,
    /// Don't show the right prompt.
    pub hide_rprompt: bool,
    /// Don't show highlighter tips.
    pub hide_tips: bool,
}

type TextFn = Box<dyn Fn() -> Text + Send>;
type HighlightFn = Box<dyn Fn(&str) -> (Text, Vec<Text>) + Send>;

/// A widget for displaying and editing code.
#[derive(Default)]
pub struct CodeArea {
    state: CodeAreaState,
    prompt: Option<TextFn>,
    rprompt: Option<TextFn>,
    highlighter: Option<HighlightFn>,
    on_submit: Option<Box<dyn FnMut(&str) + Send>>,
    bindings: Option<Box<dyn Bindings<Self>>>,
    /// Whether a bracketed paste is in progress.
    pasting: bool,
    paste_buffer: String,
}

impl CodeArea {
    /// An empty code area with no prompt.
    pub fn new() -> Self {
        Self::default()
    }

    /// Show the text returned by `f` before the code.
    #[must_use]
    pub fn with_prompt(mut self, f: impl Fn() -> Text + Send + 'static) -> Self {
        self.prompt = Some(Box::new(f));
        self
    }

    /// Show the text returned by `f` at the right edge.
    #[must_use]
    pub fn with_rprompt(mut self, f: impl Fn() -> Text + Send + 'static) -> Self {
        self.rprompt = Some(Box::new(f));
        self
    }

    /// Highlight the code with `f`, which returns the styled code and any
    /// tips to show below it.
    #[must_use]
    pub fn with_highlighter(
        mut self,
        f: impl Fn(&str) -> (Text, Vec<Text>) + Send + 'static,
    ) -> Self {
        self.highlighter = Some(Box::new(f));
        self
    }

    /// Call `f` with the code when Enter is pressed.
    #[must_use]
    pub fn with_on_submit(mut self, f: impl FnMut(&str) + Send + 'static) -> Self {
        self.on_submit = Some(Box::new(f));
        self
    }

    /// Consult `bindings` before the built-in keys.
    #[must_use]
    pub fn with_bindings(mut self, bindings: impl Bindings<Self> + 'static) -> Self {
        self.bindings = Some(Box::new(bindings));
        self
    }

    /// Start with the given state.
    #[must_use]
    pub fn with_state(mut self, state: CodeAreaState) -> Self {
        self.state = state;
        self
    }

    /// The current state.
    #[inline]
    pub const fn state(&self) -> &CodeAreaState {
        &self.state
    }

    /// The current state, mutably.
    #[inline]
    pub fn state_mut(&mut self) -> &mut CodeAreaState {
        &mut self.state
    }

    /// The code.
    #[inline]
    pub fn content(&self) -> &str {
        &self.state.buffer.content
    }

    /// Clear the state, including any paste in progress.
    pub fn reset(&mut self) {
        self.state = CodeAreaState::default();
        self.pasting = false;
        self.paste_buffer.clear();
    }

    /// Trigger the submit callback with the current code.
    pub fn submit(&mut self) {
        if let Some(f) = self.on_submit.as_mut() {
            f(&self.state.buffer.content);
        }
    }

    fn render_full(&self, width: usize) -> Buffer {
        let code = &self.state.buffer;
        let (styled, tips) = match &self.highlighter {
            Some(h) => h(&code.content),
            None => (Text::plain(code.content.as_str()), Vec::new()),
        };
        let prompt = self.prompt.as_ref().map(|f| f()).unwrap_or_default();

        let mut bb = BufferBuilder::new(width);
        bb.set_eager_wrap(true).write_styled(&prompt);
        if bb.height() == 1 && bb.col() * 2 < width {
            bb.indent_here();
        }
        let (before, after) = styled.split_at(code.dot);
        bb.write_styled(&before)
            .set_dot_here()
            .write_styled(&after)
            .set_eager_wrap(false)
            .set_indent(0);

        if !self.state.hide_rprompt {
            if let Some(rprompt) = self.rprompt.as_ref().map(|f| f()) {
                let w = rprompt.width();
                if w > 0 {
                    let padding = width.saturating_sub(bb.col() + w);
                    if padding >= 1 {
                        bb.write_spaces(padding, "").write_styled(&rprompt);
                    }
                }
            }
        }

        if !self.state.hide_tips {
            for tip in &tips {
                bb.newline().write_styled(tip);
            }
        }
        bb.buffer()
    }

    fn handle_paste(&mut self, start: bool) -> bool {
        if start {
            self.pasting = true;
        } else {
            let text = std::mem::take(&mut self.paste_buffer);
            self.state.buffer.insert_at_dot(&text);
            self.pasting = false;
        }
        true
    }

    fn handle_key(&mut self, key: KeyEvent) -> bool {
        if self.pasting {
            match (key.code, key.mods.is_empty()) {
                (KeyCode::Char(c), true) => self.paste_buffer.push(c),
                (KeyCode::Enter, true) => self.paste_buffer.push('\n'),
                (KeyCode::Tab, true) => self.paste_buffer.push('\t'),
                _ => log::debug!("ignoring {key} inside bracketed paste"),
            }
            return true;
        }

        let buffer = &mut self.state.buffer;
        match (key.code, key.mods) {
            (KeyCode::Enter, m) if m.is_empty() => self.submit(),
            (KeyCode::Backspace, m) if m.is_empty() => {
                buffer.backspace();
            }
            (KeyCode::Char('H'), m) if m == Mod::CTRL => {
                buffer.backspace();
            }
            (KeyCode::Delete, m) if m.is_empty() => {
                buffer.delete();
            }
            (KeyCode::Left, m) if m.is_empty() => buffer.left(),
            (KeyCode::Right, m) if m.is_empty() => buffer.right(),
            (KeyCode::Home, m) if m.is_empty() => buffer.home(),
            (KeyCode::End, m) if m.is_empty() => buffer.end(),
            (KeyCode::Char(c), m) if m.is_empty() && !c.is_control() => {
                let mut tmp = [0; 4];
                buffer.insert_at_dot(c.encode_utf8(&mut tmp));
            }
            _ => return false,
        }
        true
    }
}

impl fmt::Debug for CodeArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodeArea")
            .field("state", &self.state)
            .field("pasting", &self.pasting)
            .finish_non_exhaustive()
    }
}

impl Widget for CodeArea {
    fn render(&self, width: usize, height: usize) -> Buffer {
        let mut b = self.render_full(width);
        b.truncate_to_height(height);
        b
    }

    fn handle(&mut self, event: &Event) -> bool {
        match *event {
            Event::Paste(start) => self.handle_paste(start),
            Event::Key(key) => {
                if !self.pasting && run_bindings(self, |w| &mut w.bindings, event) {
                    return true;
                }
                self.handle_key(key)
            }
            _ => false,
        }
    }

    fn max_height(&self, width: usize, _height: usize) -> usize {
        self.render_full(width).height()
    }
}
