//! Collaborators that decorate the code area: prompts and highlighters.
//!
//! Both may compute their content asynchronously. When a newer result is
//! ready they send on their late-update channel and the session redraws.

use crate::buffer::Text;
use crossbeam_channel::Receiver;

/// Supplies the text of a prompt.
pub trait Prompt: Send + Sync {
    /// Recompute the prompt. `force` is set at the start of a session and
    /// after an interrupt; otherwise this is called after every event and
    /// may be ignored if nothing changed.
    fn trigger(&self, force: bool);

    /// The prompt to show now.
    fn get(&self) -> Text;

    /// Notifications that [`Prompt::get`] has something newer.
    fn late_updates(&self) -> Option<Receiver<()>> {
        None
    }
}

/// Styles code and reports problems with it.
pub trait Highlighter: Send + Sync {
    /// The styled code and any tips (errors and the like) to show below it.
    fn get(&self, code: &str) -> (Text, Vec<Text>);

    /// Notifications that [`Highlighter::get`] has something newer.
    fn late_updates(&self) -> Option<Receiver<()>> {
        None
    }
}

/// A prompt that never changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstPrompt(pub Text);

impl ConstPrompt {
    /// A prompt always showing `text`.
    pub fn new(text: impl Into<Text>) -> Self {
        Self(text.into())
    }
}

impl Prompt for ConstPrompt {
    fn trigger(&self, _force: bool) {}

    fn get(&self) -> Text {
        self.0.clone()
    }
}

impl<F> Highlighter for F
where
    F: Fn(&str) -> (Text, Vec<Text>) + Send + Sync,
{
    fn get(&self, code: &str) -> (Text, Vec<Text>) {
        self(code)
    }
}
