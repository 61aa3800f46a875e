//! App: Reading code from a terminal, one line-editing session at a time.
//!
//! An [`App`] ties the pieces together: a [`Tty`] for input and output, an
//! event [`Loop`] that serializes everything the session does, a
//! [`CodeArea`] for the code, and a stack of addon widgets below it.
//!
//! [`App::read_line`] runs one session:
//!
//! 1. Reset state and run the before-readline hooks
//! 2. Set up the terminal, start relaying input, signals and late updates
//! 3. Trigger the prompts and run the loop until the code is committed
//! 4. Stop the relays, restore the terminal, run the after-readline hooks
//!    and reset state again
//!
//! Other threads interact with a running session through an [`AppHandle`].

mod prompt;
mod relay;
mod render;

pub use prompt::{ConstPrompt, Highlighter, Prompt};
pub use render::{distribute_height, render_notes, render_stack};

use self::relay::Relay;
use crate::buffer::{Buffer, Text};
use crate::error::{Error, Result};
use crate::event_loop::{Action, Handler, Loop, LoopHandle, RedrawFlags, DEFAULT_QUEUE_CAPACITY};
use crate::input::{Event, KeyCode, KeyEvent};
use crate::tty::{Signal, Tty};
use crate::widget::{Bindings, CodeArea, SharedWidget, Widget};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Session settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Use at most this many rows, even if the terminal is taller.
    pub max_height: Option<usize>,
    /// Keep the right prompt in the final frame of a session.
    pub rprompt_persistent: bool,
    /// Capacity of the event queue.
    pub queue_capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            max_height: None,
            rprompt_persistent: false,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl AppConfig {
    /// Cap the rendered height.
    #[must_use]
    pub const fn with_max_height(mut self, rows: usize) -> Self {
        self.max_height = Some(rows);
        self
    }

    /// Keep the right prompt after the session ends.
    #[must_use]
    pub const fn with_rprompt_persistent(mut self, persistent: bool) -> Self {
        self.rprompt_persistent = persistent;
        self
    }

    /// Set the event queue capacity.
    #[must_use]
    pub const fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }
}

/// What the session's event loop handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// Decoded terminal input.
    Input(Event),
    /// A terminal signal.
    Signal(Signal),
    /// A prompt or highlighter has newer content.
    LateUpdate,
    /// Check for a commit made from another thread.
    Wake,
    /// The terminal input ended.
    InputClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Commit {
    Code,
    Eof,
}

/// State shared between the session and other threads.
#[derive(Default)]
struct State {
    notes: Vec<Text>,
    addons: Vec<SharedWidget>,
    commit: Option<Commit>,
}

fn lock_widget(w: &SharedWidget) -> MutexGuard<'_, dyn Widget + 'static> {
    w.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Talks to a session from any thread.
#[derive(Clone)]
pub struct AppHandle {
    state: Arc<Mutex<State>>,
    loop_handle: LoopHandle<AppEvent>,
}

impl AppHandle {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Show `note` above the code at the next redraw.
    pub fn notify(&self, note: impl Into<Text>) {
        self.lock().notes.push(note.into());
        self.redraw(false);
    }

    /// Request a redraw, repainting everything if `full`.
    pub fn redraw(&self, full: bool) {
        self.loop_handle.redraw(full);
    }

    /// End the session, returning the code.
    pub fn commit_code(&self) {
        self.lock().commit = Some(Commit::Code);
        self.loop_handle.try_input(AppEvent::Wake);
    }

    /// End the session with [`Error::EndOfInput`].
    pub fn commit_eof(&self) {
        self.lock().commit = Some(Commit::Eof);
        self.loop_handle.try_input(AppEvent::Wake);
    }

    /// Show `widget` below the code and any other addons. It gets events
    /// before the code area.
    pub fn push_addon(&self, widget: SharedWidget) {
        self.lock().addons.push(widget);
        self.redraw(false);
    }

    /// Remove the topmost addon.
    pub fn pop_addon(&self) -> Option<SharedWidget> {
        let w = self.lock().addons.pop();
        self.redraw(false);
        w
    }

    /// Number of addons shown.
    pub fn addon_count(&self) -> usize {
        self.lock().addons.len()
    }

    fn top_addon(&self) -> Option<SharedWidget> {
        self.lock().addons.last().cloned()
    }

    fn addons(&self) -> Vec<SharedWidget> {
        self.lock().addons.clone()
    }

    fn take_notes(&self) -> Vec<Text> {
        std::mem::take(&mut self.lock().notes)
    }

    fn take_commit(&self) -> Option<Commit> {
        self.lock().commit.take()
    }

    fn reset(&self) {
        *self.lock() = State::default();
    }
}

impl fmt::Debug for AppHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("AppHandle")
            .field("notes", &state.notes)
            .field("addons", &state.addons.len())
            .field("commit", &state.commit)
            .finish()
    }
}

/// The part of an [`App`] that global bindings act on.
pub struct Editor {
    code_area: CodeArea,
    handle: AppHandle,
    prompt: Option<Arc<dyn Prompt>>,
    rprompt: Option<Arc<dyn Prompt>>,
}

impl Editor {
    /// The code area.
    #[inline]
    pub const fn code_area(&self) -> &CodeArea {
        &self.code_area
    }

    /// The code area, mutably.
    #[inline]
    pub fn code_area_mut(&mut self) -> &mut CodeArea {
        &mut self.code_area
    }

    /// A handle to the session.
    #[inline]
    pub const fn handle(&self) -> &AppHandle {
        &self.handle
    }

    fn trigger_prompts(&self, force: bool) {
        for p in self.prompt.iter().chain(&self.rprompt) {
            p.trigger(force);
        }
    }

    /// Forget the code, notes and addons.
    fn reset(&mut self) {
        self.code_area.reset();
        self.handle.reset();
    }
}

impl fmt::Debug for Editor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Editor")
            .field("code_area", &self.code_area)
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

type BeforeHook = Box<dyn FnMut() + Send>;
type AfterHook = Box<dyn FnMut(&str) + Send>;

/// A line editor over a terminal.
pub struct App<T: Tty> {
    tty: T,
    config: AppConfig,
    event_loop: Loop<AppEvent>,
    editor: Editor,
    highlighter: Option<Arc<dyn Highlighter>>,
    global_bindings: Option<Box<dyn Bindings<Editor>>>,
    before_readline: Vec<BeforeHook>,
    after_readline: Vec<AfterHook>,
}

impl<T: Tty> App<T> {
    /// An app with the default configuration.
    pub fn new(tty: T) -> Self {
        Self::with_config(tty, AppConfig::default())
    }

    /// An app with the given configuration.
    pub fn with_config(tty: T, config: AppConfig) -> Self {
        let event_loop = Loop::new(config.queue_capacity);
        let handle = AppHandle {
            state: Arc::default(),
            loop_handle: event_loop.handle(),
        };
        let submit = handle.clone();
        let code_area = CodeArea::new().with_on_submit(move |_| submit.commit_code());
        Self {
            tty,
            config,
            event_loop,
            editor: Editor {
                code_area,
                handle,
                prompt: None,
                rprompt: None,
            },
            highlighter: None,
            global_bindings: None,
            before_readline: Vec::new(),
            after_readline: Vec::new(),
        }
    }

    fn map_code_area(mut self, f: impl FnOnce(CodeArea) -> CodeArea) -> Self {
        let code_area = std::mem::take(&mut self.editor.code_area);
        self.editor.code_area = f(code_area);
        self
    }

    /// Show `prompt` before the code.
    #[must_use]
    pub fn with_prompt(self, prompt: impl Prompt + 'static) -> Self {
        let prompt: Arc<dyn Prompt> = Arc::new(prompt);
        let get = Arc::clone(&prompt);
        let mut app = self.map_code_area(|ca| ca.with_prompt(move || get.get()));
        app.editor.prompt = Some(prompt);
        app
    }

    /// Show `rprompt` at the right edge of the last code line.
    #[must_use]
    pub fn with_rprompt(self, rprompt: impl Prompt + 'static) -> Self {
        let rprompt: Arc<dyn Prompt> = Arc::new(rprompt);
        let get = Arc::clone(&rprompt);
        let mut app = self.map_code_area(|ca| ca.with_rprompt(move || get.get()));
        app.editor.rprompt = Some(rprompt);
        app
    }

    /// Style the code with `highlighter`.
    #[must_use]
    pub fn with_highlighter(self, highlighter: impl Highlighter + 'static) -> Self {
        let highlighter: Arc<dyn Highlighter> = Arc::new(highlighter);
        let get = Arc::clone(&highlighter);
        let mut app = self.map_code_area(|ca| ca.with_highlighter(move |code| get.get(code)));
        app.highlighter = Some(highlighter);
        app
    }

    /// Consult `bindings` in the code area before its built-in keys.
    #[must_use]
    pub fn with_code_area_bindings(self, bindings: impl Bindings<CodeArea> + 'static) -> Self {
        self.map_code_area(|ca| ca.with_bindings(bindings))
    }

    /// Consult `bindings` for events no widget handled.
    #[must_use]
    pub fn with_global_bindings(mut self, bindings: impl Bindings<Editor> + 'static) -> Self {
        self.global_bindings = Some(Box::new(bindings));
        self
    }

    /// Run `f` at the start of every session.
    #[must_use]
    pub fn with_before_readline(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.before_readline.push(Box::new(f));
        self
    }

    /// Run `f` with the final code at the end of every session.
    #[must_use]
    pub fn with_after_readline(mut self, f: impl FnMut(&str) + Send + 'static) -> Self {
        self.after_readline.push(Box::new(f));
        self
    }

    /// A handle for talking to sessions from other threads.
    pub fn handle(&self) -> AppHandle {
        self.editor.handle.clone()
    }

    /// The terminal.
    #[inline]
    pub const fn tty(&self) -> &T {
        &self.tty
    }

    /// The editor state.
    #[inline]
    pub const fn editor(&self) -> &Editor {
        &self.editor
    }

    /// The configuration.
    #[inline]
    pub const fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Read one piece of code. Returns [`Error::EndOfInput`] if the session
    /// was ended without code, or [`Error::Setup`] if the terminal could not
    /// be set up.
    ///
    /// State is empty at the start and the end of every session.
    pub fn read_line(&mut self) -> Result<String> {
        self.reset();
        for hook in &mut self.before_readline {
            hook();
        }

        let result = self.run_session();

        let content = self.editor.code_area.content().to_string();
        for hook in &mut self.after_readline {
            hook(&content);
        }
        self.reset();
        result
    }

    fn reset(&mut self) {
        self.editor.reset();
        self.event_loop.clear();
    }

    fn run_session(&mut self) -> Result<String> {
        let restore = self.tty.setup()?;
        let result = self.serve();
        self.tty.stop_input();
        self.tty.stop_signals();
        if let Err(e) = restore.restore() {
            log::warn!("restoring terminal: {e}");
        }
        result
    }

    fn serve(&mut self) -> Result<String> {
        let relays = self.start_relays()?;
        log::debug!("session started with {} relays", relays.len());
        self.editor.trigger_prompts(true);

        let mut session = Session {
            tty: &self.tty,
            config: &self.config,
            editor: &mut self.editor,
            bindings: &mut self.global_bindings,
        };
        let result = self.event_loop.run(&mut session);
        drop(relays);
        result
    }

    fn start_relays(&self) -> Result<Vec<Relay>> {
        let to = self.event_loop.handle().sender().clone();
        let mut relays = Vec::new();

        let input = self.tty.start_input()?;
        relays.push(Relay::spawn(
            input,
            to.clone(),
            AppEvent::Input,
            Some(AppEvent::InputClosed),
        )?);
        let signals = self.tty.notify_signals()?;
        relays.push(Relay::spawn(signals, to.clone(), AppEvent::Signal, None)?);

        let late = [
            self.editor.prompt.as_ref().and_then(|p| p.late_updates()),
            self.editor.rprompt.as_ref().and_then(|p| p.late_updates()),
            self.highlighter.as_ref().and_then(|h| h.late_updates()),
        ];
        for updates in late.into_iter().flatten() {
            relays.push(Relay::spawn(updates, to.clone(), |()| AppEvent::LateUpdate, None)?);
        }
        Ok(relays)
    }
}

/// The loop handler of one session.
struct Session<'a, T: Tty> {
    tty: &'a T,
    config: &'a AppConfig,
    editor: &'a mut Editor,
    bindings: &'a mut Option<Box<dyn Bindings<Editor>>>,
}

impl<T: Tty> Session<'_, T> {
    fn interrupt(&mut self) {
        self.editor.reset();
        self.editor.trigger_prompts(true);
    }

    /// Offer `event` to the top addon, then the code area, then the global
    /// bindings. Enter never reaches the code area while an addon is shown.
    fn handle_input(&mut self, event: &Event) {
        let addon = self.editor.handle.top_addon();
        let mut handled = addon.as_ref().is_some_and(|w| lock_widget(w).handle(event));

        let is_enter = *event == Event::Key(KeyEvent::new(KeyCode::Enter));
        if !handled && (addon.is_none() || !is_enter) {
            handled = self.editor.code_area.handle(event);
        }
        if !handled {
            handled = self.run_global_bindings(event);
        }
        if !handled {
            if let Event::Key(key) = *event {
                self.unhandled_key(key);
            }
        }
    }

    fn run_global_bindings(&mut self, event: &Event) -> bool {
        let Some(mut bindings) = self.bindings.take() else {
            return false;
        };
        let handled = bindings.handle(&mut *self.editor, event);
        *self.bindings = Some(bindings);
        handled
    }

    /// Raw mode turns off the terminal's own handling of Ctrl-C and Ctrl-D.
    fn unhandled_key(&mut self, key: KeyEvent) {
        if key == KeyEvent::ctrl('C') {
            self.interrupt();
        } else if key == KeyEvent::ctrl('D') && self.editor.code_area.content().is_empty() {
            self.editor.handle.commit_eof();
        } else {
            self.editor.handle.notify(format!("Unbound key: {key}"));
        }
    }
}

impl<T: Tty> Handler<AppEvent> for Session<'_, T> {
    type Output = Result<String>;

    fn handle(&mut self, event: AppEvent) -> Action<Self::Output> {
        match event {
            AppEvent::Input(e) => self.handle_input(&e),
            AppEvent::Signal(Signal::Hangup) => {
                log::debug!("hangup, ending session");
                return Action::Quit(Err(Error::EndOfInput));
            }
            AppEvent::Signal(Signal::Interrupt) => self.interrupt(),
            AppEvent::Signal(Signal::WindowChange) => self.editor.handle.redraw(true),
            AppEvent::Signal(Signal::Other(n)) => log::debug!("ignoring signal {n}"),
            AppEvent::InputClosed => return Action::Quit(Err(Error::EndOfInput)),
            AppEvent::LateUpdate | AppEvent::Wake => {}
        }
        match self.editor.handle.take_commit() {
            Some(Commit::Code) => Action::Quit(Ok(self.editor.code_area.content().to_string())),
            Some(Commit::Eof) => Action::Quit(Err(Error::EndOfInput)),
            None => {
                if matches!(event, AppEvent::Input(_)) {
                    self.editor.trigger_prompts(false);
                }
                Action::Continue
            }
        }
    }

    fn redraw(&mut self, flags: RedrawFlags) {
        let (rows, width) = self.tty.size();
        let height = match self.config.max_height {
            Some(max) if max > 0 => rows.min(max),
            _ => rows,
        };
        let notes = self.editor.handle.take_notes();
        let notes = (!notes.is_empty()).then(|| render_notes(&notes, width));
        let is_final = flags.contains(RedrawFlags::FINAL);

        let main = if is_final {
            let state = self.editor.code_area.state_mut();
            state.hide_rprompt = !self.config.rprompt_persistent;
            state.hide_tips = true;
            let mut buf = render_stack(&[&self.editor.code_area], width, height);
            buf.extend(Buffer::new(width), true);
            buf
        } else {
            let addons = self.editor.handle.addons();
            let guards: Vec<_> = addons.iter().map(lock_widget).collect();
            let mut widgets: Vec<&dyn Widget> = vec![&self.editor.code_area];
            widgets.extend(guards.iter().map(|g| &**g));
            render_stack(&widgets, width, height)
        };

        if let Err(e) = self.tty.commit(notes.as_ref(), &main, flags.contains(RedrawFlags::FULL)) {
            log::warn!("writing to terminal: {e}");
        }
        if is_final {
            self.tty.reset_buffer();
        }
    }
}
