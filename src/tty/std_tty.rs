//! The process's own terminal: stdin for input, stderr for output.
//!
//! Input is decoded on a `linewheel-input` thread and signals are relayed
//! from a `linewheel-signals` thread. Both are joined when stopped.

use super::{Restore, Signal, Tty};
use crate::buffer::{Buffer, Writer};
use crate::error::{Error, Result};
use crate::input::{Decoder, Event, StdinSource};
use crate::terminal::OutputBuffer;
use crossbeam_channel::{bounded, Receiver, SendTimeoutError, Sender, TrySendError};
use crossterm::terminal;
use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGWINCH};
use signal_hook::iterator::{Handle, Signals};
use std::io::{self, Stderr, Write};
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Capacity of the decoded input channel.
const INPUT_CHANNEL_SIZE: usize = 128;

/// Capacity of the signal channel. Signals beyond it are dropped.
const SIGNAL_CHANNEL_SIZE: usize = 32;

/// How long a blocked send waits before checking the shutdown flag.
const SEND_POLL: Duration = Duration::from_millis(50);

/// Size reported when the terminal cannot tell.
const FALLBACK_SIZE: (usize, usize) = (24, 80);

/// Marks "no pending raw-mode request".
const NO_RAW_REQUEST: i32 = i32::MIN;

/// The controlling terminal.
#[derive(Debug)]
pub struct StdTty {
    writer: Mutex<Writer<Stderr>>,
    input: Mutex<Option<InputActor>>,
    raw: Arc<AtomicI32>,
    signals: Mutex<Option<SignalActor>>,
}

impl StdTty {
    /// A terminal over the process's stdin and stderr.
    pub fn new() -> Self {
        Self {
            writer: Mutex::new(Writer::new(io::stderr())),
            input: Mutex::new(None),
            raw: Arc::new(AtomicI32::new(NO_RAW_REQUEST)),
            signals: Mutex::new(None),
        }
    }
}

impl Default for StdTty {
    fn default() -> Self {
        Self::new()
    }
}

/// Write terminal mode toggles in one go.
fn write_modes(on: bool) -> io::Result<()> {
    let mut out = OutputBuffer::with_capacity(32);
    out.autowrap(!on);
    out.bracketed_paste(on);
    let mut stderr = io::stderr();
    out.flush_to(&mut stderr)?;
    stderr.flush()
}

impl Tty for StdTty {
    fn setup(&self) -> Result<Restore> {
        terminal::enable_raw_mode().map_err(Error::Setup)?;
        if let Err(e) = write_modes(true) {
            let _ = terminal::disable_raw_mode();
            return Err(Error::Setup(e));
        }
        Ok(Restore::new(|| {
            let modes = write_modes(false);
            terminal::disable_raw_mode()?;
            modes
        }))
    }

    fn size(&self) -> (usize, usize) {
        match terminal::size() {
            Ok((cols, rows)) if cols > 0 && rows > 0 => (usize::from(rows), usize::from(cols)),
            Ok(_) => FALLBACK_SIZE,
            Err(e) => {
                log::debug!("querying terminal size: {e}");
                FALLBACK_SIZE
            }
        }
    }

    fn start_input(&self) -> Result<Receiver<Event>> {
        let (tx, rx) = bounded(INPUT_CHANNEL_SIZE);
        let actor = InputActor::spawn(tx, Arc::clone(&self.raw))?;
        let old = self
            .input
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(actor);
        if let Some(old) = old {
            old.join();
        }
        Ok(rx)
    }

    fn set_raw_input(&self, n: i32) {
        self.raw.store(n, Ordering::Release);
    }

    fn stop_input(&self) {
        let actor = self.input.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(actor) = actor {
            actor.join();
        }
    }

    fn notify_signals(&self) -> Result<Receiver<Signal>> {
        let (tx, rx) = bounded(SIGNAL_CHANNEL_SIZE);
        let actor = SignalActor::spawn(tx)?;
        let old = self
            .signals
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(actor);
        if let Some(old) = old {
            old.join();
        }
        Ok(rx)
    }

    fn stop_signals(&self) {
        let actor = self.signals.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(actor) = actor {
            actor.join();
        }
    }

    fn commit(&self, notes: Option<&Buffer>, main: &Buffer, full: bool) -> Result<()> {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(writer.commit(notes, main, full)?)
    }

    fn reset_buffer(&self) {
        self.writer.lock().unwrap_or_else(PoisonError::into_inner).reset();
    }
}

/// Decodes stdin on its own thread.
#[derive(Debug)]
struct InputActor {
    handle: Option<JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
}

impl InputActor {
    fn spawn(sender: Sender<Event>, raw: Arc<AtomicI32>) -> Result<Self> {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = Arc::clone(&shutdown);
        let handle = thread::Builder::new()
            .name("linewheel-input".to_string())
            .spawn(move || Self::run_loop(&sender, &shutdown_clone, &raw))?;
        Ok(Self {
            handle: Some(handle),
            shutdown,
        })
    }

    fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    fn join(mut self) {
        self.shutdown();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    fn run_loop(sender: &Sender<Event>, shutdown: &Arc<AtomicBool>, raw: &AtomicI32) {
        let mut decoder = Decoder::new(StdinSource::new(Arc::clone(shutdown)));
        loop {
            let n = raw.swap(NO_RAW_REQUEST, Ordering::AcqRel);
            if n != NO_RAW_REQUEST {
                decoder.set_raw(n);
            }
            match decoder.read_event() {
                Ok(event) => {
                    if !Self::send(sender, event, shutdown) {
                        break;
                    }
                }
                Err(Error::Stopped) => break,
                Err(Error::EndOfInput) => {
                    log::debug!("terminal input closed");
                    break;
                }
                Err(e) => {
                    log::warn!("reading terminal input: {e}");
                    break;
                }
            }
        }
    }

    /// Send without blocking past a shutdown. Returns `false` if the event
    /// could not be delivered.
    fn send(sender: &Sender<Event>, mut event: Event, shutdown: &AtomicBool) -> bool {
        loop {
            match sender.send_timeout(event, SEND_POLL) {
                Ok(()) => return true,
                Err(SendTimeoutError::Timeout(e)) => {
                    if shutdown.load(Ordering::Relaxed) {
                        return false;
                    }
                    event = e;
                }
                Err(SendTimeoutError::Disconnected(_)) => return false,
            }
        }
    }
}

impl Drop for InputActor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Relays SIGHUP, SIGINT and SIGWINCH on its own thread.
struct SignalActor {
    handle: Option<JoinHandle<()>>,
    signals: Handle,
}

impl std::fmt::Debug for SignalActor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalActor").finish_non_exhaustive()
    }
}

impl SignalActor {
    fn spawn(sender: Sender<Signal>) -> Result<Self> {
        let mut signals = Signals::new([SIGHUP, SIGINT, SIGWINCH])?;
        let close = signals.handle();
        let handle = thread::Builder::new()
            .name("linewheel-signals".to_string())
            .spawn(move || {
                for sig in signals.forever() {
                    let sig = match sig {
                        SIGHUP => Signal::Hangup,
                        SIGINT => Signal::Interrupt,
                        SIGWINCH => Signal::WindowChange,
                        n => Signal::Other(n),
                    };
                    log::debug!("received {sig:?}");
                    match sender.try_send(sig) {
                        Ok(()) => {}
                        Err(TrySendError::Full(sig)) => log::warn!("dropped {sig:?}, queue full"),
                        Err(TrySendError::Disconnected(_)) => break,
                    }
                }
            });
        let handle = match handle {
            Ok(h) => h,
            Err(e) => {
                close.close();
                return Err(e.into());
            }
        };
        Ok(Self {
            handle: Some(handle),
            signals: close,
        })
    }

    fn join(mut self) {
        self.signals.close();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for SignalActor {
    fn drop(&mut self) {
        self.signals.close();
    }
}
