//! An in-memory terminal for tests.
//!
//! [`FakeTty`] goes to the code under test; the paired [`TtyCtrl`] stays
//! with the test to inject input and signals, resize the terminal, and check
//! what got committed. Committed buffers are queued in order; the waiting
//! helpers consume them until one matches.

use super::{Restore, Signal, Tty};
use crate::buffer::Buffer;
use crate::error::{Error, Result};
use crate::input::Event;
use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender};
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Size of a new fake terminal, as `(rows, columns)`.
pub const DEFAULT_SIZE: (usize, usize) = (24, 60);

/// How long the waiting helpers wait by default.
pub const DEFAULT_WAIT: Duration = Duration::from_secs(1);

/// Room for injected events and signals.
const QUEUE_SIZE: usize = 256;

#[derive(Debug)]
struct Shared {
    size: Mutex<(usize, usize)>,
    setup_error: Mutex<Option<String>>,
    setups: AtomicUsize,
    restores: Arc<AtomicUsize>,
    raw_inputs: Mutex<Vec<i32>>,
    buffer_resets: AtomicUsize,
    events_tx: Mutex<Option<Sender<Event>>>,
    events_rx: Receiver<Event>,
    signals_tx: Mutex<Option<Sender<Signal>>>,
    signals_rx: Receiver<Signal>,
    main_tx: Sender<Buffer>,
    notes_tx: Sender<Buffer>,
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A terminal that records everything in memory.
#[derive(Debug)]
pub struct FakeTty {
    shared: Arc<Shared>,
}

/// The test side of a [`FakeTty`].
#[derive(Debug)]
pub struct TtyCtrl {
    shared: Arc<Shared>,
    main_rx: Receiver<Buffer>,
    notes_rx: Receiver<Buffer>,
    wait: Duration,
}

impl FakeTty {
    /// A fake terminal of [`DEFAULT_SIZE`] and its controller.
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> (Self, TtyCtrl) {
        let (events_tx, events_rx) = bounded(QUEUE_SIZE);
        let (signals_tx, signals_rx) = bounded(QUEUE_SIZE);
        let (main_tx, main_rx) = unbounded();
        let (notes_tx, notes_rx) = unbounded();
        let shared = Arc::new(Shared {
            size: Mutex::new(DEFAULT_SIZE),
            setup_error: Mutex::new(None),
            setups: AtomicUsize::new(0),
            restores: Arc::new(AtomicUsize::new(0)),
            raw_inputs: Mutex::new(Vec::new()),
            buffer_resets: AtomicUsize::new(0),
            events_tx: Mutex::new(Some(events_tx)),
            events_rx,
            signals_tx: Mutex::new(Some(signals_tx)),
            signals_rx,
            main_tx,
            notes_tx,
        });
        let ctrl = TtyCtrl {
            shared: Arc::clone(&shared),
            main_rx,
            notes_rx,
            wait: DEFAULT_WAIT,
        };
        (Self { shared }, ctrl)
    }
}

impl Tty for FakeTty {
    fn setup(&self) -> Result<Restore> {
        self.shared.setups.fetch_add(1, Ordering::SeqCst);
        if let Some(msg) = lock(&self.shared.setup_error).clone() {
            return Err(Error::Setup(io::Error::other(msg)));
        }
        let restores = Arc::clone(&self.shared.restores);
        Ok(Restore::new(move || {
            restores.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }))
    }

    fn size(&self) -> (usize, usize) {
        *lock(&self.shared.size)
    }

    fn start_input(&self) -> Result<Receiver<Event>> {
        Ok(self.shared.events_rx.clone())
    }

    fn set_raw_input(&self, n: i32) {
        lock(&self.shared.raw_inputs).push(n);
    }

    fn stop_input(&self) {}

    fn notify_signals(&self) -> Result<Receiver<Signal>> {
        Ok(self.shared.signals_rx.clone())
    }

    fn stop_signals(&self) {}

    fn commit(&self, notes: Option<&Buffer>, main: &Buffer, _full: bool) -> Result<()> {
        if let Some(notes) = notes {
            let _ = self.shared.notes_tx.send(notes.clone());
        }
        let _ = self.shared.main_tx.send(main.clone());
        Ok(())
    }

    fn reset_buffer(&self) {
        self.shared.buffer_resets.fetch_add(1, Ordering::SeqCst);
    }
}

impl TtyCtrl {
    /// Use `wait` as the timeout of the waiting helpers.
    #[must_use]
    pub const fn with_wait(mut self, wait: Duration) -> Self {
        self.wait = wait;
        self
    }

    /// Queue an input event.
    ///
    /// # Panics
    ///
    /// If input was closed or the queue is full.
    pub fn inject(&self, event: impl Into<Event>) {
        let tx = lock(&self.shared.events_tx);
        let Some(tx) = tx.as_ref() else {
            panic!("inject after close_input");
        };
        tx.try_send(event.into()).expect("fake input queue full");
    }

    /// Queue a signal.
    ///
    /// # Panics
    ///
    /// If the queue is full.
    pub fn inject_signal(&self, sig: Signal) {
        let tx = lock(&self.shared.signals_tx);
        if let Some(tx) = tx.as_ref() {
            tx.try_send(sig).expect("fake signal queue full");
        }
    }

    /// End the input, as if the terminal had closed it.
    pub fn close_input(&self) {
        lock(&self.shared.events_tx).take();
    }

    /// Change the size reported to the code under test.
    pub fn set_size(&self, rows: usize, cols: usize) {
        *lock(&self.shared.size) = (rows, cols);
    }

    /// Make setup fail with `msg`, or succeed again with `None`.
    pub fn set_setup_error(&self, msg: Option<&str>) {
        *lock(&self.shared.setup_error) = msg.map(str::to_string);
    }

    /// How many times setup was called.
    pub fn setup_count(&self) -> usize {
        self.shared.setups.load(Ordering::SeqCst)
    }

    /// How many times a setup was undone.
    pub fn restore_count(&self) -> usize {
        self.shared.restores.load(Ordering::SeqCst)
    }

    /// Every raw-input request so far.
    pub fn raw_inputs(&self) -> Vec<i32> {
        lock(&self.shared.raw_inputs).clone()
    }

    /// How many times the committed buffer was forgotten.
    pub fn buffer_resets(&self) -> usize {
        self.shared.buffer_resets.load(Ordering::SeqCst)
    }

    /// The most recently committed main buffer, consuming every pending one.
    pub fn last_buffer(&self) -> Option<Buffer> {
        self.main_rx.try_iter().last()
    }

    /// Consume committed main buffers until one equals `want`. Returns the
    /// last buffer seen instead if none matched in time.
    pub fn wait_buffer(&self, want: &Buffer) -> std::result::Result<(), Option<Buffer>> {
        wait_for(&self.main_rx, want, self.wait)
    }

    /// Like [`TtyCtrl::wait_buffer`], for notes.
    pub fn wait_notes(&self, want: &Buffer) -> std::result::Result<(), Option<Buffer>> {
        wait_for(&self.notes_rx, want, self.wait)
    }

    /// Assert that `want` gets committed as the main buffer.
    ///
    /// # Panics
    ///
    /// If it is not committed in time.
    #[track_caller]
    pub fn assert_buffer(&self, want: &Buffer) {
        if let Err(last) = self.wait_buffer(want) {
            fail("buffer", want, last.as_ref());
        }
    }

    /// Assert that `want` gets committed as notes.
    ///
    /// # Panics
    ///
    /// If it is not committed in time.
    #[track_caller]
    pub fn assert_notes(&self, want: &Buffer) {
        if let Err(last) = self.wait_notes(want) {
            fail("notes", want, last.as_ref());
        }
    }
}

fn wait_for(
    rx: &Receiver<Buffer>,
    want: &Buffer,
    wait: Duration,
) -> std::result::Result<(), Option<Buffer>> {
    let deadline = Instant::now() + wait;
    let mut last = None;
    loop {
        match rx.recv_deadline(deadline) {
            Ok(b) if b == *want => return Ok(()),
            Ok(b) => last = Some(b),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => return Err(last),
        }
    }
}

#[track_caller]
fn fail(what: &str, want: &Buffer, last: Option<&Buffer>) -> ! {
    let got = last.map_or_else(|| "nothing\n".to_string(), Buffer::tty_string);
    panic!("{what} not committed in time\nwant:\n{}last got:\n{got}", want.tty_string());
}
