//! Event loop: Serializes input handling and redraws.
//!
//! A [`Loop`] owns a bounded event queue and a one-slot redraw marker. Any
//! thread can feed it through a [`LoopHandle`]; one thread runs it with a
//! [`Handler`]. Each iteration redraws, then blocks until an event arrives or
//! a redraw is requested. Events already queued are handled in one batch
//! before the next redraw, so fast input does not redraw per keystroke.
//!
//! Redraw requests never block. Requests made before the loop gets to them
//! collapse into one redraw, which is full if any of them asked for full.

use bitflags::bitflags;
use crossbeam_channel::{bounded, select, Receiver, Sender, TryRecvError, TrySendError};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Default capacity of the event queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 128;

bitflags! {
    /// What kind of redraw is being asked for.
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RedrawFlags: u8 {
        /// Repaint everything instead of diffing against the last frame.
        const FULL = 0b01;
        /// The last redraw before the loop returns.
        const FINAL = 0b10;
    }
}

impl fmt::Debug for RedrawFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        bitflags::parser::to_writer(self, f)
    }
}

/// What the loop does after an event has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action<T> {
    /// Keep going.
    Continue,
    /// Do a final redraw and return the value from [`Loop::run`].
    Quit(T),
}

/// The callbacks driven by a [`Loop`].
pub trait Handler<E> {
    /// What [`Loop::run`] returns.
    type Output;

    /// Handle one event.
    fn handle(&mut self, event: E) -> Action<Self::Output>;

    /// Redraw the UI.
    fn redraw(&mut self, flags: RedrawFlags);
}

/// A serial scheduler for events of type `E`.
#[derive(Debug)]
pub struct Loop<E> {
    handle: LoopHandle<E>,
    events: Receiver<E>,
    redraw: Receiver<()>,
}

/// Feeds a [`Loop`] from any thread.
#[derive(Debug)]
pub struct LoopHandle<E> {
    events: Sender<E>,
    redraw: Sender<()>,
    full: Arc<AtomicBool>,
}

impl<E> Clone for LoopHandle<E> {
    fn clone(&self) -> Self {
        Self {
            events: self.events.clone(),
            redraw: self.redraw.clone(),
            full: Arc::clone(&self.full),
        }
    }
}

impl<E> LoopHandle<E> {
    /// Queue an event, blocking while the queue is full.
    ///
    /// Returns `false` if the loop is gone.
    pub fn input(&self, event: E) -> bool {
        self.events.send(event).is_ok()
    }

    /// Queue an event unless the queue is full. Returns whether it was
    /// queued.
    pub fn try_input(&self, event: E) -> bool {
        match self.events.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                log::warn!("event queue full, dropping event");
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }

    /// Request a redraw. Never blocks.
    pub fn redraw(&self, full: bool) {
        if full {
            self.full.store(true, Ordering::Release);
        }
        // A marker already pending covers this request.
        let _ = self.redraw.try_send(());
    }

    /// The sender side of the event queue, for relays that need to wait on
    /// it together with other channels.
    #[inline]
    pub const fn sender(&self) -> &Sender<E> {
        &self.events
    }
}

impl<E> Loop<E> {
    /// A loop whose queue holds up to `capacity` events.
    pub fn new(capacity: usize) -> Self {
        let (events_tx, events) = bounded(capacity);
        let (redraw_tx, redraw) = bounded(1);
        Self {
            handle: LoopHandle {
                events: events_tx,
                redraw: redraw_tx,
                full: Arc::new(AtomicBool::new(false)),
            },
            events,
            redraw,
        }
    }

    /// A handle feeding this loop.
    pub fn handle(&self) -> LoopHandle<E> {
        self.handle.clone()
    }

    /// Take the pending redraw request, if any.
    fn take_redraw(&self) -> Option<RedrawFlags> {
        let marked = self.redraw.try_recv().is_ok();
        let full = self.handle.full.swap(false, Ordering::AcqRel);
        if full {
            Some(RedrawFlags::FULL)
        } else if marked {
            Some(RedrawFlags::empty())
        } else {
            None
        }
    }

    /// Run until the handler quits, returning its value.
    pub fn run<H: Handler<E>>(&self, handler: &mut H) -> H::Output {
        loop {
            let flags = self.take_redraw().unwrap_or_default();
            handler.redraw(flags);

            select! {
                recv(self.events) -> event => {
                    // The loop holds a sender, so the queue never disconnects.
                    let Ok(event) = event else { continue };
                    if let Some(out) = self.dispatch(handler, event) {
                        return out;
                    }
                }
                recv(self.redraw) -> _ => {
                    // Consumed a marker: put it back for the next iteration.
                    let _ = self.handle.redraw.try_send(());
                }
            }
        }
    }

    /// Handle `event` and everything queued behind it. Returns the output
    /// once the handler quits, after the final redraw.
    fn dispatch<H: Handler<E>>(&self, handler: &mut H, event: E) -> Option<H::Output> {
        let mut next = Some(event);
        while let Some(event) = next {
            if let Action::Quit(out) = handler.handle(event) {
                let flags = self.take_redraw().unwrap_or_default() | RedrawFlags::FINAL;
                handler.redraw(flags);
                return Some(out);
            }
            next = match self.events.try_recv() {
                Ok(event) => Some(event),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
            };
        }
        None
    }

    /// Discard queued events and redraw requests.
    pub fn clear(&self) {
        while self.events.try_recv().is_ok() {}
        let _ = self.take_redraw();
    }
}

impl<E> Default for Loop<E> {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::thread;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Ev {
        Key(i32),
        /// Request this many redraws, one of them full if `full`.
        Burst(usize, bool),
        Quit,
        QuitAfterRedraw,
    }

    struct Recorder {
        handle: LoopHandle<Ev>,
        handled: Vec<Ev>,
        redraws: Vec<RedrawFlags>,
        /// Inject `Ev::Quit` on this redraw (1-based).
        quit_on_redraw: Option<usize>,
    }

    impl Recorder {
        fn new(l: &Loop<Ev>) -> Self {
            Self {
                handle: l.handle(),
                handled: Vec::new(),
                redraws: Vec::new(),
                quit_on_redraw: None,
            }
        }
    }

    impl Handler<Ev> for Recorder {
        type Output = usize;

        fn handle(&mut self, event: Ev) -> Action<usize> {
            self.handled.push(event);
            match event {
                Ev::Key(_) => Action::Continue,
                Ev::Burst(n, full) => {
                    for i in 0..n {
                        self.handle.redraw(full && i == n / 2);
                    }
                    Action::Continue
                }
                Ev::Quit => Action::Quit(self.handled.len()),
                Ev::QuitAfterRedraw => {
                    self.handle.redraw(true);
                    Action::Quit(self.handled.len())
                }
            }
        }

        fn redraw(&mut self, flags: RedrawFlags) {
            self.redraws.push(flags);
            if self.quit_on_redraw == Some(self.redraws.len()) {
                assert!(self.handle.try_input(Ev::Quit));
            }
        }
    }

    #[test]
    fn test_events_handled_in_order() {
        let l = Loop::default();
        let h = l.handle();
        for i in 0..5 {
            assert!(h.input(Ev::Key(i)));
        }
        assert!(h.input(Ev::Quit));

        let mut r = Recorder::new(&l);
        assert_eq!(l.run(&mut r), 6);
        assert_eq!(
            r.handled,
            vec![Ev::Key(0), Ev::Key(1), Ev::Key(2), Ev::Key(3), Ev::Key(4), Ev::Quit]
        );
        // One redraw before the batch, one final.
        assert_eq!(r.redraws, vec![RedrawFlags::empty(), RedrawFlags::FINAL]);
    }

    #[test]
    fn test_quit_stops_handling() {
        let l = Loop::default();
        let h = l.handle();
        h.input(Ev::Key(1));
        h.input(Ev::Quit);
        h.input(Ev::Key(2));

        let mut r = Recorder::new(&l);
        l.run(&mut r);
        assert_eq!(r.handled, vec![Ev::Key(1), Ev::Quit]);
        assert_eq!(
            r.redraws.iter().filter(|f| f.contains(RedrawFlags::FINAL)).count(),
            1
        );
    }

    #[test]
    fn test_redraw_requested_before_run() {
        let l = Loop::default();
        let h = l.handle();
        h.redraw(true);
        h.input(Ev::Quit);

        let mut r = Recorder::new(&l);
        l.run(&mut r);
        assert_eq!(r.redraws, vec![RedrawFlags::FULL, RedrawFlags::FINAL]);
    }

    #[test]
    fn test_redraw_requests_coalesce() {
        let l = Loop::default();
        l.handle().input(Ev::Burst(10, false));

        let mut r = Recorder::new(&l);
        r.quit_on_redraw = Some(2);
        l.run(&mut r);
        assert_eq!(
            r.redraws,
            vec![RedrawFlags::empty(), RedrawFlags::empty(), RedrawFlags::FINAL]
        );
    }

    #[test]
    fn test_full_is_sticky_across_coalescing() {
        let l = Loop::default();
        l.handle().input(Ev::Burst(10, true));

        let mut r = Recorder::new(&l);
        r.quit_on_redraw = Some(2);
        l.run(&mut r);
        assert_eq!(
            r.redraws,
            vec![RedrawFlags::empty(), RedrawFlags::FULL, RedrawFlags::FINAL]
        );
    }

    #[test]
    fn test_final_redraw_carries_pending_full() {
        let l = Loop::default();
        l.handle().input(Ev::QuitAfterRedraw);

        let mut r = Recorder::new(&l);
        l.run(&mut r);
        assert_eq!(
            r.redraws,
            vec![RedrawFlags::empty(), RedrawFlags::FINAL | RedrawFlags::FULL]
        );
    }

    #[test]
    fn test_redraw_wakes_waiting_loop() {
        let l = Loop::default();
        let h = l.handle();
        let done = Arc::new(AtomicBool::new(false));
        let feeder = {
            let done = Arc::clone(&done);
            thread::spawn(move || {
                while !done.load(Ordering::Relaxed) {
                    h.redraw(false);
                    thread::sleep(std::time::Duration::from_millis(5));
                }
            })
        };

        let mut r = Recorder::new(&l);
        r.quit_on_redraw = Some(2);
        l.run(&mut r);
        done.store(true, Ordering::Relaxed);
        feeder.join().unwrap();
        assert_eq!(r.handled, vec![Ev::Quit]);
        assert!(r.redraws.len() >= 3);
        assert!(r.redraws.last().unwrap().contains(RedrawFlags::FINAL));
    }

    #[test]
    fn test_input_from_other_thread() {
        let l = Loop::new(4);
        let h = l.handle();
        let feeder = thread::spawn(move || {
            for i in 0..100 {
                assert!(h.input(Ev::Key(i)));
            }
            assert!(h.input(Ev::Quit));
        });

        let mut r = Recorder::new(&l);
        assert_eq!(l.run(&mut r), 101);
        feeder.join().unwrap();
        let keys: Vec<Ev> = (0..100).map(Ev::Key).collect();
        assert_eq!(&r.handled[..100], keys.as_slice());
    }

    #[test]
    fn test_try_input_on_full_queue() {
        let l = Loop::new(1);
        let h = l.handle();
        assert!(h.try_input(Ev::Key(1)));
        assert!(!h.try_input(Ev::Key(2)));
        l.clear();
        assert!(h.try_input(Ev::Key(3)));
    }

    #[test]
    fn test_input_after_loop_dropped() {
        let l = Loop::<Ev>::default();
        let h = l.handle();
        drop(l);
        assert!(!h.try_input(Ev::Key(1)));
        assert!(!h.input(Ev::Key(2)));
    }
}
