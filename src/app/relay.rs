//! Relay threads forwarding channels into the session's event queue.

use crate::error::Result;
use crossbeam_channel::{bounded, select, Receiver, Sender};
use std::thread::{self, JoinHandle};

/// Forwards items from one channel into another on a `linewheel-relay`
/// thread until dropped. Dropping stops the thread and waits for it, so
/// nothing more is forwarded afterwards.
#[derive(Debug)]
pub struct Relay {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Relay {
    /// Forward `map(item)` for each item of `from`. If `from` disconnects,
    /// `on_close` (if any) is forwarded last.
    pub fn spawn<T, E>(
        from: Receiver<T>,
        to: Sender<E>,
        map: impl Fn(T) -> E + Send + 'static,
        on_close: Option<E>,
    ) -> Result<Self>
    where
        T: Send + 'static,
        E: Send + 'static,
    {
        let (stop, stopped) = bounded::<()>(0);
        let handle = thread::Builder::new()
            .name("linewheel-relay".to_string())
            .spawn(move || {
                loop {
                    let item = select! {
                        recv(from) -> item => item,
                        recv(stopped) -> _ => return,
                    };
                    let event = match item {
                        Ok(item) => map(item),
                        Err(_) => match on_close {
                            Some(event) => {
                                log::debug!("relay source closed");
                                select! {
                                    send(to, event) -> _ => {},
                                    recv(stopped) -> _ => {},
                                }
                                return;
                            }
                            None => return,
                        },
                    };
                    select! {
                        send(to, event) -> res => if res.is_err() { return },
                        recv(stopped) -> _ => return,
                    }
                }
            })?;
        Ok(Self {
            stop: Some(stop),
            handle: Some(handle),
        })
    }
}

impl Drop for Relay {
    fn drop(&mut self) {
        // Disconnecting the stop channel wakes the thread wherever it waits.
        self.stop.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_forwards_in_order() {
        let (tx, rx) = bounded(8);
        let (out_tx, out_rx) = bounded(8);
        let relay = Relay::spawn(rx, out_tx, |n: i32| n * 10, None).unwrap();
        for n in 1..=3 {
            tx.send(n).unwrap();
        }
        let got: Vec<i32> = (0..3).map(|_| out_rx.recv().unwrap()).collect();
        assert_eq!(got, [10, 20, 30]);
        drop(relay);
    }

    #[test]
    fn test_close_event() {
        let (tx, rx) = bounded::<i32>(1);
        let (out_tx, out_rx) = bounded(1);
        let _relay = Relay::spawn(rx, out_tx, |n| n, Some(-1)).unwrap();
        drop(tx);
        assert_eq!(out_rx.recv().unwrap(), -1);
    }

    #[test]
    fn test_stop_while_blocked_on_send() {
        let (tx, rx) = bounded(4);
        // Nobody reads `out_rx`, so the relay blocks sending the second item.
        let (out_tx, out_rx) = bounded(1);
        let relay = Relay::spawn(rx, out_tx, |n: i32| n, None).unwrap();
        tx.send(1).unwrap();
        tx.send(2).unwrap();
        drop(relay);
        assert!(out_rx.try_iter().count() <= 1);
        assert!(tx.send(3).is_err());
    }
}
