//! Byte sources and the rune reader built on them.
//!
//! The decoder pulls bytes one at a time with an optional timeout. A zero
//! timeout means "block until a byte arrives"; anything else gives up with
//! [`Error::Timeout`] once the duration has passed.

use crate::error::{Error, Result};
use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::collections::VecDeque;
use std::time::Duration;

/// Something that yields terminal input bytes.
pub trait ByteSource {
    /// Read one byte, waiting at most `timeout` (forever if zero).
    fn read_byte(&mut self, timeout: Duration) -> Result<u8>;
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn read_byte(&mut self, timeout: Duration) -> Result<u8> {
        (**self).read_byte(timeout)
    }
}

/// A fixed byte string. Reports end of input once exhausted.
#[derive(Debug, Clone, Default)]
pub struct SliceSource {
    data: Vec<u8>,
    pos: usize,
}

impl SliceSource {
    /// A source over `data`.
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            pos: 0,
        }
    }

    /// Bytes not read yet.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }
}

impl ByteSource for SliceSource {
    fn read_byte(&mut self, _timeout: Duration) -> Result<u8> {
        let b = *self.data.get(self.pos).ok_or(Error::EndOfInput)?;
        self.pos += 1;
        Ok(b)
    }
}

/// Bytes arriving in chunks over a channel. Reports end of input once every
/// sender is gone and all chunks are consumed.
#[derive(Debug)]
pub struct ChannelSource {
    rx: Receiver<Vec<u8>>,
    chunk: VecDeque<u8>,
}

impl ChannelSource {
    /// A source reading from `rx`.
    pub fn new(rx: Receiver<Vec<u8>>) -> Self {
        Self {
            rx,
            chunk: VecDeque::new(),
        }
    }
}

impl ByteSource for ChannelSource {
    fn read_byte(&mut self, timeout: Duration) -> Result<u8> {
        loop {
            if let Some(b) = self.chunk.pop_front() {
                return Ok(b);
            }
            let chunk = if timeout.is_zero() {
                self.rx.recv().map_err(|_| Error::EndOfInput)?
            } else {
                self.rx.recv_timeout(timeout).map_err(|e| match e {
                    RecvTimeoutError::Timeout => Error::Timeout,
                    RecvTimeoutError::Disconnected => Error::EndOfInput,
                })?
            };
            self.chunk.extend(chunk);
        }
    }
}

#[cfg(unix)]
pub use self::stdin::StdinSource;

#[cfg(unix)]
mod stdin {
    use super::ByteSource;
    use crate::error::{Error, Result};
    use std::io;
    use std::os::unix::io::{AsRawFd, RawFd};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    const READ_BUF_SIZE: usize = 4096;

    /// How often a blocked read checks the stop flag.
    const POLL_INTERVAL: Duration = Duration::from_millis(50);

    /// Standard input, read with `poll(2)` so a blocked read notices when its
    /// owner raises the stop flag.
    pub struct StdinSource {
        fd: RawFd,
        stop: Arc<AtomicBool>,
        buf: Box<[u8; READ_BUF_SIZE]>,
        start: usize,
        end: usize,
    }

    impl StdinSource {
        /// A source over stdin that fails with [`Error::Stopped`] once `stop`
        /// is set.
        pub fn new(stop: Arc<AtomicBool>) -> Self {
            Self {
                fd: io::stdin().as_raw_fd(),
                stop,
                buf: Box::new([0; READ_BUF_SIZE]),
                start: 0,
                end: 0,
            }
        }

        /// Wait up to `wait` for stdin to become readable.
        #[allow(unsafe_code)]
        fn poll(&self, wait: Duration) -> io::Result<bool> {
            let ms = i32::try_from(wait.as_millis()).unwrap_or(i32::MAX);
            let mut pfd = libc::pollfd {
                fd: self.fd,
                events: libc::POLLIN,
                revents: 0,
            };
            // SAFETY: `pfd` is a valid pollfd for the duration of the call.
            let ready = unsafe { libc::poll(&mut pfd, 1, ms) };
            match ready {
                n if n > 0 => Ok(true),
                0 => Ok(false),
                _ => {
                    let err = io::Error::last_os_error();
                    if err.kind() == io::ErrorKind::Interrupted {
                        Ok(false)
                    } else {
                        Err(err)
                    }
                }
            }
        }

        #[allow(unsafe_code)]
        fn fill(&mut self) -> Result<()> {
            // SAFETY: the buffer is valid for writes of its full length.
            let n = unsafe { libc::read(self.fd, self.buf.as_mut_ptr().cast(), self.buf.len()) };
            if n == 0 {
                return Err(Error::EndOfInput);
            }
            if n < 0 {
                let err = io::Error::last_os_error();
                return match err.kind() {
                    io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock => Ok(()),
                    _ => Err(err.into()),
                };
            }
            self.start = 0;
            self.end = n.unsigned_abs();
            Ok(())
        }
    }

    impl ByteSource for StdinSource {
        fn read_byte(&mut self, timeout: Duration) -> Result<u8> {
            let deadline = (!timeout.is_zero()).then(|| Instant::now() + timeout);
            while self.start == self.end {
                if self.stop.load(Ordering::Relaxed) {
                    return Err(Error::Stopped);
                }
                let wait = match deadline {
                    Some(d) => {
                        let left = d.saturating_duration_since(Instant::now());
                        if left.is_zero() {
                            return Err(Error::Timeout);
                        }
                        left.min(POLL_INTERVAL)
                    }
                    None => POLL_INTERVAL,
                };
                if self.poll(wait)? {
                    self.fill()?;
                }
            }
            let b = self.buf[self.start];
            self.start += 1;
            Ok(b)
        }
    }
}

/// Decodes UTF-8 runes from a [`ByteSource`].
///
/// Invalid or truncated encodings decode to U+FFFD. A byte that cannot
/// continue the current rune is kept and starts the next one.
#[derive(Debug)]
pub struct RuneReader<S> {
    source: S,
    pushback: Option<u8>,
}

impl<S: ByteSource> RuneReader<S> {
    /// Wrap a byte source.
    pub const fn new(source: S) -> Self {
        Self {
            source,
            pushback: None,
        }
    }

    /// The underlying source.
    #[inline]
    pub const fn get_ref(&self) -> &S {
        &self.source
    }

    /// Unwrap the underlying source. A pushed-back byte is lost.
    pub fn into_inner(self) -> S {
        self.source
    }

    fn next_byte(&mut self, timeout: Duration) -> Result<u8> {
        match self.pushback.take() {
            Some(b) => Ok(b),
            None => self.source.read_byte(timeout),
        }
    }

    /// Read one rune, waiting at most `timeout` for each byte (forever if
    /// zero).
    pub fn read_rune(&mut self, timeout: Duration) -> Result<char> {
        let lead = self.next_byte(timeout)?;
        let len = match lead {
            0x00..=0x7f => return Ok(char::from(lead)),
            0xc2..=0xdf => 2,
            0xe0..=0xef => 3,
            0xf0..=0xf4 => 4,
            _ => return Ok(char::REPLACEMENT_CHARACTER),
        };

        let mut bytes = [lead, 0, 0, 0];
        for slot in &mut bytes[1..len] {
            match self.next_byte(timeout) {
                Ok(b) if b & 0xc0 == 0x80 => *slot = b,
                Ok(b) => {
                    self.pushback = Some(b);
                    return Ok(char::REPLACEMENT_CHARACTER);
                }
                Err(Error::Timeout | Error::EndOfInput) => {
                    return Ok(char::REPLACEMENT_CHARACTER);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(std::str::from_utf8(&bytes[..len])
            .ok()
            .and_then(|s| s.chars().next())
            .unwrap_or(char::REPLACEMENT_CHARACTER))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;
    use std::time::Instant;

    fn runes(data: &[u8]) -> Vec<char> {
        let mut r = RuneReader::new(SliceSource::new(data));
        let mut out = Vec::new();
        loop {
            match r.read_rune(Duration::ZERO) {
                Ok(c) => out.push(c),
                Err(e) => {
                    assert!(e.is_end_of_input(), "unexpected error {e}");
                    return out;
                }
            }
        }
    }

    #[test]
    fn test_slice_source_ends() {
        let mut s = SliceSource::new("ab");
        assert_eq!(s.read_byte(Duration::ZERO).unwrap(), b'a');
        assert_eq!(s.remaining(), 1);
        assert_eq!(s.read_byte(Duration::ZERO).unwrap(), b'b');
        assert!(s.read_byte(Duration::ZERO).unwrap_err().is_end_of_input());
    }

    #[test]
    fn test_ascii_and_multibyte() {
        assert_eq!(runes("a好é😀".as_bytes()), vec!['a', '好', 'é', '😀']);
    }

    #[test]
    fn test_truncated_sequence_at_end() {
        assert_eq!(runes(b"\xe4\xbd"), vec![char::REPLACEMENT_CHARACTER]);
    }

    #[test]
    fn test_interrupted_sequence_keeps_next_byte() {
        assert_eq!(runes(b"\xe4a"), vec![char::REPLACEMENT_CHARACTER, 'a']);
    }

    #[test]
    fn test_invalid_lead_and_overlong() {
        assert_eq!(
            runes(b"\x80\xc0\xafx"),
            vec![
                char::REPLACEMENT_CHARACTER,
                char::REPLACEMENT_CHARACTER,
                char::REPLACEMENT_CHARACTER,
                'x'
            ]
        );
        // Encoded surrogate.
        assert_eq!(runes(b"\xed\xa0\x80"), vec![char::REPLACEMENT_CHARACTER]);
    }

    #[test]
    fn test_channel_source_one_byte_at_a_time() {
        let (tx, rx) = unbounded();
        for b in "好".bytes() {
            tx.send(vec![b]).unwrap();
        }
        drop(tx);
        let mut r = RuneReader::new(ChannelSource::new(rx));
        assert_eq!(r.read_rune(Duration::ZERO).unwrap(), '好');
        assert!(r.read_rune(Duration::ZERO).unwrap_err().is_end_of_input());
    }

    #[test]
    fn test_channel_source_timeout() {
        let (tx, rx) = unbounded::<Vec<u8>>();
        let mut r = RuneReader::new(ChannelSource::new(rx));
        let start = Instant::now();
        assert!(matches!(
            r.read_rune(Duration::from_millis(20)),
            Err(Error::Timeout)
        ));
        assert!(start.elapsed() >= Duration::from_millis(20));

        tx.send(b"x".to_vec()).unwrap();
        assert_eq!(r.read_rune(Duration::from_millis(20)).unwrap(), 'x');
    }

    #[test]
    fn test_continuation_timeout_yields_replacement() {
        let (tx, rx) = unbounded();
        tx.send(vec![0xe4]).unwrap();
        let mut r = RuneReader::new(ChannelSource::new(rx));
        assert_eq!(
            r.read_rune(Duration::from_millis(10)).unwrap(),
            char::REPLACEMENT_CHARACTER
        );
        drop(tx);
    }

    /// Yields its bytes, then fails.
    struct FailingSource(VecDeque<u8>);

    impl ByteSource for FailingSource {
        fn read_byte(&mut self, _timeout: Duration) -> Result<u8> {
            self.0
                .pop_front()
                .ok_or_else(|| Error::Io(std::io::Error::other("device gone")))
        }
    }

    #[test]
    fn test_io_error_mid_sequence_is_returned() {
        let mut r = RuneReader::new(FailingSource(VecDeque::from([0xe4, 0xbd])));
        assert!(matches!(r.read_rune(Duration::ZERO), Err(Error::Io(_))));
    }
}
