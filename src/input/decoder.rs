//! Decoder: Turns terminal input into [`Event`]s.
//!
//! Plain runes become key events, with C0 control characters reported as
//! Ctrl-modified keys. An ESC starts a lookahead in which every further rune
//! must arrive within the sequence timeout; running out of input ends the
//! sequence. Recognized forms:
//!
//! - `ESC x`: Alt-modified key (`ESC ESC ...` adds Alt to a sequence)
//! - `ESC O x`: SS3 function keys
//! - `ESC [ params final`: CSI keys in xterm, urxvt and tmux flavors,
//!   cursor position reports, SGR and X10 mouse reports, bracketed paste
//!
//! Sequences that turn out malformed are not dropped: their runes are
//! replayed as individual key events.

use super::event::{Event, KeyCode, KeyEvent, Mod, MouseEvent};
use super::source::{ByteSource, RuneReader};
use crate::buffer::Pos;
use crate::error::Result;
use std::collections::VecDeque;
use std::time::Duration;

/// Default time allowed between runes of one escape sequence. Terminals send
/// sequences in one burst, so this only needs to cover scheduling jitter.
pub const DEFAULT_SEQ_TIMEOUT: Duration = Duration::from_millis(10);

const ESC: char = '\x1b';

/// Escape-sequence decoder over a byte source.
#[derive(Debug)]
pub struct Decoder<S> {
    reader: RuneReader<S>,
    pending: VecDeque<Event>,
    seq_timeout: Duration,
    raw: i32,
}

impl<S: ByteSource> Decoder<S> {
    /// A decoder with the default sequence timeout.
    pub fn new(source: S) -> Self {
        Self {
            reader: RuneReader::new(source),
            pending: VecDeque::new(),
            seq_timeout: DEFAULT_SEQ_TIMEOUT,
            raw: 0,
        }
    }

    /// Set the time allowed between runes of one escape sequence.
    #[must_use]
    pub const fn with_seq_timeout(mut self, timeout: Duration) -> Self {
        self.seq_timeout = timeout;
        self
    }

    /// Deliver the next `n` runes as [`Event::Raw`] without interpreting
    /// them. `-1` keeps raw mode on until it is set to 0.
    pub fn set_raw(&mut self, n: i32) {
        self.raw = n;
    }

    /// Remaining raw runes (`-1` for unlimited).
    #[inline]
    pub const fn raw(&self) -> i32 {
        self.raw
    }

    /// Read the next event, blocking until one is complete.
    pub fn read_event(&mut self) -> Result<Event> {
        if let Some(ev) = self.pending.pop_front() {
            return Ok(ev);
        }

        let first = self.reader.read_rune(Duration::ZERO)?;
        if self.raw != 0 {
            if self.raw > 0 {
                self.raw -= 1;
            }
            return Ok(Event::Raw(first));
        }

        let mut seq = Seq {
            reader: &mut self.reader,
            timeout: self.seq_timeout,
            runes: vec![first],
            tail: Vec::new(),
        };
        match decode(first, &mut seq) {
            Ok(ev) => {
                let tail = std::mem::take(&mut seq.tail);
                self.pending.extend(tail);
                Ok(ev)
            }
            Err(reason) => {
                log::debug!("{reason}: {:?}", seq.runes.iter().collect::<String>());
                let mut keys = seq.runes.iter().map(|&r| Event::Key(ctrl_modify(r)));
                // `runes` always holds the first rune.
                let head = keys.next().unwrap_or(Event::Key(ctrl_modify(first)));
                self.pending.extend(keys);
                Ok(head)
            }
        }
    }
}

impl<S: ByteSource> Iterator for Decoder<S> {
    type Item = Event;

    /// Yields events until the source fails or ends.
    fn next(&mut self) -> Option<Event> {
        self.read_event().ok()
    }
}

/// The runes of the sequence being decoded.
struct Seq<'a, S> {
    reader: &'a mut RuneReader<S>,
    timeout: Duration,
    runes: Vec<char>,
    /// Events to deliver after the decoded one.
    tail: Vec<Event>,
}

impl<S: ByteSource> Seq<'_, S> {
    /// The next rune of the sequence, or `None` if none arrives in time.
    fn next(&mut self) -> Option<char> {
        let r = self.reader.read_rune(self.timeout).ok()?;
        self.runes.push(r);
        Some(r)
    }
}

fn decode<S: ByteSource>(first: char, seq: &mut Seq<'_, S>) -> std::result::Result<Event, &'static str> {
    if first != ESC {
        return Ok(Event::Key(ctrl_modify(first)));
    }

    // rxvt and derivatives prefix CSI and SS3 sequences with another ESC to
    // signal Alt.
    let mut r2 = seq.next();
    let two_esc = r2 == Some(ESC);
    if two_esc {
        r2 = seq.next();
    }
    let alt = if two_esc { Mod::ALT } else { Mod::empty() };

    match r2 {
        None => Ok(Event::Key(KeyEvent::ctrl('[').plus(alt))),
        Some('[') => decode_csi(seq, alt),
        Some('O') => {
            let Some(r) = seq.next() else {
                return Ok(Event::Key(KeyEvent::alt('O')));
            };
            match ss3(r) {
                Some(k) => Ok(Event::Key(k.plus(alt))),
                // Both escapes must come back out.
                None if two_esc => Err("bad SS3"),
                None => {
                    // Not a function key after all: Alt-O, then whatever
                    // followed it.
                    seq.tail.push(Event::Key(ctrl_modify(r)));
                    Ok(Event::Key(KeyEvent::alt('O')))
                }
            }
        }
        Some(r) => Ok(Event::Key(ctrl_modify(r).plus(Mod::ALT))),
    }
}

fn decode_csi<S: ByteSource>(seq: &mut Seq<'_, S>, alt: Mod) -> std::result::Result<Event, &'static str> {
    let Some(mut r) = seq.next() else {
        return Ok(Event::Key(KeyEvent::alt('[')));
    };

    let mut starter = None;
    match r {
        '<' => {
            starter = Some('<');
            r = seq.next().ok_or("incomplete CSI")?;
        }
        'M' => {
            let cb = seq.next().ok_or("incomplete mouse event")?;
            let cx = seq.next().ok_or("incomplete mouse event")?;
            let cy = seq.next().ok_or("incomplete mouse event")?;
            let cb = u32::from(cb) as usize;
            let button = u8::try_from(cb & 3).ok().filter(|&b| b != 3);
            return Ok(Event::Mouse(MouseEvent {
                pos: Pos::new(x10_coord(cy), x10_coord(cx)),
                down: button.is_some(),
                button,
                mods: mouse_modify(cb),
            }));
        }
        _ => {}
    }

    let mut nums: Vec<usize> = Vec::with_capacity(2);
    let last = loop {
        match r {
            ';' => nums.push(0),
            '0'..='9' => {
                if nums.is_empty() {
                    nums.push(0);
                }
                let digit = r as usize - '0' as usize;
                if let Some(n) = nums.last_mut() {
                    *n = n.saturating_mul(10).saturating_add(digit);
                }
            }
            _ => break r,
        }
        r = seq.next().ok_or("incomplete CSI")?;
    };

    match (starter, last, nums.as_slice()) {
        (None, 'R', nums) => match *nums {
            [row, col] => Ok(Event::CursorPosition { row, col }),
            _ => Err("bad cursor position report"),
        },
        (Some('<'), 'M' | 'm', nums) => match *nums {
            [b, x, y] => Ok(Event::Mouse(MouseEvent {
                pos: Pos::new(y, x),
                down: last == 'M',
                button: u8::try_from(b & 3).ok(),
                mods: mouse_modify(b),
            })),
            _ => Err("bad SGR mouse event"),
        },
        (_, '~', [200]) => Ok(Event::Paste(true)),
        (_, '~', [201]) => Ok(Event::Paste(false)),
        (_, last, nums) => parse_csi(nums, last)
            .map(|k| Event::Key(k.plus(alt)))
            .ok_or("bad CSI"),
    }
}

fn x10_coord(c: char) -> usize {
    (u32::from(c) as usize).saturating_sub(32)
}

/// Key for a rune outside an escape sequence.
fn ctrl_modify(r: char) -> KeyEvent {
    match r {
        '\0' => KeyEvent::ctrl('`'),
        '\x1e' => KeyEvent::ctrl('6'),
        '\x1f' => KeyEvent::ctrl('/'),
        // Ambiguous with Ctrl-I, Ctrl-J, Ctrl-M and Ctrl-?; the plain keys
        // are far more likely.
        '\t' => KeyEvent::new(KeyCode::Tab),
        '\n' | '\r' => KeyEvent::new(KeyCode::Enter),
        '\x7f' => KeyEvent::new(KeyCode::Backspace),
        '\x01'..='\x1d' => char::from_u32(u32::from(r) + 0x40)
            .map_or_else(|| KeyEvent::char(r), KeyEvent::ctrl),
        _ => KeyEvent::char(r),
    }
}

/// `ESC O x` keys. These cannot carry modifiers other than a leading ESC.
fn ss3(r: char) -> Option<KeyEvent> {
    use KeyCode::{Down, End, Home, Insert, Left, Right, Up, F};
    let k = match r {
        // xterm, tmux
        'A' => KeyEvent::new(Up),
        'B' => KeyEvent::new(Down),
        'C' => KeyEvent::new(Right),
        'D' => KeyEvent::new(Left),
        'H' => KeyEvent::new(Home),
        'F' => KeyEvent::new(End),
        'M' => KeyEvent::new(Insert),
        // urxvt
        'a' => KeyEvent::with(Up, Mod::CTRL),
        'b' => KeyEvent::with(Down, Mod::CTRL),
        'c' => KeyEvent::with(Right, Mod::CTRL),
        'd' => KeyEvent::with(Left, Mod::CTRL),
        'P' => KeyEvent::new(F(1)),
        'Q' => KeyEvent::new(F(2)),
        'R' => KeyEvent::new(F(3)),
        'S' => KeyEvent::new(F(4)),
        _ => return None,
    };
    Some(k)
}

/// CSI keys identified by the final rune, e.g. `ESC [ A` for Up or
/// `ESC [ 1 ; 5 A` for Ctrl-Up.
fn csi_by_last(r: char) -> Option<KeyEvent> {
    use KeyCode::{Down, End, Home, Left, Right, Tab, Up};
    let k = match r {
        'A' => KeyEvent::new(Up),
        'B' => KeyEvent::new(Down),
        'C' => KeyEvent::new(Right),
        'D' => KeyEvent::new(Left),
        // urxvt
        'a' => KeyEvent::with(Up, Mod::SHIFT),
        'b' => KeyEvent::with(Down, Mod::SHIFT),
        'c' => KeyEvent::with(Right, Mod::SHIFT),
        'd' => KeyEvent::with(Left, Mod::SHIFT),
        'H' => KeyEvent::new(Home),
        'F' => KeyEvent::new(End),
        'Z' => KeyEvent::with(Tab, Mod::SHIFT),
        _ => return None,
    };
    Some(k)
}

/// Keys of `ESC [ n ~`, by `n`.
fn csi_tilde(n: usize) -> Option<KeyCode> {
    use KeyCode::{Delete, End, Home, Insert, PageDown, PageUp, F};
    let code = match n {
        1 | 7 => Home,
        4 | 8 => End,
        2 => Insert,
        3 => Delete,
        5 => PageUp,
        6 => PageDown,
        11..=15 => F(u8::try_from(n - 10).ok()?),
        17..=21 => F(u8::try_from(n - 11).ok()?),
        23 | 24 => F(u8::try_from(n - 12).ok()?),
        _ => return None,
    };
    Some(code)
}

/// Keys of `ESC [ 27 ; mod ; n ~`, by `n`.
fn csi_tilde27(n: usize) -> Option<KeyCode> {
    match n {
        9 => Some(KeyCode::Tab),
        13 => Some(KeyCode::Enter),
        33 | 35 | 39..=41 | 43..=46 | 48..=62 => {
            char::from_u32(u32::try_from(n).ok()?).map(KeyCode::Char)
        }
        63 => Some(KeyCode::Char(';')),
        _ => None,
    }
}

fn parse_csi(nums: &[usize], last: char) -> Option<KeyEvent> {
    if let Some(k) = csi_by_last(last) {
        return match *nums {
            [] => Some(k),
            [1, m] => xterm_modify(k, m),
            _ => None,
        };
    }
    match (last, nums) {
        ('~', &[n]) => csi_tilde(n).map(KeyEvent::new),
        ('~', &[n, m]) => xterm_modify(KeyEvent::new(csi_tilde(n)?), m),
        ('~', &[27, m, n]) => xterm_modify(KeyEvent::new(csi_tilde27(n)?), m),
        // urxvt replaces the final '~' to encode modifiers.
        ('$', &[n]) => Some(KeyEvent::with(csi_tilde(n)?, Mod::SHIFT)),
        ('^', &[n]) => Some(KeyEvent::with(csi_tilde(n)?, Mod::CTRL)),
        ('@', &[n]) => Some(KeyEvent::with(csi_tilde(n)?, Mod::SHIFT | Mod::CTRL)),
        _ => None,
    }
}

/// Apply an xterm modifier parameter: 1 plus a bitmask of Shift (1), Alt
/// (2), Ctrl (4) and Meta (8, reported as Alt). 0 means unmodified.
fn xterm_modify(k: KeyEvent, m: usize) -> Option<KeyEvent> {
    if m > 16 {
        return None;
    }
    if m == 0 {
        return Some(k);
    }
    let bits = m - 1;
    let mut mods = Mod::empty();
    if bits & 1 != 0 {
        mods |= Mod::SHIFT;
    }
    if bits & 2 != 0 || bits & 8 != 0 {
        mods |= Mod::ALT;
    }
    if bits & 4 != 0 {
        mods |= Mod::CTRL;
    }
    Some(k.plus(mods))
}

fn mouse_modify(n: usize) -> Mod {
    let mut mods = Mod::empty();
    if n & 4 != 0 {
        mods |= Mod::SHIFT;
    }
    if n & 8 != 0 {
        mods |= Mod::ALT;
    }
    if n & 16 != 0 {
        mods |= Mod::CTRL;
    }
    mods
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::input::source::{ChannelSource, SliceSource};
    use crossbeam_channel::unbounded;
    use pretty_assertions::assert_eq;
    use crate::input::KeyCode::{
        Delete, Down, End, Enter, Home, Insert, Left, PageUp, Right, Tab, Up, F,
    };

    fn decode_all(input: &str) -> Vec<Event> {
        Decoder::new(SliceSource::new(input)).collect()
    }

    fn key(code: KeyCode, mods: Mod) -> Event {
        Event::Key(KeyEvent::with(code, mods))
    }

    fn ch(c: char) -> Event {
        Event::Key(KeyEvent::char(c))
    }

    fn mouse(line: usize, col: usize, down: bool, button: Option<u8>, mods: Mod) -> Event {
        Event::Mouse(MouseEvent {
            pos: Pos::new(line, col),
            down,
            button,
            mods,
        })
    }

    fn check(cases: &[(&str, Event)]) {
        for (input, want) in cases {
            assert_eq!(decode_all(input), vec![*want], "input {input:?}");
        }
    }

    const NONE: Mod = Mod::empty();
    const S: Mod = Mod::SHIFT;
    const A: Mod = Mod::ALT;
    const C: Mod = Mod::CTRL;

    #[test]
    fn test_plain_and_control_keys() {
        check(&[
            ("x", ch('x')),
            ("X", ch('X')),
            (" ", ch(' ')),
            ("好", ch('好')),
            ("\x01", Event::Key(KeyEvent::ctrl('A'))),
            ("\x1b", Event::Key(KeyEvent::ctrl('['))),
            ("\0", Event::Key(KeyEvent::ctrl('`'))),
            ("\x1e", Event::Key(KeyEvent::ctrl('6'))),
            ("\x1f", Event::Key(KeyEvent::ctrl('/'))),
            ("\n", key(Enter, NONE)),
            ("\r", key(Enter, NONE)),
            ("\t", key(Tab, NONE)),
            ("\x7f", key(KeyCode::Backspace, NONE)),
        ]);
    }

    #[test]
    fn test_alt_keys() {
        check(&[
            ("\x1ba", Event::Key(KeyEvent::alt('a'))),
            ("\x1b[", Event::Key(KeyEvent::alt('['))),
            ("\x1bO", Event::Key(KeyEvent::alt('O'))),
            ("\x1b\x01", Event::Key(KeyEvent::with(KeyCode::Char('A'), C | A))),
            ("\x1b\r", key(Enter, A)),
            ("\x1b\x1b", Event::Key(KeyEvent::with(KeyCode::Char('['), C | A))),
        ]);
    }

    #[test]
    fn test_ss3_keys() {
        check(&[
            ("\x1bOA", key(Up, NONE)),
            ("\x1bOH", key(Home, NONE)),
            ("\x1bOM", key(Insert, NONE)),
            ("\x1bOP", key(F(1), NONE)),
            ("\x1bOS", key(F(4), NONE)),
            ("\x1bOa", key(Up, C)),
            ("\x1bOd", key(Left, C)),
            ("\x1b\x1bOA", key(Up, A)),
            ("\x1b\x1bOH", key(Home, A)),
        ]);
    }

    #[test]
    fn test_alt_o_followed_by_other_key() {
        assert_eq!(
            decode_all("\x1bOx"),
            vec![Event::Key(KeyEvent::alt('O')), ch('x')]
        );
        let esc = Event::Key(KeyEvent::ctrl('['));
        assert_eq!(decode_all("\x1b\x1bOx"), vec![esc, esc, ch('O'), ch('x')]);
    }

    #[test]
    fn test_csi_by_last() {
        check(&[
            ("\x1b[A", key(Up, NONE)),
            ("\x1b[B", key(Down, NONE)),
            ("\x1b[C", key(Right, NONE)),
            ("\x1b[D", key(Left, NONE)),
            ("\x1b[H", key(Home, NONE)),
            ("\x1b[F", key(End, NONE)),
            ("\x1b[Z", key(Tab, S)),
            ("\x1b[a", key(Up, S)),
            ("\x1b[d", key(Left, S)),
            ("\x1b\x1b[A", key(Up, A)),
        ]);
    }

    #[test]
    fn test_xterm_modifiers() {
        let want = [
            NONE,
            S,
            A,
            S | A,
            C,
            S | C,
            A | C,
            S | A | C,
            // Meta is reported as Alt.
            A,
            S | A,
            A,
            S | A,
            A | C,
            S | A | C,
            A | C,
            S | A | C,
        ];
        for (i, mods) in want.iter().enumerate() {
            let input = format!("\x1b[1;{}A", i + 1);
            assert_eq!(decode_all(&input), vec![key(Up, *mods)], "input {input:?}");
        }
        check(&[("\x1b[1;0A", key(Up, NONE))]);
    }

    #[test]
    fn test_csi_tilde() {
        check(&[
            ("\x1b[1~", key(Home, NONE)),
            ("\x1b[2~", key(Insert, NONE)),
            ("\x1b[3~", key(Delete, NONE)),
            ("\x1b[4~", key(End, NONE)),
            ("\x1b[5~", key(PageUp, NONE)),
            ("\x1b[7~", key(Home, NONE)),
            ("\x1b[11~", key(F(1), NONE)),
            ("\x1b[15~", key(F(5), NONE)),
            ("\x1b[17~", key(F(6), NONE)),
            ("\x1b[21~", key(F(10), NONE)),
            ("\x1b[23~", key(F(11), NONE)),
            ("\x1b[24~", key(F(12), NONE)),
            ("\x1b[1;2~", key(Home, S)),
            ("\x1b[3;5~", key(Delete, C)),
            ("\x1b\x1b[1~", key(Home, A)),
        ]);
    }

    #[test]
    fn test_urxvt_terminators() {
        check(&[
            ("\x1b[1$", key(Home, S)),
            ("\x1b[1^", key(Home, C)),
            ("\x1b[1@", key(Home, S | C)),
            ("\x1b[3^", key(Delete, C)),
        ]);
    }

    #[test]
    fn test_csi_tilde27() {
        check(&[
            ("\x1b[27;4;63~", key(KeyCode::Char(';'), S | A)),
            ("\x1b[27;5;9~", key(Tab, C)),
            ("\x1b[27;5;13~", key(Enter, C)),
            ("\x1b[27;2;48~", key(KeyCode::Char('0'), S)),
        ]);
    }

    #[test]
    fn test_cursor_position_and_paste() {
        check(&[
            ("\x1b[3;4R", Event::CursorPosition { row: 3, col: 4 }),
            ("\x1b[200~", Event::Paste(true)),
            ("\x1b[201~", Event::Paste(false)),
        ]);
    }

    #[test]
    fn test_x10_mouse() {
        check(&[
            ("\x1b[M\x00\x23\x24", mouse(4, 3, true, Some(0), NONE)),
            ("\x1b[M\x01\x23\x24", mouse(4, 3, true, Some(1), NONE)),
            ("\x1b[M\x03\x23\x24", mouse(4, 3, false, None, NONE)),
            ("\x1b[M\x04\x23\x24", mouse(4, 3, true, Some(0), S)),
            ("\x1b[M\x08\x23\x24", mouse(4, 3, true, Some(0), A)),
            ("\x1b[M\x10\x23\x24", mouse(4, 3, true, Some(0), C)),
            ("\x1b[M\x14\x23\x24", mouse(4, 3, true, Some(0), S | C)),
        ]);
    }

    #[test]
    fn test_sgr_mouse() {
        check(&[
            ("\x1b[<0;3;4M", mouse(4, 3, true, Some(0), NONE)),
            ("\x1b[<1;3;4M", mouse(4, 3, true, Some(1), NONE)),
            ("\x1b[<0;3;4m", mouse(4, 3, false, Some(0), NONE)),
            ("\x1b[<4;3;4M", mouse(4, 3, true, Some(0), S)),
            ("\x1b[<16;3;4M", mouse(4, 3, true, Some(0), C)),
        ]);
    }

    #[test]
    fn test_bad_sequences_replay_as_keys() {
        let esc = Event::Key(KeyEvent::ctrl('['));
        // Unknown final rune.
        assert_eq!(
            decode_all("\x1b[1;2y"),
            vec![esc, ch('['), ch('1'), ch(';'), ch('2'), ch('y')]
        );
        // Modifier out of range.
        assert_eq!(
            decode_all("\x1b[1;17A"),
            vec![esc, ch('['), ch('1'), ch(';'), ch('1'), ch('7'), ch('A')]
        );
        // Cursor position report with one parameter.
        assert_eq!(decode_all("\x1b[5R"), vec![esc, ch('['), ch('5'), ch('R')]);
        // Incomplete CSI at end of input.
        assert_eq!(decode_all("\x1b[12"), vec![esc, ch('['), ch('1'), ch('2')]);
        // Incomplete mouse report.
        assert_eq!(decode_all("\x1b[M\x20"), vec![esc, ch('['), ch('M'), ch(' ')]);
    }

    #[test]
    fn test_input_after_sequence_is_kept() {
        assert_eq!(
            decode_all("\x1b[Aab\x1b[3~"),
            vec![key(Up, NONE), ch('a'), ch('b'), key(Delete, NONE)]
        );
    }

    #[test]
    fn test_raw_mode_counts_down() {
        let mut d = Decoder::new(SliceSource::new("\x1b[Ax\x1b[A"));
        d.set_raw(3);
        assert_eq!(d.read_event().unwrap(), Event::Raw('\x1b'));
        assert_eq!(d.read_event().unwrap(), Event::Raw('['));
        assert_eq!(d.read_event().unwrap(), Event::Raw('A'));
        assert_eq!(d.raw(), 0);
        assert_eq!(d.read_event().unwrap(), ch('x'));
        assert_eq!(d.read_event().unwrap(), key(Up, NONE));
    }

    #[test]
    fn test_raw_mode_until_off() {
        let mut d = Decoder::new(SliceSource::new("\x01\x01"));
        d.set_raw(-1);
        assert_eq!(d.read_event().unwrap(), Event::Raw('\x01'));
        assert_eq!(d.raw(), -1);
        d.set_raw(0);
        assert_eq!(d.read_event().unwrap(), Event::Key(KeyEvent::ctrl('A')));
    }

    #[test]
    fn test_lone_escape_after_timeout() {
        let (tx, rx) = unbounded();
        let mut d = Decoder::new(ChannelSource::new(rx)).with_seq_timeout(Duration::from_millis(5));
        tx.send(b"\x1b".to_vec()).unwrap();
        assert_eq!(d.read_event().unwrap(), Event::Key(KeyEvent::ctrl('[')));
        tx.send(b"[A".to_vec()).unwrap();
        assert_eq!(d.read_event().unwrap(), ch('['));
        assert_eq!(d.read_event().unwrap(), ch('A'));
    }

    #[test]
    fn test_sequence_split_across_chunks() {
        let (tx, rx) = unbounded();
        for b in "\x1b[1;5C好".bytes() {
            tx.send(vec![b]).unwrap();
        }
        drop(tx);
        let mut d = Decoder::new(ChannelSource::new(rx));
        assert_eq!(d.read_event().unwrap(), key(Right, C));
        assert_eq!(d.read_event().unwrap(), ch('好'));
        assert!(matches!(d.read_event(), Err(Error::EndOfInput)));
    }

    #[test]
    fn test_invalid_utf8_yields_replacement() {
        let events: Vec<Event> = Decoder::new(SliceSource::new(&b"\xe4\xbda"[..])).collect();
        assert_eq!(events, vec![ch(char::REPLACEMENT_CHARACTER), ch('a')]);
    }
}
