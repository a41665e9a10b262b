use aho_corasick::{AhoCorasick, BuildError, MatchKind};
use lib_2048::Direction;

/// Longest SGR mouse report body we wait for before giving up on it.
const MAX_MOUSE_REPORT: usize = 32;

const PATTERNS: [&[u8]; 14] = [
    b"\x1b[A", b"\x1b[B", b"\x1b[C", b"\x1b[D", b"\x1b[<", b"r", b"R", b"p", b"P", b"n", b"N",
    b"q", b"Q", b"\x03",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerKind {
    Press,
    Drag,
    Release,
}

/// A primary-button mouse report, in zero-based terminal cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pointer {
    pub kind: PointerKind,
    pub column: u16,
    pub row: u16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Arrow(Direction),
    CycleStep,
    ToggleNumbers,
    Restart,
    Quit,
    Pointer(Pointer),
}

enum MouseReport {
    Event(Option<Pointer>, usize),
    Incomplete,
    Malformed,
}

/// Turns raw terminal bytes into keys, carrying partial escape sequences
/// over to the next read.
pub struct KeyDecoder {
    searcher: AhoCorasick,
    pending: Vec<u8>,
}

impl KeyDecoder {
    pub fn new() -> Result<Self, BuildError> {
        let searcher = AhoCorasick::builder()
            .match_kind(MatchKind::LeftmostFirst)
            .build(PATTERNS)?;

        Ok(Self {
            searcher,
            pending: Vec::new(),
        })
    }

    pub fn feed(&mut self, bytes: &[u8]) -> Vec<Key> {
        self.pending.extend_from_slice(bytes);

        let mut keys = Vec::new();
        let mut pos = 0;

        let keep_from = loop {
            let Some(found) = self.searcher.find(&self.pending[pos..]) else {
                break pos + Self::settled_len(&self.pending[pos..]);
            };

            let (start, end) = (pos + found.start(), pos + found.end());

            let key = match found.pattern().as_usize() {
                0 => Key::Arrow(Direction::Up),
                1 => Key::Arrow(Direction::Down),
                2 => Key::Arrow(Direction::Right),
                3 => Key::Arrow(Direction::Left),
                4 => match parse_mouse_report(&self.pending[end..]) {
                    MouseReport::Event(pointer, len) => {
                        pos = end + len;
                        keys.extend(pointer.map(Key::Pointer));
                        continue;
                    }
                    MouseReport::Incomplete => break start,
                    MouseReport::Malformed => {
                        pos = end;
                        continue;
                    }
                },
                5 | 6 => Key::CycleStep,
                7 | 8 => Key::ToggleNumbers,
                9 | 10 => Key::Restart,
                _ => Key::Quit,
            };

            keys.push(key);
            pos = end;
        };

        self.pending.drain(..keep_from);
        keys
    }

    /// Bytes of `tail` that can be dropped; a trailing escape may still grow
    /// into a key.
    fn settled_len(tail: &[u8]) -> usize {
        match tail {
            [.., 0x1b, b'['] => tail.len() - 2,
            [.., 0x1b] => tail.len() - 1,
            _ => tail.len(),
        }
    }
}

fn parse_mouse_report(body: &[u8]) -> MouseReport {
    let Some(end) = body.iter().position(|&b| b == b'M' || b == b'm') else {
        let plausible = body.iter().all(|&b| b.is_ascii_digit() || b == b';');

        return if plausible && body.len() < MAX_MOUSE_REPORT {
            MouseReport::Incomplete
        } else {
            MouseReport::Malformed
        };
    };

    let Ok(fields) = std::str::from_utf8(&body[..end]) else {
        return MouseReport::Malformed;
    };

    let mut fields = fields.split(';').map(str::parse::<u16>);

    let (Some(Ok(button)), Some(Ok(column)), Some(Ok(row)), None) =
        (fields.next(), fields.next(), fields.next(), fields.next())
    else {
        return MouseReport::Malformed;
    };

    // Wheel and non-primary buttons are reported but not used.
    let pointer = (button & 0b0100_0011 == 0).then(|| Pointer {
        kind: if body[end] == b'm' {
            PointerKind::Release
        } else if button & 0b0010_0000 != 0 {
            PointerKind::Drag
        } else {
            PointerKind::Press
        },
        column: column.saturating_sub(1),
        row: row.saturating_sub(1),
    });

    MouseReport::Event(pointer, end + 1)
}
