//! Normalized key events and the decoders that produce them.
//!
//! Everything downstream of this module sees only [`KeyEvent`] values. Raw
//! platform input is turned into events either by [`ByteDecoder`], which
//! understands the byte sequences a terminal writes to stdin, or by
//! [`from_crossterm`], which maps events from crossterm's own decoder.

use crossterm::event::{KeyCode, KeyEventKind, KeyModifiers};

/// A single unit of keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Char(char),
    Enter,
    Backspace,
    ArrowUp,
    ArrowDown,
    /// Ctrl-C while the terminal is in raw mode.
    Interrupt,
    Ignored,
}

/// Turns a stream of raw bytes into key events.
///
/// Decoders are fed one byte at a time and may hold partial sequences
/// between calls, so a multi-byte arrow key split across reads still decodes.
pub trait KeyDecoder {
    /// Feed one byte. Returns an event once a full sequence is recognized.
    fn feed(&mut self, byte: u8) -> Option<KeyEvent>;

    /// Drop any half-read sequence, e.g. after a read timeout.
    fn reset(&mut self);
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum State {
    #[default]
    Ground,
    /// Saw `ESC`.
    Escape,
    /// Saw `ESC [` or `ESC O`; waiting for the final byte.
    Csi,
    /// Saw the `0xE0` / `0x00` prefix used by legacy console key codes.
    /// `0xE0` may also open a three-byte UTF-8 sequence.
    Extended { prefix: u8 },
    /// Inside a UTF-8 sequence; `need` continuation bytes remain.
    Utf8 { need: u8 },
}

/// Decoder for ANSI terminals, with the legacy two-byte console arrow codes
/// (`0xE0 0x48` / `0xE0 0x50`) accepted too.
#[derive(Debug, Default)]
pub struct ByteDecoder {
    state: State,
    pending: Vec<u8>,
}

impl ByteDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    fn ground(&mut self, byte: u8) -> Option<KeyEvent> {
        match byte {
            b'\r' | b'\n' => Some(KeyEvent::Enter),
            0x08 | 0x7F => Some(KeyEvent::Backspace),
            0x03 => Some(KeyEvent::Interrupt),
            0x1B => {
                self.state = State::Escape;
                None
            }
            0xE0 | 0x00 => {
                self.state = State::Extended { prefix: byte };
                None
            }
            0x20..=0x7E => Some(KeyEvent::Char(byte as char)),
            0xC2..=0xDF => self.start_utf8(byte, 1),
            0xE1..=0xEF => self.start_utf8(byte, 2),
            0xF0..=0xF4 => self.start_utf8(byte, 3),
            _ => Some(KeyEvent::Ignored),
        }
    }

    fn start_utf8(&mut self, byte: u8, need: u8) -> Option<KeyEvent> {
        self.pending.clear();
        self.pending.push(byte);
        self.state = State::Utf8 { need };
        None
    }
}

impl KeyDecoder for ByteDecoder {
    fn feed(&mut self, byte: u8) -> Option<KeyEvent> {
        match self.state {
            State::Ground => self.ground(byte),
            State::Escape => match byte {
                b'[' | b'O' => {
                    self.state = State::Csi;
                    None
                }
                // lone ESC, or Alt+key: keep the key
                _ => {
                    self.state = State::Ground;
                    self.ground(byte)
                }
            },
            State::Csi => match byte {
                // parameter and intermediate bytes
                0x20..=0x3F => None,
                _ => {
                    self.state = State::Ground;
                    Some(match byte {
                        b'A' => KeyEvent::ArrowUp,
                        b'B' => KeyEvent::ArrowDown,
                        _ => KeyEvent::Ignored,
                    })
                }
            },
            // U+0800..=U+0FFF; 72 and 80 are never continuation bytes
            State::Extended { prefix: 0xE0 } if (0xA0..=0xBF).contains(&byte) => {
                self.pending.clear();
                self.pending.extend([0xE0, byte]);
                self.state = State::Utf8 { need: 1 };
                None
            }
            State::Extended { .. } => {
                self.state = State::Ground;
                Some(match byte {
                    72 => KeyEvent::ArrowUp,
                    80 => KeyEvent::ArrowDown,
                    _ => KeyEvent::Ignored,
                })
            }
            State::Utf8 { need } => {
                if byte & 0xC0 != 0x80 {
                    // Broken sequence; re-read this byte from the ground state.
                    self.state = State::Ground;
                    self.pending.clear();
                    return match self.ground(byte) {
                        None => Some(KeyEvent::Ignored),
                        Some(event) => Some(event),
                    };
                }
                self.pending.push(byte);
                if need > 1 {
                    self.state = State::Utf8 { need: need - 1 };
                    return None;
                }
                self.state = State::Ground;
                let event = std::str::from_utf8(&self.pending)
                    .ok()
                    .and_then(|s| s.chars().next())
                    .map_or(KeyEvent::Ignored, KeyEvent::Char);
                self.pending.clear();
                Some(event)
            }
        }
    }

    fn reset(&mut self) {
        self.state = State::Ground;
        self.pending.clear();
    }
}

/// Maps a crossterm key event to a [`KeyEvent`].
pub fn from_crossterm(event: &crossterm::event::KeyEvent) -> KeyEvent {
    if event.kind == KeyEventKind::Release {
        return KeyEvent::Ignored;
    }
    let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
    match event.code {
        KeyCode::Char('c') | KeyCode::Char('C') if ctrl => KeyEvent::Interrupt,
        KeyCode::Char(_) if ctrl => KeyEvent::Ignored,
        KeyCode::Char(c) if !c.is_control() => KeyEvent::Char(c),
        KeyCode::Enter => KeyEvent::Enter,
        KeyCode::Backspace => KeyEvent::Backspace,
        KeyCode::Up => KeyEvent::ArrowUp,
        KeyCode::Down => KeyEvent::ArrowDown,
        _ => KeyEvent::Ignored,
    }
}
