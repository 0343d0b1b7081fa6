//! Host console: the capability bundle the interpreter core sees, the
//! crossterm-backed implementation used by the binary, and a scripted
//! in-memory implementation for embedding and tests.

use std::collections::VecDeque;
use std::io::{self, BufReader, BufWriter, IsTerminal, Read, Stdin, Stdout, Write};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;

use crate::{CoreError, Result};

/// Capabilities the interpreter requires from its host. `poll_key` must not
/// block; `read_key` may.
pub trait Console {
    /// True iff a byte is available without blocking.
    fn poll_key(&mut self) -> Result<bool>;

    /// Read one byte, blocking until one arrives.
    fn read_key(&mut self) -> Result<u8>;

    fn write_byte(&mut self, byte: u8) -> Result<()>;

    fn flush(&mut self) -> Result<()>;
}

enum Input {
    /// Interactive terminal; keys arrive as crossterm events.
    Tty { pending: Option<u8> },
    /// Redirected stdin. Only already-buffered bytes are visible to a poll;
    /// the first buffer fill happens on a blocking read.
    Pipe(BufReader<Stdin>),
}

/// Console backed by the process terminal. Input is polled through the
/// event queue so the keyboard status register can be serviced without
/// blocking; output is buffered and flushed only where the trap routines
/// ask for it.
pub struct HostConsole {
    input: Input,
    out: BufWriter<Stdout>,
    raw_output: bool,
}

impl HostConsole {
    pub fn new() -> Self {
        let tty = io::stdin().is_terminal();
        let input = if tty {
            Input::Tty { pending: None }
        } else {
            Input::Pipe(BufReader::new(io::stdin()))
        };
        Self {
            input,
            out: BufWriter::new(io::stdout()),
            raw_output: tty,
        }
    }

    /// Translate a key event to the byte a program would see, or report an
    /// interrupt for Ctrl+C (which raw mode delivers as a key, not a signal).
    fn key_byte(key: KeyEvent) -> Result<Option<u8>> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if let KeyCode::Char('c') | KeyCode::Char('C') = key.code {
                return Err(CoreError::Interrupted);
            }
            return Ok(None);
        }
        let byte = match key.code {
            KeyCode::Char(ch) if ch.is_ascii() => Some(ch as u8),
            KeyCode::Enter => Some(b'\n'),
            KeyCode::Tab => Some(b'\t'),
            KeyCode::Backspace => Some(0x08),
            KeyCode::Esc => Some(0x1B),
            _ => None,
        };
        Ok(byte)
    }

    /// Drain the event queue without blocking; `None` when no key byte is
    /// pending.
    fn poll_event_byte() -> Result<Option<u8>> {
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if let Some(byte) = Self::key_byte(key)? {
                    return Ok(Some(byte));
                }
            }
        }
        Ok(None)
    }

    fn wait_event_byte() -> Result<u8> {
        loop {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if let Some(byte) = Self::key_byte(key)? {
                    return Ok(byte);
                }
            }
        }
    }
}

impl Default for HostConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for HostConsole {
    fn poll_key(&mut self) -> Result<bool> {
        match &mut self.input {
            Input::Tty { pending } => {
                if pending.is_some() {
                    return Ok(true);
                }
                *pending = Self::poll_event_byte()?;
                Ok(pending.is_some())
            }
            Input::Pipe(reader) => Ok(!reader.buffer().is_empty()),
        }
    }

    fn read_key(&mut self) -> Result<u8> {
        match &mut self.input {
            Input::Tty { pending } => {
                if let Some(byte) = pending.take() {
                    return Ok(byte);
                }
                Self::wait_event_byte()
            }
            Input::Pipe(reader) => {
                let mut buf = [0u8; 1];
                reader.read_exact(&mut buf)?;
                Ok(buf[0])
            }
        }
    }

    fn write_byte(&mut self, byte: u8) -> Result<()> {
        // Raw mode disables output post-processing, so newline must carry
        // its own carriage return.
        if self.raw_output && byte == b'\n' {
            self.out.write_all(b"\r\n")?;
        } else {
            self.out.write_all(&[byte])?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

/// Scoped raw-mode acquisition. Restores the terminal on drop, which covers
/// normal exit, halt, fatal abort, interrupt, and panic unwind.
pub struct TerminalGuard {
    active: bool,
}

impl TerminalGuard {
    pub fn enter() -> Result<Self> {
        if !io::stdin().is_terminal() {
            return Ok(Self { active: false });
        }
        terminal::enable_raw_mode()?;
        Ok(Self { active: true })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if self.active {
            let _ = terminal::disable_raw_mode();
        }
    }
}

/// In-memory console with scripted input and captured output. Lets a host
/// run LC-3 programs without a terminal, and backs the test suites.
#[derive(Default)]
pub struct BufferConsole {
    input: VecDeque<u8>,
    output: Vec<u8>,
    flushes: usize,
}

impl BufferConsole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input(bytes: &[u8]) -> Self {
        Self {
            input: bytes.iter().copied().collect(),
            ..Self::default()
        }
    }

    pub fn push_input(&mut self, byte: u8) {
        self.input.push_back(byte);
    }

    pub fn output(&self) -> &[u8] {
        &self.output
    }

    pub fn flushes(&self) -> usize {
        self.flushes
    }
}

impl Console for BufferConsole {
    fn poll_key(&mut self) -> Result<bool> {
        Ok(!self.input.is_empty())
    }

    fn read_key(&mut self) -> Result<u8> {
        self.input.pop_front().ok_or_else(|| {
            CoreError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "scripted input exhausted",
            ))
        })
    }

    fn write_byte(&mut self, byte: u8) -> Result<()> {
        self.output.push(byte);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.flushes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_console_scripts_input() {
        let mut console = BufferConsole::with_input(b"ab");
        assert!(console.poll_key().unwrap());
        assert_eq!(console.read_key().unwrap(), b'a');
        assert_eq!(console.read_key().unwrap(), b'b');
        assert!(!console.poll_key().unwrap());
        assert!(matches!(console.read_key(), Err(CoreError::Io(_))));
    }

    #[test]
    fn buffer_console_captures_output() {
        let mut console = BufferConsole::new();
        console.write_byte(b'h').unwrap();
        console.write_byte(b'i').unwrap();
        console.flush().unwrap();
        assert_eq!(console.output(), b"hi");
        assert_eq!(console.flushes(), 1);
    }
}
