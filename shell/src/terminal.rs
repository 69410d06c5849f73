use crossterm::terminal;
use std::io::{self, Write};
use tracing::warn;

/// Keeps the terminal in raw mode for as long as it lives.
///
/// Raw mode delivers keys one at a time without echo, which the line editor
/// needs. Dropping the guard restores the previous mode, also when a panic
/// unwinds through its owner.
pub struct RawMode(());

impl RawMode {
    pub fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self(()))
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        if let Err(err) = terminal::disable_raw_mode() {
            warn!("failed to restore terminal mode: {err}");
        }
    }
}

/// Writer for log lines printed while the terminal is in raw mode.
///
/// Raw mode turns off the `\n` to `\r\n` translation, so every line break is
/// written as `\r\n` here. A log line can still land between two prompt
/// repaints; the next output event redraws the prompt below it.
pub struct RawLineWriter<W>(pub W);

impl<W: Write> Write for RawLineWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut lines = buf.split(|&b| b == b'\n');
        if let Some(first) = lines.next() {
            self.0.write_all(first)?;
        }
        for line in lines {
            self.0.write_all(b"\r\n")?;
            self.0.write_all(line)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_line_writer_returns_carriage() {
        let mut writer = RawLineWriter(Vec::new());
        writer
            .write_all(b" WARN shell: one\n WARN shell: two\n")
            .unwrap();
        assert_eq!(writer.0, b" WARN shell: one\r\n WARN shell: two\r\n");

        let mut writer = RawLineWriter(Vec::new());
        writer.write_all(b"no break").unwrap();
        assert_eq!(writer.0, b"no break");
    }
}
