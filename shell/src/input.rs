//! Key sources and the input actor.

use crate::dispatcher::Submission;
use crate::editor::{EditorAction, LineEditor};
use crate::error::InputError;
use crate::key::{ByteDecoder, KeyDecoder, KeyEvent, from_crossterm};
use crate::output::{Messenger, OutputEvent};
use crate::session::SessionState;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use crossterm::event::{self, Event};
use std::collections::VecDeque;
use std::io::{self, Read};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info};

/// Something that produces key events, waiting at most `timeout` for one.
pub trait KeySource {
    /// `Ok(None)` means nothing arrived in time.
    fn next_key(&mut self, timeout: Duration) -> Result<Option<KeyEvent>, InputError>;
}

/// Keys read through crossterm. The terminal should be in raw mode.
#[derive(Debug, Default)]
pub struct TerminalKeys;

impl KeySource for TerminalKeys {
    fn next_key(&mut self, timeout: Duration) -> Result<Option<KeyEvent>, InputError> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        match event::read()? {
            Event::Key(key) => Ok(Some(from_crossterm(&key))),
            _ => Ok(None),
        }
    }
}

/// Keys decoded from a raw byte stream such as piped stdin.
///
/// Reads happen on a helper thread so a blocking reader never keeps the
/// input actor from noticing shutdown.
pub struct ByteKeys {
    chunks: Receiver<io::Result<Vec<u8>>>,
    decoder: ByteDecoder,
    pending: VecDeque<KeyEvent>,
}

impl ByteKeys {
    pub fn spawn<R: Read + Send + 'static>(mut reader: R) -> Self {
        let (tx, rx) = unbounded();
        thread::spawn(move || {
            let mut buf = [0u8; 256];
            loop {
                let chunk = match reader.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => Ok(buf[..n].to_vec()),
                    Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                    Err(err) => Err(err),
                };
                let failed = chunk.is_err();
                if tx.send(chunk).is_err() || failed {
                    break;
                }
            }
        });
        Self {
            chunks: rx,
            decoder: ByteDecoder::new(),
            pending: VecDeque::new(),
        }
    }
}

impl KeySource for ByteKeys {
    fn next_key(&mut self, timeout: Duration) -> Result<Option<KeyEvent>, InputError> {
        if let Some(key) = self.pending.pop_front() {
            return Ok(Some(key));
        }
        match self.chunks.recv_timeout(timeout) {
            Ok(Ok(bytes)) => {
                let decoder = &mut self.decoder;
                self.pending
                    .extend(bytes.into_iter().filter_map(|b| decoder.feed(b)));
                Ok(self.pending.pop_front())
            }
            Ok(Err(err)) => Err(InputError::Io(err)),
            Err(RecvTimeoutError::Timeout) => {
                // a lone ESC never completes; don't let it swallow the next key
                self.decoder.reset();
                Ok(None)
            }
            Err(RecvTimeoutError::Disconnected) => Err(InputError::Closed),
        }
    }
}

/// Drives a [`KeySource`] into the [`LineEditor`].
///
/// Owns the editor, and with it the buffer and history. Other actors only
/// ever see what it sends: redraws to the output actor and submissions to
/// the dispatch loop.
pub struct InputActor<S> {
    source: S,
    editor: LineEditor,
    output: Messenger,
    commands: Sender<Submission>,
    session: Arc<SessionState>,
    poll_interval: Duration,
}

impl<S: KeySource> InputActor<S> {
    pub fn new(
        source: S,
        output: Messenger,
        commands: Sender<Submission>,
        session: Arc<SessionState>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            source,
            editor: LineEditor::new(),
            output,
            commands,
            session,
            poll_interval,
        }
    }

    pub fn run(mut self) {
        debug!("input actor started");
        while self.session.is_running() {
            match self.source.next_key(self.poll_interval) {
                Ok(Some(KeyEvent::Interrupt)) => {
                    info!("interrupt key pressed");
                    self.session.interrupt();
                }
                Ok(Some(key)) => self.handle(key),
                Ok(None) => {}
                Err(InputError::Closed) => {
                    // Dropping the command sender lets the dispatch loop run
                    // what is already queued before it ends the session.
                    info!("key input closed");
                    break;
                }
                Err(err) => {
                    error!("input actor stopped: {err}");
                    self.output.error(&format!("Error handling input: {err}"));
                    break;
                }
            }
        }
        debug!("input actor stopped");
    }

    fn handle(&mut self, key: KeyEvent) {
        match self.editor.handle(key) {
            Some(EditorAction::Redraw(line)) => {
                self.output.send_event(OutputEvent::Redraw(line));
            }
            Some(EditorAction::Submit(command)) => {
                self.output.send_event(OutputEvent::Commit(command.clone()));
                let submission = Submission {
                    command,
                    history: self.editor.history().entries().to_vec(),
                };
                if self.commands.send(submission).is_err() {
                    debug!("dispatch loop gone, dropping command");
                }
            }
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Replays a fixed list of keys, then reports the input as closed.
    struct Scripted(VecDeque<KeyEvent>);

    impl KeySource for Scripted {
        fn next_key(&mut self, _timeout: Duration) -> Result<Option<KeyEvent>, InputError> {
            self.0.pop_front().map(Some).ok_or(InputError::Closed)
        }
    }

    struct Failing;

    impl KeySource for Failing {
        fn next_key(&mut self, _timeout: Duration) -> Result<Option<KeyEvent>, InputError> {
            Err(io::Error::other("device gone").into())
        }
    }

    fn keys(text: &str) -> VecDeque<KeyEvent> {
        text.chars()
            .map(|c| match c {
                '\n' => KeyEvent::Enter,
                '^' => KeyEvent::ArrowUp,
                c => KeyEvent::Char(c),
            })
            .collect()
    }

    fn run_actor<S: KeySource>(
        source: S,
    ) -> (Arc<SessionState>, Vec<OutputEvent>, Vec<Submission>) {
        let session = SessionState::new();
        let (out_tx, out_rx) = unbounded();
        let (cmd_tx, cmd_rx) = unbounded();
        InputActor::new(
            source,
            Messenger::new(out_tx, false),
            cmd_tx,
            Arc::clone(&session),
            Duration::from_millis(10),
        )
        .run();
        (
            session,
            out_rx.try_iter().collect(),
            cmd_rx.try_iter().collect(),
        )
    }

    #[test]
    fn test_submissions_carry_history_snapshot() {
        let (session, _, submitted) = run_actor(Scripted(keys("foo\nbar\n^\n")));
        let commands: Vec<_> = submitted.iter().map(|s| s.command.as_str()).collect();
        assert_eq!(commands, ["foo", "bar", "bar"]);
        assert_eq!(submitted[1].history, ["foo", "bar"]);
        // recalled "bar" is an adjacent duplicate and is stored once
        assert_eq!(submitted[2].history, ["foo", "bar"]);
        // running out of input is not an interrupt
        assert!(!session.is_interrupted());
    }

    #[test]
    fn test_commit_precedes_next_redraw() {
        let (_, events, _) = run_actor(Scripted(keys("a\n")));
        assert_eq!(
            events,
            [
                OutputEvent::Redraw("a".into()),
                OutputEvent::Commit("a".into()),
            ]
        );
    }

    #[test]
    fn test_blank_enter_sends_nothing() {
        let (_, events, submitted) = run_actor(Scripted(keys("  \n")));
        assert!(submitted.is_empty());
        assert!(!events.iter().any(|e| matches!(e, OutputEvent::Commit(_))));
    }

    #[test]
    fn test_interrupt_key_flags_session() {
        let mut script = keys("x");
        script.push_back(KeyEvent::Interrupt);
        let (session, _, submitted) = run_actor(Scripted(script));
        assert!(session.is_interrupted());
        assert!(session.is_running());
        assert!(submitted.is_empty());
    }

    #[test]
    fn test_read_failure_reported_once() {
        let (session, events, _) = run_actor(Failing);
        assert_eq!(
            events,
            [OutputEvent::Message(
                "[-] Error handling input: failed to read key input: device gone".into()
            )]
        );
        assert!(!session.is_interrupted());
    }

    #[test]
    fn test_byte_keys_decode_stream() -> anyhow::Result<()> {
        let mut source = ByteKeys::spawn(Cursor::new(b"hi\x1b[A\r".to_vec()));
        let mut got = Vec::new();
        loop {
            match source.next_key(Duration::from_millis(100)) {
                Ok(Some(key)) => got.push(key),
                Ok(None) => {}
                Err(InputError::Closed) => break,
                Err(err) => return Err(err.into()),
            }
        }
        assert_eq!(
            got,
            [
                KeyEvent::Char('h'),
                KeyEvent::Char('i'),
                KeyEvent::ArrowUp,
                KeyEvent::Enter,
            ]
        );
        Ok(())
    }
}
