//! Terminal rendering.
//!
//! All writes to the terminal go through one [`OutputActor`], which applies
//! [`OutputEvent`]s strictly in the order they were queued. Each event is one
//! atomic step: return to column 0, erase the line, write, and (for
//! messages) repaint the prompt and the line being edited.

use crate::error::OutputError;
use crate::session::SessionState;
use crossbeam_channel::{Receiver, Sender, select};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

const ERASE_LINE: &str = "\r\x1b[K";

/// A unit of work for the output actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputEvent {
    /// Paint the prompt and the current line.
    Prompt,
    /// The line being edited now reads this.
    Redraw(String),
    /// This command was submitted; leave it in the scrollback and start an
    /// empty line.
    Commit(String),
    /// Asynchronous text to show above the prompt.
    Message(String),
}

/// Tag prepended to messages sent through the [`Messenger`] helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Output,
    Feedback,
    Error,
}

impl Severity {
    fn tag(self) -> &'static str {
        match self {
            Severity::Output => "[+]",
            Severity::Feedback => "[!]",
            Severity::Error => "[-]",
        }
    }

    fn color(self) -> &'static str {
        match self {
            Severity::Output => "\x1b[1;32m",
            Severity::Feedback => "\x1b[1;33m",
            Severity::Error => "\x1b[1;31m",
        }
    }
}

/// Cloneable handle for queueing output from any thread.
#[derive(Debug, Clone)]
pub struct Messenger {
    tx: Sender<OutputEvent>,
    color: bool,
}

impl Messenger {
    pub fn new(tx: Sender<OutputEvent>, color: bool) -> Self {
        Self { tx, color }
    }

    /// Queues an event. Once the output actor is gone the event is dropped.
    pub fn send_event(&self, event: OutputEvent) {
        if self.tx.send(event).is_err() {
            debug!("output actor stopped, dropping event");
        }
    }

    /// Queues a plain message.
    pub fn send(&self, message: impl Into<String>) {
        self.send_event(OutputEvent::Message(message.into()));
    }

    pub fn output(&self, message: &str) {
        self.tagged(Severity::Output, message);
    }

    pub fn feedback(&self, message: &str) {
        self.tagged(Severity::Feedback, message);
    }

    pub fn error(&self, message: &str) {
        self.tagged(Severity::Error, message);
    }

    fn tagged(&self, severity: Severity, message: &str) {
        let text = if self.color {
            format!("{}{}\x1b[0m {}", severity.color(), severity.tag(), message)
        } else {
            format!("{} {}", severity.tag(), message)
        };
        self.send(text);
    }
}

/// Knows what is on the prompt line and how to repaint it.
///
/// Keeps its own copy of the visible line, fed by redraw events, so a message
/// can be printed above the prompt without asking the editor for its buffer.
#[derive(Debug)]
pub struct Renderer<W: Write> {
    out: W,
    prompt: String,
    line: String,
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W, prompt: impl Into<String>) -> Self {
        Self {
            out,
            prompt: prompt.into(),
            line: String::new(),
        }
    }

    pub fn render(&mut self, event: OutputEvent) -> Result<(), OutputError> {
        self.out.write_all(ERASE_LINE.as_bytes())?;
        match event {
            OutputEvent::Prompt => {}
            OutputEvent::Redraw(line) => self.line = line,
            OutputEvent::Commit(command) => {
                self.line.clear();
                write!(self.out, "{}{}\r\n", self.prompt, command)?;
            }
            OutputEvent::Message(message) => {
                self.write_text(&message)?;
                self.out.write_all(b"\r\n")?;
            }
        }
        write!(self.out, "{}{}", self.prompt, self.line)?;
        self.out.flush()?;
        Ok(())
    }

    /// Erases the prompt line, leaving the cursor at column 0.
    pub fn finish(&mut self) -> Result<(), OutputError> {
        self.out.write_all(ERASE_LINE.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    // Raw mode does not translate LF, so every line break gets an explicit CR.
    fn write_text(&mut self, text: &str) -> Result<(), OutputError> {
        let mut lines = text.split('\n');
        if let Some(first) = lines.next() {
            self.out.write_all(first.trim_end_matches('\r').as_bytes())?;
        }
        for line in lines {
            self.out.write_all(b"\r\n")?;
            self.out.write_all(line.trim_end_matches('\r').as_bytes())?;
        }
        Ok(())
    }
}

/// Drains [`OutputEvent`]s into a [`Renderer`] until the session ends.
pub struct OutputActor<W: Write> {
    renderer: Renderer<W>,
    events: Receiver<OutputEvent>,
    session: Arc<SessionState>,
    poll_interval: Duration,
}

impl<W: Write> OutputActor<W> {
    pub fn new(
        renderer: Renderer<W>,
        events: Receiver<OutputEvent>,
        session: Arc<SessionState>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            renderer,
            events,
            session,
            poll_interval,
        }
    }

    /// Runs the render loop and hands the renderer back when done.
    ///
    /// Events already queued when the session ends are still rendered, so a
    /// farewell message sent right before shutdown is not lost.
    pub fn run(mut self) -> Renderer<W> {
        debug!("output actor started");
        if let Err(err) = self.render_loop() {
            error!("output actor stopped: {err}");
            return self.renderer;
        }
        let result = self.drain().and_then(|()| self.renderer.finish());
        if let Err(err) = result {
            error!("output actor failed while closing: {err}");
        }
        debug!("output actor stopped");
        self.renderer
    }

    fn render_loop(&mut self) -> Result<(), OutputError> {
        let events = self.events.clone();
        let shutdown = self.session.shutdown_signal();
        while self.session.is_running() {
            select! {
                recv(events) -> event => match event {
                    Ok(event) => {
                        self.renderer.render(event)?;
                        self.drain()?;
                    }
                    Err(_) => break,
                },
                recv(shutdown) -> _ => break,
                default(self.poll_interval) => {}
            }
        }
        Ok(())
    }

    fn drain(&mut self) -> Result<(), OutputError> {
        while let Ok(event) = self.events.try_recv() {
            self.renderer.render(event)?;
        }
        Ok(())
    }
}
