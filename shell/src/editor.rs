use crate::history::{Direction, HistoryStore};
use crate::key::KeyEvent;

/// What the caller must do after the editor consumed a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorAction {
    /// The visible line changed; repaint the prompt followed by this text.
    Redraw(String),
    /// A command was submitted. The line should be committed to the
    /// scrollback and a fresh, empty prompt shown.
    Submit(String),
}

/// Single-line editor with history recall.
///
/// Owns the uncommitted buffer and the [`HistoryStore`]; nothing else mutates
/// either of them.
#[derive(Debug, Default)]
pub struct LineEditor {
    buffer: String,
    history: HistoryStore,
}

impl LineEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one key event. Returns `None` when nothing visible changed.
    pub fn handle(&mut self, event: KeyEvent) -> Option<EditorAction> {
        match event {
            KeyEvent::Char(c) => {
                self.buffer.push(c);
                Some(self.redraw())
            }
            KeyEvent::Backspace => {
                self.buffer.pop()?;
                Some(self.redraw())
            }
            KeyEvent::ArrowUp => Some(self.navigate(Direction::Up)),
            KeyEvent::ArrowDown => Some(self.navigate(Direction::Down)),
            KeyEvent::Enter => self.submit(),
            KeyEvent::Interrupt | KeyEvent::Ignored => None,
        }
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    fn navigate(&mut self, direction: Direction) -> EditorAction {
        self.buffer = self.history.navigate(direction, &self.buffer);
        self.redraw()
    }

    fn submit(&mut self) -> Option<EditorAction> {
        let command = self.buffer.trim();
        if command.is_empty() {
            return None;
        }
        let command = command.to_string();
        self.history.append(command.clone());
        self.history.reset_navigation();
        self.buffer.clear();
        Some(EditorAction::Submit(command))
    }

    fn redraw(&self) -> EditorAction {
        EditorAction::Redraw(self.buffer.clone())
    }
}
