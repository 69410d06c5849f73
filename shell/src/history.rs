/// Direction of a history navigation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Towards older entries.
    Up,
    /// Towards the live input line.
    Down,
}

/// Submitted commands plus the state of an in-progress history browse.
///
/// `cursor` is 0 while the user edits the live line and `-k` while the line
/// shows the k-th most recent entry, so `0 >= cursor >= -len` always holds.
/// The draft is whatever the user had typed before the browse started.
#[derive(Debug, Default, Clone)]
pub struct HistoryStore {
    entries: Vec<String>,
    cursor: isize,
    saved_draft: String,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a submitted command. A repeat of the most recent entry is not
    /// stored again; older duplicates are allowed.
    pub fn append(&mut self, command: impl Into<String>) {
        let command = command.into();
        if self.entries.last() != Some(&command) {
            self.entries.push(command);
        }
        self.cursor = 0;
    }

    /// Moves one step through the history and returns what the buffer should
    /// now contain. Steps past either end leave `current` untouched.
    pub fn navigate(&mut self, direction: Direction, current: &str) -> String {
        let len = self.entries.len() as isize;
        if len == 0 {
            return current.to_string();
        }

        match (self.cursor, direction) {
            (0, Direction::Down) => return current.to_string(),
            (0, Direction::Up) => self.saved_draft = current.to_string(),
            (cursor, Direction::Up) if -cursor == len => return current.to_string(),
            (-1, Direction::Down) => {
                self.cursor = 0;
                return self.saved_draft.clone();
            }
            _ => {}
        }

        self.cursor += match direction {
            Direction::Up => -1,
            Direction::Down => 1,
        };
        self.entries[(len + self.cursor) as usize].clone()
    }

    /// Leaves browse mode and forgets the saved draft.
    pub fn reset_navigation(&mut self) {
        self.cursor = 0;
        self.saved_draft.clear();
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn cursor(&self) -> isize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
