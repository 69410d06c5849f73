use std::io;
use thiserror::Error;

/// Failure of the raw key source feeding the input actor.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to read key input: {0}")]
    Io(#[from] io::Error),

    /// The source reached end of input. Ends the session, but is not a failure.
    #[error("key input closed")]
    Closed,
}

/// Failure of the terminal the output actor renders to.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to write to terminal: {0}")]
    Io(#[from] io::Error),
}

/// Invalid command-line configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("poll interval must be between 1 and {max} ms, got {got}")]
    PollInterval { got: u64, max: u64 },

    #[error("prompt must not contain control characters")]
    PromptControlChars,
}
