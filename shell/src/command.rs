use anyhow::Result;
use std::io::Write;

/// What a command may look at and change while it runs.
///
/// `history` is a snapshot of the submitted commands taken when this command
/// was submitted (it already includes the command itself).
pub struct Context<'a> {
    pub history: &'a [String],
    /// Set to end the session once the command's output has been queued.
    pub exit: bool,
}

/// Object-safe trait for any command the dispatcher can run.
///
/// Whatever the command writes to `stdout` is shown as one message above the
/// prompt once it returns.
pub trait ExecutableCommand {
    fn execute(self: Box<Self>, stdout: &mut dyn Write, ctx: &mut Context<'_>) -> Result<()>;
}

/// Factory that tries to create a command from a submitted line.
///
/// Returns `None` when the factory doesn't recognize the line.
pub trait CommandFactory: Send {
    fn try_create(&self, command: &str) -> Option<Box<dyn ExecutableCommand>>;
}
