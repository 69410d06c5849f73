use crate::command::{CommandFactory, Context, ExecutableCommand};
use crate::dispatcher::Factory;
use anyhow::Result;
use std::io::Write;

/// Built-in commands known to the shell at compile time.
///
/// A builtin is selected when the submitted line equals its name, ignoring
/// ASCII case. Builtins take no arguments: `help me` is not `help`.
pub(crate) trait BuiltinCommand: Sized + Default {
    /// Canonical name of the command, e.g. "help".
    fn name() -> &'static str;

    fn execute(self, stdout: &mut dyn Write, ctx: &mut Context<'_>) -> Result<()>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(self: Box<Self>, stdout: &mut dyn Write, ctx: &mut Context<'_>) -> Result<()> {
        BuiltinCommand::execute(*self, stdout, ctx)
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn try_create(&self, command: &str) -> Option<Box<dyn ExecutableCommand>> {
        command
            .eq_ignore_ascii_case(T::name())
            .then(|| Box::new(T::default()) as Box<dyn ExecutableCommand>)
    }
}

/// Display the available commands.
#[derive(Default)]
pub struct Help;

impl BuiltinCommand for Help {
    fn name() -> &'static str {
        "help"
    }

    fn execute(self, stdout: &mut dyn Write, _ctx: &mut Context<'_>) -> Result<()> {
        writeln!(stdout)?;
        writeln!(stdout, "Available commands:")?;
        writeln!(stdout, "    help    - Display this help message")?;
        writeln!(stdout, "    history - Display the command history")?;
        writeln!(stdout, "    exit    - Exit the CLI")?;
        writeln!(stdout, "    clear   - Clear the screen")?;
        Ok(())
    }
}

/// List submitted commands, oldest first, numbered from 1.
#[derive(Default)]
pub struct History;

impl BuiltinCommand for History {
    fn name() -> &'static str {
        "history"
    }

    fn execute(self, stdout: &mut dyn Write, ctx: &mut Context<'_>) -> Result<()> {
        if ctx.history.is_empty() {
            writeln!(stdout, "No command history available.")?;
            return Ok(());
        }
        writeln!(stdout)?;
        writeln!(stdout, "Command History:")?;
        for (i, command) in ctx.history.iter().enumerate() {
            writeln!(stdout, "    {}. {}", i + 1, command)?;
        }
        Ok(())
    }
}

/// Clear the screen and move the cursor home.
#[derive(Default)]
pub struct Clear;

impl BuiltinCommand for Clear {
    fn name() -> &'static str {
        "clear"
    }

    fn execute(self, stdout: &mut dyn Write, _ctx: &mut Context<'_>) -> Result<()> {
        write!(stdout, "\x1b[2J\x1b[H")?;
        Ok(())
    }
}

/// End the session.
#[derive(Default)]
pub struct Exit;

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn execute(self, stdout: &mut dyn Write, ctx: &mut Context<'_>) -> Result<()> {
        ctx.exit = true;
        writeln!(stdout, "Exiting...")?;
        Ok(())
    }
}

/// Fallback for every line that is not a builtin.
pub struct Echo {
    pub command: String,
}

impl ExecutableCommand for Echo {
    fn execute(self: Box<Self>, stdout: &mut dyn Write, _ctx: &mut Context<'_>) -> Result<()> {
        writeln!(stdout, "Received command: {}", self.command)?;
        Ok(())
    }
}
