use crate::builtin::Echo;
use crate::command::{CommandFactory, Context, ExecutableCommand};
use crate::output::Messenger;
use crate::session::SessionState;
use tracing::{debug, info, warn};

/// Factory allows creating instances of ExecutableCommand.
///
/// Only supports commands defined in this crate, see [`crate::builtin`].
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<fn() -> T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// A command submitted at the prompt, with the history as it stood right
/// after the command was recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub command: String,
    pub history: Vec<String>,
}

/// Maps submitted commands to their effects.
///
/// Factories are asked in order; the first one that recognizes the command
/// wins. Lines no factory recognizes are echoed back, never rejected.
pub struct Dispatcher {
    commands: Vec<Box<dyn CommandFactory>>,
}

impl Dispatcher {
    /// Create a dispatcher with a custom set of command factories.
    pub fn new(commands: Vec<Box<dyn CommandFactory>>) -> Self {
        Self { commands }
    }

    /// Runs one submission and queues whatever it printed as a message.
    ///
    /// A command that asks to exit ends the session only after its output is
    /// queued, so the output actor still renders it while draining.
    pub fn dispatch(&self, submission: &Submission, session: &SessionState, out: &Messenger) {
        let command = submission.command.trim();
        debug!(command, "dispatching");

        let cmd = self.resolve(command);
        let mut ctx = Context {
            history: &submission.history,
            exit: false,
        };
        let mut stdout: Vec<u8> = Vec::new();
        let result = cmd.execute(&mut stdout, &mut ctx);

        let printed = String::from_utf8_lossy(&stdout);
        let text = printed.strip_suffix('\n').unwrap_or(&*printed);
        if !text.is_empty() {
            out.send(text);
        }
        if let Err(err) = result {
            warn!(command, "command failed: {err:#}");
            out.error(&format!("{command}: {err:#}"));
        }
        if ctx.exit {
            info!("exit requested");
            session.shutdown();
        }
    }

    fn resolve(&self, command: &str) -> Box<dyn ExecutableCommand> {
        self.commands
            .iter()
            .find_map(|factory| factory.try_create(command))
            .unwrap_or_else(|| {
                Box::new(Echo {
                    command: command.to_string(),
                })
            })
    }
}

impl Default for Dispatcher {
    /// Create a dispatcher with the builtins: `help`, `history`, `clear`,
    /// `exit`.
    fn default() -> Self {
        use crate::builtin::*;
        Self::new(vec![
            Box::new(Factory::<Help>::default()),
            Box::new(Factory::<History>::default()),
            Box::new(Factory::<Clear>::default()),
            Box::new(Factory::<Exit>::default()),
        ])
    }
}
