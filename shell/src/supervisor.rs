use crate::config::ShellConfig;
use crate::dispatcher::{Dispatcher, Submission};
use crate::input::{InputActor, KeySource};
use crate::output::{Messenger, OutputActor, OutputEvent, Renderer};
use crate::session::SessionState;
use anyhow::{Result, anyhow};
use crossbeam_channel::{Receiver, Sender, select, unbounded};
use std::io::{self, Write};
use std::sync::Arc;
use std::thread;
use tracing::{debug, info, warn};

/// Owns a shell session: starts the input and output actors, runs the
/// dispatch loop on the calling thread, and tears everything down.
///
/// The dispatch loop is the only place the session is ended, either by an
/// `exit` command or when it notices an interrupt request.
pub struct Supervisor {
    config: ShellConfig,
    session: Arc<SessionState>,
    dispatcher: Dispatcher,
    output_tx: Sender<OutputEvent>,
    output_rx: Receiver<OutputEvent>,
}

impl Supervisor {
    pub fn new(config: ShellConfig) -> Self {
        let (output_tx, output_rx) = unbounded();
        Self {
            config,
            session: SessionState::new(),
            dispatcher: Dispatcher::default(),
            output_tx,
            output_rx,
        }
    }

    /// Replace the builtin command set.
    pub fn with_dispatcher(mut self, dispatcher: Dispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    pub fn session(&self) -> Arc<SessionState> {
        Arc::clone(&self.session)
    }

    /// A handle for printing above the prompt from other threads.
    pub fn messenger(&self) -> Messenger {
        Messenger::new(self.output_tx.clone(), !self.config.no_color)
    }

    /// Routes SIGINT and SIGTERM to the interrupt flag instead of killing the
    /// process, so the session shuts down like it does on `exit`.
    pub fn install_signal_handlers(&self) -> io::Result<()> {
        #[cfg(unix)]
        {
            use signal_hook::consts::{SIGINT, SIGTERM};
            signal_hook::flag::register(SIGINT, self.session.interrupt_flag())?;
            signal_hook::flag::register(SIGTERM, self.session.interrupt_flag())?;
        }
        #[cfg(not(unix))]
        signal_hook::flag::register(signal_hook::consts::SIGINT, self.session.interrupt_flag())?;
        Ok(())
    }

    /// Runs the session until it ends and returns the output writer.
    pub fn run<S, W>(self, keys: S, out: W) -> Result<W>
    where
        S: KeySource + Send + 'static,
        W: Write + Send + 'static,
    {
        let poll = self.config.poll_interval();
        let messenger = self.messenger();
        let (command_tx, command_rx) = unbounded();

        let output = OutputActor::new(
            Renderer::new(out, self.config.styled_prompt()),
            self.output_rx.clone(),
            Arc::clone(&self.session),
            poll,
        );
        let output = thread::Builder::new()
            .name("output".into())
            .spawn(move || output.run())?;

        let input = InputActor::new(
            keys,
            messenger.clone(),
            command_tx,
            Arc::clone(&self.session),
            poll,
        );
        let input = thread::Builder::new()
            .name("input".into())
            .spawn(move || input.run())?;

        info!("session started");
        messenger.send_event(OutputEvent::Prompt);
        self.dispatch_loop(&command_rx, &messenger);

        if input.join().is_err() {
            warn!("input actor panicked");
        }
        let renderer = output
            .join()
            .map_err(|_| anyhow!("output actor panicked"))?;
        info!("session ended");
        Ok(renderer.into_inner())
    }

    fn dispatch_loop(&self, commands: &Receiver<Submission>, messenger: &Messenger) {
        let shutdown = self.session.shutdown_signal();
        while self.session.is_running() {
            if self.session.is_interrupted() {
                self.interrupt(messenger);
                break;
            }
            select! {
                recv(commands) -> submission => match submission {
                    Ok(submission) => {
                        self.dispatcher.dispatch(&submission, &self.session, messenger);
                    }
                    Err(_) => {
                        // queued commands were all dispatched above
                        info!("no more input, ending session");
                        self.interrupt(messenger);
                    }
                },
                recv(shutdown) -> _ => break,
                default(self.config.poll_interval()) => {}
            }
        }
        debug!("dispatch loop stopped");
    }

    fn interrupt(&self, messenger: &Messenger) {
        messenger.send("Shutting down...");
        self.session.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{CommandFactory, Context, ExecutableCommand};
    use crate::error::InputError;
    use crate::key::KeyEvent;
    use std::collections::VecDeque;
    use std::time::Duration;

    /// Replays keys, then idles without closing.
    struct Scripted(VecDeque<KeyEvent>);

    impl KeySource for Scripted {
        fn next_key(&mut self, timeout: Duration) -> Result<Option<KeyEvent>, InputError> {
            match self.0.pop_front() {
                Some(key) => Ok(Some(key)),
                None => {
                    thread::sleep(timeout);
                    Ok(None)
                }
            }
        }
    }

    fn typed(lines: &[&str]) -> Scripted {
        let mut keys = VecDeque::new();
        for line in lines {
            keys.extend(line.chars().map(KeyEvent::Char));
            keys.push_back(KeyEvent::Enter);
        }
        Scripted(keys)
    }

    fn config() -> ShellConfig {
        ShellConfig {
            prompt: "> ".into(),
            poll_interval_ms: 10,
            no_color: true,
            plain_input: false,
        }
    }

    #[test]
    fn test_exit_stops_dispatch_of_queued_commands() -> Result<()> {
        let supervisor = Supervisor::new(config());
        let session = supervisor.session();
        let out = supervisor.run(typed(&["hello", "exit", "after"]), Vec::new())?;
        let out = String::from_utf8(out)?;

        assert!(!session.is_running());
        assert!(out.contains("Received command: hello"));
        assert!(out.contains("Exiting..."));
        assert!(!out.contains("Received command: after"));
        Ok(())
    }

    #[test]
    fn test_interrupt_shuts_down() -> Result<()> {
        let supervisor = Supervisor::new(config());
        let session = supervisor.session();
        let mut keys = typed(&["one"]);
        keys.0.push_back(KeyEvent::Interrupt);

        let out = String::from_utf8(supervisor.run(keys, Vec::new())?)?;
        assert!(!session.is_running());
        assert!(out.contains("Shutting down..."));
        Ok(())
    }

    #[test]
    fn test_external_interrupt_flag() -> Result<()> {
        let supervisor = Supervisor::new(config());
        let flag = supervisor.session().interrupt_flag();
        let handle = thread::spawn(move || supervisor.run(typed(&[]), Vec::new()));
        thread::sleep(Duration::from_millis(30));
        flag.store(true, std::sync::atomic::Ordering::SeqCst);

        let out = handle.join().map_err(|_| anyhow!("supervisor panicked"))??;
        assert!(String::from_utf8(out)?.contains("Shutting down..."));
        Ok(())
    }

    #[test]
    fn test_messenger_output_from_other_thread() -> Result<()> {
        let supervisor = Supervisor::new(config());
        let messenger = supervisor.messenger();
        thread::spawn(move || messenger.feedback("background job done"))
            .join()
            .map_err(|_| anyhow!("producer panicked"))?;

        let out = String::from_utf8(supervisor.run(typed(&["exit"]), Vec::new())?)?;
        assert!(out.contains("[!] background job done"));
        Ok(())
    }

    /// `greet` prints a line; `bye` ends the session.
    struct Greeter;

    struct Greet {
        leaving: bool,
    }

    impl ExecutableCommand for Greet {
        fn execute(self: Box<Self>, stdout: &mut dyn Write, ctx: &mut Context<'_>) -> Result<()> {
            if self.leaving {
                ctx.exit = true;
                writeln!(stdout, "see you")?;
            } else {
                writeln!(stdout, "hi after {} commands", ctx.history.len())?;
            }
            Ok(())
        }
    }

    impl CommandFactory for Greeter {
        fn try_create(&self, command: &str) -> Option<Box<dyn ExecutableCommand>> {
            let leaving = match command {
                "greet" => false,
                "bye" => true,
                _ => return None,
            };
            Some(Box::new(Greet { leaving }))
        }
    }

    #[test]
    fn test_custom_dispatcher_replaces_builtins() -> Result<()> {
        let commands: Vec<Box<dyn CommandFactory>> = vec![Box::new(Greeter)];
        let supervisor = Supervisor::new(config()).with_dispatcher(Dispatcher::new(commands));
        let session = supervisor.session();
        let out = supervisor.run(typed(&["greet", "help", "exit", "bye", "greet"]), Vec::new())?;
        let out = String::from_utf8(out)?;

        assert!(!session.is_running());
        assert!(out.contains("hi after 1 commands"));
        assert!(out.contains("Received command: help"));
        assert!(out.contains("Received command: exit"));
        assert!(!out.contains("Exiting..."));
        assert!(out.contains("see you"));
        assert!(!out.contains("hi after 5 commands"));
        Ok(())
    }
}
