//! An interactive, line-oriented command shell.
//!
//! Keys are read and edited on an input thread, rendered by an output thread,
//! and submitted lines are run on the caller's thread by a [`Dispatcher`].
//! Output from any thread can be printed through a [`Messenger`] without
//! mangling the line the user is typing.
//!
//! The main entry point is [`Supervisor`], which wires the pieces together
//! for one session. The lower-level modules [`key`], [`history`] and
//! [`editor`] are usable on their own.

mod builtin;
pub mod command;
pub mod config;
pub mod dispatcher;
pub mod editor;
pub mod error;
pub mod history;
pub mod input;
pub mod key;
pub mod output;
pub mod session;
mod supervisor;
pub mod terminal;

pub use config::ShellConfig;
pub use dispatcher::{Dispatcher, Submission};
pub use output::Messenger;
pub use session::SessionState;
/// Just a convenient re-export of the session runner.
///
/// See [`Supervisor`] for the high-level API.
pub use supervisor::Supervisor;
