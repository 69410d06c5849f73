use crate::error::ConfigError;
use argh::FromArgs;
use std::time::Duration;

/// Longest any actor may wait before checking for shutdown.
pub const MAX_POLL_INTERVAL_MS: u64 = 100;

const DEFAULT_PROMPT: &str = "shell> ";

#[derive(FromArgs, Debug, Clone, PartialEq, Eq)]
/// Interactive command shell with line editing and command history.
pub struct ShellConfig {
    #[argh(option, default = "DEFAULT_PROMPT.to_string()")]
    /// text shown before the input line
    pub prompt: String,

    #[argh(option, default = "MAX_POLL_INTERVAL_MS")]
    /// how often, in milliseconds, idle actors check for shutdown (1-100)
    pub poll_interval_ms: u64,

    #[argh(switch)]
    /// do not color the prompt or message tags
    pub no_color: bool,

    #[argh(switch)]
    /// read raw bytes from stdin instead of putting the terminal in raw mode
    pub plain_input: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            poll_interval_ms: MAX_POLL_INTERVAL_MS,
            no_color: false,
            plain_input: false,
        }
    }
}

impl ShellConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_POLL_INTERVAL_MS).contains(&self.poll_interval_ms) {
            return Err(ConfigError::PollInterval {
                got: self.poll_interval_ms,
                max: MAX_POLL_INTERVAL_MS,
            });
        }
        if self.prompt.chars().any(char::is_control) {
            return Err(ConfigError::PromptControlChars);
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// The prompt as printed, in bright bold red unless color is off.
    pub fn styled_prompt(&self) -> String {
        if self.no_color {
            self.prompt.clone()
        } else {
            format!("\x1b[1;91m{}\x1b[0m", self.prompt)
        }
    }
}
