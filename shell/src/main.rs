use anyhow::{Context, Result};
use prompt_shell::input::{ByteKeys, TerminalKeys};
use prompt_shell::terminal::{RawLineWriter, RawMode};
use prompt_shell::{ShellConfig, Supervisor};
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let config: ShellConfig = argh::from_env();
    config.validate()?;

    let plain_input = config.plain_input;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(move || -> Box<dyn Write> {
            if plain_input {
                Box::new(io::stderr())
            } else {
                Box::new(RawLineWriter(io::stderr()))
            }
        })
        .init();

    let supervisor = Supervisor::new(config);
    supervisor
        .install_signal_handlers()
        .context("failed to install signal handlers")?;

    if plain_input {
        supervisor.run(ByteKeys::spawn(io::stdin()), io::stdout())?;
    } else {
        let _raw = RawMode::enable().context("failed to enable raw terminal mode")?;
        supervisor.run(TerminalKeys, io::stdout())?;
    }
    Ok(())
}
