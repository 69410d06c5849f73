use anyhow::Result;
use prompt_shell::input::ByteKeys;
use prompt_shell::{ShellConfig, Supervisor};
use std::io::Cursor;

fn run_session(input: &[u8]) -> Result<String> {
    let config = ShellConfig {
        prompt: "> ".into(),
        poll_interval_ms: 10,
        no_color: true,
        plain_input: true,
    };
    let keys = ByteKeys::spawn(Cursor::new(input.to_vec()));
    let out = Supervisor::new(config).run(keys, Vec::new())?;
    Ok(String::from_utf8(out)?)
}

fn position(haystack: &str, needle: &str) -> usize {
    haystack
        .find(needle)
        .unwrap_or_else(|| panic!("{needle:?} not found in {haystack:?}"))
}

#[test]
fn test_history_recall_and_listing() -> Result<()> {
    let out = run_session(b"alpha\rbeta\rgam\x1b[A\x1b[A\x1b[B\x1b[B\rhistory\r")?;

    assert!(out.contains("Received command: alpha"));
    assert!(out.contains("Received command: beta"));
    // the draft came back after browsing
    assert!(out.contains("Received command: gam"));

    let listing = &out[position(&out, "Command History:")..];
    let order: Vec<_> = ["1. alpha", "2. beta", "3. gam", "4. history"]
        .iter()
        .map(|entry| position(listing, entry))
        .collect();
    assert!(order.windows(2).all(|w| w[0] < w[1]));
    Ok(())
}

#[test]
fn test_end_of_input_runs_queued_commands_then_shuts_down() -> Result<()> {
    let out = run_session(b"one\rtwo\r")?;
    let two = position(&out, "Received command: two");
    let bye = position(&out, "Shutting down...");
    assert!(position(&out, "Received command: one") < two);
    assert!(two < bye);
    // the prompt line is erased on the way out
    assert!(out.ends_with("\r\x1b[K"));
    Ok(())
}

#[test]
fn test_exit_ignores_rest_of_input() -> Result<()> {
    let out = run_session(b"EXIT\rnever\r")?;
    assert!(out.contains("Exiting..."));
    assert!(!out.contains("Received command: never"));
    assert!(!out.contains("Shutting down..."));
    Ok(())
}

#[test]
fn test_blank_lines_and_backspace() -> Result<()> {
    let out = run_session(b"   \r\rhelq\x7fp\rhistory\r")?;
    assert!(out.contains("Available commands:"));
    assert!(out.contains("1. help"));
    assert!(out.contains("2. history"));
    assert!(!out.contains("3."));
    Ok(())
}

#[test]
fn test_ctrl_c_byte_interrupts() -> Result<()> {
    // an interrupt may overtake commands still queued, so only the shutdown
    // itself is certain
    let out = run_session(b"ls\r\x03")?;
    assert!(out.contains("> ls\r\n"));
    assert_eq!(out.matches("Shutting down...").count(), 1);
    Ok(())
}
