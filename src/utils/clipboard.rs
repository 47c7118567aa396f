use std::io::Write;
use std::process::{Command, Stdio};

use tracing::debug;

/// Clipboard helpers tried in order on this platform.
#[cfg(target_os = "macos")]
const CANDIDATES: &[(&str, &[&str])] = &[("pbcopy", &[])];
#[cfg(target_os = "windows")]
const CANDIDATES: &[(&str, &[&str])] = &[("cmd", &["/C", "clip"])];
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const CANDIDATES: &[(&str, &[&str])] = &[
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
];

pub fn copy_to_clipboard(text: &str) -> Result<(), String> {
    for (program, args) in CANDIDATES {
        match pipe_into(program, args, text) {
            Ok(()) => return Ok(()),
            Err(err) => debug!(program, error = %err, "Clipboard helper failed"),
        }
    }
    let names: Vec<&str> = CANDIDATES.iter().map(|(program, _)| *program).collect();
    Err(format!(
        "No working clipboard command found (tried {})",
        names.join(", ")
    ))
}

fn pipe_into(program: &str, args: &[&str], input: &str) -> Result<(), String> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|err| format!("`{program}` not available: {err}"))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(input.as_bytes())
            .map_err(|err| format!("`{program}` rejected input: {err}"))?;
    }
    match child.wait() {
        Ok(status) if status.success() => Ok(()),
        Ok(status) => Err(format!("`{program}` exited with {status}")),
        Err(err) => Err(format!("`{program}` failed: {err}")),
    }
}
