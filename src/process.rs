//! Helpers for running the external tools we depend on (`tesseract`,
//! `pdftotext`, `pdfinfo`).

use std::process::Output;

use tokio::process::Command;

use crate::prelude::*;

/// Run a command to completion and capture its output.
///
/// A missing binary gets a friendlier message, because "No such file or
/// directory" is confusing when the user's input file exists.
#[instrument(level = "debug", skip_all, fields(command = command_name))]
pub async fn run_command(command_name: &str, cmd: &mut Command) -> Result<Output> {
    match cmd.output().await {
        Ok(output) => Ok(output),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Err(anyhow!(
            "cannot find `{}`; is it installed and on your PATH?",
            command_name
        )),
        Err(err) => Err(err).with_context(|| format!("cannot run {}", command_name)),
    }
}

/// Report any command failures, and include any error output.
///
/// Standard output and standard error are logged at `debug` level. A
/// successful command whose standard error matches `is_error_line` is also
/// treated as a failure.
pub fn check_for_command_failure(
    command_name: &str,
    output: &Output,
    is_error_line: Option<&dyn Fn(&str) -> bool>,
) -> Result<()> {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    trace!(
        command_name = command_name,
        output = %stdout,
        "Standard output from command"
    );
    if !stderr.trim().is_empty() {
        debug!(
            command_name = command_name,
            output = %stderr,
            "Standard error from command",
        );
    }

    if output.status.success() {
        if let Some(is_error_line) = is_error_line
            && stderr.lines().any(is_error_line)
        {
            return Err(anyhow!(
                "{} printed error output:\n{}",
                command_name,
                stderr.trim_end(),
            ));
        }
        Ok(())
    } else if let Some(exit_code) = output.status.code() {
        Err(anyhow!(
            "{} failed with exit code {} and error output:\n{}",
            command_name,
            exit_code,
            stderr.trim_end(),
        ))
    } else {
        Err(anyhow!(
            "{} failed with error output:\n{}",
            command_name,
            stderr.trim_end(),
        ))
    }
}
