use anyhow::{bail, Result};
use std::ffi::OsString;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;

/// One external invocation, built during planning and run only after the
/// batch has been confirmed. Arguments are kept as OS strings so file names
/// that are not valid UTF-8 reach the program unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedCommand {
    pub program: String,
    pub args: Vec<OsString>,
    pub working_dir: Option<PathBuf>,
}

impl PlannedCommand {
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
            working_dir: None,
        }
    }

    pub fn in_dir(mut self, dir: &Path) -> Self {
        self.working_dir = Some(dir.to_path_buf());
        self
    }
}

impl fmt::Display for PlannedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", shell_quote(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", shell_quote(&arg.to_string_lossy()))?;
        }
        Ok(())
    }
}

/// Quotes `arg` for a POSIX shell so printed commands can be pasted back.
fn shell_quote(arg: &str) -> String {
    let safe = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "@%+=:,./-_".contains(c));
    if safe {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r#"'"'"'"#))
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionSummary {
    pub succeeded: usize,
    pub failed: usize,
}

/// Runs `commands` in order.
///
/// A command that exits unsuccessfully (for example because ffmpeg refuses
/// to overwrite an existing output) is reported and skipped. A program that
/// cannot be started at all aborts the batch.
pub fn execute(commands: &[PlannedCommand]) -> Result<ExecutionSummary> {
    let mut summary = ExecutionSummary::default();

    for planned in commands {
        let mut command = Command::new(&planned.program);
        command.args(&planned.args);
        if let Some(dir) = &planned.working_dir {
            command.current_dir(dir);
        }

        tracing::debug!("Running: {planned}");
        let status = match command.status() {
            Ok(status) => status,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                bail!(
                    "{} not found. Please install it and ensure it's in your PATH.",
                    planned.program
                );
            }
            Err(e) => bail!("Failed to execute {}: {e}", planned.program),
        };

        if status.success() {
            summary.succeeded += 1;
        } else {
            summary.failed += 1;
            tracing::warn!("Command failed ({status}): {planned}");
            eprintln!("Warning: command exited with {status}, continuing");
        }
    }

    Ok(summary)
}
