//! Execution context, process execution and terminal output.
//!
//! Nothing outside this module touches the process-wide stdio handles or
//! spawns processes directly.  Everything goes through a [`Ctx`], which
//! carries:
//!
//! - the argv the program was started with,
//! - a snapshot of the ambient environment,
//! - the `stdout` / `stderr` writers used for our own output,
//! - the [`ProcessRunner`] that actually starts `borg`.
//!
//! Tests build a [`Ctx`] over in-memory buffers and a recording runner, so
//! the whole command flow can be exercised without spawning anything.
//!
//! `borg` itself always inherits the real stdin/stdout/stderr: its progress
//! and statistics go straight to the terminal, uncaptured.

use std::{
    collections::BTreeMap,
    ffi::OsString,
    io::Write,
    process::{Command, ExitStatus, Stdio},
};

use console::style;

use crate::{borg::Invocation, error::Error};

// ─── Context ──────────────────────────────────────────────────────────────────

/// Everything a command needs to print or run a subprocess.
///
/// There is no stdin handle: the front end never reads input, and `borg`
/// inherits stdin directly through [`SystemRunner`].
pub struct Ctx<'a> {
    pub argv: Vec<OsString>,
    /// Ambient process environment, captured once at startup.
    pub env: BTreeMap<OsString, OsString>,
    pub stdout: &'a mut dyn Write,
    pub stderr: &'a mut dyn Write,
    pub runner: &'a mut dyn ProcessRunner,
}

impl Ctx<'_> {
    /// Program name for usage output, taken from `argv[0]`.
    pub fn program_name(&self) -> String {
        self.argv
            .first()
            .and_then(|p| std::path::Path::new(p).file_name())
            .map_or_else(
                || env!("CARGO_PKG_NAME").to_string(),
                |n| n.to_string_lossy().into_owned(),
            )
    }
}

// ─── Process runners ──────────────────────────────────────────────────────────

/// Starts an [`Invocation`] and waits for it to finish.
pub trait ProcessRunner {
    /// Run `invocation` to completion.  A non-zero exit is an
    /// [`Error::ToolFailed`].
    fn run(&mut self, invocation: &Invocation) -> Result<(), Error>;
}

/// Spawns real processes with inherited stdio.
#[derive(Debug, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&mut self, invocation: &Invocation) -> Result<(), Error> {
        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .env_clear()
            .envs(&invocation.env)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|source| Error::Spawn {
                program: invocation.program.clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(Error::ToolFailed {
                command: invocation.command_line(),
                code: failure_code(status),
            })
        }
    }
}

/// `--dry-run`: every invocation is echoed by the caller and then skipped.
#[derive(Debug, Default)]
pub struct DryRunner;

impl ProcessRunner for DryRunner {
    fn run(&mut self, _invocation: &Invocation) -> Result<(), Error> {
        Ok(())
    }
}

/// Exit code to report for a child that did not succeed.
///
/// Signal deaths map to `128 + signal` like a shell would report them.
fn failure_code(status: ExitStatus) -> u8 {
    if let Some(code) = status.code() {
        return u8::try_from(code).ok().filter(|&c| c != 0).unwrap_or(1);
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return u8::try_from(128 + signal).unwrap_or(1);
        }
    }
    1
}

// ─── Output ───────────────────────────────────────────────────────────────────

/// Print `$ <command line>` to stderr before running it.
///
/// The environment is deliberately not shown: it usually carries
/// `BORG_PASSPHRASE`.
pub fn echo_command(ctx: &mut Ctx<'_>, invocation: &Invocation) {
    // Write errors on our own diagnostics are not worth aborting a backup.
    let _ = writeln!(
        ctx.stderr,
        "{} {}",
        style("$").dim().for_stderr(),
        style(invocation.command_line()).bold().for_stderr()
    );
    let _ = ctx.stdout.flush();
    let _ = ctx.stderr.flush();
}

/// Print a yellow `warning:` line to stderr.
pub fn warn(ctx: &mut Ctx<'_>, msg: &str) {
    let _ = writeln!(
        ctx.stderr,
        "{} {msg}",
        style("warning:").yellow().bold().for_stderr()
    );
}

/// Print the final error line for a failed run.
pub fn print_error(ctx: &mut Ctx<'_>, err: &anyhow::Error) {
    let _ = writeln!(
        ctx.stderr,
        "{} {err:#}",
        style("Error:").red().bold().for_stderr()
    );
}

// ─── Test support ─────────────────────────────────────────────────────────────

#[cfg(test)]
pub mod testing {
    //! In-memory [`Ctx`] plumbing shared by the unit tests.

    use super::*;

    /// Records every invocation instead of running it.
    ///
    /// `fail_at` makes the n-th call (0-based) fail with `fail_code`.
    #[derive(Debug, Default)]
    pub struct RecordingRunner {
        pub invocations: Vec<Invocation>,
        pub fail_at: Option<usize>,
        pub fail_code: u8,
    }

    impl ProcessRunner for RecordingRunner {
        fn run(&mut self, invocation: &Invocation) -> Result<(), Error> {
            let index = self.invocations.len();
            self.invocations.push(invocation.clone());
            if self.fail_at == Some(index) {
                return Err(Error::ToolFailed {
                    command: invocation.command_line(),
                    code: self.fail_code,
                });
            }
            Ok(())
        }
    }

    /// Owns the buffers a test [`Ctx`] borrows.
    #[derive(Debug, Default)]
    pub struct Harness {
        pub argv: Vec<OsString>,
        pub env: BTreeMap<OsString, OsString>,
        pub stdout: Vec<u8>,
        pub stderr: Vec<u8>,
        pub runner: RecordingRunner,
    }

    impl Harness {
        pub fn with_env(pairs: &[(&str, &str)]) -> Self {
            Self {
                env: pairs
                    .iter()
                    .map(|&(k, v)| (OsString::from(k), OsString::from(v)))
                    .collect(),
                ..Self::default()
            }
        }

        pub fn ctx(&mut self) -> Ctx<'_> {
            Ctx {
                argv: self.argv.clone(),
                env: self.env.clone(),
                stdout: &mut self.stdout,
                stderr: &mut self.stderr,
                runner: &mut self.runner,
            }
        }

        pub fn stdout_text(&self) -> String {
            String::from_utf8_lossy(&self.stdout).into_owned()
        }

        pub fn stderr_text(&self) -> String {
            String::from_utf8_lossy(&self.stderr).into_owned()
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
