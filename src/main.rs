//! `borg-backup-rs`: a borg front end driven by `backup-config.toml`.
//!
//! # Overview
//!
//! This binary is a thin orchestration layer around
//! [`borg`](https://www.borgbackup.org).  The config declares named backup
//! sources; each one becomes a `borg create` invocation.  Anything the config
//! does not model can still be run through `borg-backup-rs borg …` with the
//! same environment.
//!
//! # Usage
//!
//! ```text
//! borg-backup-rs help                       # usage
//! borg-backup-rs init                       # scaffold backup-config.toml
//! borg-backup-rs backup                     # borg create for every source
//! borg-backup-rs backup --only docs         # just one source
//! borg-backup-rs backup -- --comment nightly  # extra borg create args
//! borg-backup-rs borg list                  # passthrough
//! borg-backup-rs -c ~/other.toml --dry-run backup
//! ```
//!
//! # Module layout
//!
//! | Module                     | Responsibility                                 |
//! |----------------------------|------------------------------------------------|
//! | [`cli`]                    | Argument types parsed by clap                  |
//! | [`config`]                 | `Config` struct + TOML loader                  |
//! | [`registry`]               | Validated, normalised backup sources           |
//! | [`runner`]                 | Flattening argument fragments into argv        |
//! | [`borg`]                   | Compiling and running `borg` invocations       |
//! | [`ui`]                     | Execution context, process runners, output     |
//! | [`commands`]               | Subcommand dispatch and handlers               |
//! | [`error`]                  | Error types and exit codes                     |
//! | [`path`]                   | `~` expansion                                  |

mod borg;
mod cli;
mod commands;
mod config;
mod error;
mod path;
mod registry;
mod runner;
mod ui;

use std::{ffi::OsString, io, process::ExitCode};

use clap::Parser;
use cli::Cli;
use ui::{Ctx, DryRunner, ProcessRunner, SystemRunner};

fn main() -> ExitCode {
    let argv: Vec<OsString> = std::env::args_os().collect();
    let cli = Cli::parse_from(&argv);

    let mut stdout = io::stdout().lock();
    let mut stderr = io::stderr().lock();
    let mut system = SystemRunner;
    let mut dry = DryRunner;
    let runner: &mut dyn ProcessRunner = if cli.dry_run { &mut dry } else { &mut system };

    let mut ctx = Ctx {
        argv,
        env: std::env::vars_os().collect(),
        stdout: &mut stdout,
        stderr: &mut stderr,
        runner,
    };

    match commands::dispatch(&cli, &mut ctx) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            ui::print_error(&mut ctx, &err);
            ExitCode::from(error::exit_code_for(&err))
        },
    }
}
