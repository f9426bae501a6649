//! Subcommand handlers.
//!
//! Each file in this module corresponds to one user-facing command:
//!
//! | File             | Invocation                          | Description                  |
//! |------------------|-------------------------------------|------------------------------|
//! | `backup.rs`      | `borg-backup-rs backup [--only …]`  | One `borg create` per source |
//! | `passthrough.rs` | `borg-backup-rs borg <args…>`       | Raw `borg` with our env      |
//! | `init.rs`        | `borg-backup-rs init`               | Scaffold a config file       |
//!
//! `help` and `--print-config` are small enough to live here.
//!
//! [`dispatch`] is the only place that maps a parsed [`Subcommand`] to its
//! handler.

pub mod backup;
pub mod init;
pub mod passthrough;

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::CommandFactory;

use crate::{
    borg::Borg,
    cli::{Cli, Subcommand},
    config::load_config,
    error::Error,
    path::expand_home_path,
    ui::{Ctx, warn},
};

/// Shown instead of `[env]` values.
const REDACTED: &str = "<redacted>";

/// Run the command selected by `cli`.
pub fn dispatch(cli: &Cli, ctx: &mut Ctx<'_>) -> Result<()> {
    let config_path = config_path(cli);

    if cli.print_config {
        let borg = load_borg(&config_path, ctx)?;
        return print_config(&borg, ctx);
    }

    match &cli.command {
        None | Some(Subcommand::Help) => help(ctx),
        Some(Subcommand::Init) => init::run(&config_path, ctx),
        Some(Subcommand::Borg { command }) => {
            let borg = load_borg(&config_path, ctx)?;
            passthrough::run(&borg, ctx, command)
        },
        Some(Subcommand::Backup { only, extra }) => {
            let borg = load_borg(&config_path, ctx)?;
            backup::run(&borg, ctx, only, extra)
        },
    }
}

/// `--config` with `~` expanded.
pub fn config_path(cli: &Cli) -> PathBuf {
    expand_home_path(&cli.config)
}

/// Read the config and build the registry, warning about shadowed archive
/// names.
pub fn load_borg(path: &Path, ctx: &mut Ctx<'_>) -> Result<Borg> {
    let cfg = load_config(path).map_err(Error::from)?;
    let borg = Borg::from_config(&cfg).map_err(Error::from)?;

    for (archive_name, entry) in borg.registry().shadowed() {
        warn(
            ctx,
            &format!(
                "archive name {archive_name:?} is declared by more than one [backup] entry; \
                 using backup.{entry}"
            ),
        );
    }

    Ok(borg)
}

/// `help`: usage on stdout.
fn help(ctx: &mut Ctx<'_>) -> Result<()> {
    let help = Cli::command().bin_name(ctx.program_name()).render_help();
    write!(ctx.stdout, "{help}").context("writing help")?;
    Ok(())
}

/// `--print-config`: the normalised sources and the `[env]` names.
fn print_config(borg: &Borg, ctx: &mut Ctx<'_>) -> Result<()> {
    let sources: Vec<_> = borg.registry().iter().collect();
    let env: BTreeMap<&str, &str> = borg
        .env()
        .keys()
        .map(|k| (k.as_str(), REDACTED))
        .collect();

    writeln!(ctx.stdout, "sources: {sources:#?}").context("writing config")?;
    writeln!(ctx.stdout, "env: {env:#?}").context("writing config")?;
    Ok(())
}

// ─── Tests ────────────────────────────────────────────────────────────────────
