//! Command-line interface definition.
//!
//! All argument parsing lives here so the rest of the codebase can stay
//! agnostic to `clap`.  The `Cli` struct is parsed once in `main` and then
//! passed (by reference) into [`crate::commands::dispatch`].

use std::path::PathBuf;

use clap::Parser;

/// Top-level CLI arguments.
#[derive(Parser, Debug)]
#[command(
    name    = "borg-backup-rs",
    about   = "A borg backup front end driven by backup-config.toml",
    version,
    // `help` is a real subcommand below.
    disable_help_subcommand = true,
    help_template = "\
{before-help}{name} {version}
{about}

{usage-heading} {usage}

{all-args}{after-help}"
)]
pub struct Cli {
    /// Path to the configuration file.
    ///
    /// A leading `~` is expanded to your home directory.
    #[arg(short, long, default_value = "backup-config.toml")]
    pub config: PathBuf,

    /// Print every borg command line without running it.
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Print the parsed backup sources and exit without running anything.
    ///
    /// Values from `[env]` are redacted; only the variable names are shown.
    #[arg(long)]
    pub print_config: bool,

    /// Subcommand to run.  Omit to show this help.
    #[command(subcommand)]
    pub command: Option<Subcommand>,
}

#[derive(clap::Subcommand, Debug, PartialEq, Eq)]
pub enum Subcommand {
    /// Show this help message and exit.
    Help,

    /// Run an arbitrary borg command with the configured environment.
    ///
    /// Everything after `borg` is passed through unchanged, e.g.
    /// `borg list ::` or `borg -- --version`.
    Borg {
        /// Borg command to execute.
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "ARGS")]
        command: Vec<String>,
    },

    /// Create one archive per configured backup source.
    ///
    /// Sources run one after the other and the run stops at the first
    /// failure.  Extra arguments are appended to every `borg create` after
    /// the built-in `--stats --verbose --progress`; put them after `--` if
    /// they start with a dash.
    Backup {
        /// Only back up these archive names.  Repeat the flag or separate
        /// names with commas.
        #[arg(long, value_name = "NAME", value_delimiter = ',')]
        only: Vec<String>,

        /// Extra arguments for `borg create`.
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "BORG_ARGS")]
        extra: Vec<String>,
    },

    /// Write a starter config file.
    ///
    /// Refuses to overwrite an existing file.
    Init,
}
