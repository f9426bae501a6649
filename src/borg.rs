//! Turning backup sources (or raw tokens) into `borg` invocations.
//!
//! [`Borg`] owns the [`Registry`] and the `[env]` overlay.  It has no other
//! state: every call compiles fresh argument vectors and a fresh merged
//! environment, then hands them to the [`ProcessRunner`] in the [`Ctx`].
//!
//! # `borg create` argument layout
//!
//! ```text
//! borg create
//!      --exclude <path> …            one pair per exclude, declared order
//!      --stats --verbose --progress  fixed reporting flags
//!      <extra> …                     user-supplied, after the fixed flags
//!      --                            end of options
//!      ::<archive_name>-{now}        borg expands {now} itself
//!      <source> …                    declared order
//! ```
//!
//! The archive target uses the repository from `BORG_REPO`, normally set in
//! `[env]`.
//!
//! Runs are strictly sequential.  Two `borg create` processes writing to the
//! same repository at once would fight over the repository lock.

use std::{collections::BTreeMap, ffi::OsString};

use crate::{
    config::Config,
    error::{ConfigError, Error},
    registry::{BackupSource, Registry},
    runner::{Fragment, command, display_command},
    ui::{Ctx, echo_command},
};

/// Executable name, looked up on `PATH`.
pub const BORG: &str = "borg";
/// The `borg` subcommand that creates an archive.
pub const CREATE: &str = "create";
/// Reporting flags passed to every `borg create`.
pub const REPORTING_FLAGS: &str = "--stats --verbose --progress";
/// Separates options from the archive target and paths.
pub const END_OF_OPTIONS: &str = "--";
/// Prefix meaning "the repository from `BORG_REPO`".
pub const REPOSITORY_MARKER: &str = "::";
/// Placeholder `borg` replaces with the current timestamp.
pub const NOW_PLACEHOLDER: &str = "{now}";

// ─── Invocation ───────────────────────────────────────────────────────────────

/// One fully-resolved child process: program, argv and complete environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub env: BTreeMap<OsString, OsString>,
}

impl Invocation {
    /// Shell-quoted command line, for display only.
    pub fn command_line(&self) -> String {
        display_command(&self.program, &self.args)
    }
}

// ─── Orchestrator ─────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct Borg {
    registry: Registry,
    env: BTreeMap<String, String>,
}

impl Borg {
    pub fn new(registry: Registry, env: BTreeMap<String, String>) -> Self {
        Self { registry, env }
    }

    /// Build the registry from `cfg` and take over its `[env]` table.
    pub fn from_config(cfg: &Config) -> Result<Self, ConfigError> {
        Ok(Self::new(Registry::from_config(cfg)?, cfg.env.clone()))
    }

    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The declared `[env]` overlay.
    pub const fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    /// `ambient` with the declared overlay applied on top.  Declared values
    /// win on a name collision.
    pub fn merged_env(
        &self,
        ambient: &BTreeMap<OsString, OsString>,
    ) -> BTreeMap<OsString, OsString> {
        let mut env = ambient.clone();
        env.extend(
            self.env
                .iter()
                .map(|(k, v)| (OsString::from(k), OsString::from(v))),
        );
        env
    }

    /// Wrap already-compiled `args` into an [`Invocation`] of `borg`.
    pub fn invocation(&self, ctx: &Ctx<'_>, args: Vec<String>) -> Invocation {
        Invocation {
            program: BORG.to_string(),
            args,
            env: self.merged_env(&ctx.env),
        }
    }

    // ── passthrough ───────────────────────────────────────────────────────────

    /// Run `borg <tokens…>` exactly as given.
    pub fn passthrough(&self, ctx: &mut Ctx<'_>, tokens: &[String]) -> Result<(), Error> {
        let args = command([Fragment::from(tokens)])?;
        let invocation = self.invocation(ctx, args);
        run_borg(ctx, &invocation)
    }

    // ── selective backup ──────────────────────────────────────────────────────

    /// Resolve an `--only` filter against the registry.
    ///
    /// An empty filter selects every source.  Otherwise every name must be
    /// registered; the result is in registry order, not filter order, and a
    /// name given twice is still selected once.
    pub fn select(&self, only: &[String]) -> Result<Vec<&BackupSource>, Error> {
        if let Some(unknown) = only.iter().find(|name| self.registry.get(name).is_none()) {
            return Err(Error::UnknownArchive {
                name: unknown.clone(),
                valid: self.registry.names(),
            });
        }

        Ok(self
            .registry
            .iter()
            .filter(|source| only.is_empty() || only.contains(&source.archive_name))
            .collect())
    }

    /// Compile every selected source up front, so that nothing runs when any
    /// of them is unusable.
    pub fn compile_backup(
        &self,
        ctx: &Ctx<'_>,
        only: &[String],
        extra: &[String],
    ) -> Result<Vec<Invocation>, Error> {
        self.select(only)?
            .into_iter()
            .map(|source| create_args(source, extra).map(|args| self.invocation(ctx, args)))
            .collect()
    }

    /// Run one `borg create` per selected source, one after the other.
    ///
    /// Stops at the first failure.  Archives created before it are kept.
    /// Returns the number of invocations that ran.
    pub fn backup(
        &self,
        ctx: &mut Ctx<'_>,
        only: &[String],
        extra: &[String],
    ) -> Result<usize, Error> {
        let invocations = self.compile_backup(ctx, only, extra)?;
        for invocation in &invocations {
            run_borg(ctx, invocation)?;
        }
        Ok(invocations.len())
    }
}

// ─── Argument builders ────────────────────────────────────────────────────────

/// `::<archive_name>-{now}`
pub fn archive_target(archive_name: &str) -> String {
    format!("{REPOSITORY_MARKER}{archive_name}-{NOW_PLACEHOLDER}")
}

/// Arguments for `borg create` of one source.
pub fn create_args(source: &BackupSource, extra: &[String]) -> Result<Vec<String>, Error> {
    let mut fragments = vec![Fragment::from([CREATE])];
    for exclude in &source.excludes {
        fragments.push(Fragment::from(["--exclude"]));
        fragments.push(Fragment::Paths(vec![exclude.clone()]));
    }
    fragments.extend([
        Fragment::from(REPORTING_FLAGS),
        Fragment::from(extra),
        Fragment::from([END_OF_OPTIONS]),
        Fragment::Tokens(vec![archive_target(&source.archive_name)]),
        Fragment::from(source.sources.as_slice()),
    ]);
    command(fragments)
}

/// Echo `invocation` and run it through the context's runner.
fn run_borg(ctx: &mut Ctx<'_>, invocation: &Invocation) -> Result<(), Error> {
    echo_command(ctx, invocation);
    ctx.runner.run(invocation)
}

// ─── Tests ────────────────────────────────────────────────────────────────────
