//! Configuration types and loading logic.
//!
//! `Config` is the raw shape of `backup-config.toml`: a table of named backup
//! sources plus an environment overlay.  The per-source tables are kept as
//! plain TOML here; validation and normalisation happen when the
//! [`crate::registry::Registry`] is built from them.
//!
//! # File format
//!
//! ```toml
//! [env]
//! BORG_REPO       = "/mnt/backups/borg"
//! BORG_PASSPHRASE = "correct horse battery staple"
//!
//! [backup.docs]
//! source_dir = "~/docs"
//! exclude    = ["~/docs/tmp"]
//!
//! [backup.photos]
//! source_dir   = ["~/Pictures", "/srv/camera"]
//! archive_name = "pictures"
//! ```

use std::{collections::BTreeMap, path::Path};

use serde::Deserialize;

use crate::error::ConfigError;

// ─── Top-level ────────────────────────────────────────────────────────────────

/// Root configuration object, deserialised from `backup-config.toml`.
///
/// Both sections are optional.  Unknown top-level sections are ignored.
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// `[backup.<name>]` tables, keyed by entry name.
    #[serde(default)]
    pub backup: BTreeMap<String, toml::Table>,

    /// `[env]` overlay applied on top of the process environment for every
    /// `borg` invocation.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

// ─── Loader ───────────────────────────────────────────────────────────────────

/// Read and parse a `Config` from `path`.
///
/// A missing or unreadable file is an error: there is nothing sensible to back
/// up without one.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    parse_config(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse config text that has already been read.
pub fn parse_config(text: &str) -> Result<Config, toml::de::Error> {
    toml::from_str(text)
}

// ─── Starter config ───────────────────────────────────────────────────────────

/// Written by `init`.  Every value is a placeholder meant to be edited.
pub const STARTER_CONFIG: &str = r#"# borg-backup-rs configuration
#
# Every [backup.<name>] table becomes one `borg create` run.
# Run `borg-backup-rs backup --only <name>` to run a subset.

[env]
# Variables here are passed to every borg invocation and take precedence
# over the ones already set in your shell.
BORG_REPO = "/path/to/borg/repo"
# BORG_PASSPHRASE = ""

[backup.home]
source_dir = "~"
exclude    = ["~/.cache", "~/Downloads"]
# archive_name = "home"   # defaults to the table name
"#;

// ─── Tests ────────────────────────────────────────────────────────────────────
