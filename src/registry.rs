//! The set of named backup sources, validated and normalised.
//!
//! A [`Registry`] is built once from the `[backup.<name>]` tables of the
//! config and never changes afterwards.  Construction is all-or-nothing: the
//! first bad entry aborts it with a [`ConfigError`] naming the entry.
//!
//! # Entry shape
//!
//! | Key            | Type                       | Required | Default        |
//! |----------------|----------------------------|----------|----------------|
//! | `source_dir`   | string or list of strings  | yes      | none           |
//! | `exclude`      | string or list of strings  | no       | `[]`           |
//! | `archive_name` | string                     | no       | the table name |
//!
//! Every path gets `~` expanded.  The registry is keyed by archive name and
//! iterates in archive-name order.

use std::{collections::BTreeMap, path::PathBuf};

use crate::{config::Config, error::ConfigError, path::expand_home};

/// Longest accepted archive name.
pub const MAX_ARCHIVE_NAME_LEN: usize = 100;

// ─── Types ────────────────────────────────────────────────────────────────────

/// One named unit of backup: one `borg create` per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupSource {
    pub archive_name: String,
    /// Paths to archive, in declared order.  Duplicates are kept.
    pub sources: Vec<PathBuf>,
    /// Paths or patterns passed to `--exclude`, in declared order.
    pub excludes: Vec<PathBuf>,
}

/// A config value that may be written either as a single string or as a list
/// of strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSpec {
    Scalar(String),
    List(Vec<String>),
}

impl PathSpec {
    /// Interpret `value` as a `PathSpec`, or report what was found instead.
    ///
    /// `entry` and `field` only feed the error message.
    pub fn from_value(
        entry: &str,
        field: &'static str,
        value: &toml::Value,
    ) -> Result<Self, ConfigError> {
        let wrong_shape = |found: String| ConfigError::WrongShape {
            entry: entry.to_owned(),
            field,
            expected: "a string or a list of strings",
            found,
        };

        match value {
            toml::Value::String(s) => Ok(Self::Scalar(s.clone())),
            toml::Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    toml::Value::String(s) => Ok(s.clone()),
                    other => Err(wrong_shape(format!("a list containing {other}"))),
                })
                .collect::<Result<_, _>>()
                .map(Self::List),
            other => Err(wrong_shape(format!("{} {other}", other.type_str()))),
        }
    }

    /// Canonical ordered path list, with `~` expanded.
    pub fn into_paths(self) -> Vec<PathBuf> {
        match self {
            Self::Scalar(s) => vec![expand_home(&s)],
            Self::List(items) => items.iter().map(|s| expand_home(s)).collect(),
        }
    }
}

/// Validated backup sources keyed by archive name.
#[derive(Debug, Default)]
pub struct Registry {
    sources: BTreeMap<String, BackupSource>,
    /// `(archive_name, entry)` for every entry that replaced an earlier one
    /// with the same archive name.
    shadowed: Vec<(String, String)>,
}

// ─── Validation ───────────────────────────────────────────────────────────────

/// `true` when `name` is 1–100 characters of `[A-Za-z0-9_-]`.
pub fn is_valid_archive_name(name: &str) -> bool {
    (1..=MAX_ARCHIVE_NAME_LEN).contains(&name.len())
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

// ─── Construction ─────────────────────────────────────────────────────────────

impl Registry {
    /// Build the registry from the `[backup]` tables of `cfg`.
    ///
    /// Entries are processed in config key order.  When two entries resolve to
    /// the same archive name the later one wins; the replacement is recorded
    /// in [`Registry::shadowed`].
    pub fn from_config(cfg: &Config) -> Result<Self, ConfigError> {
        let mut registry = Self::default();
        for (entry, table) in &cfg.backup {
            let source = parse_entry(entry, table)?;
            let name = source.archive_name.clone();
            if registry.sources.insert(name.clone(), source).is_some() {
                registry.shadowed.push((name, entry.clone()));
            }
        }
        Ok(registry)
    }

    pub fn get(&self, archive_name: &str) -> Option<&BackupSource> {
        self.sources.get(archive_name)
    }

    /// Archive names in registry order.
    pub fn names(&self) -> Vec<String> {
        self.sources.keys().cloned().collect()
    }

    /// Sources in registry order.
    pub fn iter(&self) -> impl Iterator<Item = &BackupSource> {
        self.sources.values()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Archive names that more than one entry resolved to, paired with the
    /// entry that ended up winning.
    pub fn shadowed(&self) -> &[(String, String)] {
        &self.shadowed
    }
}

fn parse_entry(entry: &str, table: &toml::Table) -> Result<BackupSource, ConfigError> {
    // 1. archive name
    let archive_name = match table.get("archive_name") {
        None => entry.to_owned(),
        Some(toml::Value::String(s)) => s.clone(),
        Some(other) => {
            return Err(ConfigError::WrongShape {
                entry: entry.to_owned(),
                field: "archive_name",
                expected: "a string",
                found: format!("{} {other}", other.type_str()),
            });
        },
    };
    if !is_valid_archive_name(&archive_name) {
        return Err(ConfigError::InvalidArchiveName {
            entry: entry.to_owned(),
            name: archive_name,
        });
    }

    // 2 & 3. source_dir
    let source_dir = table
        .get("source_dir")
        .ok_or_else(|| ConfigError::MissingSourceDir {
            entry: entry.to_owned(),
            keys: table.keys().cloned().collect(),
        })?;
    let sources = PathSpec::from_value(entry, "source_dir", source_dir)?.into_paths();

    // 4. exclude
    let excludes = match table.get("exclude") {
        Some(value) => PathSpec::from_value(entry, "exclude", value)?.into_paths(),
        None => Vec::new(),
    };

    Ok(BackupSource {
        archive_name,
        sources,
        excludes,
    })
}

// ─── Tests ────────────────────────────────────────────────────────────────────
