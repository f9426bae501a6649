//! Typed failures and their exit codes.
//!
//! Everything that can stop a run before or during a `borg` invocation is an
//! [`Error`].  Command handlers return `anyhow::Result` and `main` downcasts
//! back to [`Error`] to pick the process exit code.

use std::{io, path::PathBuf};

use thiserror::Error;

// ─── Exit codes ───────────────────────────────────────────────────────────────
// Values follow sysexits(3).

/// The command was used incorrectly (unknown `--only` name, bad tokens).
pub const EX_USAGE: u8 = 64;
/// `borg` could not be started at all.
pub const EX_UNAVAILABLE: u8 = 69;
/// Something was wrong with the configuration file.
pub const EX_CONFIG: u8 = 78;

// ─── Configuration errors ─────────────────────────────────────────────────────

/// Problems found while reading the config file or building the registry.
///
/// All of these are fatal and are raised before any process is spawned.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot parse config file {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("backup.{entry} must contain 'source_dir', but got keys {keys:?}")]
    MissingSourceDir { entry: String, keys: Vec<String> },

    #[error("backup.{entry}.{field} must be {expected}, but got {found}")]
    WrongShape {
        entry: String,
        field: &'static str,
        expected: &'static str,
        found: String,
    },

    #[error(
        "backup.{entry}: archive name must be 1-100 characters of [A-Za-z0-9_-], but got: {name:?}"
    )]
    InvalidArchiveName { entry: String, name: String },
}

// ─── Run errors ───────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("unknown archive name {name:?}; valid names are: {}", valid.join(", "))]
    UnknownArchive { name: String, valid: Vec<String> },

    #[error("cannot split {fragment:?} into shell words (unbalanced quotes?)")]
    Tokenize { fragment: String },

    #[error("failed to spawn {program}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{command} exited with status {code}")]
    ToolFailed { command: String, code: u8 },
}

impl Error {
    /// Process exit code to report for this failure.
    ///
    /// A failing `borg` run hands its own exit code through unchanged.
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => EX_CONFIG,
            Self::UnknownArchive { .. } | Self::Tokenize { .. } => EX_USAGE,
            Self::Spawn { .. } => EX_UNAVAILABLE,
            Self::ToolFailed { code, .. } => *code,
        }
    }
}

/// Exit code for any error that reached `main`.
///
/// Errors that are not one of ours (I/O on our own output, `init` failures)
/// exit with 1.
pub fn exit_code_for(err: &anyhow::Error) -> u8 {
    if let Some(err) = err.downcast_ref::<Error>() {
        err.exit_code()
    } else if err.downcast_ref::<ConfigError>().is_some() {
        EX_CONFIG
    } else {
        1
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_archive_lists_valid_names() {
        let err = Error::UnknownArchive {
            name: "nope".into(),
            valid: vec!["docs".into(), "photos".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("\"nope\""));
        assert!(msg.contains("docs, photos"));
        assert_eq!(err.exit_code(), EX_USAGE);
    }

    #[test]
    fn tool_failure_propagates_exit_code() {
        let err = Error::ToolFailed {
            command: "borg create".into(),
            code: 2,
        };
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn config_errors_use_ex_config() {
        let err: Error = ConfigError::MissingSourceDir {
            entry: "docs".into(),
            keys: vec!["exclude".into()],
        }
        .into();
        assert_eq!(err.exit_code(), EX_CONFIG);
        assert!(err.to_string().contains("backup.docs must contain 'source_dir'"));
    }

    #[test]
    fn exit_code_survives_anyhow_context() {
        use anyhow::Context;

        let err = Err::<(), _>(Error::ToolFailed {
            command: "borg create".into(),
            code: 7,
        })
        .context("backing up docs")
        .unwrap_err();
        assert_eq!(exit_code_for(&err), 7);
    }

    #[test]
    fn foreign_errors_exit_with_one() {
        assert_eq!(exit_code_for(&anyhow::anyhow!("something else")), 1);
    }
}
