//! Command argument construction helpers.
//!
//! Invocation arguments come from several places at once: fixed flags written
//! as shell-style strings, per-source `--exclude` pairs, user-supplied extra
//! arguments and lists of paths.  [`command`] flattens all of them into the
//! literal argv handed to the child process.
//!
//! Nothing in here executes anything; process execution lives in
//! [`crate::ui`].
//!
//! # Fragments
//!
//! | Variant              | Treatment                                     |
//! |----------------------|-----------------------------------------------|
//! | [`Fragment::Tokens`] | used verbatim, one token per element          |
//! | [`Fragment::Shell`]  | split with shell word-splitting rules         |
//! | [`Fragment::Paths`]  | each path converted to one string token       |
//!
//! Paths are never word-split, so `/home/alice/My Documents` stays a single
//! argument.

use std::path::PathBuf;

use crate::error::Error;

// ─── Fragments ────────────────────────────────────────────────────────────────

/// One piece of an argument vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// Already-split literal tokens.
    Tokens(Vec<String>),
    /// A single string that still needs shell word-splitting, e.g.
    /// `"--stats --verbose"`.
    Shell(String),
    /// Filesystem paths, one token each.
    Paths(Vec<PathBuf>),
}

impl From<&str> for Fragment {
    fn from(s: &str) -> Self {
        Self::Shell(s.to_owned())
    }
}

impl From<String> for Fragment {
    fn from(s: String) -> Self {
        Self::Shell(s)
    }
}

impl From<Vec<String>> for Fragment {
    fn from(tokens: Vec<String>) -> Self {
        Self::Tokens(tokens)
    }
}

impl From<&[String]> for Fragment {
    fn from(tokens: &[String]) -> Self {
        Self::Tokens(tokens.to_vec())
    }
}

impl<const N: usize> From<[&str; N]> for Fragment {
    fn from(tokens: [&str; N]) -> Self {
        Self::Tokens(tokens.iter().map(|&t| t.to_owned()).collect())
    }
}

impl From<Vec<PathBuf>> for Fragment {
    fn from(paths: Vec<PathBuf>) -> Self {
        Self::Paths(paths)
    }
}

impl From<&[PathBuf]> for Fragment {
    fn from(paths: &[PathBuf]) -> Self {
        Self::Paths(paths.to_vec())
    }
}

// ─── Flattening ───────────────────────────────────────────────────────────────

/// Flatten `fragments` into one ordered token list.
///
/// Fragment order is preserved, and so is the order of tokens inside each
/// fragment.  Empty fragments contribute nothing.  A [`Fragment::Shell`] with
/// unbalanced quotes is an error rather than being passed through half-split.
pub fn command<I, F>(fragments: I) -> Result<Vec<String>, Error>
where
    I: IntoIterator<Item = F>,
    F: Into<Fragment>,
{
    let mut tokens = Vec::new();
    for fragment in fragments {
        match fragment.into() {
            Fragment::Tokens(t) => tokens.extend(t),
            Fragment::Shell(s) => {
                let words = shlex::split(&s).ok_or(Error::Tokenize { fragment: s })?;
                tokens.extend(words);
            },
            Fragment::Paths(paths) => {
                tokens.extend(
                    paths
                        .iter()
                        .map(|p| p.to_string_lossy().into_owned()),
                );
            },
        }
    }
    Ok(tokens)
}

/// Render `program` + `args` as a copy-pasteable shell command line.
///
/// Used only for the diagnostic echo.  Falls back to a plain space join if a
/// token cannot be quoted (it contains a NUL byte).
pub fn display_command(program: &str, args: &[String]) -> String {
    let words = std::iter::once(program).chain(args.iter().map(String::as_str));
    shlex::try_join(words.clone()).unwrap_or_else(|_| words.collect::<Vec<_>>().join(" "))
}

// ─── Tests ────────────────────────────────────────────────────────────────────
