//! Home-directory expansion for paths read from the command line and config.

use std::path::{Path, PathBuf};

/// Expand a leading `~` or `~/` to the current user's home directory.
///
/// Anything else (`~alice/…`, relative paths, absolute paths) is returned
/// untouched.  If the home directory cannot be determined the input is
/// returned as-is and `borg` gets to complain about it.
pub fn expand_home(input: &str) -> PathBuf {
    let rest = match input.strip_prefix('~') {
        Some("") => "",
        Some(rest) if rest.starts_with('/') => rest.trim_start_matches('/'),
        _ => return PathBuf::from(input),
    };

    match dirs::home_dir() {
        Some(home) if rest.is_empty() => home,
        Some(home) => home.join(rest),
        None => PathBuf::from(input),
    }
}

/// [`expand_home`] for a path that already went through `clap`.
pub fn expand_home_path(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(s) => expand_home(s),
        None => path.to_path_buf(),
    }
}
