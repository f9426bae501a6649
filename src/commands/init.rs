//! `borg-backup-rs init`: write a starter config file.

use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::{config::STARTER_CONFIG, ui::Ctx};

/// Write [`STARTER_CONFIG`] to `path`.
///
/// Refuses to touch an existing file.
pub fn run(path: &Path, ctx: &mut Ctx<'_>) -> Result<()> {
    if path.exists() {
        bail!("{} already exists, refusing to overwrite it", path.display());
    }

    std::fs::write(path, STARTER_CONFIG).with_context(|| format!("writing {}", path.display()))?;

    writeln!(
        ctx.stdout,
        "wrote {}; edit BORG_REPO and the [backup.*] tables before running `backup`",
        path.display()
    )
    .context("writing to stdout")?;
    Ok(())
}
