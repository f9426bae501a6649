//! `borg-backup-rs borg <args…>`: run any borg command with the configured
//! environment.
//!
//! This is the escape hatch for everything the config does not model:
//! `list`, `check`, `prune`, `extract`, `mount`…  The tokens are passed to
//! `borg` exactly as given; nothing is validated or re-split.

use anyhow::Result;

use crate::{borg::Borg, ui::Ctx};

pub fn run(borg: &Borg, ctx: &mut Ctx<'_>, tokens: &[String]) -> Result<()> {
    borg.passthrough(ctx, tokens)?;
    Ok(())
}
