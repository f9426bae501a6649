//! `borg-backup-rs backup`: one `borg create` per configured source.
//!
//! Sources run in registry order, one at a time, and the run stops at the
//! first failure.  Archives that were created before the failure stay in the
//! repository; there is no rollback.

use anyhow::Result;
use console::style;

use crate::{
    borg::Borg,
    ui::{Ctx, warn},
};

pub fn run(borg: &Borg, ctx: &mut Ctx<'_>, only: &[String], extra: &[String]) -> Result<()> {
    borg.select(only)?;
    if borg.registry().is_empty() {
        warn(ctx, "no [backup.<name>] entries in the config; nothing to do");
        return Ok(());
    }

    let ran = borg.backup(ctx, only, extra)?;

    let _ = writeln!(
        ctx.stderr,
        "{} {}",
        style("✓").cyan().bold().for_stderr(),
        style(format!("{ran} of {} backup source(s) done.", borg.registry().len()))
            .cyan()
            .for_stderr()
    );
    Ok(())
}
