use crate::orphans::{self, OrphanSet};
use crate::project_store::ProjectStore;
use crate::prompt::Confirm;
use crate::prune::{PruneOutcome, Pruner};
use crate::report::Report;
use anyhow::Result;
use std::io::Write;

const CONFIRM_QUESTION: &str = "Delete orphaned data?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    DryRun,
    Prune,
}

#[derive(Debug, Clone)]
pub struct SweepOptions {
    pub mode: Mode,
    pub backup_suffix: String,
    pub color: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SweepResult {
    Clean,
    Reported(OrphanSet),
    Aborted,
    Pruned(PruneOutcome),
}

/// Scan, report, and in prune mode ask before deleting.
pub fn run(
    store: &ProjectStore,
    opts: &SweepOptions,
    prompt: &mut dyn Confirm,
    out: &mut dyn Write,
) -> Result<SweepResult> {
    let entries = store.entries()?;
    let dirs = store.dirs()?;
    if entries.is_none() {
        tracing::info!("No usable project list; skipping directory check");
    }
    tracing::debug!(
        entries = entries.as_ref().map_or(0, Vec::len),
        dirs = dirs.len(),
        config = %store.config().path().display(),
        root = %store.root().display(),
        "scanned"
    );

    let set = orphans::detect(entries.as_deref(), &dirs, store.encoding());
    Report::new(&set).colored(opts.color).render(out)?;
    if set.is_empty() {
        return Ok(SweepResult::Clean);
    }

    if opts.mode == Mode::DryRun {
        writeln!(out, "\nRun with --prune to delete.")?;
        return Ok(SweepResult::Reported(set));
    }

    writeln!(out)?;
    out.flush()?;
    if !prompt.confirm(CONFIRM_QUESTION)? {
        writeln!(out, "Aborted.")?;
        return Ok(SweepResult::Aborted);
    }

    let outcome = Pruner::new(store.config(), &opts.backup_suffix).prune(&set)?;
    writeln!(
        out,
        "Removed {} directories and {} config entries.",
        outcome.dirs_removed, outcome.entries_removed
    )?;
    if outcome.dirs_already_gone > 0 {
        writeln!(out, "{} directories were already gone.", outcome.dirs_already_gone)?;
    }
    if let Some(backup) = &outcome.backup {
        writeln!(out, "Backup: {}", backup.display())?;
    }
    Ok(SweepResult::Pruned(outcome))
}
