use crate::orphans::OrphanSet;
use crate::project_store::config_file::{read_document, remove_projects, write_document};
use crate::project_store::ConfigFile;
use anyhow::{Context, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

pub const DEFAULT_BACKUP_SUFFIX: &str = ".backup";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneOutcome {
    pub dirs_removed: usize,
    pub dirs_already_gone: usize,
    pub entries_removed: usize,
    pub backup: Option<PathBuf>,
}

/// Deletes orphaned directories and config entries.
pub struct Pruner<'a> {
    config: &'a ConfigFile,
    backup_suffix: &'a str,
}

impl<'a> Pruner<'a> {
    pub fn new(config: &'a ConfigFile, backup_suffix: &'a str) -> Self {
        Self {
            config,
            backup_suffix,
        }
    }

    /// Backup, then directories, then the config rewrite. The rewrite reads
    /// from the backup so the result is always backup minus orphaned keys.
    pub fn prune(&self, set: &OrphanSet) -> Result<PruneOutcome> {
        let mut outcome = PruneOutcome::default();

        let backup = if self.config.exists() {
            let backup = self.config.backup_path(self.backup_suffix);
            fs::copy(self.config.path(), &backup).with_context(|| {
                format!(
                    "Failed to back up {} to {}",
                    self.config.path().display(),
                    backup.display()
                )
            })?;
            tracing::info!("Backed up config to {}", backup.display());
            Some(backup)
        } else {
            None
        };

        for dir in &set.orphaned_dirs {
            match fs::remove_dir_all(&dir.path) {
                Ok(()) => {
                    tracing::info!("Removed {}", dir.path.display());
                    outcome.dirs_removed += 1;
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    tracing::debug!("{} already gone", dir.path.display());
                    outcome.dirs_already_gone += 1;
                }
                Err(e) => {
                    return Err(e)
                        .with_context(|| format!("Failed to remove {}", dir.path.display()))
                }
            }
        }

        if let Some(backup) = &backup {
            let keys = set.orphaned_keys();
            if !keys.is_empty() {
                let mut doc = read_document(backup)?;
                outcome.entries_removed = remove_projects(&mut doc, &keys);
                write_document(self.config.path(), &doc)?;
                tracing::info!(
                    "Removed {} entries from {}",
                    outcome.entries_removed,
                    self.config.path().display()
                );
            }
        }

        outcome.backup = backup;
        Ok(outcome)
    }
}
