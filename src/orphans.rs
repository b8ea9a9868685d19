//! Reconcile config entries against data directories.

use crate::project_store::{EncodingMode, ProjectDir, ProjectEntry};
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrphanSet {
    /// Config entries whose path no longer exists, in document order.
    pub orphaned_paths: Vec<ProjectEntry>,
    /// Data directories no live entry encodes to, in listing order.
    pub orphaned_dirs: Vec<ProjectDir>,
}

impl OrphanSet {
    pub fn is_empty(&self) -> bool {
        self.orphaned_paths.is_empty() && self.orphaned_dirs.is_empty()
    }

    pub fn orphaned_keys(&self) -> Vec<&str> {
        self.orphaned_paths.iter().map(|e| e.path.as_str()).collect()
    }
}

/// Detect orphans against the real filesystem.
pub fn detect(
    entries: Option<&[ProjectEntry]>,
    dirs: &[ProjectDir],
    encoding: EncodingMode,
) -> OrphanSet {
    detect_with(entries, dirs, encoding, |p| p.exists())
}

/// Same as [`detect`] with a caller-supplied existence check.
///
/// `None` means there is no config to judge directories against, so nothing
/// is reported. An empty entry list is still a baseline: every directory is
/// orphaned. When several keys encode to the same name the directory is kept
/// if any of them is live.
pub fn detect_with<F>(
    entries: Option<&[ProjectEntry]>,
    dirs: &[ProjectDir],
    encoding: EncodingMode,
    exists: F,
) -> OrphanSet
where
    F: Fn(&Path) -> bool,
{
    let Some(entries) = entries else {
        return OrphanSet::default();
    };

    let mut live = HashSet::new();
    let mut orphaned_paths = Vec::new();
    for entry in entries {
        if exists(Path::new(&entry.path)) {
            live.insert(encoding.encode(&entry.path));
        } else {
            tracing::debug!(path = %entry.path, "config entry points at a missing path");
            orphaned_paths.push(entry.clone());
        }
    }

    let orphaned_dirs = dirs
        .iter()
        .filter(|d| !live.contains(&d.name))
        .cloned()
        .collect();

    OrphanSet {
        orphaned_paths,
        orphaned_dirs,
    }
}
