use anyhow::{Context, Result};
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

/// An immediate subdirectory of the data root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDir {
    pub name: String,
    pub path: PathBuf,
}

/// List the subdirectories of `root`, sorted by name. A missing root is
/// treated as empty; plain files and symlinks are skipped.
pub fn list_project_dirs(root: &Path) -> Result<Vec<ProjectDir>> {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!("Data root {} does not exist", root.display());
            return Ok(Vec::new());
        }
        Err(e) => return Err(e).with_context(|| format!("Failed to list {}", root.display())),
    };

    let candidates = entries.map(|entry| {
        entry.map(|e| {
            let is_dir = e.file_type().map(|t| t.is_dir()).unwrap_or(false);
            (e.file_name().to_string_lossy().into_owned(), e.path(), is_dir)
        })
    });
    Ok(collect_dirs(root, candidates))
}

/// Keep directory candidates, sorted by name. Entries that fail to read are
/// logged and skipped.
fn collect_dirs<I>(root: &Path, candidates: I) -> Vec<ProjectDir>
where
    I: IntoIterator<Item = io::Result<(String, PathBuf, bool)>>,
{
    let mut dirs = Vec::new();
    for candidate in candidates {
        let (name, path, is_dir) = match candidate {
            Ok(v) => v,
            Err(e) => {
                tracing::debug!("Skipping unreadable entry in {}: {}", root.display(), e);
                continue;
            }
        };
        if is_dir {
            dirs.push(ProjectDir { name, path });
        }
    }
    dirs.sort_by(|a, b| a.name.cmp(&b.name));
    dirs
}
