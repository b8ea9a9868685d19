use crate::orphans::OrphanSet;
use std::collections::HashSet;
use std::fs::Metadata;
use std::io::{self, Write};
use std::path::Path;

pub const NOTHING_TO_CLEAN: &str = "No orphaned data found.";

const YELLOW: &str = "\x1b[33m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// `~{n}B` below 1 KiB, `~{n/1024}K` above. Truncates.
pub fn format_bytes(n: u64) -> String {
    if n < 1024 {
        format!("~{n}B")
    } else {
        format!("~{}K", n / 1024)
    }
}

/// `~{kb}K`, `~{kb/1024}M` or `~{kb/1048576}G`. Truncates.
pub fn format_kb(kb: u64) -> String {
    if kb < 1024 {
        format!("~{kb}K")
    } else if kb < 1_048_576 {
        format!("~{}M", kb / 1024)
    } else {
        format!("~{}G", kb / 1_048_576)
    }
}

/// Allocated size of everything under `path` in KiB, rounded up.
///
/// Symlinks are counted but not followed, and a hard-linked file is counted
/// once per walk. Entries that vanish or cannot be read mid-walk are skipped.
pub fn disk_usage_kb(path: &Path) -> u64 {
    let mut bytes = 0u64;
    let mut seen_links = HashSet::new();
    let walker = ignore::WalkBuilder::new(path)
        .standard_filters(false)
        .follow_links(false)
        .build();
    for entry in walker {
        let entry = match entry {
            Ok(v) => v,
            Err(_) => continue,
        };
        if let Ok(meta) = entry.metadata() {
            if is_repeat_link(&meta, &mut seen_links) {
                continue;
            }
            bytes += allocated_bytes(&meta);
        }
    }
    bytes.div_ceil(1024)
}

#[cfg(unix)]
fn allocated_bytes(meta: &Metadata) -> u64 {
    use std::os::unix::fs::MetadataExt;
    meta.blocks() * 512
}

#[cfg(not(unix))]
fn allocated_bytes(meta: &Metadata) -> u64 {
    meta.len()
}

/// True for the second and later sightings of the same multiply-linked inode.
#[cfg(unix)]
fn is_repeat_link(meta: &Metadata, seen: &mut HashSet<(u64, u64)>) -> bool {
    use std::os::unix::fs::MetadataExt;
    meta.nlink() > 1 && !meta.is_dir() && !seen.insert((meta.dev(), meta.ino()))
}

#[cfg(not(unix))]
fn is_repeat_link(_meta: &Metadata, _seen: &mut HashSet<(u64, u64)>) -> bool {
    false
}

/// Orphans plus the sizes shown next to them.
#[derive(Debug, Clone)]
pub struct Report<'a> {
    set: &'a OrphanSet,
    dir_kb: Vec<u64>,
    color: bool,
}

impl<'a> Report<'a> {
    /// Measures every orphaned directory on disk.
    pub fn new(set: &'a OrphanSet) -> Self {
        let dir_kb = set
            .orphaned_dirs
            .iter()
            .map(|d| disk_usage_kb(&d.path))
            .collect();
        Self::with_dir_sizes(set, dir_kb)
    }

    pub fn with_dir_sizes(set: &'a OrphanSet, dir_kb: Vec<u64>) -> Self {
        Self {
            set,
            dir_kb,
            color: false,
        }
    }

    pub fn colored(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn config_bytes(&self) -> u64 {
        self.set.orphaned_paths.iter().map(|e| e.value_size).sum()
    }

    pub fn disk_kb(&self) -> u64 {
        self.dir_kb.iter().sum()
    }

    pub fn render(&self, out: &mut dyn Write) -> io::Result<()> {
        if self.set.is_empty() {
            return writeln!(out, "{NOTHING_TO_CLEAN}");
        }

        let paths = &self.set.orphaned_paths;
        if !paths.is_empty() {
            self.heading(out, &format!("Orphaned config entries ({}):", paths.len()))?;
            for entry in paths {
                writeln!(out, "  {}  {}", entry.path, format_bytes(entry.value_size))?;
            }
            writeln!(out, "  Config reclaimable: {}", format_bytes(self.config_bytes()))?;
        }

        let dirs = &self.set.orphaned_dirs;
        if !dirs.is_empty() {
            if !paths.is_empty() {
                writeln!(out)?;
            }
            self.heading(out, &format!("Orphaned project directories ({}):", dirs.len()))?;
            for (dir, kb) in dirs.iter().zip(&self.dir_kb) {
                writeln!(out, "  {}  {}", dir.name, format_kb(*kb))?;
            }
            writeln!(out, "  Disk reclaimable: {}", format_kb(self.disk_kb()))?;
        }

        tracing::info!(
            orphaned_paths = paths.len(),
            orphaned_dirs = dirs.len(),
            config_bytes = self.config_bytes(),
            disk_kb = self.disk_kb(),
            "orphan report"
        );
        Ok(())
    }

    fn heading(&self, out: &mut dyn Write, text: &str) -> io::Result<()> {
        if self.color {
            writeln!(out, "{BOLD}{YELLOW}{text}{RESET}")
        } else {
            writeln!(out, "{text}")
        }
    }
}
