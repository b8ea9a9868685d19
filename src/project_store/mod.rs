pub mod config_file;
pub mod path_encoding;
pub mod scan;

pub use config_file::{ConfigFile, ProjectEntry};
pub use path_encoding::EncodingMode;
pub use scan::{list_project_dirs, ProjectDir};

use std::path::{Path, PathBuf};

/// The two inputs being reconciled: the JSON config and the data root whose
/// subdirectories are named after encoded project paths.
#[derive(Debug, Clone)]
pub struct ProjectStore {
    config: ConfigFile,
    root: PathBuf,
    encoding: EncodingMode,
}

impl ProjectStore {
    pub fn new(config_file: PathBuf, root: PathBuf, encoding: EncodingMode) -> Self {
        Self {
            config: ConfigFile::new(config_file),
            root,
            encoding,
        }
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn encoding(&self) -> EncodingMode {
        self.encoding
    }

    /// Directory the data for `project_path` would live in.
    pub fn project_dir(&self, project_path: &str) -> PathBuf {
        self.root.join(self.encoding.encode(project_path))
    }

    /// `None` when there is no usable config to compare directories against.
    pub fn entries(&self) -> anyhow::Result<Option<Vec<ProjectEntry>>> {
        self.config.read_entries()
    }

    pub fn dirs(&self) -> anyhow::Result<Vec<ProjectDir>> {
        list_project_dirs(&self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_dir_uses_encoding() {
        let store = ProjectStore::new(
            PathBuf::from("/h/.claude.json"),
            PathBuf::from("/h/.claude/projects"),
            EncodingMode::Dash,
        );
        assert_eq!(
            store.project_dir("/tmp/p"),
            PathBuf::from("/h/.claude/projects/-tmp-p")
        );
    }
}
