use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};

/// Overrides the directory holding both the config and the data root.
pub const CONFIG_DIR_ENV: &str = "CLAUDE_CONFIG_DIR";

const CONFIG_FILE_NAME: &str = ".claude.json";
const DATA_DIR_NAME: &str = ".claude";
const PROJECTS_DIR_NAME: &str = "projects";

/// Where the config file and the per-project data root live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locations {
    pub config_file: PathBuf,
    pub projects_dir: PathBuf,
}

impl Locations {
    /// Defaults: `$CLAUDE_CONFIG_DIR` if set, otherwise the home directory.
    pub fn resolve() -> Result<Self> {
        if let Ok(val) = std::env::var(CONFIG_DIR_ENV) {
            let p = PathBuf::from(val);
            if !p.as_os_str().is_empty() {
                return Ok(Self::under_config_dir(&p));
            }
        }
        let home = dirs::home_dir().ok_or_else(|| anyhow!("Could not find home directory"))?;
        Ok(Self::under_home(&home))
    }

    /// `~/.claude.json` and `~/.claude/projects/`
    pub fn under_home(home: &Path) -> Self {
        Self {
            config_file: home.join(CONFIG_FILE_NAME),
            projects_dir: home.join(DATA_DIR_NAME).join(PROJECTS_DIR_NAME),
        }
    }

    /// `<dir>/.claude.json` and `<dir>/projects/`
    pub fn under_config_dir(dir: &Path) -> Self {
        Self {
            config_file: dir.join(CONFIG_FILE_NAME),
            projects_dir: dir.join(PROJECTS_DIR_NAME),
        }
    }

    pub fn with_overrides(mut self, config_file: Option<PathBuf>, projects_dir: Option<PathBuf>) -> Self {
        if let Some(p) = config_file {
            self.config_file = p;
        }
        if let Some(p) = projects_dir {
            self.projects_dir = p;
        }
        self
    }
}

/// `~/foo` → `$HOME/foo`
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
