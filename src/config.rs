use crate::paths::{expand_tilde, Locations};
use crate::project_store::EncodingMode;
use crate::prune::DEFAULT_BACKUP_SUFFIX;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub const SETTINGS_ENV: &str = "PRUNE_PROJECTS_CONFIG";
const SETTINGS_FILE_NAME: &str = "prune-projects.toml";

/// Settings for the tool itself, not the JSON config it cleans.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub prune: PruneConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct PathsConfig {
    pub config_file: Option<String>,
    pub projects_dir: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PruneConfig {
    #[serde(default = "default_backup_suffix")]
    pub backup_suffix: String,
    #[serde(default)]
    pub encoding: EncodingMode,
}

fn default_backup_suffix() -> String {
    DEFAULT_BACKUP_SUFFIX.to_string()
}

impl Default for PruneConfig {
    fn default() -> Self {
        Self {
            backup_suffix: default_backup_suffix(),
            encoding: EncodingMode::default(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub directory: Option<String>,
    pub retention_days: Option<u64>,
}

impl Settings {
    pub fn load_with_path() -> Result<(Self, Option<PathBuf>)> {
        let mut candidates = Vec::new();

        if let Ok(explicit) = std::env::var(SETTINGS_ENV) {
            candidates.push(PathBuf::from(explicit));
        }

        candidates.push(PathBuf::from(SETTINGS_FILE_NAME));

        if let Some(dir) = dirs::config_dir() {
            candidates.push(dir.join("prune-projects").join(SETTINGS_FILE_NAME));
        }

        for path in candidates {
            if path.exists() {
                let settings = Self::load_from(&path)?;
                return Ok((settings, Some(path)));
            }
        }

        Ok((Settings::default(), None))
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let settings: Settings =
            toml::from_str(&content).with_context(|| format!("Invalid settings in {}", path.display()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        let suffix = &self.prune.backup_suffix;
        if suffix.is_empty() {
            anyhow::bail!("prune.backup_suffix cannot be empty");
        }
        if suffix.contains('/') || suffix.contains(std::path::MAIN_SEPARATOR) {
            anyhow::bail!(
                "prune.backup_suffix must not contain a path separator, got: {}",
                suffix
            );
        }
        Ok(())
    }

    /// Apply `[paths]` on top of the resolved defaults.
    pub fn apply_paths(&self, locations: Locations) -> Locations {
        locations.with_overrides(
            self.paths.config_file.as_deref().map(expand_tilde),
            self.paths.projects_dir.as_deref().map(expand_tilde),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.prune.backup_suffix, ".backup");
        assert_eq!(s.prune.encoding, EncodingMode::Dash);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_parse_full_settings() {
        let s: Settings = toml::from_str(
            r#"
            [paths]
            config_file = "/srv/cc/.claude.json"

            [prune]
            backup_suffix = ".bak"
            encoding = "length-prefixed"

            [logging]
            level = "debug"
            retention_days = 7
            "#,
        )
        .unwrap();
        assert_eq!(s.prune.backup_suffix, ".bak");
        assert_eq!(s.prune.encoding, EncodingMode::LengthPrefixed);
        assert_eq!(s.logging.level.as_deref(), Some("debug"));
        assert_eq!(s.logging.retention_days, Some(7));

        let loc = s.apply_paths(Locations::under_home(Path::new("/home/u")));
        assert_eq!(loc.config_file, PathBuf::from("/srv/cc/.claude.json"));
        assert_eq!(loc.projects_dir, PathBuf::from("/home/u/.claude/projects"));
    }

    #[test]
    fn test_partial_prune_section_keeps_default_suffix() {
        let s: Settings = toml::from_str("[prune]\nencoding = \"dash\"\n").unwrap();
        assert_eq!(s.prune.backup_suffix, ".backup");
    }

    #[test]
    fn test_validate_rejects_bad_suffix() {
        let mut s = Settings::default();
        s.prune.backup_suffix = String::new();
        assert!(s.validate().is_err());
        s.prune.backup_suffix = "/x".into();
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE_NAME);
        fs::write(&path, "[prune]\nbackup_suffix = \"\"\n").unwrap();
        let err = Settings::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("backup_suffix"));

        fs::write(&path, "[logging]\nlevel = \"info\"\n").unwrap();
        let s = Settings::load_from(&path).unwrap();
        assert_eq!(s.logging.level.as_deref(), Some("info"));
    }
}
