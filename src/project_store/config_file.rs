use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Top-level key holding the project map.
pub const PROJECTS_KEY: &str = "projects";

/// One entry of the `projects` object. Only the size of the value matters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectEntry {
    pub path: String,
    pub value_size: u64,
}

/// The JSON config that records known project paths.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    path: PathBuf,
}

impl ConfigFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Sibling file the config is copied to before it is rewritten.
    pub fn backup_path(&self, suffix: &str) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(suffix);
        PathBuf::from(name)
    }

    /// Project entries in document order. `None` when the file is missing,
    /// malformed, or has no `projects` object; `Some(vec![])` when the object
    /// is present but empty.
    pub fn read_entries(&self) -> Result<Option<Vec<ProjectEntry>>> {
        let Some(doc) = self.load_document()? else {
            return Ok(None);
        };
        Ok(project_entries(&doc))
    }

    fn load_document(&self) -> Result<Option<Value>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("No config file at {}", self.path.display());
                return Ok(None);
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", self.path.display()))
            }
        };
        match serde_json::from_str::<Value>(&content) {
            Ok(doc) => Ok(Some(doc)),
            Err(e) => {
                tracing::warn!(
                    "Ignoring malformed config at {}: {}",
                    self.path.display(),
                    e
                );
                Ok(None)
            }
        }
    }
}

/// Extract `(path, serialized size)` pairs from a parsed config document.
/// `None` if there is no `projects` object to reconcile against.
pub fn project_entries(doc: &Value) -> Option<Vec<ProjectEntry>> {
    let Some(projects) = doc.get(PROJECTS_KEY).and_then(Value::as_object) else {
        if doc.get(PROJECTS_KEY).is_some() {
            tracing::warn!("`{}` is not an object; ignoring config", PROJECTS_KEY);
        }
        return None;
    };
    let entries = projects
        .iter()
        .map(|(path, value)| ProjectEntry {
            path: path.clone(),
            value_size: serialized_size(value),
        })
        .collect();
    Some(entries)
}

fn serialized_size(value: &Value) -> u64 {
    serde_json::to_vec(value).map(|v| v.len() as u64).unwrap_or(0)
}

/// Drop the given keys from the `projects` object. Returns how many were
/// present.
pub fn remove_projects(doc: &mut Value, keys: &[&str]) -> usize {
    let Some(projects) = doc.get_mut(PROJECTS_KEY).and_then(Value::as_object_mut) else {
        return 0;
    };
    keys.iter()
        .filter(|key| projects.shift_remove(**key).is_some())
        .count()
}

pub fn read_document(path: &Path) -> Result<Value> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Replace `path` with the pretty-printed document via a temp file in the
/// same directory.
pub fn write_document(path: &Path, doc: &Value) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
    serde_json::to_writer_pretty(&mut tmp, doc)?;
    tmp.write_all(b"\n")?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)
        .with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write_config(dir: &Path, content: &str) -> ConfigFile {
        let path = dir.join(".claude.json");
        fs::write(&path, content).unwrap();
        ConfigFile::new(path)
    }

    #[test]
    fn test_read_entries_keeps_document_order() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = write_config(
            dir.path(),
            r#"{"projects": {"/z": {}, "/a": {"k": 1}, "/m": []}}"#,
        );
        let entries = cfg.read_entries().unwrap().unwrap();
        let paths: Vec<&str> = entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["/z", "/a", "/m"]);
        assert_eq!(entries[0].value_size, 2);
        assert_eq!(entries[1].value_size, r#"{"k":1}"#.len() as u64);
    }

    #[test]
    fn test_missing_config_has_no_entries() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = ConfigFile::new(dir.path().join("absent.json"));
        assert!(!cfg.exists());
        assert_eq!(cfg.read_entries().unwrap(), None);
    }

    #[test]
    fn test_malformed_config_has_no_entries() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = write_config(dir.path(), "{ not json");
        assert_eq!(cfg.read_entries().unwrap(), None);

        let cfg = write_config(dir.path(), r#"{"projects": ["/a"]}"#);
        assert_eq!(cfg.read_entries().unwrap(), None);

        let cfg = write_config(dir.path(), r#"{"other": 1}"#);
        assert_eq!(cfg.read_entries().unwrap(), None);
    }

    #[test]
    fn test_empty_projects_object_is_a_baseline() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = write_config(dir.path(), r#"{"projects": {}}"#);
        assert_eq!(cfg.read_entries().unwrap(), Some(Vec::new()));
    }

    #[test]
    fn test_backup_path_is_sibling() {
        let cfg = ConfigFile::new(PathBuf::from("/home/u/.claude.json"));
        assert_eq!(
            cfg.backup_path(".backup"),
            PathBuf::from("/home/u/.claude.json.backup")
        );
    }

    #[test]
    fn test_remove_projects_keeps_other_keys() {
        let mut doc = json!({
            "theme": "dark",
            "projects": {"/a": 1, "/b": 2, "/c": 3}
        });
        let removed = remove_projects(&mut doc, &["/b", "/missing"]);
        assert_eq!(removed, 1);
        assert_eq!(doc, json!({"theme": "dark", "projects": {"/a": 1, "/c": 3}}));
    }

    #[test]
    fn test_write_document_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        fs::write(&path, "old").unwrap();
        let doc = json!({"projects": {"/a": {"x": true}}});
        write_document(&path, &doc).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.ends_with('\n'));
        assert_eq!(read_document(&path).unwrap(), doc);
    }
}
