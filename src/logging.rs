use crate::paths::expand_tilde;
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::{Duration, SystemTime};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

const RETENTION_DAYS: u64 = 30;
const LOG_FILE_PREFIX: &str = "prune-projects";
const DEFAULT_LEVEL: &str = "warn";

pub struct LoggingSettings<'a> {
    pub level: Option<&'a str>,
    /// Also log to a daily file here. Stderr only when unset.
    pub directory: Option<&'a str>,
    pub retention_days: Option<u64>,
}

/// Install the global subscriber. Stdout is left to the report, so the
/// console layer writes to stderr. Returns the log directory if file logging
/// is on.
pub fn setup_tracing_with_settings(settings: LoggingSettings<'_>) -> Result<Option<PathBuf>> {
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .compact();

    let log_dir = match settings.directory {
        Some(dir) => {
            let dir = expand_tilde(dir);
            std::fs::create_dir_all(&dir)?;
            let _ = cleanup_old_logs(&dir, settings.retention_days.unwrap_or(RETENTION_DAYS));
            Some(dir)
        }
        None => None,
    };

    let file_layer = log_dir.as_ref().map(|dir| {
        let file_appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        // Dropping the guard would stop the writer thread.
        let _ = LOG_GUARD.set(guard);
        tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(false)
            .with_file(true)
            .with_line_number(true)
            .with_level(true)
            .compact()
            .boxed()
    });

    let _ = tracing_subscriber::registry()
        .with(build_filter(settings.level))
        .with(stderr_layer)
        .with(file_layer)
        .try_init();

    Ok(log_dir)
}

fn build_filter(level: Option<&str>) -> EnvFilter {
    let default_filter = || {
        let base = level.unwrap_or(DEFAULT_LEVEL);
        EnvFilter::new(format!("prune_projects={base},ignore=warn"))
    };
    if level.is_some() {
        default_filter()
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter())
    }
}

fn cleanup_old_logs(log_dir: &Path, retention_days: u64) -> Result<()> {
    let now = SystemTime::now();
    let max_age = Duration::from_secs(retention_days.saturating_mul(60 * 60 * 24));
    for entry in std::fs::read_dir(log_dir)? {
        let entry = match entry {
            Ok(v) => v,
            Err(_) => continue,
        };
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let file_name = match path.file_name().and_then(|n| n.to_str()) {
            Some(v) => v,
            None => continue,
        };
        if !file_name.starts_with(LOG_FILE_PREFIX) {
            continue;
        }
        let age = match entry
            .metadata()
            .and_then(|m| m.modified())
            .map(|modified| now.duration_since(modified))
        {
            Ok(Ok(v)) => v,
            _ => continue,
        };
        if age > max_age {
            let _ = std::fs::remove_file(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleanup_keeps_recent_and_foreign_files() {
        let dir = tempfile::tempdir().unwrap();
        let ours = dir.path().join("prune-projects.2026-01-01");
        let foreign = dir.path().join("other.log");
        std::fs::write(&ours, "x").unwrap();
        std::fs::write(&foreign, "x").unwrap();

        cleanup_old_logs(dir.path(), 30).unwrap();
        assert!(ours.exists());
        assert!(foreign.exists());
    }

    #[test]
    fn test_cleanup_with_huge_retention_keeps_everything() {
        let dir = tempfile::tempdir().unwrap();
        let ours = dir.path().join("prune-projects.2020-01-01");
        std::fs::write(&ours, "x").unwrap();

        cleanup_old_logs(dir.path(), u64::MAX).unwrap();
        assert!(ours.exists());
    }

    #[test]
    fn test_cleanup_removes_expired_logs() {
        let dir = tempfile::tempdir().unwrap();
        let ours = dir.path().join("prune-projects.2020-01-01");
        let foreign = dir.path().join("other.log");
        std::fs::write(&ours, "x").unwrap();
        std::fs::write(&foreign, "x").unwrap();
        std::thread::sleep(Duration::from_millis(20));

        // Zero-day retention: anything older than now is expired.
        cleanup_old_logs(dir.path(), 0).unwrap();
        assert!(!ours.exists());
        assert!(foreign.exists());
    }
}
