mod cli;
mod config;
mod logging;
mod orphans;
mod paths;
mod project_store;
mod prompt;
mod prune;
mod report;

use crate::cli::sweep::{self, Mode, SweepOptions};
use crate::config::Settings;
use crate::paths::Locations;
use crate::project_store::{EncodingMode, ProjectStore};
use anyhow::Result;
use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "prune-projects", version)]
#[command(
    about = "Report per-project data whose project path no longer exists, and optionally delete it",
    long_about = None
)]
struct Cli {
    /// Delete orphaned directories and config entries after confirmation
    #[arg(long, default_value_t = false)]
    prune: bool,

    /// JSON config listing known projects (default: ~/.claude.json)
    #[arg(long)]
    config_file: Option<PathBuf>,

    /// Directory holding per-project data (default: ~/.claude/projects)
    #[arg(long)]
    projects_dir: Option<PathBuf>,

    /// How project paths map to directory names
    #[arg(long, value_enum)]
    encoding: Option<EncodingMode>,

    /// Log level for stderr output (overrides RUST_LOG)
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let (settings, settings_path) = Settings::load_with_path()?;

    let log_dir = logging::setup_tracing_with_settings(logging::LoggingSettings {
        level: cli.log_level.as_deref().or(settings.logging.level.as_deref()),
        directory: settings.logging.directory.as_deref(),
        retention_days: settings.logging.retention_days,
    })
    .unwrap_or_else(|err| {
        eprintln!("Failed to initialize file logging: {err}");
        None
    });

    let locations = settings
        .apply_paths(Locations::resolve()?)
        .with_overrides(cli.config_file, cli.projects_dir);
    let encoding = cli.encoding.unwrap_or(settings.prune.encoding);

    match settings_path.as_ref() {
        Some(path) => tracing::debug!("Settings: {}", path.display()),
        None => tracing::debug!("Settings: (default)"),
    }
    if let Some(dir) = log_dir.as_ref() {
        tracing::debug!("Log directory: {}", dir.display());
    }
    tracing::debug!(
        config = %locations.config_file.display(),
        projects = %locations.projects_dir.display(),
        ?encoding,
        "resolved locations"
    );

    let store = ProjectStore::new(locations.config_file, locations.projects_dir, encoding);
    let opts = SweepOptions {
        mode: if cli.prune { Mode::Prune } else { Mode::DryRun },
        backup_suffix: settings.prune.backup_suffix,
        color: std::io::stdout().is_terminal(),
    };

    let mut prompt = prompt::LinePrompt::stdio();
    let mut stdout = std::io::stdout().lock();
    let result = sweep::run(&store, &opts, &mut prompt, &mut stdout)?;
    tracing::debug!(?result, "finished");
    Ok(())
}
