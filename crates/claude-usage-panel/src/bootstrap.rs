use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use panel_core::settings::app_dir;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default log file name inside `~/.claude-usage-panel/logs/`.
pub const LOG_FILE_NAME: &str = "usage-panel.log";

// ── Directory bootstrap ────────────────────────────────────────────────────────

/// Ensure `~/.claude-usage-panel/` and its `logs/` directory exist.
pub fn ensure_directories() -> anyhow::Result<()> {
    ensure_directories_in(&app_dir())
}

/// Same as [`ensure_directories`] rooted at `base`.
pub fn ensure_directories_in(base: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(base)?;
    fs::create_dir_all(base.join("logs"))?;
    Ok(())
}

/// Log file used when `--log-file` is not given.
pub fn default_log_file() -> PathBuf {
    app_dir().join("logs").join(LOG_FILE_NAME)
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map a CLI level name to an [`EnvFilter`] directive.
///
/// Unrecognised names are passed through so that full filter directives
/// (e.g. `panel_runtime=debug`) still work.
pub fn level_directive(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" | "WARN" => "warn".to_string(),
        "ERROR" | "CRITICAL" => "error".to_string(),
        _ => log_level.to_string(),
    }
}

/// Initialise the global `tracing` subscriber, appending to a log file.
///
/// The terminal belongs to the panel, so nothing is written to stdout or
/// stderr. Returns the path being logged to.
pub fn setup_logging(log_level: &str, log_file: Option<&PathBuf>) -> anyhow::Result<PathBuf> {
    let path = log_file.cloned().unwrap_or_else(default_log_file);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let filter =
        EnvFilter::try_new(level_directive(log_level)).unwrap_or_else(|_| EnvFilter::new("info"));

    let layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .with_thread_ids(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()?;

    Ok(path)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
