//! Logging init: append to a file under the XDG state dir, or to stderr when
//! that file cannot be opened.

use anyhow::{anyhow, Context, Result};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,mdimg=debug,mdimg_core=debug";
const LOG_FILE_NAME: &str = "mdimg.log";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Opens (creating as needed) `<dir>/mdimg.log` for appending.
fn open_log_file(dir: &Path) -> Result<(File, PathBuf)> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create log dir: {}", dir.display()))?;
    let path = dir.join(LOG_FILE_NAME);
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file: {}", path.display()))?;
    Ok((file, path))
}

/// Initialize structured logging to `~/.local/state/mdimg/mdimg.log`.
///
/// Returns the log file path. On failure nothing is installed, so the caller
/// can fall back to `init_logging_stderr`.
pub fn init_logging() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("mdimg")?;
    let (file, path) = open_log_file(&xdg_dirs.get_state_home().join("mdimg"))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow!("failed to install log subscriber: {}", e))?;

    tracing::info!("mdimg logging initialized at {}", path.display());
    Ok(path)
}

/// Initialize logging to stderr only (no file). Use when init_logging() fails so the CLI doesn't crash.
pub fn init_logging_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}
