//! File logging
//!
//! The terminal belongs to the UI, so log output goes to `parlor.log` in the
//! first usable directory offered, normally the data directory with the temp
//! directory behind it. Verbosity follows `RUST_LOG` (default `info`).

use anyhow::{anyhow, Context, Result};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub const LOG_FILE: &str = "parlor.log";

fn open_log_file(dir: &Path) -> Result<(PathBuf, File)> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {:?}", dir))?;
    let path = dir.join(LOG_FILE);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {:?}", path))?;
    Ok((path, file))
}

/// Open `parlor.log` in the first of `dirs` that accepts it
fn open_first_log_file(dirs: &[PathBuf]) -> Result<(PathBuf, File)> {
    let mut last_error = anyhow!("No log directory available");
    for dir in dirs {
        match open_log_file(dir) {
            Ok(opened) => return Ok(opened),
            Err(e) => last_error = e,
        }
    }
    Err(last_error)
}

/// Install the global subscriber writing to `parlor.log` in the first usable
/// directory of `dirs`
pub fn init(dirs: &[PathBuf]) -> Result<PathBuf> {
    let (path, file) = open_first_log_file(dirs)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;

    Ok(path)
}
