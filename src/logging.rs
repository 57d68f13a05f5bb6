//! Per-run log file for the debug-level tracing layer

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::constants::{EXECUTABLE_PATH, LOG_DIR, LOG_DIR_ENV};
use crate::error::{Result, TabpipeError};

/// An opened run log and where it lives.
#[derive(Debug)]
pub struct RunLog {
    pub file: File,
    pub path: PathBuf,
}

/// `TABPIPE_LOG_DIR` if set, otherwise `logs/` next to the executable.
pub fn log_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(LOG_DIR_ENV).filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let exe = EXECUTABLE_PATH
        .get()
        .ok_or_else(|| TabpipeError::other("executable path not initialized"))?;
    let parent = exe
        .parent()
        .ok_or_else(|| TabpipeError::other(format!("{} has no parent directory", exe.display())))?;
    Ok(parent.join(LOG_DIR))
}

/// `{cwd-name}_{pid}_{timestamp}.log`, so runs from different folders stay apart.
pub fn log_file_name(working_dir: &Path, pid: u32, timestamp: u64) -> String {
    let folder = working_dir
        .file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_else(|| "unknown".into());
    format!("{folder}_{pid}_{timestamp}.log")
}

/// Create a fresh log file inside `dir`, creating the directory if needed.
pub fn create_log_file_in(dir: &Path) -> Result<RunLog> {
    fs::create_dir_all(dir)?;
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| TabpipeError::other(e.to_string()))?
        .as_secs();
    let path = dir.join(log_file_name(&std::env::current_dir()?, std::process::id(), timestamp));

    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&path)?;
    Ok(RunLog { file, path })
}

pub fn create_log_file() -> Result<RunLog> {
    create_log_file_in(&log_dir()?)
}
