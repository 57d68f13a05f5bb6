//! Constants for tabpipe

use std::path::PathBuf;
use std::sync::OnceLock;

/// Full path of the executable file
pub static EXECUTABLE_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Directory (next to the executable) that receives per-run log files
pub const LOG_DIR: &str = "logs";

/// Environment variable that moves the log directory elsewhere
pub const LOG_DIR_ENV: &str = "TABPIPE_LOG_DIR";

/// Separator between `key=value` pairs in a loose parameter string
pub const PARAM_SEPARATOR: char = '|';

/// Separator between a key and its value in a loose parameter string
pub const PARAM_ASSIGN: char = '=';

/// Rows printed by `head` when `--lines` is not given
pub const DEFAULT_HEAD_LINES: i64 = 5;

/// Name used for the pipeline assembled from the command line
pub const PIPELINE_NAME: &str = "command-line";

/// Worksheet name used by the xlsx writer when none is given
pub const DEFAULT_SHEET_NAME: &str = "Sheet1";

/// Text rendered for missing values
pub const NA_REPR: &str = "NaN";

/// Cell texts read as missing values
pub const NA_VALUES: &[&str] = &[
    "", "#N/A", "#NA", "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

pub fn init_constants() {
    if let Ok(exe_path) = std::env::current_exe() {
        // A second initialisation keeps the first path.
        let _ = EXECUTABLE_PATH.set(exe_path);
    }
}
