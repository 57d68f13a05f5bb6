use calamine::XlsxError;
use std::path::PathBuf;
/// Tabular I/O error types
use thiserror::Error;

use crate::error::ParamError;

#[derive(Error, Debug)]
pub enum TableError {
    #[error("{} not found.", .0.display())]
    FileNotFound(PathBuf),
    #[error("No {role} registered for extension '{extension}' ({})", .path.display())]
    UnsupportedExtension {
        role: &'static str,
        extension: String,
        path: PathBuf,
    },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Failed to read Excel file: {0}")]
    Excel(#[from] XlsxError),
    #[error("Failed to write Excel package: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Worksheet '{0}' not found")]
    WorksheetNotFound(String),
    #[error("Column '{0}' not found")]
    ColumnNotFound(String),
    #[error("Invalid table format: {0}")]
    InvalidFormat(String),
    #[error(transparent)]
    Params(#[from] ParamError),
}

impl TableError {
    /// Create a new UnsupportedExtension error
    pub fn unsupported(role: &'static str, extension: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::UnsupportedExtension {
            role,
            extension: extension.into(),
            path: path.into(),
        }
    }

    /// Create a new InvalidFormat error
    pub fn invalid_format(msg: impl Into<String>) -> Self {
        Self::InvalidFormat(msg.into())
    }

    /// Create a new ColumnNotFound error
    pub fn column_not_found(name: impl Into<String>) -> Self {
        Self::ColumnNotFound(name.into())
    }
}

/// Result type alias for table operations
pub type TableResult<T> = Result<T, TableError>;
