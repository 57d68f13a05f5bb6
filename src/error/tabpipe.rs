/// Unified error type for tabpipe
use thiserror::Error;

use crate::error::{ParamError, QueryError, TableError};

#[derive(Error, Debug)]
pub enum TabpipeError {
    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Table reading and writing
    #[error(transparent)]
    Table(#[from] TableError),

    // Loose parameters
    #[error(transparent)]
    Params(#[from] ParamError),

    // Filter expressions
    #[error(transparent)]
    Query(#[from] QueryError),

    // Generic error for compatibility
    #[error("{0}")]
    Other(String),
}

/// Result type alias using TabpipeError
pub type Result<T> = std::result::Result<T, TabpipeError>;

impl TabpipeError {
    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

// Conversion from String for convenience
impl From<String> for TabpipeError {
    fn from(msg: String) -> Self {
        Self::Other(msg)
    }
}

// Conversion from &str for convenience
impl From<&str> for TabpipeError {
    fn from(msg: &str) -> Self {
        Self::Other(msg.to_string())
    }
}
