/// Loose parameter parsing error types
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParamError {
    #[error("Malformed parameter '{0}': expected key=value")]
    MissingAssignment(String),
    #[error("Malformed parameter '{0}': empty key")]
    EmptyKey(String),
    #[error("Invalid value for '{key}': expected {expected}, got {found}")]
    InvalidValue {
        key: String,
        expected: &'static str,
        found: String,
    },
    #[error("{context} got unexpected option(s): {}", .keys.join(", "))]
    UnknownOption { context: String, keys: Vec<String> },
}

impl ParamError {
    /// Create a new InvalidValue error
    pub fn invalid_value(key: impl Into<String>, expected: &'static str, found: impl ToString) -> Self {
        Self::InvalidValue {
            key: key.into(),
            expected,
            found: found.to_string(),
        }
    }
}

/// Result type alias for parameter parsing
pub type ParamResult<T> = Result<T, ParamError>;
