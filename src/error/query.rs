/// Filter expression error types
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("Invalid syntax at offset {offset}: {message}")]
    Syntax { offset: usize, message: String },
    #[error("name '{0}' is not defined")]
    UnknownColumn(String),
    #[error("Type error: {0}")]
    Type(String),
    #[error("Filter expression must evaluate to a boolean, got {0}")]
    NotBoolean(String),
}

impl QueryError {
    /// Create a new Syntax error
    pub fn syntax(offset: usize, msg: impl Into<String>) -> Self {
        Self::Syntax {
            offset,
            message: msg.into(),
        }
    }

    /// Create a new Type error
    pub fn type_error(msg: impl Into<String>) -> Self {
        Self::Type(msg.into())
    }
}

/// Result type alias for filter expressions
pub type QueryResult<T> = Result<T, QueryError>;
