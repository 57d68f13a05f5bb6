use std::fmt;

/// Failure contained at a stage boundary.
///
/// Carries the stage name and the rendered message of whatever went wrong
/// inside it; the underlying error does not travel further.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageError {
    pub stage: String,
    pub message: String,
}

impl StageError {
    pub fn new(stage: impl Into<String>, error: &dyn std::error::Error) -> Self {
        Self {
            stage: stage.into(),
            message: error.to_string(),
        }
    }
}

impl fmt::Display for StageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error in '{}' stage: {}", self.stage, self.message)
    }
}

impl std::error::Error for StageError {}
