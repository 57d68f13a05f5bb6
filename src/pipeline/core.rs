use tracing::debug;

use super::adapter::ErrorLog;
use crate::error::{Result, StageError};
use crate::table::Table;

/// Lazy, ordered sequence of tables flowing between stages.
pub type Stream = Box<dyn Iterator<Item = Table>>;

/// What a stage function produces; the first `Err` ends the stage.
pub type StageItems = Box<dyn Iterator<Item = Result<Table>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageRole {
    /// Forwards upstream, then appends its own tables.
    Source,
    /// Consumes upstream and yields what it decides to.
    Transform,
}

pub trait Stage {
    fn name(&self) -> &str;

    fn role(&self) -> StageRole;

    /// Wrap `input`. Failures are reported to `errors`, never returned.
    fn run(self: Box<Self>, input: Stream, errors: &ErrorLog) -> Stream;
}

/// Outcome of draining a pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Tables that reached the end of the chain.
    pub drained: usize,
    pub errors: Vec<StageError>,
}

impl RunReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Stage errors only fail the process in strict mode.
    pub fn exit_code(&self, strict: bool) -> i32 {
        if strict && !self.is_clean() { 1 } else { 0 }
    }
}

pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
    name: String,
}

impl Pipeline {
    pub fn new(name: &str) -> Self {
        Self {
            stages: Vec::new(),
            name: name.to_string(),
        }
    }

    pub fn add_stage(mut self, stage: Box<dyn Stage>) -> Self {
        debug!(
            "Adding {:?} stage '{}' to pipeline '{}'",
            stage.role(),
            stage.name(),
            self.name
        );
        self.stages.push(stage);
        self
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Fold the stages left to right, starting from an empty stream.
    ///
    /// Nothing is pulled yet; transform stages only set themselves up.
    pub fn compose(self, errors: &ErrorLog) -> Stream {
        debug!(
            "Composing pipeline '{}' with {} stages",
            self.name,
            self.stages.len()
        );
        self.stages
            .into_iter()
            .fold(Box::new(std::iter::empty()) as Stream, |stream, stage| {
                stage.run(stream, errors)
            })
    }

    /// Compose and drain the pipeline, collecting whatever the stages reported.
    pub fn run(self) -> RunReport {
        let name = self.name.clone();
        let errors = ErrorLog::new();
        let drained = self.compose(&errors).count();
        let report = RunReport {
            drained,
            errors: errors.take(),
        };
        debug!(
            "Pipeline '{}' drained {} table(s) with {} error(s)",
            name,
            report.drained,
            report.errors.len()
        );
        report
    }
}
