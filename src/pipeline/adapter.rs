//! Turns plain stage functions into fail-soft pipeline stages.
//!
//! A transform receives the upstream stream and returns its own items; a
//! source forwards upstream untouched and then appends what it produces.
//! Either way, the first error is reported once, tagged with the stage
//! name, and the stage's output simply ends. A transform that fails to
//! start still drains its upstream, so earlier stages run and report.

use std::cell::RefCell;
use std::mem;
use std::rc::Rc;
use tracing::{debug, error};

use super::core::{Stage, StageItems, StageRole, Stream};
use crate::error::{Result, StageError};

/// Errors reported by the stages of one run, in the order they happened.
#[derive(Debug, Clone, Default)]
pub struct ErrorLog(Rc<RefCell<Vec<StageError>>>);

impl ErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&self, stage_error: StageError) {
        error!("{}", stage_error);
        self.0.borrow_mut().push(stage_error);
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn snapshot(&self) -> Vec<StageError> {
        self.0.borrow().clone()
    }

    pub fn take(&self) -> Vec<StageError> {
        mem::take(&mut *self.0.borrow_mut())
    }
}

type Start = Box<dyn FnOnce() -> Result<StageItems>>;
type Transform = Box<dyn FnOnce(Stream) -> Result<StageItems>>;

enum GuardState {
    Deferred(Start),
    Running(StageItems),
    /// Upstream of a stage that failed to start; consumed and discarded.
    Draining(Stream),
    Done,
}

/// Yields the stage's tables until its items run out or one fails.
struct Guarded {
    stage: String,
    state: GuardState,
    errors: ErrorLog,
}

impl Guarded {
    fn new(stage: &str, state: GuardState, errors: &ErrorLog) -> Self {
        Self {
            stage: stage.to_string(),
            state,
            errors: errors.clone(),
        }
    }

    fn fail(&mut self, e: &dyn std::error::Error) {
        self.state = GuardState::Done;
        self.errors.report(StageError::new(&self.stage, e));
    }
}

impl Iterator for Guarded {
    type Item = crate::table::Table;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match mem::replace(&mut self.state, GuardState::Done) {
                GuardState::Done => return None,
                GuardState::Deferred(start) => {
                    debug!("Starting stage '{}'", self.stage);
                    match start() {
                        Ok(items) => self.state = GuardState::Running(items),
                        Err(e) => {
                            self.fail(&e);
                            return None;
                        }
                    }
                }
                GuardState::Draining(input) => {
                    let discarded = input.count();
                    debug!("Stage '{}' discarded {} upstream table(s)", self.stage, discarded);
                    return None;
                }
                GuardState::Running(mut items) => match items.next() {
                    Some(Ok(table)) => {
                        self.state = GuardState::Running(items);
                        return Some(table);
                    }
                    Some(Err(e)) => {
                        self.fail(&e);
                        return None;
                    }
                    None => {
                        debug!("Stage '{}' exhausted", self.stage);
                        return None;
                    }
                },
            }
        }
    }
}

/// Upstream handle shared between a transform and its guard.
struct Upstream(Rc<RefCell<Stream>>);

impl Iterator for Upstream {
    type Item = crate::table::Table;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.borrow_mut().next()
    }
}

enum StageKind {
    Source(Start),
    Transform(Transform),
}

struct AdaptedStage {
    name: String,
    kind: StageKind,
}

impl Stage for AdaptedStage {
    fn name(&self) -> &str {
        &self.name
    }

    fn role(&self) -> StageRole {
        match self.kind {
            StageKind::Source(_) => StageRole::Source,
            StageKind::Transform(_) => StageRole::Transform,
        }
    }

    fn run(self: Box<Self>, input: Stream, errors: &ErrorLog) -> Stream {
        let AdaptedStage { name, kind } = *self;
        match kind {
            StageKind::Source(start) => Box::new(input.chain(Guarded::new(
                &name,
                GuardState::Deferred(start),
                errors,
            ))),
            StageKind::Transform(f) => {
                debug!("Starting stage '{}'", name);
                let upstream = Rc::new(RefCell::new(input));
                let state = match f(Box::new(Upstream(upstream.clone()))) {
                    Ok(items) => GuardState::Running(items),
                    Err(e) => {
                        errors.report(StageError::new(&name, &e));
                        GuardState::Draining(Box::new(Upstream(upstream)))
                    }
                };
                Box::new(Guarded::new(&name, state, errors))
            }
        }
    }
}

/// Adapt a function over the whole upstream stream.
///
/// `f` runs as soon as the stage is composed; its items are pulled lazily.
pub fn transform_stage<F>(name: &str, f: F) -> Box<dyn Stage>
where
    F: FnOnce(Stream) -> Result<StageItems> + 'static,
{
    Box::new(AdaptedStage {
        name: name.to_string(),
        kind: StageKind::Transform(Box::new(f)),
    })
}

/// Adapt a producer that appends its items after everything upstream.
///
/// `g` is only called once the upstream stream is exhausted.
pub fn source_stage<G>(name: &str, g: G) -> Box<dyn Stage>
where
    G: FnOnce() -> Result<StageItems> + 'static,
{
    Box::new(AdaptedStage {
        name: name.to_string(),
        kind: StageKind::Source(Box::new(g)),
    })
}
