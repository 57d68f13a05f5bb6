// Integration tests for stage composition and fail-soft behaviour
use std::cell::RefCell;
use std::rc::Rc;
use tabpipe::error::{Result, TabpipeError};
use tabpipe::pipeline::{ErrorLog, Pipeline, StageItems, source_stage, transform_stage};
use tabpipe::table::{Table, Value};

fn table(tag: &str) -> Table {
    Table::new(vec!["tag".into()], vec![vec![Value::from(tag)]]).unwrap()
}

fn tag(table: &Table) -> String {
    table.rows()[0][0].to_string()
}

fn emit(tag_name: &'static str) -> Box<dyn tabpipe::pipeline::Stage> {
    source_stage(tag_name, move || {
        Ok(Box::new(std::iter::once(Ok(table(tag_name)))) as StageItems)
    })
}

#[test]
fn test_empty_pipeline_drains_nothing() {
    let pipeline = Pipeline::new("empty");
    assert!(pipeline.is_empty());
    assert_eq!(pipeline.len(), 0);
    let report = pipeline.run();
    assert_eq!(report.drained, 0);
    assert!(report.is_clean());
    assert_eq!(report.exit_code(true), 0);
}

#[test]
fn test_sources_concatenate_in_order() {
    let errors = ErrorLog::new();
    let tags: Vec<String> = Pipeline::new("test")
        .add_stage(emit("a"))
        .add_stage(emit("b"))
        .add_stage(emit("c"))
        .compose(&errors)
        .map(|t| tag(&t))
        .collect();
    assert_eq!(tags, vec!["a", "b", "c"]);
    assert!(errors.is_empty());
}

#[test]
fn test_side_effects_only_during_drain() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = seen.clone();
    let pipeline = Pipeline::new("test")
        .add_stage(emit("a"))
        .add_stage(emit("b"))
        .add_stage(transform_stage("record", move |input| {
            Ok(Box::new(input.map(move |t| -> Result<Table> {
                log.borrow_mut().push(tag(&t));
                Ok(t)
            })) as StageItems)
        }));
    assert_eq!(pipeline.len(), 3);
    assert_eq!(pipeline.stage_names(), vec!["a", "b", "record"]);

    let errors = ErrorLog::new();
    let mut stream = pipeline.compose(&errors);
    assert!(seen.borrow().is_empty());

    assert!(stream.next().is_some());
    assert_eq!(*seen.borrow(), vec!["a"]);
    assert_eq!(stream.count(), 1);
    assert_eq!(*seen.borrow(), vec!["a", "b"]);
}

#[test]
fn test_failing_stage_truncates_but_run_completes() {
    let report = Pipeline::new("test")
        .add_stage(emit("a"))
        .add_stage(emit("b"))
        .add_stage(transform_stage("picky", |input| {
            Ok(Box::new(input.map(|t| {
                if tag(&t) == "b" {
                    Err(TabpipeError::other("cannot handle b"))
                } else {
                    Ok(t)
                }
            })) as StageItems)
        }))
        .add_stage(emit("c"))
        .run();

    // "a" passes, "b" stops the picky stage, the later source still runs.
    assert_eq!(report.drained, 2);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].stage, "picky");
    assert_eq!(report.errors[0].message, "cannot handle b");
    assert_eq!(report.exit_code(false), 0);
    assert_eq!(report.exit_code(true), 1);
}

#[test]
fn test_failing_source_keeps_upstream() {
    let report = Pipeline::new("test")
        .add_stage(emit("a"))
        .add_stage(source_stage("broken", || Err(TabpipeError::other("nope"))))
        .run();
    assert_eq!(report.drained, 1);
    assert_eq!(
        report.errors[0].to_string(),
        "Error in 'broken' stage: nope"
    );
}

#[test]
fn test_transform_that_fails_to_start_still_runs_upstream_sources() {
    let report = Pipeline::new("test")
        .add_stage(emit("a"))
        .add_stage(source_stage("missing", || Err(TabpipeError::other("no such file"))))
        .add_stage(transform_stage("sink", |_| Err(TabpipeError::other("bad sink"))))
        .add_stage(emit("z"))
        .run();

    let stages: Vec<&str> = report.errors.iter().map(|e| e.stage.as_str()).collect();
    assert_eq!(stages, vec!["sink", "missing"]);
    assert_eq!(report.drained, 1);
}
