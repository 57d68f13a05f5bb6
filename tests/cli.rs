// Integration tests for command-line chaining
use clap::Parser;
use std::cell::RefCell;
use std::fs;
use std::rc::Rc;
use tabpipe::cli::{Cli, Commands, build_pipeline, chain_command};
use tabpipe::io::FormatRegistry;
use tabpipe::pipeline::StageContext;

fn context() -> (StageContext, Rc<RefCell<Vec<u8>>>) {
    let out = Rc::new(RefCell::new(Vec::new()));
    let ctx = StageContext::with_output(Rc::new(FormatRegistry::standard()), out.clone());
    (ctx, out)
}

fn commands(args: &[&str]) -> (bool, Vec<Commands>) {
    let cli = Cli::try_parse_from(args).unwrap();
    let strict = cli.strict;
    (strict, cli.invocations().unwrap())
}

#[test]
fn test_chain_builds_one_stage_per_command() {
    let (ctx, _) = context();
    let (_, cmds) = commands(&[
        "tabpipe", "read", "-f", "a.csv", "read", "-f", "b.csv", "filter", "-e", "x > 1",
        "info", "print",
    ]);
    let pipeline = build_pipeline(cmds, &ctx);
    assert_eq!(
        pipeline.stage_names(),
        vec!["read", "read", "filter", "info", "print"]
    );
}

#[test]
fn test_end_to_end_filter_and_write() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.csv");
    let output = dir.path().join("out.csv");
    fs::write(&input, "city,pop\nOslo,700\nBergen,290\nRome,2800\n").unwrap();

    let (ctx, out) = context();
    let (strict, cmds) = commands(&[
        "tabpipe",
        "--strict",
        "read",
        "-f",
        input.to_str().unwrap(),
        "filter",
        "-e",
        "pop >= 500",
        "to",
        "-f",
        output.to_str().unwrap(),
        "-p",
        "index=False",
    ]);
    let report = chain_command(cmds, &ctx);

    assert!(strict);
    assert_eq!(report.exit_code(strict), 0);
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "city,pop\nOslo,700\nRome,2800\n"
    );
    let printed = String::from_utf8(out.borrow().clone()).unwrap();
    assert!(printed.contains("Rome"));
    assert!(!printed.contains("Bergen"));
}

#[test]
fn test_errors_only_fail_in_strict_mode() {
    let (ctx, _) = context();
    let (strict, cmds) = commands(&["tabpipe", "read", "-f", "does-not-exist.csv", "print"]);
    let report = chain_command(cmds, &ctx);

    assert!(!strict);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.exit_code(strict), 0);
    assert_eq!(report.exit_code(true), 1);
}
