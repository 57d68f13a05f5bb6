// Integration tests for the built-in stages, driven through a pipeline
use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;
use tabpipe::io::FormatRegistry;
use tabpipe::pipeline::stages::{filter, head, info, print, read, to};
use tabpipe::pipeline::{ErrorLog, Pipeline, RunReport, Stage, StageContext};
use tabpipe::table::{Table, Value};
use tempfile::TempDir;

struct Harness {
    dir: TempDir,
    out: Rc<RefCell<Vec<u8>>>,
    ctx: StageContext,
}

impl Harness {
    fn new() -> Self {
        let out = Rc::new(RefCell::new(Vec::new()));
        let ctx = StageContext::with_output(Rc::new(FormatRegistry::standard()), out.clone());
        Self {
            dir: tempfile::tempdir().unwrap(),
            out,
            ctx,
        }
    }

    fn file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn run(&self, stages: Vec<Box<dyn Stage>>) -> RunReport {
        stages
            .into_iter()
            .fold(Pipeline::new("test"), |p, s| p.add_stage(s))
            .run()
    }

    fn collect(&self, stages: Vec<Box<dyn Stage>>) -> Vec<Table> {
        let errors = ErrorLog::new();
        let tables = stages
            .into_iter()
            .fold(Pipeline::new("test"), |p, s| p.add_stage(s))
            .compose(&errors)
            .collect();
        assert!(errors.is_empty(), "unexpected errors: {:?}", errors.snapshot());
        tables
    }

    fn printed(&self) -> String {
        String::from_utf8(self.out.borrow().clone()).unwrap()
    }
}

const PEOPLE: &str = "name,age,city\nAnn,34,Oslo\nBob,17,Rome\nCid,52,Oslo\n";

#[test]
fn test_head_prints_at_most_n_rows() {
    let h = Harness::new();
    let path = h.file("people.csv", PEOPLE);

    let report = h.run(vec![read(path, String::new(), &h.ctx), head(2, &h.ctx)]);
    assert!(report.is_clean());
    assert_eq!(report.drained, 1);
    assert_eq!(
        h.printed(),
        "   name  age  city\n0   Ann   34  Oslo\n1   Bob   17  Rome\n"
    );
}

#[test]
fn test_head_with_fewer_rows_than_requested() {
    let h = Harness::new();
    let path = h.file("people.csv", PEOPLE);

    let report = h.run(vec![read(path, String::new(), &h.ctx), head(3, &h.ctx)]);
    assert!(report.is_clean());
    assert_eq!(h.printed().lines().count(), 4);

    let h = Harness::new();
    let path = h.file("people.csv", PEOPLE);
    h.run(vec![read(path, String::new(), &h.ctx), head(10, &h.ctx)]);
    assert_eq!(h.printed().lines().count(), 4);
}

#[test]
fn test_negative_head_drops_trailing_rows() {
    let h = Harness::new();
    let path = h.file("people.csv", PEOPLE);

    h.run(vec![read(path, String::new(), &h.ctx), head(-2, &h.ctx)]);
    let printed = h.printed();
    assert!(printed.contains("Ann"));
    assert!(!printed.contains("Bob"));
    assert!(!printed.contains("Cid"));
}

#[test]
fn test_missing_file_is_reported_and_run_completes() {
    let h = Harness::new();
    let missing = h.path("missing.csv");

    let report = h.run(vec![read(missing, String::new(), &h.ctx), head(3, &h.ctx)]);
    assert_eq!(report.drained, 0);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].stage, "read");
    assert!(report.errors[0].message.contains("missing.csv"));
    assert_eq!(h.printed(), "");
}

#[test]
fn test_unsupported_extensions() {
    let h = Harness::new();
    let notes = h.file("notes.txt", "hello");
    let people = h.file("people.csv", PEOPLE);

    let report = h.run(vec![
        read(notes, String::new(), &h.ctx),
        read(people, String::new(), &h.ctx),
        to(h.path("out.parquet"), String::new(), &h.ctx),
    ]);
    let stages: Vec<&str> = report.errors.iter().map(|e| e.stage.as_str()).collect();
    assert_eq!(stages, vec!["to", "read"]);
    assert!(!h.path("out.parquet").exists());
}

#[test]
fn test_bad_filter_stops_before_writing() {
    let h = Harness::new();
    let path = h.file("a.csv", PEOPLE);
    let out = h.path("out.csv");

    let report = h.run(vec![
        read(path, String::new(), &h.ctx),
        filter("bad syntax (".into(), &h.ctx),
        to(out.clone(), String::new(), &h.ctx),
    ]);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].stage, "filter");
    assert!(!out.exists());
    assert_eq!(report.drained, 0);
}

#[test]
fn test_filter_prints_and_yields_matching_rows() {
    let h = Harness::new();
    let path = h.file("people.csv", PEOPLE);

    let tables = h.collect(vec![
        read(path, String::new(), &h.ctx),
        filter("city == 'Oslo' and age > 40".into(), &h.ctx),
    ]);
    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0].index(), &[2]);
    assert_eq!(h.printed(), "   name  age  city\n2   Cid   52  Oslo\n");
}

#[test]
fn test_filter_unknown_column_is_a_stage_error() {
    let h = Harness::new();
    let path = h.file("people.csv", PEOPLE);

    let report = h.run(vec![
        read(path, String::new(), &h.ctx),
        filter("height > 2".into(), &h.ctx),
        print(&h.ctx),
    ]);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].stage, "filter");
    assert!(report.errors[0].message.contains("height"));
    assert_eq!(h.printed(), "");
}

#[test]
fn test_two_reads_flow_in_order() {
    let h = Harness::new();
    let a = h.file("a.csv", "x\n1\n2\n");
    let b = h.file("b.csv", "y\n1\n2\n3\n");

    let report = h.run(vec![
        read(a, String::new(), &h.ctx),
        read(b, String::new(), &h.ctx),
        info(&h.ctx),
    ]);
    assert_eq!(report.drained, 2);
    let printed = h.printed();
    let first = printed.find("Table: 2 rows x 1 columns").unwrap();
    let second = printed.find("Table: 3 rows x 1 columns").unwrap();
    assert!(first < second);
}

#[test]
fn test_print_has_no_index() {
    let h = Harness::new();
    let path = h.file("people.csv", PEOPLE);

    h.run(vec![read(path, String::new(), &h.ctx), print(&h.ctx)]);
    assert_eq!(
        h.printed(),
        "name  age  city\n Ann   34  Oslo\n Bob   17  Rome\n Cid   52  Oslo\n"
    );
}

#[test]
fn test_csv_round_trip_through_to() {
    let h = Harness::new();
    let x = h.file("x.csv", "id,score,label,flag\n1,1.5,a,True\n2,,b,False\n3,2.0,,True\n");
    let y = h.path("y.csv");

    let written = h.collect(vec![
        read(x.clone(), String::new(), &h.ctx),
        to(y.clone(), String::new(), &h.ctx),
    ]);
    let reread = h.collect(vec![read(y, String::new(), &h.ctx)]);
    let original = h.collect(vec![read(x, String::new(), &h.ctx)]);
    assert_eq!(reread, original);
    assert_eq!(written, original);
}

#[test]
fn test_xlsx_and_json_round_trips() {
    let h = Harness::new();
    let source = h.file("people.csv", PEOPLE);
    let original = h.collect(vec![read(source.clone(), String::new(), &h.ctx)]);

    for name in ["people.xlsx", "people.json"] {
        let target = h.path(name);
        h.collect(vec![
            read(source.clone(), String::new(), &h.ctx),
            to(target.clone(), String::new(), &h.ctx),
        ]);
        let back = h.collect(vec![read(target, String::new(), &h.ctx)]);
        assert_eq!(back, original, "round trip through {name}");
    }
}

#[test]
fn test_params_are_forwarded() {
    let h = Harness::new();
    let path = h.file("semi.csv", "a;b\n1;2\n3;4\n");

    let tables = h.collect(vec![read(path, "sep=';'|usecols=['b']|nrows=1".into(), &h.ctx)]);
    assert_eq!(tables[0].columns(), &["b"]);
    assert_eq!(tables[0].rows(), &[vec![Value::Int(2)]]);
}

#[test]
fn test_bad_params_are_stage_errors() {
    let h = Harness::new();
    let path = h.file("people.csv", PEOPLE);
    let out = h.path("out.csv");

    let report = h.run(vec![
        read(path.clone(), "sep".into(), &h.ctx),
        read(path, String::new(), &h.ctx),
        to(out.clone(), "colour=red".into(), &h.ctx),
    ]);
    let stages: Vec<&str> = report.errors.iter().map(|e| e.stage.as_str()).collect();
    assert_eq!(stages, vec!["to", "read"]);
    assert!(report.errors[0].message.contains("colour"));
    assert!(!out.exists());
}

#[test]
fn test_to_passes_tables_through() {
    let h = Harness::new();
    let path = h.file("people.csv", PEOPLE);
    let html = h.path("people.html");

    let report = h.run(vec![
        read(path, String::new(), &h.ctx),
        to(html.clone(), String::new(), &h.ctx),
        head(1, &h.ctx),
    ]);
    assert!(report.is_clean());
    assert!(fs::read_to_string(html).unwrap().contains("<td>Oslo</td>"));
    assert!(h.printed().contains("Ann"));
}

#[test]
fn test_failed_writer_setup_still_reports_upstream_read() {
    let h = Harness::new();
    let missing = h.path("missing.csv");

    let report = h.run(vec![
        read(missing, String::new(), &h.ctx),
        to(h.path("out.parquet"), String::new(), &h.ctx),
    ]);
    let stages: Vec<&str> = report.errors.iter().map(|e| e.stage.as_str()).collect();
    assert_eq!(stages, vec!["to", "read"]);
    assert!(report.errors[0].message.contains(".parquet"));
    assert!(report.errors[1].message.contains("missing.csv"));
    assert_eq!(report.drained, 0);
}

#[test]
fn test_failed_writer_setup_without_upstream() {
    let h = Harness::new();

    let report = h.run(vec![to(h.path("out.parquet"), String::new(), &h.ctx)]);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].stage, "to");
    assert_eq!(report.drained, 0);
}

#[test]
fn test_bare_nan_is_a_missing_value_marker() {
    let h = Harness::new();
    let source = h.file("in.csv", "a,b\n1,\n2,x\n");
    let target = h.path("out.csv");

    let report = h.run(vec![
        read(source, String::new(), &h.ctx),
        to(target.clone(), "na_rep=nan".into(), &h.ctx),
    ]);
    assert!(report.is_clean(), "{:?}", report.errors);
    assert_eq!(fs::read_to_string(target).unwrap(), "a,b\n1,nan\n2,x\n");
}
