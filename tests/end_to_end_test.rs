//! End-to-end tests for a complete tally run against files on disk.

use regex_tally::{run, DumpStatus, PreparedRun, Report, RunConfig, SortOrder, TallyError};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new(rules: &str, data: &str) -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("rules.tsv"), rules).unwrap();
        fs::write(dir.path().join("data.log"), data).unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn config(&self) -> RunConfig {
        RunConfig::new(self.path("rules.tsv"), self.path("data.log"))
            .with_unmatched_path(self.path("unmatched.txt"))
            .with_dump_dir(self.dir.path())
    }
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

#[test]
fn test_scenario_hits_and_unmatched_file() {
    let fixture = Fixture::new("A\t^foo\nB\tbar\n", "foo1\nxbarx\nnothing\n");
    let outcome = run(&fixture.config()).unwrap();

    assert_eq!(outcome.rules.get("A").unwrap().hits(), 1);
    assert_eq!(outcome.rules.get("B").unwrap().hits(), 1);
    assert_eq!(outcome.stats.lines_read, 3);
    assert_eq!(outcome.stats.matched, 2);
    assert_eq!(outcome.stats.unmatched, 1);
    assert_eq!(outcome.dump, DumpStatus::NotRequested);
    assert_eq!(read(&fixture.path("unmatched.txt")), "nothing\n");
}

#[test]
fn test_scenario_dump_rule() {
    let fixture = Fixture::new("A\t^foo\nB\tbar\n", "foo1\nxbarx\nnothing\n");
    let outcome = run(&fixture.config().with_dump_rule("B")).unwrap();

    assert_eq!(
        outcome.dump,
        DumpStatus::Enabled {
            rule: "B".to_string(),
            path: fixture.path("B.txt"),
        }
    );
    assert_eq!(read(&fixture.path("B.txt")), "xbarx\n");
    assert_eq!(read(&fixture.path("unmatched.txt")), "nothing\n");
}

#[test]
fn test_dump_status_is_known_before_scanning() {
    let fixture = Fixture::new("A\t^foo\nB\tbar\n", "foo1\nxbarx\nnothing\n");
    let prepared = PreparedRun::prepare(&fixture.config().with_dump_rule("B")).unwrap();

    assert_eq!(
        prepared.dump_status(),
        &DumpStatus::Enabled {
            rule: "B".to_string(),
            path: fixture.path("B.txt"),
        }
    );
    assert_eq!(prepared.rules().len(), 2);
    assert_eq!(prepared.rules().total_hits(), 0);
    assert_eq!(read(&fixture.path("B.txt")), "");
    assert_eq!(read(&fixture.path("unmatched.txt")), "");

    let outcome = prepared.execute().unwrap();
    assert_eq!(outcome.stats.lines_read, 3);
    assert_eq!(read(&fixture.path("B.txt")), "xbarx\n");
}

#[test]
fn test_dump_file_colliding_with_unmatched_sink_is_rejected() {
    let fixture = Fixture::new("unmatched\tfoo\n", "foo\nbar\n");
    fs::write(fixture.path("unmatched.txt"), "previous run\n").unwrap();

    let err = run(&fixture.config().with_dump_rule("unmatched")).unwrap_err();
    assert!(matches!(err, TallyError::Config(_)));
    assert_eq!(read(&fixture.path("unmatched.txt")), "previous run\n");
}

#[test]
fn test_unknown_dump_rule_creates_no_file() {
    let fixture = Fixture::new("A\t^foo\n", "foo\n");
    let outcome = run(&fixture.config().with_dump_rule("Z")).unwrap();

    assert_eq!(outcome.dump, DumpStatus::UnknownRule("Z".to_string()));
    assert!(!fixture.path("Z.txt").exists());
    assert_eq!(outcome.stats.matched, 1);
}

#[test]
fn test_malformed_rule_file_never_touches_unmatched_sink() {
    let fixture = Fixture::new("A\t^foo\nmissing-tab\n", "foo\nbar\n");
    let unmatched = fixture.path("unmatched.txt");
    fs::write(&unmatched, "previous run\n").unwrap();

    let err = run(&fixture.config()).unwrap_err();
    match err {
        TallyError::MalformedRule { line_number, line } => {
            assert_eq!(line_number, 2);
            assert_eq!(line, "missing-tab");
        }
        other => panic!("Expected MalformedRule, got {other:?}"),
    }
    assert_eq!(read(&unmatched), "previous run\n");
}

#[test]
fn test_missing_rule_file() {
    let fixture = Fixture::new("", "foo\n");
    let config = RunConfig::new(fixture.path("nope.tsv"), fixture.path("data.log"))
        .with_unmatched_path(fixture.path("unmatched.txt"));

    let err = run(&config).unwrap_err();
    assert!(matches!(err, TallyError::RuleFileRead { .. }));
    assert!(err.is_load_error());
    assert!(!fixture.path("unmatched.txt").exists());
}

#[test]
fn test_missing_data_file() {
    let fixture = Fixture::new("A\ta\n", "");
    let config = RunConfig::new(fixture.path("rules.tsv"), fixture.path("absent.log"))
        .with_unmatched_path(fixture.path("unmatched.txt"));

    let err = run(&config).unwrap_err();
    assert!(matches!(err, TallyError::DataRead { .. }));
    assert!(!fixture.path("unmatched.txt").exists());
}

#[test]
fn test_unwritable_unmatched_path() {
    let fixture = Fixture::new("A\ta\n", "a\n");
    let config = fixture
        .config()
        .with_unmatched_path(fixture.path("no/such/dir/unmatched.txt"));

    let err = run(&config).unwrap_err();
    assert!(matches!(err, TallyError::SinkWrite { .. }));
}

#[test]
fn test_unmatched_sink_is_truncated() {
    let fixture = Fixture::new("all\t.\n", "x\ny\n");
    fs::write(fixture.path("unmatched.txt"), "stale contents\n").unwrap();

    run(&fixture.config()).unwrap();
    assert_eq!(read(&fixture.path("unmatched.txt")), "");
}

#[test]
fn test_counts_partition_every_line() {
    let rules = "\
# syslog-ish buckets
sshd\tsshd\\[\\d+\\]
cron\tCRON
kernel\t^kernel:
any_error\t(?i)error
";
    let data = "\
sshd[12]: Accepted key
CRON[9]: session opened
kernel: usb 1-1: new device
kernel: ERROR in sshd[4] handler
systemd: Started
nginx: upstream error
plain line
";
    let fixture = Fixture::new(rules, data);
    let outcome = run(&fixture.config()).unwrap();

    let hits: Vec<(String, u64)> = outcome
        .rules
        .iter()
        .map(|r| (r.name().to_string(), r.hits()))
        .collect();
    assert_eq!(
        hits,
        vec![
            ("sshd".to_string(), 2),
            ("cron".to_string(), 1),
            ("kernel".to_string(), 1),
            ("any_error".to_string(), 1),
        ]
    );
    assert_eq!(outcome.stats.lines_read, 7);
    assert_eq!(
        outcome.stats.matched + outcome.stats.unmatched,
        outcome.stats.lines_read
    );
    assert_eq!(outcome.rules.total_hits(), outcome.stats.matched);
    assert_eq!(
        read(&fixture.path("unmatched.txt")),
        "systemd: Started\nplain line\n"
    );
}

#[test]
fn test_report_from_run() {
    let fixture = Fixture::new("A\t^foo\nB\tbar\n", "foo1\nxbarx\nbar\nnothing\n");
    let config = fixture.config().with_order(SortOrder::HitsDescending);
    let outcome = run(&config).unwrap();

    let report = Report::new(
        &outcome.rules,
        &outcome.stats,
        &config.rules_path,
        &config.data_path,
    )
    .with_order(config.order);
    assert!(report.mismatch().is_none());

    let rows = report.rows();
    assert_eq!(rows[0].name, "B");
    assert_eq!(rows[0].hits, 2);
    assert_eq!(rows[1].name, "A");

    let mut out = Vec::new();
    report.render(config.format, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("         4 : data lines read in"));
    assert!(text.contains("         1 : unmatched lines"));
}
