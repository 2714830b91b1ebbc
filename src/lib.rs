//! # regex-tally
//!
//! Run an ordered list of named regular expressions across a data set and
//! tally which rule claims each line.
//!
//! A run has three stages:
//!
//! 1. [`load_rules`] parses a tab-delimited rule file into a [`RuleSet`].
//! 2. [`Classifier`] tests each data line against the rules in load order.
//!    The first rule whose pattern matches gets the hit; later rules are not
//!    consulted. Lines no rule matches go to the unmatched sink, and lines
//!    credited to one chosen rule can be copied to a dump sink.
//! 3. [`Report`] renders run totals and per-rule hit counts and durations.
//!
//! [`run`] drives all three against files on disk.
//!
//! ## Quick Start
//!
//! ```rust
//! use regex_tally::{parse_rules_str, Classifier, LineSink, Report, SortOrder};
//! use std::path::Path;
//!
//! let mut rules = parse_rules_str("# rules\nA\t^foo\nB\tbar\n")?;
//!
//! let mut unmatched = Vec::new();
//! let mut dumped = Vec::new();
//! let mut classifier = Classifier::new(&mut rules, LineSink::new("unmatched.txt", &mut unmatched))
//!     .with_dump("B", LineSink::new("B.txt", &mut dumped));
//! classifier.scan(&b"foo1\nxbarx\nnothing\n"[..], Path::new("data.log"))?;
//! let stats = classifier.finish()?;
//!
//! assert_eq!(unmatched, b"nothing\n");
//! assert_eq!(dumped, b"xbarx\n");
//!
//! let report = Report::new(&rules, &stats, Path::new("rules.tsv"), Path::new("data.log"))
//!     .with_order(SortOrder::HitsDescending);
//! let mut out = Vec::new();
//! report.render_text(&mut out)?;
//! # Ok::<(), regex_tally::TallyError>(())
//! ```

pub mod classifier;
pub mod config;
pub mod error;
pub mod loader;
pub mod report;
pub mod ruleset;
pub mod runner;

pub use classifier::{first_match, Classification, Classifier, LineSink, RunStats};
pub use config::{dump_path_for, ReportFormat, RunConfig, SortOrder, DEFAULT_UNMATCHED_PATH};
pub use error::{Result, TallyError};
pub use loader::{load_rules, parse_rules, parse_rules_str, RuleLoader};
pub use report::{sorted_rules, HitMismatch, Report, RuleRow};
pub use ruleset::{Rule, RuleSet, Sequence};
pub use runner::{run, DumpStatus, PreparedRun, RunOutcome};
