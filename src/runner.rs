//! Whole-run driver.
//!
//! Stages run strictly in order: validate the configuration, load the rule
//! file, open the data file, create the unmatched sink, create the dump sink,
//! scan. A rule file that fails to load therefore never creates or truncates
//! any output file.
//!
//! [`PreparedRun`] holds everything up to the scan, so callers can report the
//! dump status before any line is classified.

use crate::classifier::{Classifier, LineSink, RunStats};
use crate::config::RunConfig;
use crate::error::{Result, TallyError};
use crate::loader::load_rules;
use crate::ruleset::RuleSet;
use log::info;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

type FileSink = LineSink<BufWriter<File>>;

/// What happened to the requested dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DumpStatus {
    /// No dump rule was requested.
    NotRequested,
    /// Lines for `rule` are written to `path`.
    Enabled { rule: String, path: PathBuf },
    /// The requested rule is not in the rule set; nothing is dumped.
    UnknownRule(String),
}

/// Rules with their final statistics plus the run counters.
#[derive(Debug)]
pub struct RunOutcome {
    pub rules: RuleSet,
    pub stats: RunStats,
    pub dump: DumpStatus,
}

/// A run with its rules loaded and every file opened, ready to scan.
#[derive(Debug)]
pub struct PreparedRun {
    rules: RuleSet,
    data: BufReader<File>,
    data_path: PathBuf,
    unmatched: FileSink,
    dump: DumpStatus,
    dump_sink: Option<FileSink>,
}

impl PreparedRun {
    /// Run every stage before the scan.
    pub fn prepare(config: &RunConfig) -> Result<Self> {
        config.validate()?;

        let rules = load_rules(&config.rules_path)?;

        let data = File::open(&config.data_path).map_err(|source| TallyError::DataRead {
            path: config.data_path.clone(),
            source,
        })?;
        let unmatched = create_sink(&config.unmatched_path)?;

        let (dump, dump_sink) = match (config.dump_rule.as_deref(), config.dump_path()) {
            (Some(rule), Some(path)) if rules.contains(rule) => {
                let sink = create_sink(&path)?;
                info!("dumping '{}' to {}", rule, path.display());
                let status = DumpStatus::Enabled {
                    rule: rule.to_string(),
                    path,
                };
                (status, Some(sink))
            }
            (Some(rule), _) => (DumpStatus::UnknownRule(rule.to_string()), None),
            (None, _) => (DumpStatus::NotRequested, None),
        };

        Ok(Self {
            rules,
            data: BufReader::new(data),
            data_path: config.data_path.clone(),
            unmatched,
            dump,
            dump_sink,
        })
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn dump_status(&self) -> &DumpStatus {
        &self.dump
    }

    /// Scan the data file to the end and flush both sinks.
    pub fn execute(self) -> Result<RunOutcome> {
        let Self {
            mut rules,
            data,
            data_path,
            unmatched,
            dump,
            dump_sink,
        } = self;

        let classifier = Classifier::new(&mut rules, unmatched);
        let stats = match (&dump, dump_sink) {
            (DumpStatus::Enabled { rule, .. }, Some(sink)) => {
                scan_to_end(classifier.with_dump(rule, sink), data, &data_path)?
            }
            _ => scan_to_end(classifier, data, &data_path)?,
        };

        Ok(RunOutcome { rules, stats, dump })
    }
}

/// Execute one complete tally run described by `config`.
pub fn run(config: &RunConfig) -> Result<RunOutcome> {
    PreparedRun::prepare(config)?.execute()
}

fn scan_to_end<U: Write, D: Write, R: BufRead>(
    mut classifier: Classifier<'_, U, D>,
    input: R,
    origin: &Path,
) -> Result<RunStats> {
    classifier.scan(input, origin)?;
    classifier.finish()
}

/// Create or truncate an output file wrapped as a [`LineSink`].
fn create_sink(path: &Path) -> Result<FileSink> {
    let file = File::create(path).map_err(|source| TallyError::SinkWrite {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(LineSink::new(path, BufWriter::new(file)))
}
