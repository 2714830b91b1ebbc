//! Line classifier.
//!
//! Every input line is tested against the rules in load order and credited to
//! the first rule whose pattern matches anywhere in it. Lines no rule claims
//! go to the unmatched sink; lines claimed by the dump rule are also copied to
//! the dump sink.

use crate::error::{Result, TallyError};
use crate::ruleset::{Rule, RuleSet};
use log::{debug, warn};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const LINE_TERMINATOR: &[u8] = b"\n";

/// Counters for one scan over a data set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Lines read from the input.
    pub lines_read: u64,
    /// Lines credited to some rule.
    pub matched: u64,
    /// Lines no rule matched.
    pub unmatched: u64,
    /// Wall-clock time spent scanning.
    pub elapsed: Duration,
}

impl RunStats {
    /// Whether the matched-line counter agrees with the rules' hit counts.
    pub fn agrees_with(&self, rules: &RuleSet) -> bool {
        rules.total_hits() == self.matched
    }
}

/// Outcome for a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Credited to the rule at this zero-based load-order slot.
    Matched(usize),
    Unmatched,
}

/// Write half of a scan: a labelled newline-delimited output.
#[derive(Debug)]
pub struct LineSink<W: Write> {
    path: PathBuf,
    writer: W,
}

impl<W: Write> LineSink<W> {
    /// Wrap `writer`; `path` labels write errors.
    pub fn new(path: impl Into<PathBuf>, writer: W) -> Self {
        Self {
            path: path.into(),
            writer,
        }
    }

    /// Append `line` followed by a newline.
    pub fn write_line(&mut self, line: &[u8]) -> Result<()> {
        self.writer
            .write_all(line)
            .and_then(|()| self.writer.write_all(LINE_TERMINATOR))
            .map_err(|source| TallyError::SinkWrite {
                path: self.path.clone(),
                source,
            })
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().map_err(|source| TallyError::SinkWrite {
            path: self.path.clone(),
            source,
        })
    }
}

/// Find the first rule, in load order, whose pattern matches `line`.
#[inline]
pub fn first_match(rules: &[Rule], line: &[u8]) -> Option<usize> {
    rules.iter().position(|rule| rule.is_match(line))
}

/// Single-pass, first-match-wins classifier over a [`RuleSet`].
///
/// # Examples
///
/// ```rust
/// use regex_tally::{parse_rules_str, Classifier, LineSink};
/// use std::path::Path;
///
/// let mut rules = parse_rules_str("A\t^foo\nB\tbar\n")?;
/// let mut unmatched = Vec::new();
///
/// let sink = LineSink::new("unmatched.txt", &mut unmatched);
/// let mut classifier = Classifier::new(&mut rules, sink);
/// classifier.scan(&b"foo1\nxbarx\nnothing\n"[..], Path::new("inline"))?;
/// let stats = classifier.finish()?;
///
/// assert_eq!(stats.matched, 2);
/// assert_eq!(unmatched, b"nothing\n");
/// assert_eq!(rules.get("A").unwrap().hits(), 1);
/// # Ok::<(), regex_tally::TallyError>(())
/// ```
pub struct Classifier<'r, U: Write, D: Write = U> {
    rules: &'r mut RuleSet,
    unmatched: LineSink<U>,
    dump: Option<(usize, LineSink<D>)>,
    stats: RunStats,
}

impl<'r, U: Write> Classifier<'r, U> {
    pub fn new(rules: &'r mut RuleSet, unmatched: LineSink<U>) -> Self {
        Self {
            rules,
            unmatched,
            dump: None,
            stats: RunStats::default(),
        }
    }
}

impl<'r, U: Write, D: Write> Classifier<'r, U, D> {
    /// Copy lines credited to `rule_name` into `sink`.
    ///
    /// An unknown name leaves dumping disabled and logs a warning.
    pub fn with_dump<E: Write>(self, rule_name: &str, sink: LineSink<E>) -> Classifier<'r, U, E> {
        let dump = match self.rules.position(rule_name) {
            Some(position) => Some((position, sink)),
            None => {
                warn!("no matching regex name found for '{rule_name}'. nothing to dump");
                None
            }
        };

        Classifier {
            rules: self.rules,
            unmatched: self.unmatched,
            dump,
            stats: self.stats,
        }
    }

    /// Name of the rule being dumped, if dumping is enabled.
    pub fn dump_rule(&self) -> Option<&str> {
        self.dump
            .as_ref()
            .and_then(|(position, _)| self.rules.iter().nth(*position))
            .map(Rule::name)
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Classify one line without its terminator.
    pub fn classify_line(&mut self, line: &[u8]) -> Result<Classification> {
        let line_start = Instant::now();
        self.stats.lines_read += 1;

        let rules = self.rules.rules_mut();
        match first_match(rules, line) {
            Some(position) => {
                rules[position].record_hit(line_start.elapsed());
                self.stats.matched += 1;

                if let Some((dump_position, sink)) = self.dump.as_mut() {
                    if *dump_position == position {
                        sink.write_line(line)?;
                    }
                }
                Ok(Classification::Matched(position))
            }
            None => {
                self.stats.unmatched += 1;
                self.unmatched.write_line(line)?;
                Ok(Classification::Unmatched)
            }
        }
    }

    /// Classify every line of `input` until it is exhausted.
    ///
    /// `origin` only labels read errors. Counters and sink contents written
    /// before a failure are kept.
    pub fn scan<R: BufRead>(&mut self, mut input: R, origin: &Path) -> Result<()> {
        let scan_start = Instant::now();
        let mut buf = Vec::new();

        let outcome = loop {
            buf.clear();
            match input.read_until(b'\n', &mut buf) {
                Ok(0) => break Ok(()),
                Ok(_) => {
                    if let Err(err) = self.classify_line(trim_line_ending(&buf)) {
                        break Err(err);
                    }
                }
                Err(source) => {
                    break Err(TallyError::DataRead {
                        path: origin.to_path_buf(),
                        source,
                    })
                }
            }
        };

        self.stats.elapsed += scan_start.elapsed();
        debug!(
            "scanned {} lines from {}: {} matched, {} unmatched",
            self.stats.lines_read,
            origin.display(),
            self.stats.matched,
            self.stats.unmatched
        );
        outcome
    }

    /// Flush both sinks and hand back the run counters.
    pub fn finish(mut self) -> Result<RunStats> {
        self.unmatched.flush()?;
        if let Some((_, sink)) = self.dump.as_mut() {
            sink.flush()?;
        }
        Ok(self.stats)
    }
}

fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
