//! Rule file loader.
//!
//! A rule file is line oriented text:
//!
//! ```text
//! # comment lines start with '#' and are ignored
//! <rule-name><TAB><regex-pattern>[<TAB>...ignored...]
//! ```
//!
//! Every line that is not a comment or blank takes the next sequence number,
//! starting at 1. Patterns use the `regex` crate syntax, which follows RE2:
//! no backreferences and no lookaround.

use crate::error::{Result, TallyError};
use crate::ruleset::{Rule, RuleSet, Sequence};
use log::{debug, info, warn};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

const COMMENT_PREFIX: char = '#';
const FIELD_SEPARATOR: char = '\t';

/// Incremental rule file parser.
///
/// Feeds one definition line at a time into a [`RuleSet`], numbering
/// definitions as it goes.
///
/// # Examples
///
/// ```rust
/// use regex_tally::RuleLoader;
///
/// let mut loader = RuleLoader::new();
/// loader.add_line("# web traffic")?;
/// loader.add_line("get\tGET /")?;
/// loader.add_line("post\tPOST /\tignored note")?;
///
/// let rules = loader.finish();
/// assert_eq!(rules.len(), 2);
/// assert_eq!(rules.get("post").unwrap().sequence(), 2);
/// # Ok::<(), regex_tally::TallyError>(())
/// ```
#[derive(Debug, Default)]
pub struct RuleLoader {
    rules: RuleSet,
    sequence: Sequence,
    redefined: Vec<String>,
}

impl RuleLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse one line of a rule file.
    ///
    /// Comment and blank lines are skipped without consuming a sequence
    /// number. A trailing `\r` is dropped before parsing.
    ///
    /// # Errors
    /// - [`TallyError::MalformedRule`] when the line has no tab-separated
    ///   pattern field.
    /// - [`TallyError::InvalidPattern`] when the pattern does not compile.
    pub fn add_line(&mut self, line: &str) -> Result<()> {
        let line = trim_line_ending(line);
        if line.is_empty() || line.starts_with(COMMENT_PREFIX) {
            return Ok(());
        }

        self.sequence += 1;

        let mut fields = line.split(FIELD_SEPARATOR);
        let (name, pattern) = match (fields.next(), fields.next()) {
            (Some(name), Some(pattern)) => (name, pattern),
            _ => {
                return Err(TallyError::MalformedRule {
                    line_number: self.sequence,
                    line: line.to_string(),
                })
            }
        };

        let rule = Rule::new(name, pattern, self.sequence)?;
        debug!("rule #{} '{}' => {}", self.sequence, name, pattern);

        if let Some(previous) = self.rules.insert(rule) {
            warn!(
                "regex name '{}' redefined at #{} (was #{}); the later definition wins",
                name,
                self.sequence,
                previous.sequence()
            );
            self.redefined.push(name.to_string());
        }

        Ok(())
    }

    /// Number of definition lines seen so far.
    pub fn sequence(&self) -> Sequence {
        self.sequence
    }

    /// Names that were defined more than once, in the order the repeats appeared.
    pub fn redefined(&self) -> &[String] {
        &self.redefined
    }

    pub fn finish(self) -> RuleSet {
        self.rules
    }
}

/// Load a rule file from disk.
///
/// # Errors
/// [`TallyError::RuleFileRead`] if the file cannot be opened or read, plus
/// anything [`RuleLoader::add_line`] reports.
pub fn load_rules(path: &Path) -> Result<RuleSet> {
    let file = File::open(path).map_err(|source| TallyError::RuleFileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let rules = parse_rules(BufReader::new(file), path)?;
    info!("loaded {} regexes from {}", rules.len(), path.display());
    Ok(rules)
}

/// Parse rule definitions from any buffered reader.
///
/// `origin` only labels read errors.
pub fn parse_rules<R: BufRead>(mut reader: R, origin: &Path) -> Result<RuleSet> {
    let mut loader = RuleLoader::new();
    let mut line = String::new();

    loop {
        line.clear();
        let read = reader
            .read_line(&mut line)
            .map_err(|source| TallyError::RuleFileRead {
                path: origin.to_path_buf(),
                source,
            })?;
        if read == 0 {
            break;
        }
        loader.add_line(&line)?;
    }

    Ok(loader.finish())
}

/// Parse rule definitions held in memory.
pub fn parse_rules_str(text: &str) -> Result<RuleSet> {
    let mut loader = RuleLoader::new();
    for line in text.lines() {
        loader.add_line(line)?;
    }
    Ok(loader.finish())
}

fn trim_line_ending(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}
