//! Run configuration for a tally pass.
//!
//! The command line front end gathers these values and hands them to the
//! library as plain data. Nothing here touches the filesystem.

use crate::error::{Result, TallyError};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Default location of the unmatched-lines sink.
pub const DEFAULT_UNMATCHED_PATH: &str = "unmatched.txt";

/// Extension appended to a rule name to form its dump file name.
pub const DUMP_EXTENSION: &str = "txt";

/// Row ordering for the per-rule section of the report.
///
/// # Examples
///
/// ```rust
/// use regex_tally::SortOrder;
///
/// assert_eq!(SortOrder::from_flags(false, false).unwrap(), SortOrder::Sequence);
/// assert_eq!(SortOrder::from_flags(true, false).unwrap(), SortOrder::Alphabetical);
/// assert!(SortOrder::from_flags(true, true).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Rule file load order.
    #[default]
    Sequence,
    /// Ascending by rule name.
    Alphabetical,
    /// Descending by hit count, ties by ascending sequence number.
    HitsDescending,
}

impl SortOrder {
    /// Resolve the two ordering flags into one mode.
    ///
    /// The flags are mutually exclusive; asking for both is a configuration
    /// conflict.
    pub fn from_flags(alpha: bool, desc: bool) -> Result<Self> {
        match (alpha, desc) {
            (true, true) => Err(TallyError::Config(
                "-alpha and -desc are mutually exclusive".to_string(),
            )),
            (true, false) => Ok(SortOrder::Alphabetical),
            (false, true) => Ok(SortOrder::HitsDescending),
            (false, false) => Ok(SortOrder::Sequence),
        }
    }
}

/// Output style of the final report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// Fixed-width human readable text.
    #[default]
    Text,
    /// The same summary and rows as a JSON document.
    Json,
}

/// Everything a single run needs to know.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Tab-delimited rule definition file.
    pub rules_path: PathBuf,

    /// Newline-delimited data set to classify.
    pub data_path: PathBuf,

    /// Where lines that matched no rule are written.
    ///
    /// **Default**: `unmatched.txt`
    pub unmatched_path: PathBuf,

    /// Rule whose matched lines are copied to `<name>.txt`.
    pub dump_rule: Option<String>,

    /// Directory the dump file is created in. `None` means the working directory.
    pub dump_dir: Option<PathBuf>,

    pub order: SortOrder,

    pub format: ReportFormat,
}

impl RunConfig {
    /// Create a configuration with defaults for every optional value.
    pub fn new(rules_path: impl Into<PathBuf>, data_path: impl Into<PathBuf>) -> Self {
        Self {
            rules_path: rules_path.into(),
            data_path: data_path.into(),
            unmatched_path: PathBuf::from(DEFAULT_UNMATCHED_PATH),
            dump_rule: None,
            dump_dir: None,
            order: SortOrder::default(),
            format: ReportFormat::default(),
        }
    }

    pub fn with_unmatched_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.unmatched_path = path.into();
        self
    }

    pub fn with_dump_rule(mut self, name: impl Into<String>) -> Self {
        self.dump_rule = Some(name.into());
        self
    }

    pub fn with_dump_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dump_dir = Some(dir.into());
        self
    }

    pub fn with_order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    pub fn with_format(mut self, format: ReportFormat) -> Self {
        self.format = format;
        self
    }

    /// Path of the dump file for the configured dump rule, if any.
    pub fn dump_path(&self) -> Option<PathBuf> {
        self.dump_rule
            .as_deref()
            .map(|name| dump_path_for(self.dump_dir.as_deref(), name))
    }

    /// Check the configuration before any file is touched.
    pub fn validate(&self) -> Result<()> {
        if self.rules_path.as_os_str().is_empty() {
            return Err(TallyError::Config("a regex list is required".to_string()));
        }
        if self.data_path.as_os_str().is_empty() {
            return Err(TallyError::Config("a data set is required".to_string()));
        }
        if self.unmatched_path.as_os_str().is_empty() {
            return Err(TallyError::Config(
                "unmatched output path cannot be empty".to_string(),
            ));
        }
        if matches!(self.dump_rule.as_deref(), Some("")) {
            return Err(TallyError::Config("dump rule name cannot be empty".to_string()));
        }
        if let Some(dump_path) = self.dump_path() {
            if dump_path == self.unmatched_path {
                return Err(TallyError::Config(format!(
                    "dump file {} is also the unmatched output",
                    dump_path.display()
                )));
            }
        }
        Ok(())
    }
}

/// `<dir>/<rule-name>.txt`, or `<rule-name>.txt` when no directory is given.
pub fn dump_path_for(dir: Option<&Path>, rule_name: &str) -> PathBuf {
    let file_name = format!("{rule_name}.{DUMP_EXTENSION}");
    match dir {
        Some(dir) => dir.join(file_name),
        None => PathBuf::from(file_name),
    }
}
