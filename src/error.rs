//! Error types for the regex-tally crate.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TallyError>;

/// Process exit status for configuration conflicts.
pub const EXIT_CONFIG: i32 = 2;
/// Process exit status for rule file load failures.
pub const EXIT_RULE_LOAD: i32 = 3;
/// Process exit status for data file failures.
pub const EXIT_DATA: i32 = 4;
/// Process exit status for unmatched/dump sink failures.
pub const EXIT_SINK: i32 = 5;
/// Process exit status for everything else.
pub const EXIT_OTHER: i32 = 1;

#[derive(Debug, Error)]
pub enum TallyError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Cannot read rule file {}: {source}", path.display())]
    RuleFileRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A non-comment rule line without a tab-separated pattern field.
    /// `line_number` counts non-comment lines only, starting at 1.
    #[error("err regex #{line_number}: {line}")]
    MalformedRule { line_number: usize, line: String },

    #[error("Invalid regex pattern for rule '{name}': {pattern}: {source}")]
    InvalidPattern {
        name: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Cannot read data file {}: {source}", path.display())]
    DataRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot write to {}: {source}", path.display())]
    SinkWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl TallyError {
    /// Exit status the binary uses when this error aborts the run.
    pub fn exit_code(&self) -> i32 {
        match self {
            TallyError::Config(_) => EXIT_CONFIG,
            TallyError::RuleFileRead { .. }
            | TallyError::MalformedRule { .. }
            | TallyError::InvalidPattern { .. } => EXIT_RULE_LOAD,
            TallyError::DataRead { .. } => EXIT_DATA,
            TallyError::SinkWrite { .. } => EXIT_SINK,
            TallyError::Io(_) => EXIT_OTHER,
        }
    }

    /// True for errors raised before any data line is processed.
    pub fn is_load_error(&self) -> bool {
        self.exit_code() == EXIT_RULE_LOAD
    }
}
