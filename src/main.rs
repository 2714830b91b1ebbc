//! `re2` - run a list of RE2-syntax regexes across a data set.

use anyhow::Context;
use clap::{ArgAction, Parser, ValueEnum};
use env_logger::{Builder, Env, Target};
use regex_tally::error::EXIT_OTHER;
use regex_tally::{
    DumpStatus, PreparedRun, Report, ReportFormat, RunConfig, SortOrder, TallyError,
    DEFAULT_UNMATCHED_PATH,
};
use std::env;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

const AFTER_HELP: &str = "\
By default, results are printed in the order listed in REGEX_LIST.
--alpha and --desc change that order and cannot be combined.

REGEX_LIST format, one rule per line:
    # comment
    <REGEX_NAME><TAB><REGEX>[<TAB>ignored]

SEE ALSO
    https://github.com/google/re2/wiki/syntax
    https://docs.rs/regex/latest/regex/#syntax";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Text,
    Json,
}

impl From<FormatArg> for ReportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => ReportFormat::Text,
            FormatArg::Json => ReportFormat::Json,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "re2", version, about, after_help = AFTER_HELP)]
struct Args {
    /// Location of the REGEX_LIST file.
    #[arg(short, long, value_name = "REGEX_LIST")]
    regex: PathBuf,

    /// Location of the file containing the data set to test.
    #[arg(short, long, value_name = "FILE")]
    data: PathBuf,

    /// File where unmatched records are placed.
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_UNMATCHED_PATH)]
    unmatch: PathBuf,

    /// Dump the records matched by REGEX_NAME to REGEX_NAME.txt.
    #[arg(long, value_name = "REGEX_NAME")]
    dumpreg: Option<String>,

    /// Directory for the dump file instead of the working directory.
    #[arg(long, value_name = "DIR", requires = "dumpreg")]
    dump_dir: Option<PathBuf>,

    /// Print results with regex names listed alphabetically.
    #[arg(long, conflicts_with = "desc")]
    alpha: bool,

    /// Print results with hit counts in descending order.
    #[arg(long)]
    desc: bool,

    /// Report format.
    #[arg(long, value_enum, default_value_t = FormatArg::Text)]
    format: FormatArg,

    /// More log output on stderr (-v info, -vv debug). RE2_LOG or RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn to_config(&self) -> Result<RunConfig, TallyError> {
        let order = SortOrder::from_flags(self.alpha, self.desc)?;
        let mut config = RunConfig::new(&self.regex, &self.data)
            .with_unmatched_path(&self.unmatch)
            .with_order(order)
            .with_format(self.format.into());
        if let Some(name) = &self.dumpreg {
            config = config.with_dump_rule(name);
        }
        if let Some(dir) = &self.dump_dir {
            config = config.with_dump_dir(dir);
        }
        Ok(config)
    }
}

/// `RE2_LOG` wins over `RUST_LOG`, which wins over the `-v` count.
fn init_logger(verbose: u8) -> anyhow::Result<()> {
    let default_filter = env::var("RUST_LOG").unwrap_or_else(|_| {
        match verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
        .to_string()
    });
    Builder::from_env(Env::new().filter_or("RE2_LOG", default_filter))
        .target(Target::Stderr)
        .format_timestamp(None)
        .try_init()
        .context("failed to initialize logger")
}

fn tally(args: &Args) -> Result<(), TallyError> {
    let config = args.to_config()?;
    let prepared = PreparedRun::prepare(&config)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match prepared.dump_status() {
        DumpStatus::Enabled { rule, path } => {
            writeln!(out, "dumping '{}' to {}", rule, path.display())?;
        }
        DumpStatus::UnknownRule(rule) => {
            eprintln!("no matching regex name found for '{rule}'. nothing to dump");
        }
        DumpStatus::NotRequested => {}
    }
    out.flush()?;

    let outcome = prepared.execute()?;

    let report = Report::new(
        &outcome.rules,
        &outcome.stats,
        &config.rules_path,
        &config.data_path,
    )
    .with_order(config.order);

    if let Some(mismatch) = report.mismatch() {
        eprintln!(
            "\t!!matchSum ({}) != matchCount ({})",
            mismatch.hit_sum, mismatch.matched_lines
        );
    }

    report.render(config.format, &mut out)?;
    out.flush()?;
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(err) = init_logger(args.verbose) {
        eprintln!("re2: {err:#}");
        return ExitCode::from(EXIT_OTHER as u8);
    }

    match tally(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("re2: {err}");
            ExitCode::from(err.exit_code() as u8)
        }
    }
}
