//! Result reporter.
//!
//! Renders the run summary and one row per rule, in the requested order, as
//! fixed-width text or as JSON.

use crate::classifier::RunStats;
use crate::config::{ReportFormat, SortOrder};
use crate::error::Result;
use crate::ruleset::{Rule, RuleSet};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Order rules for display.
///
/// Alphabetical order compares names byte-wise. Descending order breaks hit
/// count ties by ascending sequence number.
pub fn sorted_rules(rules: &RuleSet, order: SortOrder) -> Vec<&Rule> {
    let mut sorted: Vec<&Rule> = rules.iter().collect();
    match order {
        SortOrder::Sequence => {}
        SortOrder::Alphabetical => sorted.sort_by(|a, b| a.name().cmp(b.name())),
        SortOrder::HitsDescending => sorted.sort_by(|a, b| {
            b.hits()
                .cmp(&a.hits())
                .then_with(|| a.sequence().cmp(&b.sequence()))
        }),
    }
    sorted
}

/// One per-rule row of the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleRow<'a> {
    pub name: &'a str,
    pub sequence: usize,
    pub hits: u64,
    pub duration_seconds: f64,
}

impl<'a> From<&'a Rule> for RuleRow<'a> {
    fn from(rule: &'a Rule) -> Self {
        Self {
            name: rule.name(),
            sequence: rule.sequence(),
            hits: rule.hits(),
            duration_seconds: rule.elapsed().as_secs_f64(),
        }
    }
}

/// Disagreement between the per-rule hit sum and the matched-line counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HitMismatch {
    pub hit_sum: u64,
    pub matched_lines: u64,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    regex_list: String,
    data_set: String,
    run_date: String,
    order: SortOrder,
    elapsed_seconds: f64,
    lines_read: u64,
    regexes_loaded: usize,
    matched_lines: u64,
    unmatched_lines: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    hit_mismatch: Option<HitMismatch>,
    matches: Vec<RuleRow<'a>>,
}

/// Everything the final report is built from.
#[derive(Debug, Clone)]
pub struct Report<'a> {
    rules: &'a RuleSet,
    stats: &'a RunStats,
    rules_path: &'a Path,
    data_path: &'a Path,
    run_date: DateTime<Utc>,
    order: SortOrder,
}

impl<'a> Report<'a> {
    pub fn new(
        rules: &'a RuleSet,
        stats: &'a RunStats,
        rules_path: &'a Path,
        data_path: &'a Path,
    ) -> Self {
        Self {
            rules,
            stats,
            rules_path,
            data_path,
            run_date: Utc::now(),
            order: SortOrder::default(),
        }
    }

    pub fn with_order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    pub fn with_run_date(mut self, run_date: DateTime<Utc>) -> Self {
        self.run_date = run_date;
        self
    }

    /// Sum of hit counts across all rules.
    pub fn hit_sum(&self) -> u64 {
        self.rules.total_hits()
    }

    pub fn mismatch(&self) -> Option<HitMismatch> {
        let hit_sum = self.hit_sum();
        (hit_sum != self.stats.matched).then_some(HitMismatch {
            hit_sum,
            matched_lines: self.stats.matched,
        })
    }

    pub fn rows(&self) -> Vec<RuleRow<'a>> {
        sorted_rules(self.rules, self.order)
            .into_iter()
            .map(RuleRow::from)
            .collect()
    }

    pub fn render<W: Write>(&self, format: ReportFormat, out: &mut W) -> Result<()> {
        match format {
            ReportFormat::Text => self.render_text(out),
            ReportFormat::Json => self.render_json(out),
        }
    }

    /// Fixed-width text report.
    pub fn render_text<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "SUMMARY\n")?;
        writeln!(out, "regex list : {}", self.rules_path.display())?;
        writeln!(out, "  data set : {}", self.data_path.display())?;
        writeln!(out, "  run date : {:>20}", self.formatted_run_date())?;
        writeln!(
            out,
            "{:>10.6} : elapsed (seconds)",
            self.stats.elapsed.as_secs_f64()
        )?;
        writeln!(out, "{:>10} : data lines read in", self.stats.lines_read)?;
        writeln!(out, "{:>10} : regexes loaded", self.rules.len())?;
        writeln!(out, "{:>10} : matched lines", self.hit_sum())?;
        writeln!(out, "{:>10} : unmatched lines\n", self.stats.unmatched)?;

        writeln!(out, "MATCHES\n")?;
        writeln!(out, "{:>30} {:>8} {:>8}   {:>11}", "REGEX", "ORD", "HITS", "DURATION")?;
        for row in self.rows() {
            writeln!(
                out,
                "{:>30} {:>8} {:>8}    {:>10.6}",
                row.name, row.sequence, row.hits, row.duration_seconds
            )?;
        }
        writeln!(out)?;
        Ok(())
    }

    /// The same content as [`Report::render_text`], as one JSON document.
    pub fn render_json<W: Write>(&self, out: &mut W) -> Result<()> {
        let report = JsonReport {
            regex_list: self.rules_path.display().to_string(),
            data_set: self.data_path.display().to_string(),
            run_date: self.formatted_run_date(),
            order: self.order,
            elapsed_seconds: self.stats.elapsed.as_secs_f64(),
            lines_read: self.stats.lines_read,
            regexes_loaded: self.rules.len(),
            matched_lines: self.hit_sum(),
            unmatched_lines: self.stats.unmatched,
            hit_mismatch: self.mismatch(),
            matches: self.rows(),
        };

        serde_json::to_writer_pretty(&mut *out, &report).map_err(std::io::Error::from)?;
        writeln!(out)?;
        Ok(())
    }

    fn formatted_run_date(&self) -> String {
        self.run_date.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}
