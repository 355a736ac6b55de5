//! Per-file and per-group coverage summaries

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{RawBranch, RawReport};
use crate::error::Result;

/// Coverage percentages for a single file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileCoverage {
    pub filename: String,
    /// Percentage of executable lines hit, floored to 2 decimals
    pub lines: f64,
    /// Percentage of branches taken, floored to 2 decimals
    pub branches: f64,
}

/// Coverage percentage for a logical group of files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupCoverage {
    pub name: String,
    pub covered_percent: f64,
}

/// Summarized state of one report. Lists keep the report's key order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub files: Vec<FileCoverage>,
    pub groups: Vec<GroupCoverage>,
}

impl Summary {
    /// Lookup of files by filename, built from `files` on each call
    pub fn file_index(&self) -> HashMap<&str, &FileCoverage> {
        self.files.iter().map(|f| (f.filename.as_str(), f)).collect()
    }

    /// Lookup of groups by name, built from `groups` on each call
    pub fn group_index(&self) -> HashMap<&str, &GroupCoverage> {
        self.groups.iter().map(|g| (g.name.as_str(), g)).collect()
    }
}

/// Build a summary from a raw report
pub fn summarize(report: &RawReport) -> Summary {
    let files: Vec<FileCoverage> = report
        .coverage
        .iter()
        .map(|(filename, data)| FileCoverage {
            filename: filename.to_string(),
            lines: line_percentage(&data.lines),
            branches: branch_percentage(&data.branches),
        })
        .collect();

    // Groups are computed by the coverage tool; copy them as-is
    let groups: Vec<GroupCoverage> = report
        .groups
        .iter()
        .map(|(name, group)| GroupCoverage {
            name: name.to_string(),
            covered_percent: group.lines.covered_percent,
        })
        .collect();

    debug!(files = files.len(), groups = groups.len(), "summarized coverage report");

    Summary { files, groups }
}

/// Parse a JSON report and summarize it
pub fn summarize_json(json: &str) -> Result<Summary> {
    let report = RawReport::from_json_str(json)?;
    Ok(summarize(&report))
}

/// Line coverage over executable lines. No executable lines counts as 100.
pub fn line_percentage(lines: &[Option<u64>]) -> f64 {
    let (covered, total) = lines
        .iter()
        .flatten()
        .fold((0usize, 0usize), |(covered, total), &hits| {
            (covered + usize::from(hits > 0), total + 1)
        });
    floored_percentage(covered, total)
}

/// Branch coverage. No branches counts as 100.
pub fn branch_percentage(branches: &[RawBranch]) -> f64 {
    let covered = branches.iter().filter(|b| b.coverage > 0).count();
    floored_percentage(covered, branches.len())
}

/// `covered / total * 100` truncated to 2 decimals.
///
/// Truncation happens on integers (hundredths of a percent) so that values
/// such as 29/100 come out as 29.0 rather than 28.99.
fn floored_percentage(covered: usize, total: usize) -> f64 {
    if total == 0 {
        return 100.0;
    }
    let hundredths = (covered as u128 * 10_000) / total as u128;
    hundredths as f64 / 100.0
}
