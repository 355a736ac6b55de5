//! covdiff - coverage summaries and snapshot diffs
//!
//! A library for turning raw coverage reports into comparable numbers:
//! - Per-file line and branch percentages, truncated to 2 decimals
//! - Per-group percentages taken from the report
//! - Sorted file and group diffs between two snapshots
//! - Gate checks over a diff for CI

pub mod config;
pub mod coverage;
pub mod error;
pub mod filter;
pub mod loader;

pub use coverage::{
    diff_files, diff_groups, evaluate, summarize, summarize_json, CoverageDiff, FileCoverage,
    FileCoverageDiff, GateConfig, GateResult, GroupCoverage, GroupCoverageDiff, RawReport, Summary,
};
pub use error::{CoverageError, Result};
pub use filter::FileFilter;
pub use loader::{load_report, parse_lcov_str, ReportFormat};
