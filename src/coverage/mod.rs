//! Coverage module
//!
//! Provides:
//! - Raw report model (per-line and per-branch hit data, pre-computed groups)
//! - Summaries with per-file and per-group percentages
//! - Diffs between two summaries
//! - Gate evaluation over a diff

mod diff;
mod gate;
mod ordered;
mod summary;

pub use diff::*;
pub use gate::*;
pub use ordered::OrderedMap;
pub use summary::*;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A raw coverage report as written by the coverage tool.
///
/// `coverage` maps filename to line and branch hit data; `groups` maps group
/// name to a pre-computed percentage. Other top-level keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawReport {
    pub coverage: OrderedMap<RawFileCoverage>,
    #[serde(default)]
    pub groups: OrderedMap<RawGroup>,
}

impl RawReport {
    /// Parse a report from JSON text
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Interpret an already-parsed JSON document as a report
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }
}

/// Hit data for a single file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFileCoverage {
    /// One entry per source line; `None` marks a line that is not executable.
    pub lines: Vec<Option<u64>>,
    #[serde(default)]
    pub branches: Vec<RawBranch>,
}

/// A single branch outcome. Only `coverage` takes part in percentages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawBranch {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub start_line: u64,
    #[serde(default)]
    pub end_line: u64,
    pub coverage: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawGroup {
    pub lines: RawGroupLines,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawGroupLines {
    pub covered_percent: f64,
}
