//! LCOV format parser
//!
//! Builds raw per-line and per-branch hit data from `DA` and `BRDA` records.
//! Summary records (`LF`, `LH`, `BRF`, `BRH`) are ignored; percentages are
//! always recomputed from the detail records.

use std::collections::HashMap;

use crate::coverage::{OrderedMap, RawBranch, RawFileCoverage, RawReport};
use crate::error::{CoverageError, Result};

/// Highest source line a `DA` record may name. Line vectors are indexed by
/// line number, so anything above this is treated as a corrupt tracefile.
pub const MAX_LINE_NUMBER: usize = 10_000_000;

/// Parse LCOV content from a string
pub fn parse_lcov_str(content: &str) -> Result<RawReport> {
    let mut files: Vec<(String, RawFileCoverage)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    let mut current: Option<(String, RawFileCoverage)> = None;

    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        let line_no = index + 1;

        if let Some(path) = line.strip_prefix("SF:") {
            // Source file start
            if let Some((open, _)) = &current {
                return Err(invalid(line_no, &format!("'{}' has no end_of_record", open)));
            }
            current = Some((path.to_string(), RawFileCoverage::default()));
        } else if let Some(data) = line.strip_prefix("DA:") {
            // Line hits
            let (_, file) = current
                .as_mut()
                .ok_or_else(|| invalid(line_no, "DA record outside of a source file"))?;
            let (number, hits) = parse_da(data)
                .ok_or_else(|| invalid(line_no, &format!("malformed DA record '{}'", data)))?;
            record_line(&mut file.lines, number, hits);
        } else if let Some(data) = line.strip_prefix("BRDA:") {
            // Branch hits
            let (_, file) = current
                .as_mut()
                .ok_or_else(|| invalid(line_no, "BRDA record outside of a source file"))?;
            let branch = parse_brda(data)
                .ok_or_else(|| invalid(line_no, &format!("malformed BRDA record '{}'", data)))?;
            file.branches.push(branch);
        } else if line == "end_of_record" {
            // End of file record
            let (path, file) = current
                .take()
                .ok_or_else(|| invalid(line_no, "end_of_record without a source file"))?;

            match positions.get(&path) {
                Some(&position) => merge(&mut files[position].1, file),
                None => {
                    positions.insert(path.clone(), files.len());
                    files.push((path, file));
                }
            }
        }
    }

    if let Some((path, _)) = current {
        return Err(CoverageError::InvalidInput(format!(
            "lcov: '{}' has no end_of_record",
            path
        )));
    }

    Ok(RawReport {
        coverage: files.into_iter().collect::<OrderedMap<_>>(),
        groups: OrderedMap::new(),
    })
}

fn invalid(line_no: usize, message: &str) -> CoverageError {
    CoverageError::InvalidInput(format!("lcov line {}: {}", line_no, message))
}

/// `DA:<line>,<hits>[,<checksum>]`
fn parse_da(data: &str) -> Option<(usize, u64)> {
    let mut parts = data.split(',');
    let number = parts.next()?.trim().parse::<usize>().ok()?;
    let hits = parts.next()?.trim().parse::<u64>().ok()?;
    if number == 0 || number > MAX_LINE_NUMBER {
        return None;
    }
    Some((number, hits))
}

/// `BRDA:<line>,<block>,<branch>,<taken>` where `taken` is `-` for never evaluated
fn parse_brda(data: &str) -> Option<RawBranch> {
    let (head, taken) = data.rsplit_once(',')?;
    let mut parts = head.splitn(3, ',');
    let line = parts.next()?.trim().parse::<u64>().ok()?;
    let block = parts.next()?.trim();
    let branch = parts.next()?.trim();

    let coverage = match taken.trim() {
        "-" => 0,
        count => count.parse::<u64>().ok()?,
    };

    Some(RawBranch {
        kind: format!("{}:{}", block, branch),
        start_line: line,
        end_line: line,
        coverage,
    })
}

fn record_line(lines: &mut Vec<Option<u64>>, number: usize, hits: u64) {
    if lines.len() < number {
        lines.resize(number, None);
    }
    let slot = &mut lines[number - 1];
    *slot = Some(slot.unwrap_or(0).saturating_add(hits));
}

/// Fold a repeated record for the same file into the first one
fn merge(into: &mut RawFileCoverage, other: RawFileCoverage) {
    for (index, hits) in other.lines.into_iter().enumerate() {
        if let Some(hits) = hits {
            record_line(&mut into.lines, index + 1, hits);
        }
    }
    into.branches.extend(other.branches);
}
