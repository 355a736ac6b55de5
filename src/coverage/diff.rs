//! Differences between two coverage summaries
//!
//! Both diffs walk the sorted union of keys from the two summaries, so output
//! order never depends on the order in which either report listed its files.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::{FileCoverage, GroupCoverage, Summary};

/// Where a key was found across the two summaries being compared.
///
/// A key always comes from one of the two summaries, so there is no variant
/// for "neither".
#[derive(Debug)]
pub enum Sides<'a, T> {
    OnlyLeft(&'a T),
    OnlyRight(&'a T),
    Both(&'a T, &'a T),
}

impl<'a, T> Sides<'a, T> {
    pub fn left(&self) -> Option<&'a T> {
        match *self {
            Sides::OnlyLeft(left) | Sides::Both(left, _) => Some(left),
            Sides::OnlyRight(_) => None,
        }
    }

    pub fn right(&self) -> Option<&'a T> {
        match *self {
            Sides::OnlyRight(right) | Sides::Both(_, right) => Some(right),
            Sides::OnlyLeft(_) => None,
        }
    }

    /// Presence on a single side always counts as a difference
    pub fn differs(&self, same: impl Fn(&T, &T) -> bool) -> bool {
        match *self {
            Sides::Both(left, right) => !same(left, right),
            Sides::OnlyLeft(_) | Sides::OnlyRight(_) => true,
        }
    }
}

/// A value before and after; `None` when the entry is missing on that side
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub from: Option<f64>,
    pub to: Option<f64>,
}

impl Change {
    fn of<T>(sides: &Sides<'_, T>, value: impl Fn(&T) -> f64) -> Self {
        Self {
            from: sides.left().map(&value),
            to: sides.right().map(&value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileCoverageDiff {
    pub filename: String,
    pub lines: Change,
    pub branches: Change,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupCoverageDiff {
    pub name: String,
    pub from: Option<f64>,
    pub to: Option<f64>,
}

/// File and group diffs between two summaries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoverageDiff {
    pub files: Vec<FileCoverageDiff>,
    pub groups: Vec<GroupCoverageDiff>,
}

impl CoverageDiff {
    pub fn between(a: &Summary, b: &Summary, groups_diff_only: bool) -> Self {
        Self {
            files: diff_files(a, b),
            groups: diff_groups(a, b, groups_diff_only),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.groups.is_empty()
    }
}

/// Files whose coverage changed, appeared or disappeared between `a` and `b`.
///
/// Percentages are compared exactly; both sides are already truncated to
/// 2 decimals.
pub fn diff_files(a: &Summary, b: &Summary) -> Vec<FileCoverageDiff> {
    let (left, right) = (a.file_index(), b.file_index());

    let diffs: Vec<FileCoverageDiff> = union_sides(&left, &right)
        .into_iter()
        .filter(|(filename, sides)| {
            let changed = sides.differs(same_file_coverage);
            trace!(filename = *filename, changed, "compared file coverage");
            changed
        })
        .map(|(filename, sides)| FileCoverageDiff {
            filename: filename.to_string(),
            lines: Change::of(&sides, |f| f.lines),
            branches: Change::of(&sides, |f| f.branches),
        })
        .collect();

    debug!(
        left = left.len(),
        right = right.len(),
        changed = diffs.len(),
        "diffed file coverage"
    );

    diffs
}

/// Group coverage between `a` and `b`.
///
/// With `diff_only` only changed, added and removed groups are reported;
/// otherwise every group from either summary is.
pub fn diff_groups(a: &Summary, b: &Summary, diff_only: bool) -> Vec<GroupCoverageDiff> {
    let (left, right) = (a.group_index(), b.group_index());

    let diffs: Vec<GroupCoverageDiff> = union_sides(&left, &right)
        .into_iter()
        .filter(|(_, sides)| !diff_only || sides.differs(same_group_coverage))
        .map(|(name, sides)| GroupCoverageDiff {
            name: name.to_string(),
            from: sides.left().map(|g| g.covered_percent),
            to: sides.right().map(|g| g.covered_percent),
        })
        .collect();

    debug!(
        left = left.len(),
        right = right.len(),
        reported = diffs.len(),
        diff_only,
        "diffed group coverage"
    );

    diffs
}

fn same_file_coverage(left: &FileCoverage, right: &FileCoverage) -> bool {
    left.lines == right.lines && left.branches == right.branches
}

fn same_group_coverage(left: &GroupCoverage, right: &GroupCoverage) -> bool {
    left.covered_percent == right.covered_percent
}

/// Pair up entries by key over the sorted union of both key sets
fn union_sides<'a, T>(
    left: &HashMap<&'a str, &'a T>,
    right: &HashMap<&'a str, &'a T>,
) -> Vec<(&'a str, Sides<'a, T>)> {
    let keys: BTreeSet<&'a str> = left.keys().chain(right.keys()).copied().collect();

    keys.into_iter()
        .map(|key| {
            let sides = match (left.get(key).copied(), right.get(key).copied()) {
                (Some(l), Some(r)) => Sides::Both(l, r),
                (Some(l), None) => Sides::OnlyLeft(l),
                (None, Some(r)) => Sides::OnlyRight(r),
                (None, None) => unreachable!("no coverages for {}", key),
            };
            (key, sides)
        })
        .collect()
}
