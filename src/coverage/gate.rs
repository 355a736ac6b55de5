//! Coverage gate validation

use colored::Colorize;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Change, CoverageDiff};

/// Limits on how far coverage may drop between two snapshots.
///
/// Drops are in percentage points. `None` leaves the metric unchecked.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GateConfig {
    #[serde(default)]
    pub max_line_drop: Option<f64>,
    #[serde(default)]
    pub max_branch_drop: Option<f64>,
    #[serde(default)]
    pub max_group_drop: Option<f64>,
    /// Treat files missing from the new snapshot as violations
    #[serde(default)]
    pub fail_on_removed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Lines,
    Branches,
    Group,
    Removed,
}

/// A single file or group that failed the gate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    pub subject: String,
    pub metric: Metric,
    pub from: Option<f64>,
    pub to: Option<f64>,
    /// `from - to`, when both sides exist
    pub drop: Option<f64>,
}

/// Result of gate validation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GateResult {
    pub passed: bool,
    pub violations: Vec<Violation>,
}

impl GateResult {
    pub fn print_summary(&self) {
        if self.passed {
            eprintln!("  {} Coverage gate passed", "✓".green());
            return;
        }

        eprintln!(
            "  {} Coverage gate failed ({} violation{})",
            "✗".red(),
            self.violations.len(),
            if self.violations.len() == 1 { "" } else { "s" }
        );

        for violation in &self.violations {
            match (violation.metric, violation.from, violation.to, violation.drop) {
                (Metric::Removed, Some(from), _, _) => {
                    eprintln!(
                        "    {} {} removed (was {:.2}%)",
                        "✗".red(),
                        violation.subject.cyan(),
                        from
                    );
                }
                (metric, Some(from), Some(to), Some(drop)) => {
                    eprintln!(
                        "    {} {} {}: {:.2}% → {:.2}% ({})",
                        "↓".red(),
                        violation.subject.cyan(),
                        metric_label(metric),
                        from,
                        to,
                        format!("-{:.2}%", drop).red()
                    );
                }
                _ => {
                    eprintln!("    {} {}", "✗".red(), violation.subject.cyan());
                }
            }
        }
    }
}

fn metric_label(metric: Metric) -> &'static str {
    match metric {
        Metric::Lines => "lines",
        Metric::Branches => "branches",
        Metric::Group => "group",
        Metric::Removed => "removed",
    }
}

/// Validate a diff against the configured limits
pub fn evaluate(diff: &CoverageDiff, config: &GateConfig) -> GateResult {
    let mut violations = Vec::new();

    for file in &diff.files {
        if config.fail_on_removed && file.lines.from.is_some() && file.lines.to.is_none() {
            violations.push(Violation {
                subject: file.filename.clone(),
                metric: Metric::Removed,
                from: file.lines.from,
                to: None,
                drop: None,
            });
            continue;
        }

        if let Some(violation) = check_drop(
            &file.filename,
            Metric::Lines,
            file.lines,
            config.max_line_drop,
        ) {
            violations.push(violation);
        }
        if let Some(violation) = check_drop(
            &file.filename,
            Metric::Branches,
            file.branches,
            config.max_branch_drop,
        ) {
            violations.push(violation);
        }
    }

    for group in &diff.groups {
        let change = Change {
            from: group.from,
            to: group.to,
        };
        if let Some(violation) =
            check_drop(&group.name, Metric::Group, change, config.max_group_drop)
        {
            violations.push(violation);
        }
    }

    debug!(violations = violations.len(), "evaluated coverage gate");

    GateResult {
        passed: violations.is_empty(),
        violations,
    }
}

/// Drops are compared in whole hundredths of a percentage point; file
/// percentages are already truncated to 2 decimals.
fn check_drop(
    subject: &str,
    metric: Metric,
    change: Change,
    max_drop: Option<f64>,
) -> Option<Violation> {
    let (from, to, max) = match (change.from, change.to, max_drop) {
        (Some(from), Some(to), Some(max)) => (from, to, max),
        _ => return None,
    };

    let drop = to_hundredths(from - to);
    if drop > to_hundredths(max) {
        Some(Violation {
            subject: subject.to_string(),
            metric,
            from: Some(from),
            to: Some(to),
            drop: Some(drop as f64 / 100.0),
        })
    } else {
        None
    }
}

fn to_hundredths(value: f64) -> i64 {
    (value * 100.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coverage::{FileCoverageDiff, GroupCoverageDiff};

    type Pair = (Option<f64>, Option<f64>);

    fn file_diff(filename: &str, lines: Pair, branches: Pair) -> FileCoverageDiff {
        FileCoverageDiff {
            filename: filename.to_string(),
            lines: Change {
                from: lines.0,
                to: lines.1,
            },
            branches: Change {
                from: branches.0,
                to: branches.1,
            },
        }
    }

    #[test]
    fn test_gate_validation() {
        let diff = CoverageDiff {
            files: vec![file_diff("a.rs", (Some(80.0), Some(75.0)), (Some(50.0), Some(50.0)))],
            groups: vec![],
        };

        // Passing case
        let config = GateConfig {
            max_line_drop: Some(5.0),
            ..Default::default()
        };
        assert!(evaluate(&diff, &config).passed);

        // Failing case
        let config = GateConfig {
            max_line_drop: Some(2.0),
            ..Default::default()
        };
        let result = evaluate(&diff, &config);
        assert!(!result.passed);
        assert_eq!(
            result.violations,
            vec![Violation {
                subject: "a.rs".to_string(),
                metric: Metric::Lines,
                from: Some(80.0),
                to: Some(75.0),
                drop: Some(5.0),
            }]
        );
    }

    #[test]
    fn test_unconfigured_gate_passes() {
        let diff = CoverageDiff {
            files: vec![file_diff("a.rs", (Some(100.0), Some(0.0)), (Some(100.0), Some(0.0)))],
            groups: vec![GroupCoverageDiff {
                name: "all".to_string(),
                from: Some(90.0),
                to: Some(10.0),
            }],
        };
        assert!(evaluate(&diff, &GateConfig::default()).passed);
    }

    #[test]
    fn test_added_and_removed_files() {
        let diff = CoverageDiff {
            files: vec![
                file_diff("new.rs", (None, Some(0.0)), (None, Some(0.0))),
                file_diff("old.rs", (Some(90.0), None), (Some(90.0), None)),
            ],
            groups: vec![],
        };

        let config = GateConfig {
            max_line_drop: Some(0.0),
            max_branch_drop: Some(0.0),
            ..Default::default()
        };
        assert!(evaluate(&diff, &config).passed);

        let config = GateConfig {
            fail_on_removed: true,
            ..config
        };
        let result = evaluate(&diff, &config);
        assert!(!result.passed);
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].subject, "old.rs");
        assert_eq!(result.violations[0].metric, Metric::Removed);
    }

    #[test]
    fn test_group_and_branch_drops() {
        let diff = CoverageDiff {
            files: vec![file_diff("a.rs", (Some(70.0), Some(72.0)), (Some(60.0), Some(40.0)))],
            groups: vec![
                GroupCoverageDiff {
                    name: "core".to_string(),
                    from: Some(88.5),
                    to: Some(80.0),
                },
                GroupCoverageDiff {
                    name: "added".to_string(),
                    from: None,
                    to: Some(1.0),
                },
            ],
        };

        let config = GateConfig {
            max_line_drop: Some(0.0),
            max_branch_drop: Some(10.0),
            max_group_drop: Some(1.0),
            fail_on_removed: false,
        };
        let result = evaluate(&diff, &config);

        let metrics: Vec<(&str, Metric)> = result
            .violations
            .iter()
            .map(|v| (v.subject.as_str(), v.metric))
            .collect();
        assert_eq!(metrics, vec![("a.rs", Metric::Branches), ("core", Metric::Group)]);
        assert_eq!(result.violations[1].drop, Some(8.5));
    }

    #[test]
    fn test_drop_equal_to_limit_passes() {
        let diff = CoverageDiff {
            files: vec![file_diff(
                "a.rs",
                (Some(1.1), Some(1.0)),
                (Some(66.67), Some(66.66)),
            )],
            groups: vec![GroupCoverageDiff {
                name: "core".to_string(),
                from: Some(80.3),
                to: Some(80.0),
            }],
        };

        let config = GateConfig {
            max_line_drop: Some(0.1),
            max_branch_drop: Some(0.01),
            max_group_drop: Some(0.3),
            fail_on_removed: false,
        };
        assert!(evaluate(&diff, &config).passed);

        let config = GateConfig {
            max_line_drop: Some(0.09),
            ..config
        };
        let result = evaluate(&diff, &config);
        assert!(!result.passed);
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].metric, Metric::Lines);
        assert_eq!(result.violations[0].drop, Some(0.1));
    }
}
