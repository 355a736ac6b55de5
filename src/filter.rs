//! Exclude files from a summary by glob pattern

use glob::Pattern;
use tracing::debug;

use crate::coverage::Summary;
use crate::error::{CoverageError, Result};

#[derive(Debug, Clone, Default)]
pub struct FileFilter {
    patterns: Vec<Pattern>,
}

impl FileFilter {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Pattern::new(p.as_ref()).map_err(|e| {
                    CoverageError::InvalidInput(format!(
                        "invalid exclude pattern '{}': {}",
                        p.as_ref(),
                        e
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { patterns })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn excludes(&self, filename: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(filename))
    }

    /// Copy of `summary` without excluded files. Groups are kept as-is.
    pub fn apply(&self, summary: &Summary) -> Summary {
        let files: Vec<_> = summary
            .files
            .iter()
            .filter(|f| !self.excludes(&f.filename))
            .cloned()
            .collect();

        if files.len() != summary.files.len() {
            debug!(
                excluded = summary.files.len() - files.len(),
                "filtered files from summary"
            );
        }

        Summary {
            files,
            groups: summary.groups.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coverage::{FileCoverage, GroupCoverage};

    fn summary() -> Summary {
        let files = ["vendor/lib.js", "src/app.ts", "src/gen/api.ts", "spec/app_spec.ts"]
            .iter()
            .map(|name| FileCoverage {
                filename: name.to_string(),
                lines: 50.0,
                branches: 100.0,
            })
            .collect();

        Summary {
            files,
            groups: vec![GroupCoverage {
                name: "vendor".to_string(),
                covered_percent: 1.0,
            }],
        }
    }

    #[test]
    fn test_excludes_matching_files() {
        let filter = FileFilter::new(&["vendor/**", "src/gen/*"]).unwrap();
        let filtered = filter.apply(&summary());

        let names: Vec<&str> = filtered.files.iter().map(|f| f.filename.as_str()).collect();
        assert_eq!(names, vec!["src/app.ts", "spec/app_spec.ts"]);
        assert_eq!(filtered.groups.len(), 1);
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let filter = FileFilter::new::<&str>(&[]).unwrap();
        assert!(filter.is_empty());
        assert_eq!(filter.apply(&summary()), summary());
    }

    #[test]
    fn test_invalid_pattern() {
        let err = FileFilter::new(&["src/[".to_string()]).unwrap_err();
        assert!(matches!(err, CoverageError::InvalidInput(_)));
        assert!(err.to_string().contains("src/["));
    }
}
