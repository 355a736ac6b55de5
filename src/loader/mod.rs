//! Report loading
//!
//! Provides:
//! - SimpleCov-style JSON reports
//! - LCOV tracefiles

mod lcov;

pub use lcov::*;

use std::fs;
use std::path::Path;
use std::str::FromStr;

use tracing::debug;

use crate::coverage::RawReport;
use crate::error::{CoverageError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Json,
    Lcov,
}

impl ReportFormat {
    /// Guess the format from a file extension, falling back to JSON
    pub fn detect(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .as_deref()
        {
            Some("info") | Some("lcov") => ReportFormat::Lcov,
            _ => ReportFormat::Json,
        }
    }
}

impl FromStr for ReportFormat {
    type Err = CoverageError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" | "simplecov" => Ok(ReportFormat::Json),
            "lcov" => Ok(ReportFormat::Lcov),
            _ => Err(CoverageError::UnknownFormat(s.to_string())),
        }
    }
}

/// Load a raw report from a file
pub fn load_report(path: &Path, format: ReportFormat) -> Result<RawReport> {
    let content = fs::read_to_string(path).map_err(|source| CoverageError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let report = match format {
        ReportFormat::Json => RawReport::from_json_str(&content)?,
        ReportFormat::Lcov => parse_lcov_str(&content)?,
    };

    debug!(
        path = %path.display(),
        ?format,
        files = report.coverage.len(),
        groups = report.groups.len(),
        "loaded coverage report"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_detect_format() {
        assert_eq!(ReportFormat::detect(Path::new("coverage/lcov.info")), ReportFormat::Lcov);
        assert_eq!(ReportFormat::detect(Path::new("out.LCOV")), ReportFormat::Lcov);
        assert_eq!(ReportFormat::detect(Path::new("coverage/coverage.json")), ReportFormat::Json);
        assert_eq!(ReportFormat::detect(Path::new("coverage")), ReportFormat::Json);
    }

    #[test]
    fn test_parse_format_name() {
        assert_eq!("LCOV".parse::<ReportFormat>().unwrap(), ReportFormat::Lcov);
        assert_eq!("simplecov".parse::<ReportFormat>().unwrap(), ReportFormat::Json);
        assert!(matches!(
            "cobertura".parse::<ReportFormat>(),
            Err(CoverageError::UnknownFormat(_))
        ));
    }

    #[test]
    fn test_load_json_report() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("coverage.json");
        fs::write(
            &path,
            r#"{"coverage": {"a.ts": {"lines": [1, 0, null, 2]}}, "groups": {}}"#,
        )
        .unwrap();

        let report = load_report(&path, ReportFormat::Json).unwrap();
        assert_eq!(report.coverage.get("a.ts").unwrap().lines.len(), 4);
    }

    #[test]
    fn test_load_lcov_report() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lcov.info");
        fs::write(&path, "SF:src/main.rs\nDA:1,1\nDA:2,0\nend_of_record\n").unwrap();

        let report = load_report(&path, ReportFormat::detect(&path)).unwrap();
        assert_eq!(
            report.coverage.get("src/main.rs").unwrap().lines,
            vec![Some(1), Some(0)]
        );
    }

    #[test]
    fn test_missing_file() {
        let path = PathBuf::from("/nonexistent/coverage.json");
        let err = load_report(&path, ReportFormat::Json).unwrap_err();
        assert!(matches!(err, CoverageError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/coverage.json"));
    }

    #[test]
    fn test_malformed_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("coverage.json");
        fs::write(&path, r#"{"coverage": {"a.ts": {"lines": "all"}}}"#).unwrap();

        let err = load_report(&path, ReportFormat::Json).unwrap_err();
        assert!(matches!(err, CoverageError::InvalidInput(_)));
    }
}
