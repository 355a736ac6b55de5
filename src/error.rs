//! Error type for the covdiff library

use std::path::PathBuf;

/// Errors raised while loading or interpreting coverage reports.
///
/// The binary converts these into `anyhow::Error` at the boundary.
#[derive(Debug, thiserror::Error)]
pub enum CoverageError {
    /// Report content is structurally wrong: missing fields, wrong types,
    /// negative hit counts, duplicate keys, malformed LCOV records.
    #[error("invalid coverage input: {0}")]
    InvalidInput(String),

    /// Reading a report from disk failed.
    #[error("failed to read {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Requested report format is not supported.
    #[error("unknown coverage format: {0}. Supported: json, lcov")]
    UnknownFormat(String),
}

/// A convenience `Result` type for covdiff operations.
pub type Result<T> = std::result::Result<T, CoverageError>;

impl From<serde_json::Error> for CoverageError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidInput(err.to_string())
    }
}
