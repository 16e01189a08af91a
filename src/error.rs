//! Error types for the survey pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal conditions that abort an aggregation run.
///
/// Row-level anomalies never surface here; they are logged and the offending
/// row (or metric) is skipped.
#[derive(Debug, Error)]
pub enum SurveyError {
    #[error("File not found - '{}'", path.display())]
    FileNotFound { path: PathBuf },

    #[error("Missing expected columns: {}", columns.join(", "))]
    MissingColumns { columns: Vec<String> },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The interactive input stream ended before an answer was given.
    #[error("input closed")]
    InputClosed,
}
