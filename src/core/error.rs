//! Error types for Robojudge.
//!
//! Uses thiserror for structured errors with context. Two families exist:
//! - Failures (`LoadError`, `TaskError`, `ConfigError`) stop the operation
//!   that raised them.
//! - Findings (`ValidationError`) describe invalid submission data. They are
//!   collected into a `ValidationReport` and never interrupt sibling checks.

use crate::core::types::{display_date, ColumnType};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for Robojudge.
///
/// This enum encompasses all failure categories and enables automatic
/// conversion between specific error types.
#[derive(Error, Debug)]
pub enum JudgeError {
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    #[error("Task error: {0}")]
    Task(#[from] TaskError),

    #[error("Invalid {field} '{value}': expected format YYYY-MM-DD")]
    InvalidDate { field: String, value: String },
}

/// Errors raised while reading a table from disk.
///
/// Any of these is fatal to the validation call that triggered the load.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("File not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed table {}{}: {message}", .path.display(), line_suffix(.line))]
    Malformed {
        path: PathBuf,
        line: Option<u64>,
        message: String,
    },

    #[error("Table {} is missing required columns: {}", .path.display(), .columns.join(", "))]
    MissingColumns { path: PathBuf, columns: Vec<String> },
}

fn line_suffix(line: &Option<u64>) -> String {
    match line {
        Some(line) => format!(" (line {})", line),
        None => String::new(),
    }
}

/// Errors from the prescription task runner.
#[derive(Error, Debug)]
pub enum TaskError {
    #[error("Failed to read task list {}: {source}", .path.display())]
    TaskListUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed task list {}: {message}", .path.display())]
    TaskListMalformed { path: PathBuf, message: String },

    #[error("Failed to launch '{program}': {source}")]
    LaunchFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors reading the configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Category a validation finding belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Column presence or column type.
    Structural,
    /// Intervention levels out of range.
    ValueRange,
    /// Geographies absent from the submission.
    Coverage,
    /// Gaps or misorderings in a geography's dates.
    Continuity,
}

/// A problem found in a submission.
///
/// The `Display` output of each variant is the human-readable message
/// surfaced to submitters.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValidationError {
    #[error("Missing columns: {}", .columns.join(", "))]
    MissingColumns { columns: Vec<String> },

    #[error("Column {column} contains non date values: {found}")]
    NonDateColumn { column: String, found: ColumnType },

    #[error("Column {column} contains non numerical values: {found}")]
    NonNumericColumn { column: String, found: ColumnType },

    #[error("Column {column} contains NaN values")]
    NullValues { column: String },

    #[error("Column {column} contains negative values")]
    NegativeValues { column: String },

    #[error("Column {column} contains values higher than max possible value")]
    AboveCeiling { column: String, ceiling: i64 },

    #[error("Missing countries / regions: {}", .geo_ids.join(", "))]
    MissingGeos { geo_ids: Vec<String> },

    #[error("{geo_id}: Expected prediction for date {} but got {}", display_date(.expected), display_date(.actual))]
    DateMismatch {
        geo_id: String,
        expected: Option<NaiveDate>,
        actual: Option<NaiveDate>,
    },
}

impl ValidationError {
    /// Get the category of this finding.
    pub fn category(&self) -> ErrorCategory {
        match self {
            ValidationError::MissingColumns { .. }
            | ValidationError::NonDateColumn { .. }
            | ValidationError::NonNumericColumn { .. } => ErrorCategory::Structural,
            ValidationError::NullValues { .. }
            | ValidationError::NegativeValues { .. }
            | ValidationError::AboveCeiling { .. } => ErrorCategory::ValueRange,
            ValidationError::MissingGeos { .. } => ErrorCategory::Coverage,
            ValidationError::DateMismatch { .. } => ErrorCategory::Continuity,
        }
    }
}

/// Result type alias for Robojudge operations.
pub type JudgeResult<T> = Result<T, JudgeError>;

/// Result type alias for table loading.
pub type LoadResult<T> = Result<T, LoadError>;

// ============================================================================
// Validation Report
// ============================================================================

/// Everything found while validating one submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Whether validation passed without errors.
    pub success: bool,
    /// Findings, in the order they were produced.
    pub errors: Vec<ValidationError>,
    /// Number of prescription variants that were checked.
    pub variants_checked: usize,
    /// Time taken for validation in milliseconds.
    pub duration_ms: u64,
}

impl ValidationReport {
    /// Create a new empty report (success).
    pub fn new() -> Self {
        Self {
            success: true,
            errors: Vec::new(),
            variants_checked: 0,
            duration_ms: 0,
        }
    }

    /// Add an error to the report.
    pub fn add_error(&mut self, error: ValidationError) {
        self.success = false;
        self.errors.push(error);
    }

    /// Add several errors, keeping their order.
    pub fn extend<I: IntoIterator<Item = ValidationError>>(&mut self, errors: I) {
        for error in errors {
            self.add_error(error);
        }
    }

    /// Check if the submission is valid.
    pub fn is_valid(&self) -> bool {
        self.success
    }

    /// The human-readable error strings, in order.
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.to_string()).collect()
    }

    /// Count findings of one category.
    pub fn count(&self, category: ErrorCategory) -> usize {
        self.errors.iter().filter(|e| e.category() == category).count()
    }

    /// Get a human-readable summary.
    pub fn summary(&self) -> String {
        if self.success {
            format!(
                "Submission is valid ({} prescription(s) checked)",
                self.variants_checked
            )
        } else {
            format!(
                "Submission has {} error(s) across {} prescription(s)",
                self.errors.len(),
                self.variants_checked
            )
        }
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}
