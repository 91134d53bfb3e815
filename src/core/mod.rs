//! Core types for the Robojudge validation system.
//!
//! This module contains the foundational pieces shared by every other module:
//! - Column and value types
//! - Column names, the intervention ceiling table and load schemas
//! - Error types and the validation report

pub mod types;
pub mod schema;
pub mod error;

// Re-export commonly used types
pub use types::{ColumnType, DateWindow, Value};
pub use schema::{TableSchema, NPI_CEILINGS};
pub use error::{JudgeError, LoadError, TaskError, ValidationError, ValidationReport};
