//! # Robojudge - Prescription Submission Validation
//!
//! Robojudge runs batches of intervention-plan prescription jobs and checks
//! what they produce. A prescription file lists, for every geography and
//! every day of a requested horizon, the level of twelve non-pharmaceutical
//! interventions, possibly for several alternative policy variants.
//!
//! ## Features
//!
//! - **Typed loading**: CSV input in ISO-8859-1 is parsed into tables whose
//!   column types are decided once, at load time
//! - **Structural checks**: required columns and column types
//! - **Per-variant checks**: intervention ceilings, geography coverage and
//!   day-by-day date continuity, run for each `PrescriptionIndex`
//! - **Collected findings**: every problem is reported, none hides another
//! - **Batch runs**: launch a prescription module for each task in a task
//!   list, skip finished outputs and validate the rest
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use robojudge::prelude::*;
//!
//! let errors = validate_submission(
//!     "2021-01-01",
//!     "2021-01-31",
//!     "data/ip.csv",
//!     "out/prescriptions.csv",
//! )?;
//! for error in &errors {
//!     println!("{}", error);
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`core`]: Column types, schemas, the ceiling table and errors
//! - [`table`]: Typed tables, CSV loading and geography keys
//! - [`validation`]: Validation stages and the pipeline that runs them
//! - [`execution`]: Task list, prescription launcher and run orchestration
//! - [`config`]: TOML configuration

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod core;
pub mod execution;
pub mod table;
pub mod validation;

/// Prelude module for convenient imports.
///
/// Import everything commonly needed with:
/// ```rust,ignore
/// use robojudge::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use crate::core::types::{ColumnType, DateWindow, Value};
    pub use crate::core::schema::{
        npi_ceiling, npi_columns, submission_columns, TableSchema, NPI_CEILINGS,
    };

    // Errors
    pub use crate::core::error::{
        ConfigError, ErrorCategory, JudgeError, JudgeResult, LoadError, TaskError,
        ValidationError, ValidationReport,
    };

    // Tables
    pub use crate::table::frame::{Column, Table};
    pub use crate::table::geo::{geo_id_set, geo_ids, with_geo_id_column, GeoId};
    pub use crate::table::loader::{load_intervention_plan, load_submission, TableLoader};

    // Validation
    pub use crate::validation::pipeline::{parse_window, validate_submission, ValidationPipeline};
    pub use crate::validation::stages::{
        DateContinuityValidation, GeoCoverageValidation, StructuralValidation, ValidationStage,
        ValueRangeValidation, VariantContext,
    };

    // Execution
    pub use crate::execution::launcher::{LaunchOutcome, PrescriptionLauncher, ProcessLauncher};
    pub use crate::execution::progress::{ProgressCallback, ProgressTracker, ProgressUpdate, SkipReason};
    pub use crate::execution::runner::{PrescriptionRunner, RunOptions, RunSummary, TaskOutcome};
    pub use crate::execution::tasks::{load_tasks, PrescriptionTask};

    // Configuration
    pub use crate::config::{JudgeConfig, RunnerConfig, ValidationConfig};
}

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
        assert_eq!(super::NAME, "robojudge");
    }

    #[test]
    fn test_default_pipeline_stages() {
        let pipeline = ValidationPipeline::default();
        assert_eq!(pipeline.stage_names().len(), 3);
    }

    #[test]
    fn test_header_only_submission_is_not_valid() {
        let header = submission_columns().join(",");
        let table = TableLoader::submission()
            .parse(&format!("{}\n", header), std::path::Path::new("empty.csv"))
            .unwrap();
        let plan = Table::new();
        let window = parse_window("2021-01-01", "2021-01-02").unwrap();

        // Columns without rows hold no numbers.
        let report = ValidationPipeline::default().validate(&table, &plan, &window);
        assert_eq!(report.count(ErrorCategory::Structural), 12);
        assert_eq!(report.variants_checked, 0);
    }
}
