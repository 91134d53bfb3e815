//! Submission validation.
//!
//! Structural checks run first over the whole submission; coverage, value
//! range and date continuity checks then run once per prescription variant.

pub mod pipeline;
pub mod stages;

pub use pipeline::{parse_window, validate_submission, ValidationPipeline};
pub use stages::{
    DateContinuityValidation, GeoCoverageValidation, StructuralValidation, ValidationStage,
    ValueRangeValidation, VariantContext,
};
