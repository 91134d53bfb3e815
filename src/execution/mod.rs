//! Prescription run orchestration.
//!
//! This module reads the task list, launches the prescription module for
//! each task and validates what it wrote.

pub mod launcher;
pub mod progress;
pub mod runner;
pub mod tasks;

pub use launcher::{LaunchOutcome, PrescriptionLauncher, ProcessLauncher};
pub use progress::{ProgressTracker, ProgressUpdate, SkipReason};
pub use runner::{PrescriptionRunner, RunOptions, RunSummary, TaskOutcome};
pub use tasks::{load_tasks, PrescriptionTask};
