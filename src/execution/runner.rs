//! Prescription run orchestration.
//!
//! For each task: skip it if its output already exists, otherwise generate
//! prescriptions with the launcher and validate what was written. Findings
//! are logged and recorded, never used to stop the run.

use crate::execution::launcher::PrescriptionLauncher;
use crate::execution::progress::{ProgressCallback, ProgressTracker, ProgressUpdate, SkipReason};
use crate::core::error::JudgeResult;
use crate::execution::tasks::{load_tasks, PrescriptionTask};
use crate::validation::pipeline::ValidationPipeline;
use log::{info, warn};
use std::path::Path;
use std::time::Instant;

/// Run options.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Skip tasks whose output file already exists.
    pub skip_existing: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            skip_existing: true,
        }
    }
}

/// What happened to one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// Output already existed; nothing was run.
    Skipped,
    /// The launcher could not start the prescription module.
    LaunchFailed { message: String },
    /// The output could not be validated (missing, unreadable or bad dates).
    ValidationFailed { message: String },
    /// The output was validated. An empty list means it is valid.
    Validated {
        exit_code: Option<i32>,
        errors: Vec<String>,
    },
}

/// Outcome of every task, in task order.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// One outcome per task.
    pub outcomes: Vec<TaskOutcome>,
    /// Wall time of the whole run.
    pub duration_ms: u64,
}

impl RunSummary {
    /// Number of skipped tasks.
    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, TaskOutcome::Skipped))
            .count()
    }

    /// Number of tasks whose output validated without errors.
    pub fn valid(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, TaskOutcome::Validated { errors, .. } if errors.is_empty()))
            .count()
    }
}

/// Runs prescription tasks one after another.
pub struct PrescriptionRunner {
    launcher: Box<dyn PrescriptionLauncher>,
    pipeline: ValidationPipeline,
    options: RunOptions,
    progress_callback: Option<ProgressCallback>,
}

impl PrescriptionRunner {
    /// Create a runner with the default validation pipeline.
    pub fn new(launcher: Box<dyn PrescriptionLauncher>) -> Self {
        Self {
            launcher,
            pipeline: ValidationPipeline::default(),
            options: RunOptions::default(),
            progress_callback: None,
        }
    }

    /// Set run options.
    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    /// Use a different validation pipeline.
    pub fn with_pipeline(mut self, pipeline: ValidationPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Set progress callback.
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Box::new(callback));
        self
    }

    /// Read a task list file and run every task in it.
    pub fn run_task_list(self, path: impl AsRef<Path>) -> JudgeResult<RunSummary> {
        let path = path.as_ref();
        info!("Generating prescriptions from {}", path.display());
        let tasks = load_tasks(path)?;
        Ok(self.run(&tasks))
    }

    /// Run every task.
    pub fn run(mut self, tasks: &[PrescriptionTask]) -> RunSummary {
        let start = Instant::now();
        let mut tracker = ProgressTracker::new(tasks.len());
        if let Some(callback) = self.progress_callback.take() {
            tracker = tracker.with_callback(callback);
        }
        tracker.start();

        let outcomes = tasks
            .iter()
            .enumerate()
            .map(|(index, task)| self.run_task(index, task, &tracker))
            .collect();

        tracker.complete();
        RunSummary {
            outcomes,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }

    fn run_task(
        &self,
        index: usize,
        task: &PrescriptionTask,
        tracker: &ProgressTracker,
    ) -> TaskOutcome {
        let started = Instant::now();
        tracker.task_started(index, task.output_file.clone());

        info!("Running prescribe module {}", self.launcher.describe());
        info!("Start date: {}", task.start_date);
        info!("End date: {}", task.end_date);
        info!("IP file: {}", task.ip_file.display());
        info!("Cost file: {}", task.cost_file.display());
        info!("Output file: {}", task.output_file.display());

        if self.options.skip_existing && task.output_exists() {
            warn!(
                "Prescriptions already generated at {}. Skipping.",
                task.output_file.display()
            );
            tracker.task_skipped(index, SkipReason::OutputExists);
            return TaskOutcome::Skipped;
        }

        let outcome = match self.launcher.launch(task) {
            Ok(launch) => {
                tracker.task_generated(
                    index,
                    started.elapsed().as_millis() as u64,
                    launch.exit_code,
                );
                if !launch.success() {
                    warn!(
                        "Prescribe module exited with status {:?} for {}",
                        launch.exit_code,
                        task.output_file.display()
                    );
                }
                self.validate_output(index, task, launch.exit_code, tracker)
            }
            Err(e) => {
                warn!("{}", e);
                tracker.report_error(index, e.to_string());
                TaskOutcome::LaunchFailed {
                    message: e.to_string(),
                }
            }
        };

        tracker.task_finished(started.elapsed().as_millis() as u64);
        outcome
    }

    fn validate_output(
        &self,
        index: usize,
        task: &PrescriptionTask,
        exit_code: Option<i32>,
        tracker: &ProgressTracker,
    ) -> TaskOutcome {
        let report = self.pipeline.validate_files(
            &task.start_date,
            &task.end_date,
            &task.ip_file,
            &task.output_file,
        );

        match report {
            Ok(report) => {
                let errors = report.messages();
                if errors.is_empty() {
                    info!("{} submission passes validation", task.output_file.display());
                } else {
                    warn!("Submission {} has errors: ", task.output_file.display());
                    warn!("{}", errors.join("\n"));
                }
                tracker.task_validated(index, errors.len());
                TaskOutcome::Validated { exit_code, errors }
            }
            Err(e) => {
                warn!("Could not validate {}: {}", task.output_file.display(), e);
                tracker.report_error(index, e.to_string());
                TaskOutcome::ValidationFailed {
                    message: e.to_string(),
                }
            }
        }
    }
}
