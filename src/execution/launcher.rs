//! Launching the external prescription module.

use crate::core::error::TaskError;
use crate::execution::tasks::PrescriptionTask;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Command;

/// How a launched generation run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchOutcome {
    /// Exit code, `None` if the process was killed by a signal.
    pub exit_code: Option<i32>,
}

impl LaunchOutcome {
    /// Check if the run exited with status zero.
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Something that can generate the prescriptions for a task.
pub trait PrescriptionLauncher: Send + Sync {
    /// Human-readable description, used in logs.
    fn describe(&self) -> String;

    /// Generate prescriptions for one task and wait for completion.
    fn launch(&self, task: &PrescriptionTask) -> Result<LaunchOutcome, TaskError>;
}

/// Runs the prescription module as a child process.
///
/// The command line is
/// `<interpreter> <module> --start_date S --end_date E --interventions_past IP
/// --intervention_costs COSTS --output_file OUT`.
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    interpreter: String,
    module: PathBuf,
}

impl ProcessLauncher {
    /// Create a launcher for a module run by `interpreter`.
    pub fn new(interpreter: impl Into<String>, module: impl Into<PathBuf>) -> Self {
        Self {
            interpreter: interpreter.into(),
            module: module.into(),
        }
    }

    /// Arguments passed to the interpreter for a task.
    pub fn arguments(&self, task: &PrescriptionTask) -> Vec<OsString> {
        vec![
            self.module.clone().into_os_string(),
            "--start_date".into(),
            task.start_date.clone().into(),
            "--end_date".into(),
            task.end_date.clone().into(),
            "--interventions_past".into(),
            task.ip_file.clone().into_os_string(),
            "--intervention_costs".into(),
            task.cost_file.clone().into_os_string(),
            "--output_file".into(),
            task.output_file.clone().into_os_string(),
        ]
    }
}

impl PrescriptionLauncher for ProcessLauncher {
    fn describe(&self) -> String {
        format!("{} {}", self.interpreter, self.module.display())
    }

    fn launch(&self, task: &PrescriptionTask) -> Result<LaunchOutcome, TaskError> {
        let status = Command::new(&self.interpreter)
            .args(self.arguments(task))
            .status()
            .map_err(|source| TaskError::LaunchFailed {
                program: self.interpreter.clone(),
                source,
            })?;

        Ok(LaunchOutcome {
            exit_code: status.code(),
        })
    }
}
