//! Progress tracking for prescription runs.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// A progress update event.
#[derive(Debug, Clone)]
pub enum ProgressUpdate {
    /// The run has started.
    Started {
        total_tasks: usize,
    },
    /// A task has started.
    TaskStarted {
        index: usize,
        total: usize,
        output_file: PathBuf,
    },
    /// A task was skipped.
    TaskSkipped {
        index: usize,
        reason: SkipReason,
    },
    /// Prescriptions were generated for a task.
    TaskGenerated {
        index: usize,
        duration_ms: u64,
        exit_code: Option<i32>,
    },
    /// A task's output was validated.
    TaskValidated {
        index: usize,
        error_count: usize,
    },
    /// Overall progress percentage.
    Progress {
        percent: f32,
        elapsed_ms: u64,
        estimated_remaining_ms: Option<u64>,
    },
    /// The run has completed.
    Completed {
        total_duration_ms: u64,
        tasks_processed: usize,
        tasks_skipped: usize,
    },
    /// A task failed.
    Error {
        index: usize,
        message: String,
    },
}

/// Reason why a task was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The output file already exists.
    OutputExists,
}

/// Callback type for progress updates.
pub type ProgressCallback = Box<dyn Fn(ProgressUpdate) + Send + Sync>;

/// Tracks run progress and forwards events to a callback.
pub struct ProgressTracker {
    /// Total number of tasks.
    total_tasks: usize,
    /// Number of tasks finished.
    completed_tasks: AtomicU64,
    /// Number of tasks skipped.
    skipped_tasks: AtomicU64,
    /// Start time.
    start_time: Option<Instant>,
    /// Progress callback.
    callback: Option<ProgressCallback>,
    /// Task durations for estimation.
    task_times: parking_lot::Mutex<Vec<u64>>,
}

impl ProgressTracker {
    /// Create a new progress tracker.
    pub fn new(total_tasks: usize) -> Self {
        Self {
            total_tasks,
            completed_tasks: AtomicU64::new(0),
            skipped_tasks: AtomicU64::new(0),
            start_time: None,
            callback: None,
            task_times: parking_lot::Mutex::new(Vec::new()),
        }
    }

    /// Set a callback for progress updates.
    pub fn with_callback(mut self, callback: ProgressCallback) -> Self {
        self.callback = Some(callback);
        self
    }

    /// Start tracking.
    pub fn start(&mut self) {
        self.start_time = Some(Instant::now());
        self.send_update(ProgressUpdate::Started {
            total_tasks: self.total_tasks,
        });
    }

    /// Report that a task has started.
    pub fn task_started(&self, index: usize, output_file: PathBuf) {
        self.send_update(ProgressUpdate::TaskStarted {
            index,
            total: self.total_tasks,
            output_file,
        });
    }

    /// Report that a task was skipped.
    pub fn task_skipped(&self, index: usize, reason: SkipReason) {
        self.skipped_tasks.fetch_add(1, Ordering::Relaxed);
        self.send_update(ProgressUpdate::TaskSkipped { index, reason });
        self.send_progress_update();
    }

    /// Report that generation finished for a task.
    pub fn task_generated(&self, index: usize, duration_ms: u64, exit_code: Option<i32>) {
        self.send_update(ProgressUpdate::TaskGenerated {
            index,
            duration_ms,
            exit_code,
        });
    }

    /// Report that a task is finished, whatever its outcome.
    pub fn task_finished(&self, duration_ms: u64) {
        self.completed_tasks.fetch_add(1, Ordering::Relaxed);
        self.task_times.lock().push(duration_ms);
        self.send_progress_update();
    }

    /// Report that a task's output was validated.
    pub fn task_validated(&self, index: usize, error_count: usize) {
        self.send_update(ProgressUpdate::TaskValidated { index, error_count });
    }

    /// Report an error.
    pub fn report_error(&self, index: usize, message: String) {
        self.send_update(ProgressUpdate::Error { index, message });
    }

    /// Complete tracking.
    pub fn complete(&self) {
        let duration = self
            .start_time
            .map(|t| t.elapsed().as_millis() as u64)
            .unwrap_or(0);

        self.send_update(ProgressUpdate::Completed {
            total_duration_ms: duration,
            tasks_processed: self.completed_tasks.load(Ordering::Relaxed) as usize,
            tasks_skipped: self.skipped_tasks.load(Ordering::Relaxed) as usize,
        });
    }

    /// Get current progress percentage.
    pub fn progress_percent(&self) -> f32 {
        if self.total_tasks == 0 {
            return 100.0;
        }
        let completed = self.completed_tasks.load(Ordering::Relaxed);
        let skipped = self.skipped_tasks.load(Ordering::Relaxed);
        ((completed + skipped) as f32 / self.total_tasks as f32) * 100.0
    }

    /// Estimate remaining time in milliseconds.
    pub fn estimated_remaining_ms(&self) -> Option<u64> {
        let times = self.task_times.lock();
        if times.is_empty() {
            return None;
        }

        let avg_time: u64 = times.iter().sum::<u64>() / times.len() as u64;
        let done = self.completed_tasks.load(Ordering::Relaxed)
            + self.skipped_tasks.load(Ordering::Relaxed);
        let remaining = self.total_tasks.saturating_sub(done as usize);

        Some(avg_time * remaining as u64)
    }

    fn send_update(&self, update: ProgressUpdate) {
        if let Some(ref callback) = self.callback {
            callback(update);
        }
    }

    fn send_progress_update(&self) {
        let elapsed = self
            .start_time
            .map(|t| t.elapsed().as_millis() as u64)
            .unwrap_or(0);

        self.send_update(ProgressUpdate::Progress {
            percent: self.progress_percent(),
            elapsed_ms: elapsed,
            estimated_remaining_ms: self.estimated_remaining_ms(),
        });
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new(0)
    }
}
