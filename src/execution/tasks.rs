//! The prescription task list.
//!
//! One row per requested prescription run. Dates stay strings: they are
//! handed to the prescription module as command line arguments.

use crate::core::error::TaskError;
use crate::table::loader::decode_latin1;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One requested prescription run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PrescriptionTask {
    /// First prescribed day, `YYYY-MM-DD`.
    pub start_date: String,
    /// Last prescribed day, `YYYY-MM-DD`.
    pub end_date: String,
    /// Past interventions file, also the reference plan for validation.
    pub ip_file: PathBuf,
    /// Intervention costs file.
    pub cost_file: PathBuf,
    /// Where the prescriptions are written.
    pub output_file: PathBuf,
}

impl PrescriptionTask {
    /// Check if this task's output has already been generated.
    pub fn output_exists(&self) -> bool {
        self.output_file.is_file()
    }
}

/// Parse a task list from decoded CSV text.
pub fn parse_tasks(text: &str, source: &Path) -> Result<Vec<PrescriptionTask>, TaskError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    reader
        .deserialize()
        .collect::<Result<Vec<PrescriptionTask>, _>>()
        .map_err(|e| TaskError::TaskListMalformed {
            path: source.to_path_buf(),
            message: e.to_string(),
        })
}

/// Read the task list file.
pub fn load_tasks(path: impl AsRef<Path>) -> Result<Vec<PrescriptionTask>, TaskError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| TaskError::TaskListUnreadable {
        path: path.to_path_buf(),
        source,
    })?;
    parse_tasks(&decode_latin1(&bytes), path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "StartDate,EndDate,IpFile,CostFile,OutputFile\n\
                          2021-01-01,2021-01-31,ip.csv,costs.csv,out/presc.csv\n";

    #[test]
    fn test_parse_single_task() {
        let tasks = parse_tasks(SAMPLE, Path::new("tasks.csv")).unwrap();
        assert_eq!(tasks.len(), 1, "Should be a single prescription request");
        assert_eq!(
            tasks[0],
            PrescriptionTask {
                start_date: "2021-01-01".to_string(),
                end_date: "2021-01-31".to_string(),
                ip_file: PathBuf::from("ip.csv"),
                cost_file: PathBuf::from("costs.csv"),
                output_file: PathBuf::from("out/presc.csv"),
            }
        );
    }

    #[test]
    fn test_header_only_list_is_empty() {
        let tasks = parse_tasks(
            "StartDate,EndDate,IpFile,CostFile,OutputFile\n",
            Path::new("tasks.csv"),
        )
        .unwrap();
        assert!(tasks.is_empty());
    }

    #[test]
    fn test_missing_column_is_malformed() {
        let result = parse_tasks("StartDate,EndDate\n2021-01-01,2021-01-02\n", Path::new("t.csv"));
        assert!(matches!(result, Err(TaskError::TaskListMalformed { .. })));
    }

    #[test]
    fn test_load_tasks_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let tasks = load_tasks(file.path()).unwrap();
        assert_eq!(tasks[0].cost_file, PathBuf::from("costs.csv"));
        assert!(!tasks[0].output_exists());

        assert!(matches!(
            load_tasks("/no/such/tasks.csv"),
            Err(TaskError::TaskListUnreadable { .. })
        ));
    }
}
