//! Validation pipeline implementation.

use crate::core::error::{JudgeError, JudgeResult, ValidationError, ValidationReport};
use crate::core::schema::PRESCRIPTION_INDEX;
use crate::core::types::{parse_date, DateWindow};
use crate::table::frame::Table;
use crate::table::geo::geo_id_set;
use crate::table::loader::{load_intervention_plan, load_submission};
use crate::validation::stages::{
    DateContinuityValidation, GeoCoverageValidation, StructuralValidation, ValidationStage,
    ValueRangeValidation, VariantContext,
};
use log::{debug, info};
use rayon::prelude::*;
use std::path::Path;
use std::time::Instant;

/// Multi-stage submission validation pipeline.
///
/// Runs the structural stage over the whole submission, then every
/// per-variant stage over each prescription variant. Findings accumulate
/// into one report; a structural finding skips the per-variant stages.
pub struct ValidationPipeline {
    structural: StructuralValidation,
    stages: Vec<Box<dyn ValidationStage>>,
    parallel: bool,
}

impl ValidationPipeline {
    /// Create a new pipeline with the given per-variant stages.
    pub fn new(stages: Vec<Box<dyn ValidationStage>>) -> Self {
        Self {
            structural: StructuralValidation::default(),
            stages,
            parallel: false,
        }
    }

    /// Create the default pipeline: coverage, value range, then continuity.
    pub fn default_pipeline() -> Self {
        Self::new(vec![
            Box::new(GeoCoverageValidation),
            Box::new(ValueRangeValidation),
            Box::new(DateContinuityValidation),
        ])
    }

    /// Validate variants on the rayon pool. Output order does not change.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Replace the structural stage.
    pub fn with_structural(mut self, structural: StructuralValidation) -> Self {
        self.structural = structural;
        self
    }

    /// Add a per-variant validation stage.
    pub fn add_stage(&mut self, stage: Box<dyn ValidationStage>) {
        self.stages.push(stage);
    }

    /// Names of the per-variant stages, in run order.
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Validate a loaded submission against a loaded intervention plan.
    pub fn validate(
        &self,
        submission: &Table,
        intervention_plan: &Table,
        window: &DateWindow,
    ) -> ValidationReport {
        let start = Instant::now();
        let mut report = ValidationReport::new();

        // Any structural finding stops here. Variant checks assume every
        // column exists with the right type.
        report.extend(self.structural.validate(submission));
        if !report.is_valid() {
            report.duration_ms = start.elapsed().as_millis() as u64;
            return report;
        }

        let required_geos = geo_id_set(intervention_plan);
        let variants = submission.partition_by(PRESCRIPTION_INDEX);
        report.variants_checked = variants.len();

        let check = |(index, rows): &(Option<String>, Table)| {
            let ctx = VariantContext {
                prescription_index: index.as_deref(),
                rows,
                required_geos: &required_geos,
                window,
            };
            let errors: Vec<ValidationError> = self
                .stages
                .iter()
                .flat_map(|stage| stage.validate(&ctx))
                .collect();
            debug!(
                "Prescription {}: {} rows, {} error(s)",
                index.as_deref().unwrap_or("None"),
                rows.row_count(),
                errors.len()
            );
            errors
        };

        let per_variant: Vec<Vec<ValidationError>> = if self.parallel {
            variants.par_iter().map(check).collect()
        } else {
            variants.iter().map(check).collect()
        };
        report.extend(per_variant.into_iter().flatten());

        report.duration_ms = start.elapsed().as_millis() as u64;
        report
    }

    /// Load both files and validate.
    ///
    /// Dates are `YYYY-MM-DD` strings. Load failures and bad dates are
    /// returned as errors; problems in the data are returned in the report.
    pub fn validate_files(
        &self,
        start_date: &str,
        end_date: &str,
        intervention_plan: impl AsRef<Path>,
        submission: impl AsRef<Path>,
    ) -> JudgeResult<ValidationReport> {
        let window = parse_window(start_date, end_date)?;
        let submission = submission.as_ref();
        let intervention_plan = intervention_plan.as_ref();

        info!(
            "Validating submission file {} start date {} end date {} intervention plan {}",
            submission.display(),
            start_date,
            end_date,
            intervention_plan.display()
        );

        let submission_table = load_submission(submission)?;
        let plan_table = load_intervention_plan(intervention_plan)?;
        Ok(self.validate(&submission_table, &plan_table, &window))
    }
}

impl Default for ValidationPipeline {
    fn default() -> Self {
        Self::default_pipeline()
    }
}

/// Parse the start and end of a prescription horizon.
pub fn parse_window(start_date: &str, end_date: &str) -> JudgeResult<DateWindow> {
    let parse = |field: &str, value: &str| {
        parse_date(value).ok_or_else(|| JudgeError::InvalidDate {
            field: field.to_string(),
            value: value.to_string(),
        })
    };
    Ok(DateWindow::new(
        parse("start date", start_date)?,
        parse("end date", end_date)?,
    ))
}

/// Check a submission file against an intervention plan file.
///
/// Returns the human-readable error strings; an empty list means the
/// submission is valid.
pub fn validate_submission(
    start_date: &str,
    end_date: &str,
    intervention_plan: impl AsRef<Path>,
    submission: impl AsRef<Path>,
) -> JudgeResult<Vec<String>> {
    ValidationPipeline::default()
        .validate_files(start_date, end_date, intervention_plan, submission)
        .map(|report| report.messages())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorCategory;
    use crate::table::loader::{in_memory_source, TableLoader};

    const HEADER: &str = "CountryName,RegionName,Date,C1_School closing,C2_Workplace closing,\
C3_Cancel public events,C4_Restrictions on gatherings,C5_Close public transport,\
C6_Stay at home requirements,C7_Restrictions on internal movement,\
C8_International travel controls,H1_Public information campaigns,H2_Testing policy,\
H3_Contact tracing,H6_Facial Coverings,PrescriptionIndex";

    fn row(country: &str, region: &str, date: &str, level: &str, index: u32) -> String {
        let levels = vec![level; 12].join(",");
        format!("{},{},{},{},{}", country, region, date, levels, index)
    }

    fn submission(rows: &[String]) -> Table {
        let text = format!("{}\n{}\n", HEADER, rows.join("\n"));
        TableLoader::submission().parse(&text, &in_memory_source()).unwrap()
    }

    fn plan(geos: &[(&str, &str)]) -> Table {
        let mut text = String::from("CountryName,RegionName,Date,C1_School closing\n");
        for (country, region) in geos {
            text.push_str(&format!("{},{},2020-12-01,1\n", country, region));
        }
        TableLoader::intervention_plan().parse(&text, &in_memory_source()).unwrap()
    }

    fn window() -> DateWindow {
        parse_window("2021-01-01", "2021-01-03").unwrap()
    }

    fn full_variant(index: u32) -> Vec<String> {
        let mut rows = Vec::new();
        for day in ["2021-01-01", "2021-01-02", "2021-01-03"] {
            rows.push(row("USA", "", day, "1", index));
            rows.push(row("United States", "California", day, "2", index));
        }
        rows
    }

    #[test]
    fn test_well_formed_submission_is_valid() {
        let mut rows = full_variant(0);
        rows.extend(full_variant(1));
        let report = ValidationPipeline::default().validate(
            &submission(&rows),
            &plan(&[("USA", ""), ("United States", "California")]),
            &window(),
        );

        assert!(report.is_valid(), "unexpected errors: {:?}", report.messages());
        assert_eq!(report.variants_checked, 2);
    }

    #[test]
    fn test_missing_columns_yield_exactly_one_error() {
        let text = "CountryName,RegionName,Date\nUSA,,2021-01-01\n";
        let table = TableLoader::submission().parse(text, &in_memory_source()).unwrap();

        let report = ValidationPipeline::default().validate(&table, &plan(&[("Canada", "")]), &window());
        assert_eq!(report.errors.len(), 1);
        assert!(report.messages()[0].starts_with("Missing columns: C1_School closing"));
        assert_eq!(report.variants_checked, 0);
    }

    #[test]
    fn test_wrong_column_types_stop_before_variants() {
        let mut rows = full_variant(0);
        rows[0] = row("USA", "", "tomorrow", "1", 0);
        let report = ValidationPipeline::default().validate(&submission(&rows), &plan(&[]), &window());

        assert_eq!(report.messages(), vec!["Column Date contains non date values: text"]);
    }

    #[test]
    fn test_each_variant_checked_independently() {
        let mut rows = full_variant(0);
        // Variant 1 prescribes only USA and skips the middle day.
        rows.push(row("USA", "", "2021-01-01", "1", 1));
        rows.push(row("USA", "", "2021-01-03", "9", 1));

        let report = ValidationPipeline::default().validate(
            &submission(&rows),
            &plan(&[("USA", ""), ("United States", "California")]),
            &window(),
        );

        assert_eq!(report.variants_checked, 2);
        assert_eq!(
            report.messages(),
            vec![
                "Missing countries / regions: United States / California".to_string(),
                "Column C1_School closing contains values higher than max possible value".to_string(),
                "Column C2_Workplace closing contains values higher than max possible value".to_string(),
                "Column C3_Cancel public events contains values higher than max possible value".to_string(),
                "Column C4_Restrictions on gatherings contains values higher than max possible value".to_string(),
                "Column C5_Close public transport contains values higher than max possible value".to_string(),
                "Column C6_Stay at home requirements contains values higher than max possible value".to_string(),
                "Column C7_Restrictions on internal movement contains values higher than max possible value".to_string(),
                "Column C8_International travel controls contains values higher than max possible value".to_string(),
                "Column H1_Public information campaigns contains values higher than max possible value".to_string(),
                "Column H2_Testing policy contains values higher than max possible value".to_string(),
                "Column H3_Contact tracing contains values higher than max possible value".to_string(),
                "Column H6_Facial Coverings contains values higher than max possible value".to_string(),
                "USA: Expected prediction for date 2021-01-02 but got 2021-01-03".to_string(),
                "USA: Expected prediction for date 2021-01-03 but got None".to_string(),
            ]
        );
        assert_eq!(report.count(ErrorCategory::ValueRange), 12);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mut rows = Vec::new();
        for index in 0..6 {
            rows.extend(full_variant(index));
            rows.push(row("Mexico", "", "2021-01-05", "-1", index));
        }
        let table = submission(&rows);
        let reference = plan(&[("USA", ""), ("Canada", "")]);

        let sequential = ValidationPipeline::default().validate(&table, &reference, &window());
        let parallel = ValidationPipeline::default()
            .with_parallel(true)
            .validate(&table, &reference, &window());

        assert!(!sequential.is_valid());
        assert_eq!(sequential.messages(), parallel.messages());
    }

    #[test]
    fn test_header_only_submission_reports_every_intervention_column() {
        let dir = tempfile::tempdir().unwrap();
        let plan_path = dir.path().join("ip.csv");
        let submission_path = dir.path().join("submission.csv");
        std::fs::write(&plan_path, "CountryName,RegionName,Date\nCanada,,2020-12-01\n").unwrap();
        std::fs::write(&submission_path, format!("{}\n", HEADER)).unwrap();

        let errors =
            validate_submission("2021-01-01", "2021-01-03", &plan_path, &submission_path).unwrap();
        assert_eq!(errors.len(), 12);
        assert_eq!(
            errors[0],
            "Column C1_School closing contains non numerical values: text"
        );
        assert_eq!(
            errors[11],
            "Column H6_Facial Coverings contains non numerical values: text"
        );
    }

    #[test]
    fn test_invalid_window_is_an_error() {
        let result = parse_window("2021-13-01", "2021-01-03");
        assert!(matches!(result, Err(JudgeError::InvalidDate { .. })));
    }

    #[test]
    fn test_missing_file_is_a_load_error() {
        let result = validate_submission("2021-01-01", "2021-01-03", "/no/plan.csv", "/no/sub.csv");
        assert!(matches!(result, Err(JudgeError::Load(_))));
    }

    #[test]
    fn test_default_stage_order() {
        assert_eq!(
            ValidationPipeline::default().stage_names(),
            vec![
                "Geo Coverage Validation",
                "Value Range Validation",
                "Date Continuity Validation"
            ]
        );
    }
}
