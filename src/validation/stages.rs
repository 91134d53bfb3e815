//! Individual validation stages.
//!
//! The structural stage looks at the whole submission. Every other stage
//! runs once per prescription variant and checks only that variant's rows.
//! Stages return what they found; they never stop on the first problem.

use crate::core::error::ValidationError;
use crate::core::schema::{npi_ceiling, submission_columns, DATE, NPI_CEILINGS};
use crate::core::types::DateWindow;
use crate::table::frame::Table;
use crate::table::geo::{geo_id_set, geo_ids, GeoId};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

/// Rows of one prescription variant plus what they are checked against.
#[derive(Debug, Clone, Copy)]
pub struct VariantContext<'a> {
    /// Value of `PrescriptionIndex` shared by the rows, `None` if empty.
    pub prescription_index: Option<&'a str>,
    /// The variant's rows.
    pub rows: &'a Table,
    /// GeoIDs of the reference intervention plan.
    pub required_geos: &'a BTreeSet<GeoId>,
    /// The requested prescription horizon.
    pub window: &'a DateWindow,
}

/// Trait for per-variant validation stages.
pub trait ValidationStage: Send + Sync {
    /// Name of this validation stage.
    fn name(&self) -> &str;

    /// Validate one variant, returning every problem found.
    fn validate(&self, ctx: &VariantContext<'_>) -> Vec<ValidationError>;
}

/// Structural validation - checks columns.
///
/// Verifies:
/// - Every expected column is present
/// - The date column holds dates
/// - Every intervention column holds numbers
///
/// When columns are missing only that one error is reported.
#[derive(Debug, Clone)]
pub struct StructuralValidation {
    expected_columns: Vec<String>,
}

impl StructuralValidation {
    /// Create a stage expecting the given columns.
    pub fn new<I, S>(expected_columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            expected_columns: expected_columns.into_iter().map(Into::into).collect(),
        }
    }

    /// Name of this validation stage.
    pub fn name(&self) -> &str {
        "Structural Validation"
    }

    /// Validate the columns of a whole submission.
    pub fn validate(&self, table: &Table) -> Vec<ValidationError> {
        let missing: Vec<String> = self
            .expected_columns
            .iter()
            .filter(|c| !table.has_column(c))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return vec![ValidationError::MissingColumns { columns: missing }];
        }

        let mut errors = Vec::new();

        if let Some(found) = table.column_type(DATE) {
            if !found.is_date() {
                errors.push(ValidationError::NonDateColumn {
                    column: DATE.to_string(),
                    found,
                });
            }
        }

        for (column, _) in NPI_CEILINGS.iter() {
            if let Some(found) = table.column_type(column) {
                if !found.is_numeric() {
                    errors.push(ValidationError::NonNumericColumn {
                        column: column.to_string(),
                        found,
                    });
                }
            }
        }

        errors
    }
}

impl Default for StructuralValidation {
    fn default() -> Self {
        Self::new(submission_columns())
    }
}

/// Coverage validation - every planned geography must be prescribed.
///
/// Extra geographies in the submission are allowed.
pub struct GeoCoverageValidation;

impl ValidationStage for GeoCoverageValidation {
    fn name(&self) -> &str {
        "Geo Coverage Validation"
    }

    fn validate(&self, ctx: &VariantContext<'_>) -> Vec<ValidationError> {
        let present = geo_id_set(ctx.rows);
        let missing: Vec<String> = ctx
            .required_geos
            .difference(&present)
            .map(|g| g.to_string())
            .collect();

        if missing.is_empty() {
            Vec::new()
        } else {
            vec![ValidationError::MissingGeos { geo_ids: missing }]
        }
    }
}

/// Value range validation - intervention levels within `[0, ceiling]`.
///
/// Each column gets three independent checks: empty cells, negative
/// levels and levels above the column's ceiling.
pub struct ValueRangeValidation;

impl ValueRangeValidation {
    fn check_column(column: &str, values: &[Option<f64>]) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let Some(ceiling) = npi_ceiling(column) else {
            return errors;
        };

        if values.iter().any(Option::is_none) {
            errors.push(ValidationError::NullValues {
                column: column.to_string(),
            });
        }

        let present = values.iter().flatten().copied();
        let (min, max) = present.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

        if min < 0.0 {
            errors.push(ValidationError::NegativeValues {
                column: column.to_string(),
            });
        }
        if max > ceiling as f64 {
            errors.push(ValidationError::AboveCeiling {
                column: column.to_string(),
                ceiling,
            });
        }

        errors
    }
}

impl ValidationStage for ValueRangeValidation {
    fn name(&self) -> &str {
        "Value Range Validation"
    }

    fn validate(&self, ctx: &VariantContext<'_>) -> Vec<ValidationError> {
        NPI_CEILINGS
            .iter()
            .filter_map(|(column, _)| {
                // Non-numeric columns were already reported structurally.
                let values = ctx.rows.column(column)?.numbers()?;
                Some(Self::check_column(column, &values))
            })
            .flatten()
            .collect()
    }
}

/// Date continuity validation - each geography covers the window day by day.
///
/// A geography's sorted dates are compared position by position with the
/// expected days. A single missing day therefore shifts every later
/// position and each shifted position is reported. When one sequence runs
/// out first, the absent side is reported as `None`.
pub struct DateContinuityValidation;

impl DateContinuityValidation {
    fn check_geo(
        geo_id: &GeoId,
        expected: &[NaiveDate],
        actual: &[Option<NaiveDate>],
    ) -> Vec<ValidationError> {
        let length = expected.len().max(actual.len());
        (0..length)
            .filter_map(|i| {
                let want = expected.get(i).copied();
                let got = actual.get(i).copied().flatten();
                let matches = matches!((want, actual.get(i)), (Some(w), Some(Some(g))) if w == *g);
                (!matches).then(|| ValidationError::DateMismatch {
                    geo_id: geo_id.to_string(),
                    expected: want,
                    actual: got,
                })
            })
            .collect()
    }
}

impl ValidationStage for DateContinuityValidation {
    fn name(&self) -> &str {
        "Date Continuity Validation"
    }

    fn validate(&self, ctx: &VariantContext<'_>) -> Vec<ValidationError> {
        let Some(dates) = ctx.rows.column(DATE).and_then(|c| c.dates()) else {
            return Vec::new();
        };

        let mut by_geo: BTreeMap<GeoId, Vec<Option<NaiveDate>>> = BTreeMap::new();
        for (geo_id, date) in geo_ids(ctx.rows).into_iter().zip(dates) {
            by_geo.entry(geo_id).or_default().push(*date);
        }

        let expected = ctx.window.expected_dates();
        by_geo
            .iter_mut()
            .flat_map(|(geo_id, actual)| {
                // Empty dates sort last.
                actual.sort_by_key(|d| (d.is_none(), *d));
                Self::check_geo(geo_id, &expected, actual)
            })
            .collect()
    }
}
