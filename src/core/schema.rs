//! Column names, the intervention ceiling table and load schemas.

use serde::{Deserialize, Serialize};

/// Country column.
pub const COUNTRY_NAME: &str = "CountryName";
/// Optional region column.
pub const REGION_NAME: &str = "RegionName";
/// Date column.
pub const DATE: &str = "Date";
/// Column identifying the policy variant a row belongs to.
pub const PRESCRIPTION_INDEX: &str = "PrescriptionIndex";
/// Derived geography key column.
pub const GEO_ID: &str = "GeoID";

/// Identifier columns shared by submissions and intervention plans.
pub const ID_COLUMNS: [&str; 3] = [COUNTRY_NAME, REGION_NAME, DATE];

/// Maximum permitted level of each intervention column, in file order.
pub const NPI_CEILINGS: [(&str, i64); 12] = [
    ("C1_School closing", 3),
    ("C2_Workplace closing", 3),
    ("C3_Cancel public events", 2),
    ("C4_Restrictions on gatherings", 4),
    ("C5_Close public transport", 2),
    ("C6_Stay at home requirements", 3),
    ("C7_Restrictions on internal movement", 2),
    ("C8_International travel controls", 4),
    ("H1_Public information campaigns", 2),
    ("H2_Testing policy", 3),
    ("H3_Contact tracing", 2),
    ("H6_Facial Coverings", 4),
];

/// Names of the twelve intervention columns, in file order.
pub fn npi_columns() -> impl Iterator<Item = &'static str> {
    NPI_CEILINGS.iter().map(|(name, _)| *name)
}

/// Ceiling for an intervention column.
pub fn npi_ceiling(column: &str) -> Option<i64> {
    NPI_CEILINGS
        .iter()
        .find(|(name, _)| *name == column)
        .map(|(_, ceiling)| *ceiling)
}

/// Every column a submission must carry, in file order.
pub fn submission_columns() -> Vec<&'static str> {
    ID_COLUMNS
        .iter()
        .copied()
        .chain(npi_columns())
        .chain(std::iter::once(PRESCRIPTION_INDEX))
        .collect()
}

/// How a file's columns should be typed at load time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Columns parsed as calendar dates.
    pub date_columns: Vec<String>,
    /// Columns kept as text even when their cells look numeric.
    pub text_columns: Vec<String>,
    /// Columns whose absence is a load failure.
    pub required_columns: Vec<String>,
}

impl TableSchema {
    /// Create an empty schema: every column is inferred.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schema of a prescription submission.
    ///
    /// Missing submission columns are reported by the structural checks,
    /// so nothing is required at load time.
    pub fn submission() -> Self {
        Self::new()
            .with_date_column(DATE)
            .with_text_column(COUNTRY_NAME)
            .with_text_column(REGION_NAME)
    }

    /// Schema of a reference intervention plan.
    pub fn intervention_plan() -> Self {
        Self::new()
            .with_date_column(DATE)
            .with_text_column(COUNTRY_NAME)
            .with_text_column(REGION_NAME)
            .with_required_column(COUNTRY_NAME)
    }

    /// Parse a column as dates.
    pub fn with_date_column(mut self, name: impl Into<String>) -> Self {
        self.date_columns.push(name.into());
        self
    }

    /// Keep a column as text.
    pub fn with_text_column(mut self, name: impl Into<String>) -> Self {
        self.text_columns.push(name.into());
        self
    }

    /// Fail the load when a column is absent.
    pub fn with_required_column(mut self, name: impl Into<String>) -> Self {
        self.required_columns.push(name.into());
        self
    }

    /// Check if a column is parsed as dates.
    pub fn is_date_column(&self, name: &str) -> bool {
        self.date_columns.iter().any(|c| c == name)
    }

    /// Check if a column is forced to text.
    pub fn is_text_column(&self, name: &str) -> bool {
        self.text_columns.iter().any(|c| c == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_columns_layout() {
        let columns = submission_columns();
        assert_eq!(columns.len(), 16);
        assert_eq!(columns[0], COUNTRY_NAME);
        assert_eq!(columns[3], "C1_School closing");
        assert_eq!(columns[15], PRESCRIPTION_INDEX);
    }

    #[test]
    fn test_ceilings() {
        let ceilings: Vec<i64> = NPI_CEILINGS.iter().map(|(_, c)| *c).collect();
        assert_eq!(ceilings, vec![3, 3, 2, 4, 2, 3, 2, 4, 2, 3, 2, 4]);
        assert_eq!(npi_ceiling("H6_Facial Coverings"), Some(4));
        assert_eq!(npi_ceiling("H4_Emergency investment in healthcare"), None);
    }

    #[test]
    fn test_plan_schema_requires_country() {
        let schema = TableSchema::intervention_plan();
        assert!(schema.is_date_column(DATE));
        assert!(schema.is_text_column(REGION_NAME));
        assert_eq!(schema.required_columns, vec![COUNTRY_NAME.to_string()]);
        assert!(TableSchema::submission().required_columns.is_empty());
    }
}
