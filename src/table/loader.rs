//! CSV loading with typed columns.
//!
//! Input files use the ISO-8859-1 single-byte encoding. Every byte maps to
//! the Unicode code point of the same value, so decoding never fails.

use crate::core::error::{LoadError, LoadResult};
use crate::core::schema::TableSchema;
use crate::core::types::parse_date;
use crate::table::frame::{Column, Table};
use csv::ReaderBuilder;
use log::debug;
use std::path::{Path, PathBuf};

/// Cell contents read as empty, on top of the empty string.
pub const NULL_TOKENS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Check if a raw cell is a null marker.
pub fn is_null_token(field: &str) -> bool {
    field.is_empty() || NULL_TOKENS.contains(&field)
}

/// Decode ISO-8859-1 bytes.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Loads delimited text files into typed tables.
#[derive(Debug, Clone, Default)]
pub struct TableLoader {
    schema: TableSchema,
}

impl TableLoader {
    /// Create a loader for the given schema.
    pub fn new(schema: TableSchema) -> Self {
        Self { schema }
    }

    /// Loader for prescription submissions.
    pub fn submission() -> Self {
        Self::new(TableSchema::submission())
    }

    /// Loader for reference intervention plans.
    pub fn intervention_plan() -> Self {
        Self::new(TableSchema::intervention_plan())
    }

    /// Load a table from disk.
    pub fn load(&self, path: impl AsRef<Path>) -> LoadResult<Table> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(LoadError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let table = self.parse(&decode_latin1(&bytes), path)?;
        debug!(
            "Loaded {} rows x {} columns from {}",
            table.row_count(),
            table.column_names().count(),
            path.display()
        );
        Ok(table)
    }

    /// Parse already-decoded text. `source` names the input in errors.
    pub fn parse(&self, text: &str, source: &Path) -> LoadResult<Table> {
        let malformed = |line: Option<u64>, message: String| LoadError::Malformed {
            path: source.to_path_buf(),
            line,
            message,
        };

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| malformed(e.position().map(|p| p.line()), e.to_string()))?
            .iter()
            .map(str::to_string)
            .collect();

        if headers.iter().all(|h| h.is_empty()) {
            return Err(malformed(Some(1), "no header row".to_string()));
        }
        for (i, name) in headers.iter().enumerate() {
            if headers[..i].contains(name) {
                return Err(malformed(Some(1), format!("duplicate column '{}'", name)));
            }
        }

        let mut raw: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
        for record in reader.records() {
            let record =
                record.map_err(|e| malformed(e.position().map(|p| p.line()), e.to_string()))?;
            for (cells, field) in raw.iter_mut().zip(record.iter()) {
                cells.push(if is_null_token(field) {
                    None
                } else {
                    Some(field.to_string())
                });
            }
        }

        let missing: Vec<String> = self
            .schema
            .required_columns
            .iter()
            .filter(|c| !headers.contains(*c))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(LoadError::MissingColumns {
                path: source.to_path_buf(),
                columns: missing,
            });
        }

        let columns = headers
            .into_iter()
            .zip(raw)
            .map(|(name, cells)| {
                let column = self.type_column(&name, cells);
                (name, column)
            });

        Table::from_columns(columns)
            .map_err(|column| malformed(None, format!("column '{}' has a ragged length", column)))
    }

    /// Decide the type of a column from its cells.
    fn type_column(&self, name: &str, cells: Vec<Option<String>>) -> Column {
        if self.schema.is_text_column(name) {
            return Column::Text(cells);
        }
        if self.schema.is_date_column(name) {
            return parse_dates(&cells).unwrap_or(Column::Text(cells));
        }
        parse_integers(&cells)
            .or_else(|| parse_floats(&cells))
            .unwrap_or(Column::Text(cells))
    }
}

fn parse_dates(cells: &[Option<String>]) -> Option<Column> {
    cells
        .iter()
        .map(|c| match c {
            Some(s) => parse_date(s).map(Some),
            None => Some(None),
        })
        .collect::<Option<Vec<_>>>()
        .map(Column::Date)
}

fn parse_integers(cells: &[Option<String>]) -> Option<Column> {
    // An all-empty column carries no integers; it is typed as floats.
    // A column without rows carries nothing and stays text.
    if cells.iter().all(Option::is_none) {
        return None;
    }
    cells
        .iter()
        .map(|c| match c {
            Some(s) => s.trim().parse::<i64>().ok().map(Some),
            None => Some(None),
        })
        .collect::<Option<Vec<_>>>()
        .map(Column::Integer)
}

fn parse_floats(cells: &[Option<String>]) -> Option<Column> {
    if cells.is_empty() {
        return None;
    }
    cells
        .iter()
        .map(|c| match c {
            Some(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .map(|f| if f.is_nan() { None } else { Some(f) }),
            None => Some(None),
        })
        .collect::<Option<Vec<_>>>()
        .map(Column::Float)
}

/// Load a submission file.
pub fn load_submission(path: impl AsRef<Path>) -> LoadResult<Table> {
    TableLoader::submission().load(path)
}

/// Load a reference intervention plan file.
pub fn load_intervention_plan(path: impl AsRef<Path>) -> LoadResult<Table> {
    TableLoader::intervention_plan().load(path)
}

/// Path used in errors for tables parsed from memory.
pub fn in_memory_source() -> PathBuf {
    PathBuf::from("<memory>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{ColumnType, Value};
    use std::io::Write;

    fn parse(text: &str) -> LoadResult<Table> {
        TableLoader::submission().parse(text, &in_memory_source())
    }

    #[test]
    fn test_column_types_are_inferred_once() {
        let table = parse(
            "CountryName,RegionName,Date,C1_School closing,H2_Testing policy,Note\n\
             Canada,,2021-01-01,1,2.5,a\n\
             USA,10,2021-01-02,,1,b\n",
        )
        .unwrap();

        assert_eq!(table.column_type("CountryName"), Some(ColumnType::Text));
        assert_eq!(table.column_type("RegionName"), Some(ColumnType::Text));
        assert_eq!(table.column_type("Date"), Some(ColumnType::Date));
        assert_eq!(table.column_type("C1_School closing"), Some(ColumnType::Integer));
        assert_eq!(table.column_type("H2_Testing policy"), Some(ColumnType::Float));
        assert_eq!(table.column_type("Note"), Some(ColumnType::Text));
        assert_eq!(table.get("RegionName", 0), Value::Null);
        assert_eq!(table.get("RegionName", 1), Value::Text("10".to_string()));
        assert_eq!(table.get("C1_School closing", 1), Value::Null);
    }

    #[test]
    fn test_bad_date_demotes_column_to_text() {
        let table = parse("Date\n2021-01-01\nyesterday\n").unwrap();
        assert_eq!(table.column_type("Date"), Some(ColumnType::Text));
    }

    #[test]
    fn test_empty_column_is_float() {
        let table = parse("Date,C1_School closing\n2021-01-01,\n").unwrap();
        assert_eq!(table.column_type("C1_School closing"), Some(ColumnType::Float));
    }

    #[test]
    fn test_nan_cells_are_nulls() {
        let table = parse("C1_School closing\n1.0\nNaN\n").unwrap();
        assert_eq!(table.get("C1_School closing", 1), Value::Null);
    }

    #[test]
    fn test_null_markers_are_nulls() {
        let table = parse(
            "CountryName,RegionName,C1_School closing\n\
             Canada,NA,1\n\
             Chile,N/A,#N/A\n\
             Peru,null,2\n",
        )
        .unwrap();

        assert_eq!(table.column_type("C1_School closing"), Some(ColumnType::Integer));
        for row in 0..3 {
            assert_eq!(table.get("RegionName", row), Value::Null);
        }
        assert_eq!(table.get("C1_School closing", 1), Value::Null);
        assert!(is_null_token(""));
        assert!(!is_null_token("Namibia"));
    }

    #[test]
    fn test_header_only_columns_are_text() {
        let table = parse("CountryName,Date,C1_School closing\n").unwrap();
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.column_type("C1_School closing"), Some(ColumnType::Text));
        assert_eq!(table.column_type("Date"), Some(ColumnType::Date));
    }

    #[test]
    fn test_country_stays_text() {
        let table = TableLoader::intervention_plan()
            .parse("CountryName,Date\n1234,2021-01-01\n", &in_memory_source())
            .unwrap();
        assert_eq!(table.column_type("CountryName"), Some(ColumnType::Text));
        assert_eq!(table.get("CountryName", 0), Value::Text("1234".to_string()));
    }

    #[test]
    fn test_ragged_row_is_malformed() {
        let result = parse("CountryName,Date\nCanada,2021-01-01,extra\n");
        assert!(matches!(result, Err(LoadError::Malformed { .. })));
    }

    #[test]
    fn test_duplicate_header_is_malformed() {
        let result = parse("Date,Date\n2021-01-01,2021-01-02\n");
        assert!(matches!(result, Err(LoadError::Malformed { .. })));
    }

    #[test]
    fn test_plan_requires_country_column() {
        let result = TableLoader::intervention_plan()
            .parse("RegionName,Date\n,2021-01-01\n", &in_memory_source());
        match result {
            Err(LoadError::MissingColumns { columns, .. }) => {
                assert_eq!(columns, vec!["CountryName".to_string()]);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_missing_file() {
        let result = load_submission("/definitely/not/here.csv");
        assert!(matches!(result, Err(LoadError::NotFound { .. })));
    }

    #[test]
    fn test_latin1_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"CountryName,RegionName,Date\nC\xf4te d'Ivoire,,2021-01-01\n")
            .unwrap();

        let table = load_intervention_plan(file.path()).unwrap();
        assert_eq!(
            table.get("CountryName", 0),
            Value::Text("C\u{f4}te d'Ivoire".to_string())
        );
    }
}
