//! In-memory typed table.

use crate::core::types::{ColumnType, Value};
use chrono::NaiveDate;
use indexmap::IndexMap;

/// A single typed column. `None` marks an empty cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// Calendar dates.
    Date(Vec<Option<NaiveDate>>),
    /// Whole numbers.
    Integer(Vec<Option<i64>>),
    /// Floating point numbers.
    Float(Vec<Option<f64>>),
    /// Free text.
    Text(Vec<Option<String>>),
}

impl Column {
    /// Number of cells.
    pub fn len(&self) -> usize {
        match self {
            Column::Date(v) => v.len(),
            Column::Integer(v) => v.len(),
            Column::Float(v) => v.len(),
            Column::Text(v) => v.len(),
        }
    }

    /// Check if the column has no cells.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Type of the column.
    pub fn column_type(&self) -> ColumnType {
        match self {
            Column::Date(_) => ColumnType::Date,
            Column::Integer(_) => ColumnType::Integer,
            Column::Float(_) => ColumnType::Float,
            Column::Text(_) => ColumnType::Text,
        }
    }

    /// Read one cell. Out-of-range rows read as `Value::Null`.
    pub fn get(&self, row: usize) -> Value {
        let value = match self {
            Column::Date(v) => v.get(row).copied().flatten().map(Value::Date),
            Column::Integer(v) => v.get(row).copied().flatten().map(Value::Integer),
            Column::Float(v) => v.get(row).copied().flatten().map(Value::Float),
            Column::Text(v) => v.get(row).cloned().flatten().map(Value::Text),
        };
        value.unwrap_or(Value::Null)
    }

    /// Dates of a date column.
    pub fn dates(&self) -> Option<&[Option<NaiveDate>]> {
        match self {
            Column::Date(v) => Some(v),
            _ => None,
        }
    }

    /// Text cells of a text column.
    pub fn texts(&self) -> Option<&[Option<String>]> {
        match self {
            Column::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Cells of a numeric column widened to floats.
    pub fn numbers(&self) -> Option<Vec<Option<f64>>> {
        match self {
            Column::Integer(v) => Some(v.iter().map(|c| c.map(|i| i as f64)).collect()),
            Column::Float(v) => Some(v.clone()),
            _ => None,
        }
    }

    /// Render a cell as text, whatever the column type. Empty cells stay `None`.
    pub fn text_at(&self, row: usize) -> Option<String> {
        match self.get(row) {
            Value::Null => None,
            Value::Text(s) => Some(s),
            other => Some(other.to_string()),
        }
    }

    /// Copy the given rows into a new column.
    pub fn select(&self, rows: &[usize]) -> Column {
        fn pick<T: Clone>(cells: &[Option<T>], rows: &[usize]) -> Vec<Option<T>> {
            rows.iter()
                .map(|&r| cells.get(r).cloned().flatten())
                .collect()
        }

        match self {
            Column::Date(v) => Column::Date(pick(v, rows)),
            Column::Integer(v) => Column::Integer(pick(v, rows)),
            Column::Float(v) => Column::Float(pick(v, rows)),
            Column::Text(v) => Column::Text(pick(v, rows)),
        }
    }
}

/// A table of named, typed columns of equal length.
///
/// Column order follows the file header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: IndexMap<String, Column>,
    row_count: usize,
}

impl Table {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from columns.
    ///
    /// Returns the offending column name if lengths differ.
    pub fn from_columns<I, S>(columns: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = (S, Column)>,
        S: Into<String>,
    {
        let mut table = Self::new();
        for (name, column) in columns {
            let name = name.into();
            if !table.columns.is_empty() && column.len() != table.row_count {
                return Err(name);
            }
            table.row_count = column.len();
            table.columns.insert(name, column);
        }
        Ok(table)
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Check if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// Column names in header order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(|k| k.as_str())
    }

    /// Check if a column exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Get a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    /// Type of a column.
    pub fn column_type(&self, name: &str) -> Option<ColumnType> {
        self.columns.get(name).map(Column::column_type)
    }

    /// Read one cell.
    pub fn get(&self, name: &str, row: usize) -> Value {
        self.columns
            .get(name)
            .map(|c| c.get(row))
            .unwrap_or(Value::Null)
    }

    /// Return a copy of this table with one more column.
    ///
    /// An existing column of the same name is replaced in place.
    pub fn with_column(&self, name: impl Into<String>, column: Column) -> Result<Table, String> {
        let name = name.into();
        if !self.columns.is_empty() && column.len() != self.row_count {
            return Err(name);
        }
        let mut table = self.clone();
        table.row_count = column.len();
        table.columns.insert(name, column);
        Ok(table)
    }

    /// Copy the given rows into a new table.
    pub fn select_rows(&self, rows: &[usize]) -> Table {
        Table {
            columns: self
                .columns
                .iter()
                .map(|(name, column)| (name.clone(), column.select(rows)))
                .collect(),
            row_count: rows.len(),
        }
    }

    /// Split the table by the values of one column.
    ///
    /// Groups come out in order of first appearance, each keyed by the
    /// rendered cell value. Empty cells form their own `None` group.
    pub fn partition_by(&self, name: &str) -> Vec<(Option<String>, Table)> {
        let Some(column) = self.columns.get(name) else {
            return Vec::new();
        };

        let mut groups: IndexMap<Option<String>, Vec<usize>> = IndexMap::new();
        for row in 0..self.row_count {
            groups.entry(column.text_at(row)).or_default().push(row);
        }

        groups
            .into_iter()
            .map(|(key, rows)| (key, self.select_rows(&rows)))
            .collect()
    }
}
