//! Value and column types for loaded prescription tables.
//!
//! Column types are decided once, when a table is parsed. Validators read
//! them as schema facts instead of inspecting cells at check time.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Date format used by every input file and command line argument.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Logical type of a loaded column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// Calendar dates.
    Date,
    /// Whole numbers.
    Integer,
    /// Floating point numbers.
    Float,
    /// Anything else.
    Text,
}

impl ColumnType {
    /// Check if values of this type are numbers.
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Float)
    }

    /// Check if values of this type are calendar dates.
    pub fn is_date(&self) -> bool {
        matches!(self, ColumnType::Date)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Date => write!(f, "date"),
            ColumnType::Integer => write!(f, "integer"),
            ColumnType::Float => write!(f, "float"),
            ColumnType::Text => write!(f, "text"),
        }
    }
}

/// A single cell read out of a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    /// Calendar date.
    Date(NaiveDate),
    /// Whole number.
    Integer(i64),
    /// Floating point number.
    Float(f64),
    /// Free text.
    Text(String),
    /// Empty cell.
    Null,
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => write!(f, "{}", s),
            Value::Null => write!(f, "None"),
        }
    }
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()
}

/// Render an optional date the way error messages show it.
pub fn display_date(date: &Option<NaiveDate>) -> String {
    match date {
        Some(d) => d.format(DATE_FORMAT).to_string(),
        None => "None".to_string(),
    }
}

/// The requested prescription horizon, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    /// First prescribed day.
    pub start: NaiveDate,
    /// Last prescribed day.
    pub end: NaiveDate,
}

impl DateWindow {
    /// Create a window from two dates.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Number of days in the window. Zero when `end` precedes `start`.
    pub fn len(&self) -> usize {
        let days = (self.end - self.start).num_days() + 1;
        days.max(0) as usize
    }

    /// Check if the window contains no days.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every day from start to end, ascending.
    pub fn expected_dates(&self) -> Vec<NaiveDate> {
        (0..self.len() as i64)
            .map(|offset| self.start + Duration::days(offset))
            .collect()
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} to {}",
            self.start.format(DATE_FORMAT),
            self.end.format(DATE_FORMAT)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn test_window_expected_dates() {
        let window = DateWindow::new(date("2021-01-01"), date("2021-01-03"));
        assert_eq!(window.len(), 3);
        assert_eq!(
            window.expected_dates(),
            vec![date("2021-01-01"), date("2021-01-02"), date("2021-01-03")]
        );
    }

    #[test]
    fn test_window_crosses_month_and_leap_day() {
        let window = DateWindow::new(date("2020-02-28"), date("2020-03-01"));
        assert_eq!(window.expected_dates()[1], date("2020-02-29"));
        assert_eq!(window.len(), 3);
    }

    #[test]
    fn test_inverted_window_is_empty() {
        let window = DateWindow::new(date("2021-01-05"), date("2021-01-01"));
        assert!(window.is_empty());
        assert!(window.expected_dates().is_empty());
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Date(date("2021-06-19")).to_string(), "2021-06-19");
        assert_eq!(Value::Integer(3).to_string(), "3");
        assert_eq!(Value::Null.to_string(), "None");
        assert_eq!(display_date(&None), "None");
    }

    #[test]
    fn test_parse_date_rejects_other_formats() {
        assert!(parse_date("2021-01-01").is_some());
        assert!(parse_date("01/02/2021").is_none());
        assert!(parse_date("2021-02-30").is_none());
    }
}
