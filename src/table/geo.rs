//! Geography identity.
//!
//! A GeoID is the country name alone, or `"<country> / <region>"` when the
//! row carries a region. Submissions and intervention plans derive it the
//! same way so their geographies can be compared as sets.

use crate::core::schema::{COUNTRY_NAME, GEO_ID, REGION_NAME};
use crate::table::frame::{Column, Table};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Separator between country and region.
pub const GEO_ID_SEPARATOR: &str = " / ";

/// Canonical key of a country or region.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GeoId(String);

impl GeoId {
    /// Derive the key from a country and an optional region.
    ///
    /// An empty region counts as absent.
    pub fn new(country: &str, region: Option<&str>) -> Self {
        match region {
            Some(region) if !region.is_empty() => {
                Self(format!("{}{}{}", country, GEO_ID_SEPARATOR, region))
            }
            _ => Self(country.to_string()),
        }
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the key into a `String`.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for GeoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GeoId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// GeoID of every row, in row order.
///
/// A missing `RegionName` column is treated as all-empty; a missing country
/// cell becomes an empty country name.
pub fn geo_ids(table: &Table) -> Vec<GeoId> {
    let countries = table.column(COUNTRY_NAME);
    let regions = table.column(REGION_NAME);

    (0..table.row_count())
        .map(|row| {
            let country = countries.and_then(|c| c.text_at(row)).unwrap_or_default();
            let region = regions.and_then(|c| c.text_at(row));
            GeoId::new(&country, region.as_deref())
        })
        .collect()
}

/// Distinct GeoIDs of a table.
pub fn geo_id_set(table: &Table) -> BTreeSet<GeoId> {
    geo_ids(table).into_iter().collect()
}

/// Return a copy of the table with a `GeoID` text column appended.
///
/// The input table is left untouched.
pub fn with_geo_id_column(table: &Table) -> Table {
    let column = Column::Text(geo_ids(table).into_iter().map(|g| Some(g.0)).collect());
    table
        .with_column(GEO_ID, column)
        .unwrap_or_else(|_| table.clone())
}
