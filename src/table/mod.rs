//! Tabular data: typed tables, CSV loading and geography keys.

pub mod frame;
pub mod geo;
pub mod loader;

pub use frame::{Column, Table};
pub use geo::{geo_id_set, geo_ids, with_geo_id_column, GeoId};
pub use loader::{load_intervention_plan, load_submission, TableLoader};
