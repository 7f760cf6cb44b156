//! Observation Schema
//! Column names shared by both habitat files and the optional-field capability check.

use polars::prelude::*;
use std::fmt;

pub const DATE: &str = "Date";
pub const LOCATION_TYPE: &str = "Location_Type";
pub const PLOT_NAME: &str = "Plot_Name";
pub const OBSERVER: &str = "Observer";
pub const LATITUDE: &str = "Latitude";
pub const LONGITUDE: &str = "Longitude";
pub const TEMPERATURE: &str = "Temperature";
pub const HUMIDITY: &str = "Humidity";
pub const PIF_WATCHLIST_STATUS: &str = "PIF_Watchlist_Status";
pub const MONTH: &str = "Month";
pub const YEAR: &str = "Year";
pub const SEASON: &str = "Season";

/// Columns every observation file must carry.
pub const MANDATORY_COLUMNS: [&str; 3] = [DATE, LOCATION_TYPE, PLOT_NAME];

/// Which habitat file a dataset was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Habitat {
    Forest,
    Grassland,
}

impl Habitat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Habitat::Forest => "forest",
            Habitat::Grassland => "grassland",
        }
    }
}

impl fmt::Display for Habitat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Presence flags for the recognized optional fields.
///
/// Computed once per table so chart sections check a flag instead of
/// probing column names while drawing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchemaCapabilities {
    /// Latitude and Longitude both present
    pub coordinates: bool,
    /// Temperature and Humidity both present
    pub environment: bool,
    /// PIF_Watchlist_Status present
    pub watchlist: bool,
    pub observer: bool,
}

impl SchemaCapabilities {
    pub fn detect(df: &DataFrame) -> Self {
        let has = |name: &str| has_column(df, name);
        Self {
            coordinates: has(LATITUDE) && has(LONGITUDE),
            environment: has(TEMPERATURE) && has(HUMIDITY),
            watchlist: has(PIF_WATCHLIST_STATUS),
            observer: has(OBSERVER),
        }
    }
}

impl fmt::Display for SchemaCapabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "coordinates={} environment={} watchlist={} observer={}",
            self.coordinates, self.environment, self.watchlist, self.observer
        )
    }
}

pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|c| c.as_str() == name)
}

/// Mandatory columns absent from `df`, in declaration order.
pub fn missing_mandatory(df: &DataFrame) -> Vec<&'static str> {
    MANDATORY_COLUMNS
        .iter()
        .copied()
        .filter(|name| !has_column(df, name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_optional_field_groups() {
        let df = df! {
            "Date" => ["2023-04-15"],
            "Location_Type" => ["Forest"],
            "Plot_Name" => ["P1"],
            "Latitude" => [38.9],
            "Longitude" => [-77.0],
            "Temperature" => [20.5],
        }
        .unwrap();

        let caps = SchemaCapabilities::detect(&df);
        assert!(caps.coordinates);
        assert!(!caps.environment);
        assert!(!caps.watchlist);
        assert!(!caps.observer);
    }

    #[test]
    fn reports_missing_mandatory_columns() {
        let df = df! {
            "Date" => ["2023-04-15"],
            "Observer" => ["A"],
        }
        .unwrap();

        assert_eq!(missing_mandatory(&df), vec![LOCATION_TYPE, PLOT_NAME]);
    }
}
