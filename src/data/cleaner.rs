//! Observation Cleaner Module
//! Dedup, date coercion, mandatory-field pruning and derived calendar columns.

use crate::data::schema::{self, DATE, LOCATION_TYPE, MONTH, OBSERVER, PLOT_NAME, SEASON, YEAR};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Text written for Observer cells that were empty.
pub const MISSING_OBSERVER: &str = "nan";

const DATE_FORMATS: [&str; 6] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%m-%d-%Y", "%d.%m.%Y", "%Y%m%d"];

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

#[derive(Error, Debug)]
pub enum CleanError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Dataset is missing mandatory column '{0}'")]
    MissingColumn(String),
}

/// Meteorological season, a pure function of the calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Spring, Season::Summer, Season::Fall, Season::Winter];

    /// Month 3-5 is Spring, 6-8 Summer, 9-11 Fall, everything else Winter.
    pub fn from_month(month: u32) -> Self {
        match month {
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            9..=11 => Season::Fall,
            _ => Season::Winter,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Fall => "Fall",
            Season::Winter => "Winter",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Season {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Season::ALL
            .into_iter()
            .find(|season| season.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown season '{}'", s))
    }
}

/// Row accounting for a single cleaning pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanReport {
    pub rows_in: usize,
    pub duplicates_removed: usize,
    pub missing_required: usize,
    pub rows_out: usize,
}

impl fmt::Display for CleanReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rows in, {} duplicates removed, {} dropped for missing Date/Location_Type/Plot_Name, {} rows out",
            self.rows_in, self.duplicates_removed, self.missing_required, self.rows_out
        )
    }
}

/// Parse a calendar date from the textual forms seen in survey exports.
///
/// Returns `None` for anything unparseable, including impossible dates
/// such as `2023-13-40`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}

/// Normalizes a raw observation dataset.
pub struct Cleaner;

impl Cleaner {
    /// Clean a dataset: dedup, coerce dates, prune rows missing mandatory
    /// fields, derive Month/Year/Season and coerce Observer to text.
    pub fn clean(df: &DataFrame) -> Result<(DataFrame, CleanReport), CleanError> {
        if let Some(column) = schema::missing_mandatory(df).first() {
            return Err(CleanError::MissingColumn(column.to_string()));
        }

        let mut report = CleanReport {
            rows_in: df.height(),
            ..Default::default()
        };

        // 1. Exact duplicates
        let deduped = Self::drop_duplicates(df)?;
        report.duplicates_removed = df.height() - deduped.height();

        // 2. Date coercion, failures become null
        let mut dated = deduped;
        let dates = Self::coerce_dates(&dated)?;
        dated.with_column(Column::new(DATE.into(), dates))?;

        // 3. Mandatory fields
        let date_ok = dated.column(DATE)?.is_not_null();
        let location_ok = dated.column(LOCATION_TYPE)?.is_not_null();
        let plot_ok = dated.column(PLOT_NAME)?.is_not_null();
        let mask = &(&date_ok & &location_ok) & &plot_ok;
        let mut cleaned = dated.filter(&mask)?;
        report.missing_required = dated.height() - cleaned.height();

        // 4. Derived calendar columns
        Self::derive_calendar_columns(&mut cleaned)?;

        // 5. Observer as text
        if schema::has_column(&cleaned, OBSERVER) {
            cleaned = cleaned
                .lazy()
                .with_column(
                    col(OBSERVER)
                        .cast(DataType::String)
                        .fill_null(lit(MISSING_OBSERVER)),
                )
                .collect()?;
        }

        report.rows_out = cleaned.height();
        Ok((cleaned, report))
    }

    /// Remove rows equal to an earlier row in every column.
    pub fn drop_duplicates(df: &DataFrame) -> Result<DataFrame, CleanError> {
        if df.width() == 0 {
            return Ok(df.clone());
        }
        Ok(df.unique_stable(None, UniqueKeepStrategy::First, None)?)
    }

    /// Parse every Date cell; cells that fail become `None`.
    fn coerce_dates(df: &DataFrame) -> Result<Vec<Option<NaiveDate>>, CleanError> {
        let as_text = df.column(DATE)?.cast(&DataType::String)?;
        let ca = as_text.str()?;
        Ok(ca.into_iter().map(|v| v.and_then(parse_date)).collect())
    }

    /// (Re)write Month, Year and Season from the typed Date column.
    fn derive_calendar_columns(df: &mut DataFrame) -> Result<(), CleanError> {
        let dates: Vec<Option<NaiveDate>> = df.column(DATE)?.date()?.as_date_iter().collect();

        let months: Vec<Option<i32>> = dates.iter().map(|d| d.map(|d| d.month() as i32)).collect();
        let years: Vec<Option<i32>> = dates.iter().map(|d| d.map(|d| d.year())).collect();
        let seasons: Vec<Option<&str>> = dates
            .iter()
            .map(|d| d.map(|d| Season::from_month(d.month()).as_str()))
            .collect();

        df.with_column(Column::new(MONTH.into(), months))?;
        df.with_column(Column::new(YEAR.into(), years))?;
        df.with_column(Column::new(SEASON.into(), seasons))?;
        Ok(())
    }
}
