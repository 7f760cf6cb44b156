//! Filter Engine Module
//! Year / Location_Type / Season selections over the unified table.

use crate::data::cleaner::Season;
use crate::data::loader::DataLoader;
use crate::data::schema::{self, LOCATION_TYPE, SEASON, YEAR};
use polars::prelude::*;
use std::fmt;

/// One selector's value: no constraint, or an exact match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice<T> {
    Any,
    Specific(T),
}

impl<T> Default for Choice<T> {
    fn default() -> Self {
        Choice::Any
    }
}

impl<T> Choice<T> {
    pub fn is_any(&self) -> bool {
        matches!(self, Choice::Any)
    }

    /// `Any` followed by every option as `Specific`.
    pub fn with_any(options: &[T]) -> Vec<Choice<T>>
    where
        T: Clone,
    {
        std::iter::once(Choice::Any)
            .chain(options.iter().cloned().map(Choice::Specific))
            .collect()
    }
}

impl<T: fmt::Display> fmt::Display for Choice<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Choice::Any => f.write_str("All"),
            Choice::Specific(v) => v.fmt(f),
        }
    }
}

/// The three dashboard selectors.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterSelection {
    pub year: Choice<i32>,
    pub location: Choice<String>,
    pub season: Choice<Season>,
}

impl FilterSelection {
    pub fn is_unfiltered(&self) -> bool {
        self.year.is_any() && self.location.is_any() && self.season.is_any()
    }

    /// Rows of `table` matching every non-`Any` selector, in table order.
    ///
    /// The table itself is never modified. A selector on a column the
    /// table lacks matches no rows.
    pub fn apply(&self, table: &DataFrame) -> PolarsResult<DataFrame> {
        let mut predicates: Vec<Expr> = Vec::with_capacity(3);

        if let Choice::Specific(year) = &self.year {
            predicates.push(col(YEAR).eq(lit(*year)));
        }
        if let Choice::Specific(location) = &self.location {
            predicates.push(
                col(LOCATION_TYPE)
                    .cast(DataType::String)
                    .eq(lit(location.as_str())),
            );
        }
        if let Choice::Specific(season) = &self.season {
            predicates.push(col(SEASON).eq(lit(season.as_str())));
        }

        let Some(predicate) = predicates.into_iter().reduce(|acc, p| acc.and(p)) else {
            return Ok(table.clone());
        };

        let constrained = [
            (self.year.is_any(), YEAR),
            (self.location.is_any(), LOCATION_TYPE),
            (self.season.is_any(), SEASON),
        ];
        if constrained
            .iter()
            .any(|(any, name)| !any && !schema::has_column(table, name))
        {
            return Ok(table.head(Some(0)));
        }

        table.clone().lazy().filter(predicate).collect()
    }
}

impl fmt::Display for FilterSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Showing data for `{}` habitat in `{}` `{}`",
            self.location, self.season, self.year
        )
    }
}

/// Values offered by each selector, taken from the full unified table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    /// Distinct years, ascending
    pub years: Vec<i32>,
    /// Distinct habitats, first-seen order
    pub locations: Vec<String>,
    /// Distinct seasons, first-seen order
    pub seasons: Vec<Season>,
}

impl FilterOptions {
    pub fn from_table(table: &DataFrame) -> PolarsResult<Self> {
        let mut years: Vec<i32> = if schema::has_column(table, YEAR) {
            table
                .column(YEAR)?
                .drop_nulls()
                .unique()?
                .cast(&DataType::Int32)?
                .i32()?
                .into_iter()
                .flatten()
                .collect()
        } else {
            Vec::new()
        };
        years.sort_unstable();

        let locations = DataLoader::get_unique_values(table, LOCATION_TYPE)?;
        let seasons = DataLoader::get_unique_values(table, SEASON)?
            .iter()
            .filter_map(|s| s.parse::<Season>().ok())
            .collect();

        Ok(Self {
            years,
            locations,
            seasons,
        })
    }

    pub fn year_choices(&self) -> Vec<Choice<i32>> {
        Choice::with_any(&self.years)
    }

    pub fn location_choices(&self) -> Vec<Choice<String>> {
        Choice::with_any(&self.locations)
    }

    pub fn season_choices(&self) -> Vec<Choice<Season>> {
        Choice::with_any(&self.seasons)
    }
}
