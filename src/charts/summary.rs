//! Chart Summaries Module
//! Aggregations behind each dashboard chart, computed from a table.

use crate::data::loader::DataLoader;
use crate::data::schema::{
    self, DATE, HUMIDITY, LATITUDE, LOCATION_TYPE, LONGITUDE, MONTH, OBSERVER,
    PIF_WATCHLIST_STATUS, PLOT_NAME, SEASON, TEMPERATURE, YEAR,
};
use polars::prelude::*;

/// Aggregated row count column.
const COUNT: &str = "count";

/// One point on the observation map.
#[derive(Debug, Clone, PartialEq)]
pub struct MapPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub plot: String,
    pub location: String,
    /// Date / Temperature / Humidity hover text, when known
    pub detail: String,
}

/// One point on the Temperature vs Humidity scatter.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentPoint {
    pub temperature: f64,
    pub humidity: f64,
    pub plot: String,
    pub detail: String,
}

/// Named group of points drawn as one legend entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries<T> {
    pub name: String,
    pub points: Vec<T>,
}

/// Observation count for one (Year, Month) cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DensityCell {
    pub year: i32,
    pub month: i32,
    pub count: usize,
}

/// Observation count for one (Location_Type, Season) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityBar {
    pub location: String,
    pub season: String,
    pub count: usize,
}

/// Text cells for the data table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableView {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Rows in the source frame, before the display limit
    pub total_rows: usize,
}

impl TableView {
    /// At most `limit` rows of `df` rendered as text; nulls are blank.
    pub fn from_frame(df: &DataFrame, limit: usize) -> PolarsResult<Self> {
        let headers: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        let shown = df.height().min(limit);
        let mut rows = Vec::with_capacity(shown);
        for i in 0..shown {
            let mut row = Vec::with_capacity(headers.len());
            for column in df.get_columns() {
                row.push(cell_text(&column.get(i)?));
            }
            rows.push(row);
        }

        Ok(Self {
            headers,
            rows,
            total_rows: df.height(),
        })
    }

    pub fn is_truncated(&self) -> bool {
        self.rows.len() < self.total_rows
    }
}

fn cell_text(value: &AnyValue) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        other => other.to_string(),
    }
}

/// Chart aggregations. Each returns an empty result when its columns are absent.
pub struct Summaries;

impl Summaries {
    /// Observations per Plot_Name, most observed first; ties keep first-seen order.
    pub fn plot_counts(df: &DataFrame) -> PolarsResult<Vec<(String, usize)>> {
        Self::value_counts(df, PLOT_NAME)
    }

    /// Observations per PIF_Watchlist_Status, most frequent first.
    pub fn watchlist_breakdown(df: &DataFrame) -> PolarsResult<Vec<(String, usize)>> {
        Self::value_counts(df, PIF_WATCHLIST_STATUS)
    }

    /// Observation counts per (Year, Month), ordered by year then month.
    pub fn monthly_density(df: &DataFrame) -> PolarsResult<Vec<DensityCell>> {
        if !(schema::has_column(df, YEAR) && schema::has_column(df, MONTH)) {
            return Ok(Vec::new());
        }

        let grid = df
            .clone()
            .lazy()
            .select([
                col(YEAR).cast(DataType::Int32),
                col(MONTH).cast(DataType::Int32),
            ])
            .filter(col(YEAR).is_not_null().and(col(MONTH).is_not_null()))
            .group_by([col(YEAR), col(MONTH)])
            .agg([len().alias(COUNT)])
            .sort_by_exprs([col(YEAR), col(MONTH)], SortMultipleOptions::default())
            .collect()?;

        let years = grid.column(YEAR)?.i32()?;
        let months = grid.column(MONTH)?.i32()?;
        Ok(years
            .into_iter()
            .zip(months)
            .zip(counts(&grid)?)
            .filter_map(|((year, month), count)| {
                Some(DensityCell {
                    year: year?,
                    month: month?,
                    count,
                })
            })
            .collect())
    }

    /// Observation counts per (Location_Type, Season), ordered by both names.
    pub fn activity_zones(df: &DataFrame) -> PolarsResult<Vec<ActivityBar>> {
        if !(schema::has_column(df, LOCATION_TYPE) && schema::has_column(df, SEASON)) {
            return Ok(Vec::new());
        }

        let zones = df
            .clone()
            .lazy()
            .select([
                col(LOCATION_TYPE).cast(DataType::String),
                col(SEASON).cast(DataType::String),
            ])
            .filter(col(LOCATION_TYPE).is_not_null().and(col(SEASON).is_not_null()))
            .group_by([col(LOCATION_TYPE), col(SEASON)])
            .agg([len().alias(COUNT)])
            .sort_by_exprs(
                [col(LOCATION_TYPE), col(SEASON)],
                SortMultipleOptions::default(),
            )
            .collect()?;

        let locations = zones.column(LOCATION_TYPE)?.str()?;
        let seasons = zones.column(SEASON)?.str()?;
        Ok(locations
            .into_iter()
            .zip(seasons)
            .zip(counts(&zones)?)
            .filter_map(|((location, season), count)| {
                Some(ActivityBar {
                    location: location?.to_string(),
                    season: season?.to_string(),
                    count,
                })
            })
            .collect())
    }

    /// Rows with both coordinates, one series per Location_Type in first-seen order.
    pub fn map_series(df: &DataFrame) -> PolarsResult<Vec<ChartSeries<MapPoint>>> {
        if !(schema::has_column(df, LATITUDE) && schema::has_column(df, LONGITUDE)) {
            return Ok(Vec::new());
        }
        let located = df
            .clone()
            .lazy()
            .filter(col(LATITUDE).is_not_null().and(col(LONGITUDE).is_not_null()))
            .collect()?;

        let lats = float_column(&located, LATITUDE)?;
        let lons = float_column(&located, LONGITUDE)?;
        let plots = text_column(&located, PLOT_NAME)?;
        let locations = text_column(&located, LOCATION_TYPE)?;
        let dates = text_column(&located, DATE)?;
        let temps = float_column(&located, TEMPERATURE)?;
        let hums = float_column(&located, HUMIDITY)?;
        let with_env =
            schema::has_column(&located, TEMPERATURE) && schema::has_column(&located, HUMIDITY);

        let mut points = Vec::with_capacity(located.height());
        for i in 0..located.height() {
            let (Some(latitude), Some(longitude)) = (lats[i], lons[i]) else {
                continue;
            };
            let mut detail = dates[i].clone().unwrap_or_default();
            if with_env {
                detail.push_str(&format!(
                    " | {} / {}",
                    fmt_opt(temps[i]),
                    fmt_opt(hums[i])
                ));
            }
            points.push(MapPoint {
                latitude,
                longitude,
                plot: plots[i].clone().unwrap_or_default(),
                location: locations[i].clone().unwrap_or_default(),
                detail,
            });
        }

        let order = DataLoader::get_unique_values(&located, LOCATION_TYPE)?;
        Ok(group_points(order, points, |p| &p.location))
    }

    /// Rows with both Temperature and Humidity, one series per Plot_Name in first-seen order.
    pub fn environment_series(df: &DataFrame) -> PolarsResult<Vec<ChartSeries<EnvironmentPoint>>> {
        if !(schema::has_column(df, TEMPERATURE) && schema::has_column(df, HUMIDITY)) {
            return Ok(Vec::new());
        }
        let measured = df
            .clone()
            .lazy()
            .filter(col(TEMPERATURE).is_not_null().and(col(HUMIDITY).is_not_null()))
            .collect()?;

        let temps = float_column(&measured, TEMPERATURE)?;
        let hums = float_column(&measured, HUMIDITY)?;
        let plots = text_column(&measured, PLOT_NAME)?;
        let dates = text_column(&measured, DATE)?;
        let observers = text_column(&measured, OBSERVER)?;

        let mut points = Vec::with_capacity(measured.height());
        for i in 0..measured.height() {
            let (Some(temperature), Some(humidity)) = (temps[i], hums[i]) else {
                continue;
            };
            let mut detail = dates[i].clone().unwrap_or_default();
            if let Some(observer) = &observers[i] {
                detail.push_str(&format!(" | {}", observer));
            }
            points.push(EnvironmentPoint {
                temperature,
                humidity,
                plot: plots[i].clone().unwrap_or_default(),
                detail,
            });
        }

        let order = DataLoader::get_unique_values(&measured, PLOT_NAME)?;
        Ok(group_points(order, points, |p| &p.plot))
    }

    /// Non-null values of `column` with their counts, most frequent first.
    /// Ties keep first-seen order.
    fn value_counts(df: &DataFrame, column: &str) -> PolarsResult<Vec<(String, usize)>> {
        if !schema::has_column(df, column) {
            return Ok(Vec::new());
        }

        let tally = df
            .clone()
            .lazy()
            .select([col(column).cast(DataType::String)])
            .filter(col(column).is_not_null())
            .group_by_stable([col(column)])
            .agg([len().alias(COUNT)])
            .sort_by_exprs(
                [col(COUNT)],
                SortMultipleOptions::default()
                    .with_order_descending(true)
                    .with_maintain_order(true),
            )
            .collect()?;

        let values = tally.column(column)?.str()?;
        Ok(values
            .into_iter()
            .zip(counts(&tally)?)
            .filter_map(|(value, count)| Some((value?.to_string(), count)))
            .collect())
    }
}

/// The aggregated COUNT column as plain integers.
fn counts(df: &DataFrame) -> PolarsResult<Vec<usize>> {
    let cast = df.column(COUNT)?.cast(&DataType::UInt64)?;
    Ok(cast
        .u64()?
        .into_iter()
        .map(|n| n.unwrap_or(0) as usize)
        .collect())
}

/// Split `points` into one series per name in `order`; empty series are skipped.
fn group_points<T>(
    order: Vec<String>,
    points: Vec<T>,
    key: impl Fn(&T) -> &String,
) -> Vec<ChartSeries<T>> {
    let mut series: Vec<ChartSeries<T>> = order
        .into_iter()
        .map(|name| ChartSeries {
            name,
            points: Vec::new(),
        })
        .collect();
    for point in points {
        if let Some(s) = series.iter_mut().find(|s| &s.name == key(&point)) {
            s.points.push(point);
        }
    }
    series.retain(|s| !s.points.is_empty());
    series
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map(|v| format!("{:.1}", v)).unwrap_or_else(|| "-".to_string())
}

fn text_column(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<String>>> {
    if !schema::has_column(df, name) {
        return Ok(vec![None; df.height()]);
    }
    let cast = df.column(name)?.cast(&DataType::String)?;
    Ok(cast
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

fn float_column(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<f64>>> {
    if !schema::has_column(df, name) {
        return Ok(vec![None; df.height()]);
    }
    let cast = df.column(name)?.cast(&DataType::Float64)?;
    Ok(cast
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> DataFrame {
        df! {
            "Date" => ["2023-04-15", "2023-04-20", "2023-07-01", "2024-01-05"],
            "Location_Type" => ["Forest", "Forest", "Grassland", "Grassland"],
            "Plot_Name" => ["P2", "P1", "P1", "G9"],
            "Latitude" => [Some(38.9), Some(38.8), None, Some(39.0)],
            "Longitude" => [Some(-77.0), Some(-77.1), Some(-76.9), Some(-76.5)],
            "Temperature" => [Some(18.0), None, Some(27.5), Some(2.0)],
            "Humidity" => [Some(60.0), Some(55.0), Some(70.0), Some(80.0)],
            "PIF_Watchlist_Status" => [Some("TRUE"), Some("FALSE"), Some("FALSE"), None],
            "Year" => [2023i32, 2023, 2023, 2024],
            "Month" => [4i32, 4, 7, 1],
            "Season" => ["Spring", "Spring", "Summer", "Winter"],
        }
        .unwrap()
    }

    #[test]
    fn plot_counts_are_descending_with_stable_ties() {
        let counts = Summaries::plot_counts(&view()).unwrap();
        assert_eq!(
            counts,
            vec![("P1".to_string(), 2), ("P2".to_string(), 1), ("G9".to_string(), 1)]
        );
    }

    #[test]
    fn density_cells_cover_every_row() {
        let cells = Summaries::monthly_density(&view()).unwrap();
        assert_eq!(
            cells,
            vec![
                DensityCell { year: 2023, month: 4, count: 2 },
                DensityCell { year: 2023, month: 7, count: 1 },
                DensityCell { year: 2024, month: 1, count: 1 },
            ]
        );
        let total: usize = cells.iter().map(|c| c.count).sum();
        assert_eq!(total, view().height());
    }

    #[test]
    fn activity_counts_sum_to_table_height() {
        let bars = Summaries::activity_zones(&view()).unwrap();
        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].location, "Forest");
        assert_eq!(bars[0].season, "Spring");
        assert_eq!(bars[0].count, 2);
        assert_eq!(bars.iter().map(|b| b.count).sum::<usize>(), 4);
        assert_eq!(bars[2].location, "Grassland");
        assert_eq!(bars[2].season, "Winter");
    }

    #[test]
    fn empty_view_gives_empty_counts() {
        let empty = view().head(Some(0));
        assert!(Summaries::plot_counts(&empty).unwrap().is_empty());
        assert!(Summaries::monthly_density(&empty).unwrap().is_empty());
        assert!(Summaries::map_series(&empty).unwrap().is_empty());
    }

    #[test]
    fn map_series_follow_habitat_order_and_skip_rows_without_coordinates() {
        let series = Summaries::map_series(&view()).unwrap();
        let names: Vec<&str> = series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Forest", "Grassland"]);

        let forest_plots: Vec<&str> = series[0].points.iter().map(|p| p.plot.as_str()).collect();
        assert_eq!(forest_plots, vec!["P2", "P1"]);
        assert_eq!(series[1].points.len(), 1);
        assert!(series[0].points[0].detail.starts_with("2023-04-15"));
    }

    #[test]
    fn environment_series_need_both_readings() {
        let series = Summaries::environment_series(&view()).unwrap();
        let names: Vec<&str> = series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["P2", "P1", "G9"]);

        let p1 = &series[1].points;
        assert_eq!(p1.len(), 1);
        assert_eq!(p1[0].temperature, 27.5);
        assert_eq!(p1[0].humidity, 70.0);
    }

    #[test]
    fn watchlist_ignores_nulls() {
        let counts = Summaries::watchlist_breakdown(&view()).unwrap();
        assert_eq!(counts, vec![("FALSE".to_string(), 2), ("TRUE".to_string(), 1)]);
    }

    #[test]
    fn absent_columns_give_empty_summaries() {
        let df = df! { "Plot_Name" => ["P1"] }.unwrap();
        assert!(Summaries::environment_series(&df).unwrap().is_empty());
        assert!(Summaries::map_series(&df).unwrap().is_empty());
        assert!(Summaries::activity_zones(&df).unwrap().is_empty());
        assert!(Summaries::watchlist_breakdown(&df).unwrap().is_empty());
        assert!(Summaries::monthly_density(&df).unwrap().is_empty());
    }

    #[test]
    fn table_view_respects_limit_and_blanks_nulls() {
        let table = TableView::from_frame(&view(), 2).unwrap();
        assert_eq!(table.headers.len(), 11);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.total_rows, 4);
        assert!(table.is_truncated());
        assert_eq!(table.rows[0][2], "P2");
        assert_eq!(table.rows[1][5], "");
    }
}
