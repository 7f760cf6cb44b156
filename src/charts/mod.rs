//! Charts module - chart summaries and rendering

mod plotter;
mod summary;

pub use plotter::{ChartPlotter, PALETTE};
pub use summary::{
    ActivityBar, ChartSeries, DensityCell, EnvironmentPoint, MapPoint, Summaries, TableView,
};
