//! Chart Viewer Widget
//! Central scrollable area with the data table and every dashboard chart.

use crate::charts::{ChartPlotter, ChartSeries, EnvironmentPoint, MapPoint, Summaries, TableView};
use crate::data::{Dashboard, FilterSelection, SchemaCapabilities};
use egui::{Color32, RichText, ScrollArea};
use polars::prelude::*;

const SECTION_SPACING: f32 = 15.0;

/// Everything drawn from the current filtered view.
///
/// Optional sections are `None` when their columns are absent or the view is empty.
#[derive(Debug, Clone, Default)]
pub struct DashboardView {
    pub caption: String,
    pub table: TableView,
    pub map: Option<Vec<ChartSeries<MapPoint>>>,
    pub plot_counts: Option<Vec<(String, usize)>>,
    pub environment: Option<Vec<ChartSeries<EnvironmentPoint>>>,
    pub watchlist: Option<Vec<(String, usize)>>,
}

impl DashboardView {
    pub fn build(
        filtered: &DataFrame,
        selection: &FilterSelection,
        capabilities: SchemaCapabilities,
        row_limit: usize,
    ) -> PolarsResult<Self> {
        let has_rows = filtered.height() > 0;

        Ok(Self {
            caption: selection.to_string(),
            table: TableView::from_frame(filtered, row_limit)?,
            map: if capabilities.coordinates && has_rows {
                Some(Summaries::map_series(filtered)?)
            } else {
                None
            },
            plot_counts: if has_rows {
                Some(Summaries::plot_counts(filtered)?)
            } else {
                None
            },
            environment: if capabilities.environment && has_rows {
                Some(Summaries::environment_series(filtered)?)
            } else {
                None
            },
            watchlist: if capabilities.watchlist && has_rows {
                Some(Summaries::watchlist_breakdown(filtered)?)
            } else {
                None
            },
        })
    }
}

/// Scrollable dashboard area.
#[derive(Default)]
pub struct ChartViewer {
    pub view: Option<DashboardView>,
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_view(&mut self, view: DashboardView) {
        self.view = Some(view);
    }

    pub fn clear(&mut self) {
        self.view = None;
    }

    /// Draw the current view plus the whole-table charts from `dashboard`.
    pub fn show(&self, ui: &mut egui::Ui, dashboard: Option<&Dashboard>) {
        let (Some(view), Some(dashboard)) = (&self.view, dashboard) else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return;
        };

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.label(
                    RichText::new("🕊 Bird Monitoring Dashboard")
                        .size(24.0)
                        .strong(),
                );
                ui.label(RichText::new(&view.caption).size(13.0));
                ui.add_space(SECTION_SPACING);

                Self::section(ui, "🗒 Observations", |ui| {
                    ChartPlotter::draw_table(ui, &view.table);
                });

                if let Some(series) = &view.map {
                    Self::section(ui, "📍 Bird Observation Map", |ui| {
                        ChartPlotter::draw_map(ui, series);
                    });
                }

                if let Some(counts) = &view.plot_counts {
                    Self::section(ui, "📊 Observation Count per Plot", |ui| {
                        ChartPlotter::draw_plot_counts(ui, counts);
                    });
                }

                Self::section(ui, "📅 Temporal Heatmap (Year vs Month)", |ui| {
                    ChartPlotter::draw_heatmap(ui, &dashboard.density);
                });

                if let Some(series) = &view.environment {
                    Self::section(ui, "🌡 Temperature vs Humidity by Plot", |ui| {
                        ChartPlotter::draw_environment(ui, series);
                    });
                }

                if let Some(counts) = &view.watchlist {
                    Self::section(ui, "🛡 Conservation Priority (PIF Watchlist)", |ui| {
                        ChartPlotter::draw_watchlist_pie(ui, counts);
                    });
                }

                Self::section(ui, "📍 High Activity Zones", |ui| {
                    ChartPlotter::draw_activity_zones(ui, &dashboard.activity);
                });
            });
    }

    /// Titled card around one chart.
    fn section(ui: &mut egui::Ui, title: &str, add_contents: impl FnOnce(&mut egui::Ui)) {
        egui::Frame::none()
            .rounding(8.0)
            .stroke(egui::Stroke::new(1.0, Color32::from_rgb(100, 149, 237)))
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.label(RichText::new(title).size(18.0).strong());
                ui.add_space(8.0);
                add_contents(ui);
            });
        ui.add_space(SECTION_SPACING);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Choice;

    fn filtered_without_temperature() -> DataFrame {
        df! {
            "Date" => ["2023-04-15", "2023-05-02"],
            "Location_Type" => ["Grassland", "Grassland"],
            "Plot_Name" => ["G1", "G2"],
            "Humidity" => [60.0, 65.0],
            "Latitude" => [39.0, 39.1],
            "Longitude" => [-77.0, -77.1],
            "Year" => [2023i32, 2023],
            "Month" => [4i32, 5],
            "Season" => ["Spring", "Spring"],
        }
        .unwrap()
    }

    #[test]
    fn missing_temperature_skips_environment_chart_only() {
        let df = filtered_without_temperature();
        let caps = SchemaCapabilities::detect(&df);
        let view = DashboardView::build(&df, &FilterSelection::default(), caps, 100).unwrap();

        assert_eq!(view.table.total_rows, 2);
        assert!(view.environment.is_none());
        assert!(view.watchlist.is_none());
        let map = view.map.as_ref().unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map[0].name, "Grassland");
        assert_eq!(map[0].points.len(), 2);
        assert_eq!(view.plot_counts.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn empty_view_keeps_table_and_skips_view_charts() {
        let df = filtered_without_temperature();
        let caps = SchemaCapabilities::detect(&df);
        let selection = FilterSelection {
            year: Choice::Specific(1999),
            ..Default::default()
        };
        let empty = selection.apply(&df).unwrap();
        let view = DashboardView::build(&empty, &selection, caps, 100).unwrap();

        assert_eq!(view.table.total_rows, 0);
        assert_eq!(view.table.headers.len(), df.width());
        assert!(view.map.is_none());
        assert!(view.plot_counts.is_none());
        assert_eq!(view.caption, "Showing data for `All` habitat in `All` `1999`");
    }
}
