//! Chart Plotter Module
//! Draws the dashboard charts with egui_plot.

use crate::charts::summary::{
    ActivityBar, ChartSeries, DensityCell, EnvironmentPoint, MapPoint, TableView,
};
use egui::{Color32, RichText, Stroke};
use egui_plot::{Bar, BarChart, Legend, Plot, PlotPoint, PlotPoints, Points, Polygon, Text};
use std::collections::BTreeSet;

pub const PALETTE: [Color32; 10] = [
    Color32::from_rgb(52, 152, 219),  // Blue
    Color32::from_rgb(231, 76, 60),   // Red
    Color32::from_rgb(46, 204, 113),  // Green
    Color32::from_rgb(155, 89, 182),  // Purple
    Color32::from_rgb(243, 156, 18),  // Orange
    Color32::from_rgb(26, 188, 156),  // Teal
    Color32::from_rgb(233, 30, 99),   // Pink
    Color32::from_rgb(0, 188, 212),   // Cyan
    Color32::from_rgb(121, 85, 72),   // Brown
    Color32::from_rgb(96, 125, 139),  // Blue Grey
];

/// Viridis stops, low to high
const VIRIDIS: [Color32; 5] = [
    Color32::from_rgb(68, 1, 84),
    Color32::from_rgb(59, 82, 139),
    Color32::from_rgb(33, 145, 140),
    Color32::from_rgb(94, 201, 98),
    Color32::from_rgb(253, 231, 37),
];

const CHART_HEIGHT: f32 = 320.0;
const PIE_SEGMENTS: usize = 96;

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Creates dashboard charts using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    pub fn color_for(index: usize) -> Color32 {
        PALETTE[index % PALETTE.len()]
    }

    pub fn season_color(season: &str) -> Color32 {
        match season {
            "Spring" => Color32::from_rgb(46, 204, 113),
            "Summer" => Color32::from_rgb(243, 156, 18),
            "Fall" => Color32::from_rgb(231, 76, 60),
            "Winter" => Color32::from_rgb(52, 152, 219),
            _ => Color32::GRAY,
        }
    }

    /// Linear interpolation across the viridis stops; `t` in 0..=1.
    pub fn viridis(t: f64) -> Color32 {
        let t = t.clamp(0.0, 1.0) * (VIRIDIS.len() - 1) as f64;
        let lo = t.floor() as usize;
        let hi = (lo + 1).min(VIRIDIS.len() - 1);
        let frac = (t - lo as f64) as f32;
        let (a, b) = (VIRIDIS[lo], VIRIDIS[hi]);
        let mix = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * frac).round() as u8;
        Color32::from_rgb(mix(a.r(), b.r()), mix(a.g(), b.g()), mix(a.b(), b.b()))
    }

    /// Filtered rows as a striped grid.
    pub fn draw_table(ui: &mut egui::Ui, table: &TableView) {
        if table.is_truncated() {
            ui.label(
                RichText::new(format!(
                    "Showing {} of {} rows",
                    table.rows.len(),
                    table.total_rows
                ))
                .size(11.0)
                .color(Color32::GRAY),
            );
        } else {
            ui.label(
                RichText::new(format!("{} rows", table.total_rows))
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        }

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                egui::ScrollArea::both()
                    .id_salt("observation_table")
                    .max_height(CHART_HEIGHT)
                    .show(ui, |ui| {
                        egui::Grid::new("observation_table_grid")
                            .striped(true)
                            .min_col_width(60.0)
                            .spacing([10.0, 4.0])
                            .show(ui, |ui| {
                                for header in &table.headers {
                                    ui.label(RichText::new(header).strong().size(11.0));
                                }
                                ui.end_row();

                                for row in &table.rows {
                                    for cell in row {
                                        ui.label(RichText::new(cell).size(11.0));
                                    }
                                    ui.end_row();
                                }
                            });
                    });
            });
    }

    /// Latitude/Longitude scatter colored by Location_Type; hover names the plot.
    pub fn draw_map(ui: &mut egui::Ui, series: &[ChartSeries<MapPoint>]) {
        let hover_points: Vec<MapPoint> = series.iter().flat_map(|s| s.points.clone()).collect();

        Plot::new("observation_map")
            .height(CHART_HEIGHT)
            .legend(Legend::default())
            .data_aspect(1.0)
            .allow_scroll(false)
            .x_axis_label("Longitude")
            .y_axis_label("Latitude")
            .label_formatter(move |_name, value| {
                nearest(&hover_points, |p| (p.longitude, p.latitude), value)
                    .map(|p| format!("{}\n{}\n{}", p.plot, p.location, p.detail))
                    .unwrap_or_default()
            })
            .show(ui, |plot_ui| {
                for (idx, location) in series.iter().enumerate() {
                    let coords: Vec<[f64; 2]> = location
                        .points
                        .iter()
                        .map(|p| [p.longitude, p.latitude])
                        .collect();
                    plot_ui.points(
                        Points::new(coords)
                            .radius(4.0)
                            .color(Self::color_for(idx))
                            .name(&location.name),
                    );
                }
            });
    }

    /// Observation count per plot, as a bar chart in count order.
    pub fn draw_plot_counts(ui: &mut egui::Ui, counts: &[(String, usize)]) {
        let labels: Vec<String> = counts.iter().map(|(plot, _)| plot.clone()).collect();

        Plot::new("plot_counts")
            .height(CHART_HEIGHT)
            .allow_scroll(false)
            .x_axis_label("Plot Name")
            .y_axis_label("Observation Count")
            .include_y(0.0)
            .x_axis_formatter(move |mark, _range| axis_label(&labels, mark.value))
            .show(ui, |plot_ui| {
                let bars: Vec<Bar> = counts
                    .iter()
                    .enumerate()
                    .map(|(i, (plot, count))| {
                        Bar::new(i as f64, *count as f64)
                            .width(0.7)
                            .name(plot)
                    })
                    .collect();
                plot_ui.bar_chart(
                    BarChart::new(bars)
                        .color(PALETTE[0])
                        .name("Observations"),
                );
            });
    }

    /// Year x Month observation density, one colored cell per pair.
    pub fn draw_heatmap(ui: &mut egui::Ui, cells: &[DensityCell]) {
        let max = cells.iter().map(|c| c.count).max().unwrap_or(1).max(1) as f64;

        Plot::new("monthly_density")
            .height(CHART_HEIGHT)
            .allow_scroll(false)
            .show_grid(false)
            .x_axis_label("Month")
            .y_axis_label("Year")
            .include_x(0.5)
            .include_x(12.5)
            .x_axis_formatter(|mark, _range| {
                let m = mark.value.round();
                if (mark.value - m).abs() < 1e-6 && (1.0..=12.0).contains(&m) {
                    MONTH_LABELS[m as usize - 1].to_string()
                } else {
                    String::new()
                }
            })
            .y_axis_formatter(|mark, _range| {
                if mark.value.fract().abs() < 1e-6 {
                    format!("{}", mark.value as i64)
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                for cell in cells {
                    let (x, y) = (cell.month as f64, cell.year as f64);
                    let color = Self::viridis(cell.count as f64 / max);
                    let rect: PlotPoints = vec![
                        [x - 0.5, y - 0.5],
                        [x + 0.5, y - 0.5],
                        [x + 0.5, y + 0.5],
                        [x - 0.5, y + 0.5],
                    ]
                    .into();
                    plot_ui.polygon(
                        Polygon::new(rect)
                            .fill_color(color)
                            .stroke(Stroke::new(0.5, color)),
                    );
                    plot_ui.text(
                        Text::new(PlotPoint::new(x, y), cell.count.to_string())
                            .color(Color32::WHITE),
                    );
                }
            });

        ui.horizontal(|ui| {
            ui.label(RichText::new("Count").size(11.0));
            for step in 0..=4 {
                let t = step as f64 / 4.0;
                let (rect, _) = ui.allocate_exact_size(egui::vec2(24.0, 12.0), egui::Sense::hover());
                ui.painter().rect_filled(rect, 2.0, Self::viridis(t));
                ui.label(RichText::new(format!("{:.0}", t * max)).size(10.0));
            }
        });
    }

    /// Temperature vs Humidity, one series per plot.
    pub fn draw_environment(ui: &mut egui::Ui, series: &[ChartSeries<EnvironmentPoint>]) {
        let hover_points: Vec<EnvironmentPoint> =
            series.iter().flat_map(|s| s.points.clone()).collect();

        Plot::new("environment_scatter")
            .height(CHART_HEIGHT)
            .legend(Legend::default())
            .allow_scroll(false)
            .x_axis_label("Temperature")
            .y_axis_label("Humidity")
            .label_formatter(move |_name, value| {
                nearest(&hover_points, |p| (p.temperature, p.humidity), value)
                    .map(|p| {
                        format!(
                            "{}\n{:.1} / {:.1}\n{}",
                            p.plot, p.temperature, p.humidity, p.detail
                        )
                    })
                    .unwrap_or_default()
            })
            .show(ui, |plot_ui| {
                for (idx, plot) in series.iter().enumerate() {
                    let coords: Vec<[f64; 2]> = plot
                        .points
                        .iter()
                        .map(|p| [p.temperature, p.humidity])
                        .collect();
                    plot_ui.points(
                        Points::new(coords)
                            .radius(3.5)
                            .color(Self::color_for(idx))
                            .name(&plot.name),
                    );
                }
            });
    }

    /// Share of observations per PIF watchlist status.
    pub fn draw_watchlist_pie(ui: &mut egui::Ui, counts: &[(String, usize)]) {
        let total: usize = counts.iter().map(|(_, n)| n).sum();
        if total == 0 {
            return;
        }

        Plot::new("watchlist_pie")
            .height(CHART_HEIGHT)
            .legend(Legend::default())
            .data_aspect(1.0)
            .show_axes(false)
            .show_grid(false)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .include_x(-1.2)
            .include_x(1.2)
            .include_y(-1.2)
            .include_y(1.2)
            .show(ui, |plot_ui| {
                let mut start = std::f64::consts::FRAC_PI_2;
                for (idx, (status, count)) in counts.iter().enumerate() {
                    let share = *count as f64 / total as f64;
                    let sweep = share * std::f64::consts::TAU;
                    let color = Self::color_for(idx);

                    plot_ui.polygon(
                        Polygon::new(pie_slice(start, sweep))
                            .fill_color(color.gamma_multiply(0.85))
                            .stroke(Stroke::new(1.0, Color32::WHITE))
                            .name(status),
                    );

                    let mid = start - sweep / 2.0;
                    plot_ui.text(
                        Text::new(
                            PlotPoint::new(0.65 * mid.cos(), 0.65 * mid.sin()),
                            format!("{:.1}%", share * 100.0),
                        )
                        .color(Color32::WHITE),
                    );
                    start -= sweep;
                }
            });
    }

    /// Observations per habitat, stacked by season; `bars` are sorted by habitat.
    pub fn draw_activity_zones(ui: &mut egui::Ui, bars: &[ActivityBar]) {
        let mut locations: Vec<String> = bars.iter().map(|b| b.location.clone()).collect();
        locations.dedup();
        let seasons: BTreeSet<&str> = bars.iter().map(|b| b.season.as_str()).collect();
        let labels = locations.clone();

        Plot::new("activity_zones")
            .height(CHART_HEIGHT)
            .legend(Legend::default())
            .allow_scroll(false)
            .x_axis_label("Location Type")
            .y_axis_label("Observations")
            .include_y(0.0)
            .x_axis_formatter(move |mark, _range| axis_label(&labels, mark.value))
            .show(ui, |plot_ui| {
                let mut charts: Vec<BarChart> = Vec::new();
                for season in &seasons {
                    let season_bars: Vec<Bar> = locations
                        .iter()
                        .enumerate()
                        .map(|(i, location)| {
                            let count = bars
                                .iter()
                                .find(|b| &b.location == location && b.season == *season)
                                .map(|b| b.count)
                                .unwrap_or(0);
                            Bar::new(i as f64, count as f64).width(0.6)
                        })
                        .collect();

                    let below: Vec<&BarChart> = charts.iter().collect();
                    let chart = BarChart::new(season_bars)
                        .color(Self::season_color(season))
                        .name(*season)
                        .stack_on(&below);
                    charts.push(chart);
                }
                for chart in charts {
                    plot_ui.bar_chart(chart);
                }
            });
    }
}

/// Category label for an integer tick; blank between ticks.
fn axis_label(labels: &[String], value: f64) -> String {
    let idx = value.round();
    if (value - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

fn nearest<'a, T>(items: &'a [T], coords: impl Fn(&T) -> (f64, f64), at: &PlotPoint) -> Option<&'a T> {
    items.iter().min_by(|a, b| {
        let da = distance_sq(coords(a), at);
        let db = distance_sq(coords(b), at);
        da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
    })
}

fn distance_sq((x, y): (f64, f64), at: &PlotPoint) -> f64 {
    (x - at.x).powi(2) + (y - at.y).powi(2)
}

/// Closed polygon for a unit-radius slice starting at `start`, sweeping clockwise.
fn pie_slice(start: f64, sweep: f64) -> PlotPoints {
    let steps = ((sweep / std::f64::consts::TAU) * PIE_SEGMENTS as f64).ceil().max(1.0) as usize;
    let mut pts = Vec::with_capacity(steps + 2);
    pts.push([0.0, 0.0]);
    for i in 0..=steps {
        let angle = start - sweep * i as f64 / steps as f64;
        pts.push([angle.cos(), angle.sin()]);
    }
    pts.into()
}
