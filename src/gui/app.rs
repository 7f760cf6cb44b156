//! Bird Dashboard Main Application
//! Main window with control panel and chart viewer.

use crate::config::DashboardConfig;
use crate::data::{Dashboard, DataLoader, Pipeline};
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction, DashboardView};
use egui::SidePanel;
use polars::prelude::*;

/// Main application window.
pub struct DashboardApp {
    config: DashboardConfig,
    dashboard: Option<Dashboard>,
    /// Rows of the unified table matching the current selection
    filtered: DataFrame,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,
}

impl DashboardApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        config: DashboardConfig,
        dashboard: Dashboard,
    ) -> Self {
        let mut app = Self {
            control_panel: ControlPanel::new(
                config.forest_path.clone(),
                config.grassland_path.clone(),
            ),
            config,
            dashboard: None,
            filtered: DataFrame::empty(),
            chart_viewer: ChartViewer::new(),
        };
        app.install(dashboard);
        app
    }

    /// Swap in a freshly built dashboard and redraw the current selection.
    fn install(&mut self, dashboard: Dashboard) {
        self.control_panel.update_options(dashboard.options.clone());
        self.control_panel.set_status(&format!(
            "Loaded {} forest + {} grassland rows ({} shared columns)",
            dashboard.forest.data.height(),
            dashboard.grassland.data.height(),
            dashboard.unified.width()
        ));
        self.dashboard = Some(dashboard);
        self.refresh_view();
    }

    /// Re-run the filter from scratch and rebuild the chart data.
    fn refresh_view(&mut self) {
        let Some(dashboard) = &self.dashboard else {
            self.chart_viewer.clear();
            return;
        };

        let selection = &self.control_panel.selection;
        let result = selection.apply(&dashboard.unified).and_then(|filtered| {
            let view = DashboardView::build(
                &filtered,
                selection,
                dashboard.capabilities,
                self.config.table_row_limit,
            )?;
            Ok((filtered, view))
        });

        match result {
            Ok((filtered, view)) => {
                log::debug!("{}: {} rows", view.caption, filtered.height());
                self.filtered = filtered;
                self.chart_viewer.set_view(view);
            }
            Err(e) => {
                log::error!("Filtering failed: {}", e);
                self.control_panel
                    .set_status(&format!("Error: {}", e));
            }
        }
    }

    /// Run the full pipeline again; a failure keeps the previous dashboard.
    fn handle_reload(&mut self) {
        if let Some(dashboard) = reload(&mut self.config, &mut self.control_panel) {
            self.install(dashboard);
        }
    }

    fn pick_csv() -> Option<std::path::PathBuf> {
        rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
    }

    /// Write the current filtered view to a user-chosen CSV.
    fn handle_export_view(&mut self) {
        if self.dashboard.is_none() {
            self.control_panel.set_status("No data to export");
            return;
        }

        let output_path = match rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .set_file_name("bird_observations_filtered.csv")
            .save_file()
        {
            Some(path) => path,
            None => return, // User cancelled
        };

        match DataLoader::write_csv(&self.filtered, &output_path) {
            Ok(()) => {
                log::info!(
                    "Exported {} rows to {}",
                    self.filtered.height(),
                    output_path.display()
                );
                self.control_panel.set_status(&format!(
                    "Exported {} rows to {}",
                    self.filtered.height(),
                    output_path.display()
                ));
            }
            Err(e) => {
                self.control_panel.set_status(&format!("Error: {}", e));
            }
        }
    }
}

/// Rerun the pipeline on the panel's source paths.
///
/// `config` only takes the new paths when the run succeeds; on failure the
/// panel goes back to the paths of the dashboard still on screen.
fn reload(config: &mut DashboardConfig, panel: &mut ControlPanel) -> Option<Dashboard> {
    let candidate = DashboardConfig {
        forest_path: panel.forest_path.clone(),
        grassland_path: panel.grassland_path.clone(),
        ..config.clone()
    };

    match Pipeline::new(&candidate).run() {
        Ok(dashboard) => {
            *config = candidate;
            Some(dashboard)
        }
        Err(e) => {
            log::error!("Reload failed: {}", e);
            panel.forest_path = config.forest_path.clone();
            panel.grassland_path = config.grassland_path.clone();
            panel.set_status(&format!("Error: {}", e));
            None
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui);

                    match action {
                        ControlPanelAction::BrowseForest => {
                            if let Some(path) = Self::pick_csv() {
                                self.control_panel.forest_path = path;
                                self.handle_reload();
                            }
                        }
                        ControlPanelAction::BrowseGrassland => {
                            if let Some(path) = Self::pick_csv() {
                                self.control_panel.grassland_path = path;
                                self.handle_reload();
                            }
                        }
                        ControlPanelAction::Reload => self.handle_reload(),
                        ControlPanelAction::FilterChanged => self.refresh_view(),
                        ControlPanelAction::ExportView => self.handle_export_view(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Charts
        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer.show(ui, self.dashboard.as_ref());
        });
    }
}
