//! Control Panel Widget
//! Left side panel with data sources, filters and actions.

use crate::data::{Choice, FilterOptions, FilterSelection};
use egui::{Color32, ComboBox, RichText};
use std::fmt;
use std::path::{Path, PathBuf};

/// Left side control panel with source files and filter selectors.
pub struct ControlPanel {
    pub forest_path: PathBuf,
    pub grassland_path: PathBuf,
    pub selection: FilterSelection,
    pub options: FilterOptions,
    pub status: String,
}

impl ControlPanel {
    pub fn new(forest_path: PathBuf, grassland_path: PathBuf) -> Self {
        Self {
            forest_path,
            grassland_path,
            selection: FilterSelection::default(),
            options: FilterOptions::default(),
            status: "Ready".to_string(),
        }
    }

    /// Replace the selector options after a pipeline run.
    ///
    /// Selections that no longer exist fall back to "All".
    pub fn update_options(&mut self, options: FilterOptions) {
        if let Choice::Specific(year) = &self.selection.year {
            if !options.years.contains(year) {
                self.selection.year = Choice::Any;
            }
        }
        if let Choice::Specific(location) = &self.selection.location {
            if !options.locations.contains(location) {
                self.selection.location = Choice::Any;
            }
        }
        if let Choice::Specific(season) = &self.selection.season {
            if !options.seasons.contains(season) {
                self.selection.season = Choice::Any;
            }
        }
        self.options = options;
    }

    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🕊 Bird Monitoring")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("Forest & Grassland")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data Sources =====
        ui.label(RichText::new("📁 Data Sources").size(14.0).strong());
        ui.add_space(5.0);

        if source_row(ui, "Forest", &self.forest_path) {
            action = ControlPanelAction::BrowseForest;
        }
        ui.add_space(4.0);
        if source_row(ui, "Grassland", &self.grassland_path) {
            action = ControlPanelAction::BrowseGrassland;
        }

        ui.add_space(8.0);
        ui.vertical_centered(|ui| {
            let button = egui::Button::new(RichText::new("⟳ Reload & Clean").size(14.0))
                .min_size(egui::vec2(180.0, 30.0));
            if ui.add(button).clicked() {
                action = ControlPanelAction::Reload;
            }
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Filters =====
        ui.label(RichText::new("🔍 Filters").size(14.0).strong());
        ui.add_space(8.0);

        let years = self.options.year_choices();
        let locations = self.options.location_choices();
        let seasons = self.options.season_choices();

        let mut changed = false;
        changed |= choice_combo(ui, "year", "Select Year", &mut self.selection.year, &years);
        ui.add_space(5.0);
        changed |= choice_combo(
            ui,
            "location",
            "Select Location Type",
            &mut self.selection.location,
            &locations,
        );
        ui.add_space(5.0);
        changed |= choice_combo(ui, "season", "Select Season", &mut self.selection.season, &seasons);

        if changed {
            action = ControlPanelAction::FilterChanged;
        }

        ui.add_space(8.0);
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(!self.selection.is_unfiltered(), |ui| {
                if ui.small_button("Reset filters").clicked() {
                    self.selection = FilterSelection::default();
                    action = ControlPanelAction::FilterChanged;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Export =====
        ui.vertical_centered(|ui| {
            let button = egui::Button::new(RichText::new("📄 Export filtered view").size(14.0))
                .min_size(egui::vec2(180.0, 30.0));
            if ui.add(button).clicked() {
                action = ControlPanelAction::ExportView;
            }
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        let status_color = if self.status.contains("Error") {
            Color32::from_rgb(220, 53, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }
}

/// One source file line with a Browse button; returns `true` when clicked.
fn source_row(ui: &mut egui::Ui, label: &str, path: &Path) -> bool {
    let mut clicked = false;
    egui::Frame::none()
        .fill(ui.visuals().widgets.noninteractive.bg_fill)
        .rounding(5.0)
        .inner_margin(8.0)
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| "No file selected".to_string());
                ui.label(RichText::new(format!("{}:", label)).size(12.0).strong());
                ui.label(RichText::new(file_name).size(12.0))
                    .on_hover_text(path.display().to_string());

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("📂 Browse").clicked() {
                        clicked = true;
                    }
                });
            });
        });
    clicked
}

/// Labelled selector over `choices`; returns `true` when the value changed.
fn choice_combo<T>(
    ui: &mut egui::Ui,
    id: &str,
    label: &str,
    current: &mut Choice<T>,
    choices: &[Choice<T>],
) -> bool
where
    T: Clone + PartialEq + fmt::Display,
{
    let label_width = 130.0;
    let combo_width = 140.0;
    let mut changed = false;

    ui.horizontal(|ui| {
        ui.add_sized([label_width, 20.0], egui::Label::new(label));
        ComboBox::from_id_salt(id)
            .width(combo_width)
            .selected_text(current.to_string())
            .show_ui(ui, |ui| {
                for choice in choices {
                    if ui
                        .selectable_label(*current == *choice, choice.to_string())
                        .clicked()
                        && *current != *choice
                    {
                        *current = choice.clone();
                        changed = true;
                    }
                }
            });
    });
    changed
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseForest,
    BrowseGrassland,
    Reload,
    FilterChanged,
    ExportView,
}
