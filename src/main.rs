//! Bird Monitoring Dashboard - forest & grassland observation viewer
//!
//! Cleans both habitat files, merges them, and opens the interactive dashboard
//! (or prints a summary with `--headless`).

use anyhow::Context;
use bird_dashboard::config::{DashboardConfig, PersistTarget};
use bird_dashboard::data::{Choice, DataLoader, FilterSelection, Pipeline, Season};
use bird_dashboard::gui::DashboardApp;
use clap::Parser;
use eframe::egui;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Forest observations CSV
    #[arg(long)]
    forest: Option<PathBuf>,
    /// Grassland observations CSV
    #[arg(long)]
    grassland: Option<PathBuf>,
    /// Directory for cleaned copies
    #[arg(long, conflicts_with_all = ["in_place", "no_persist"])]
    output_dir: Option<PathBuf>,
    /// Overwrite the source files with the cleaned data
    #[arg(long, conflicts_with = "no_persist")]
    in_place: bool,
    /// Do not write cleaned copies
    #[arg(long)]
    no_persist: bool,
    /// Run the pipeline and print a summary instead of opening the window
    #[arg(long)]
    headless: bool,
    #[arg(long, requires = "headless")]
    year: Option<i32>,
    #[arg(long, requires = "headless")]
    location: Option<String>,
    #[arg(long, requires = "headless")]
    season: Option<Season>,
    /// Write the filtered view to this CSV (headless only)
    #[arg(long, requires = "headless")]
    export: Option<PathBuf>,
}

impl Cli {
    fn resolve_config(&self) -> anyhow::Result<DashboardConfig> {
        let mut config = match &self.config {
            Some(path) => DashboardConfig::load(path)
                .with_context(|| format!("Loading configuration from {}", path.display()))?,
            None => DashboardConfig::default(),
        };

        if let Some(forest) = &self.forest {
            config.forest_path = forest.clone();
        }
        if let Some(grassland) = &self.grassland {
            config.grassland_path = grassland.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.persist = PersistTarget::Directory { path: dir.clone() };
        }
        if self.in_place {
            config.persist = PersistTarget::InPlace;
        }
        if self.no_persist {
            config.persist = PersistTarget::Disabled;
        }
        Ok(config)
    }

    fn selection(&self) -> FilterSelection {
        FilterSelection {
            year: self.year.map_or(Choice::Any, Choice::Specific),
            location: self.location.clone().map_or(Choice::Any, Choice::Specific),
            season: self.season.map_or(Choice::Any, Choice::Specific),
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    log::info!(
        "Loading forest data from {} and grassland data from {}",
        config.forest_path.display(),
        config.grassland_path.display()
    );
    let dashboard = Pipeline::new(&config)
        .run()
        .context("Preparing observation data")?;

    if cli.headless {
        let selection = cli.selection();
        let filtered = selection
            .apply(&dashboard.unified)
            .context("Applying filter selection")?;

        println!("Years:     {:?}", dashboard.options.years);
        println!("Locations: {:?}", dashboard.options.locations);
        println!(
            "Seasons:   {:?}",
            dashboard
                .options
                .seasons
                .iter()
                .map(Season::as_str)
                .collect::<Vec<_>>()
        );
        println!("{}", selection);
        println!(
            "{} of {} observations match",
            filtered.height(),
            dashboard.unified.height()
        );

        if let Some(path) = &cli.export {
            DataLoader::write_csv(&filtered, path)
                .with_context(|| format!("Exporting filtered view to {}", path.display()))?;
            log::info!("Exported {} rows to {}", filtered.height(), path.display());
        }
        return Ok(());
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([1100.0, 700.0])
            .with_title("Bird Monitoring Dashboard"),
        ..Default::default()
    };

    eframe::run_native(
        "Bird Monitoring Dashboard",
        options,
        Box::new(move |cc| Ok(Box::new(DashboardApp::new(cc, config, dashboard)))),
    )
    .map_err(|e| anyhow::anyhow!("Dashboard window failed: {}", e))
}
