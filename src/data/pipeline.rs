//! Dashboard Pipeline
//! Load -> clean -> persist -> merge, producing everything the window draws.

use crate::charts::{ActivityBar, DensityCell, Summaries};
use crate::config::{DashboardConfig, PersistTarget};
use crate::data::cleaner::{CleanError, CleanReport, Cleaner};
use crate::data::filter::FilterOptions;
use crate::data::loader::{DataLoader, LoaderError};
use crate::data::merger::{self, MergeError};
use crate::data::schema::{Habitat, SchemaCapabilities};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Load(#[from] LoaderError),
    #[error("Cleaning {habitat} data from {path} failed: {source}")]
    Clean {
        habitat: Habitat,
        path: PathBuf,
        #[source]
        source: CleanError,
    },
    #[error("Merging cleaned datasets failed: {0}")]
    Merge(#[from] MergeError),
    #[error("Building dashboard summaries failed: {0}")]
    Summaries(#[from] PolarsError),
    #[error("Forest and grassland cleaned copies would both be written to {0}")]
    OutputCollision(PathBuf),
}

/// One habitat file after cleaning.
#[derive(Debug, Clone)]
pub struct CleanedDataset {
    pub habitat: Habitat,
    pub source: PathBuf,
    pub data: DataFrame,
    pub report: CleanReport,
    pub capabilities: SchemaCapabilities,
    /// Where the cleaned copy was written, if anywhere
    pub persisted_to: Option<PathBuf>,
}

/// Everything derived from one full pipeline run.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub forest: CleanedDataset,
    pub grassland: CleanedDataset,
    /// Forest rows then grassland rows over the shared columns
    pub unified: DataFrame,
    pub capabilities: SchemaCapabilities,
    pub options: FilterOptions,
    /// Year x Month counts over the whole unified table
    pub density: Vec<DensityCell>,
    /// Habitat x Season counts over the whole unified table
    pub activity: Vec<ActivityBar>,
}

/// Path the cleaned copy of `source` is written to, if any.
pub fn persist_path(target: &PersistTarget, habitat: Habitat, source: &Path) -> Option<PathBuf> {
    match target {
        PersistTarget::InPlace => Some(source.to_path_buf()),
        PersistTarget::Directory { path } => {
            let file_name = source
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "observations.csv".to_string());
            Some(path.join(format!("{}_{}", habitat.as_str(), file_name)))
        }
        PersistTarget::Disabled => None,
    }
}

/// Runs the full load/clean/merge pipeline for a configuration.
pub struct Pipeline<'a> {
    config: &'a DashboardConfig,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a DashboardConfig) -> Self {
        Self { config }
    }

    pub fn run(&self) -> Result<Dashboard, PipelineError> {
        let started = Instant::now();

        let forest_out = persist_path(&self.config.persist, Habitat::Forest, &self.config.forest_path);
        let grassland_out = persist_path(
            &self.config.persist,
            Habitat::Grassland,
            &self.config.grassland_path,
        );
        if let (Some(a), Some(b)) = (&forest_out, &grassland_out) {
            if a == b {
                return Err(PipelineError::OutputCollision(a.clone()));
            }
        }

        // Load both before writing anything so a bad second file leaves the first untouched
        let forest_raw = DataLoader::load_csv(&self.config.forest_path)?;
        let grassland_raw = DataLoader::load_csv(&self.config.grassland_path)?;

        let forest = Self::clean_dataset(Habitat::Forest, &self.config.forest_path, &forest_raw, forest_out)?;
        let grassland = Self::clean_dataset(
            Habitat::Grassland,
            &self.config.grassland_path,
            &grassland_raw,
            grassland_out,
        )?;

        let unified = merger::merge(&forest.data, &grassland.data)?;
        let capabilities = SchemaCapabilities::detect(&unified);
        let options = FilterOptions::from_table(&unified)?;
        let density = Summaries::monthly_density(&unified)?;
        let activity = Summaries::activity_zones(&unified)?;

        log::info!(
            "Unified table: {} rows, {} columns ({}) in {:?}",
            unified.height(),
            unified.width(),
            capabilities,
            started.elapsed()
        );

        Ok(Dashboard {
            forest,
            grassland,
            unified,
            capabilities,
            options,
            density,
            activity,
        })
    }

    fn clean_dataset(
        habitat: Habitat,
        source: &Path,
        raw: &DataFrame,
        output: Option<PathBuf>,
    ) -> Result<CleanedDataset, PipelineError> {
        let (data, report) = Cleaner::clean(raw).map_err(|source_err| PipelineError::Clean {
            habitat,
            path: source.to_path_buf(),
            source: source_err,
        })?;
        let capabilities = SchemaCapabilities::detect(&data);
        log::info!("Cleaned {} data ({}): {}", habitat, source.display(), report);
        log::debug!("{} capabilities: {}", habitat, capabilities);

        if let Some(path) = &output {
            DataLoader::write_csv(&data, path)?;
            log::info!("Saved cleaned {} data to {}", habitat, path.display());
        }

        Ok(CleanedDataset {
            habitat,
            source: source.to_path_buf(),
            data,
            report,
            capabilities,
            persisted_to: output,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persist_paths_follow_target() {
        let source = Path::new("/data/birds.csv");

        assert_eq!(
            persist_path(&PersistTarget::InPlace, Habitat::Forest, source),
            Some(PathBuf::from("/data/birds.csv"))
        );
        assert_eq!(
            persist_path(
                &PersistTarget::Directory {
                    path: PathBuf::from("/out")
                },
                Habitat::Grassland,
                source
            ),
            Some(PathBuf::from("/out/grassland_birds.csv"))
        );
        assert_eq!(persist_path(&PersistTarget::Disabled, Habitat::Forest, source), None);
    }

    #[test]
    fn in_place_with_same_source_twice_is_rejected() {
        let config = DashboardConfig {
            forest_path: PathBuf::from("same.csv"),
            grassland_path: PathBuf::from("same.csv"),
            persist: PersistTarget::InPlace,
            ..Default::default()
        };
        assert!(matches!(
            Pipeline::new(&config).run(),
            Err(PipelineError::OutputCollision(_))
        ));
    }
}
