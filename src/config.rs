//! Dashboard Configuration
//! Source paths, where cleaned copies go, and display limits.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading config file {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse JSON configuration in {path}: {source}")]
    JsonParseError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Configuration file not found at {path}")]
    NotFound { path: PathBuf },
}

/// Where the cleaned datasets are written after each pipeline run.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PersistTarget {
    /// Overwrite the source files
    InPlace,
    /// Write `<habitat>_<file name>` under a separate directory
    Directory { path: PathBuf },
    Disabled,
}

impl Default for PersistTarget {
    fn default() -> Self {
        PersistTarget::Directory {
            path: PathBuf::from("cleaned"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    #[serde(default = "default_forest_path")]
    pub forest_path: PathBuf,
    #[serde(default = "default_grassland_path")]
    pub grassland_path: PathBuf,
    #[serde(default)]
    pub persist: PersistTarget,
    /// Maximum rows drawn in the data table
    #[serde(default = "default_table_row_limit")]
    pub table_row_limit: usize,
}

fn default_forest_path() -> PathBuf {
    PathBuf::from("data/bird_forest_data.csv")
}

fn default_grassland_path() -> PathBuf {
    PathBuf::from("data/bird_grassland_data.csv")
}

fn default_table_row_limit() -> usize {
    500
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            forest_path: default_forest_path(),
            grassland_path: default_grassland_path(),
            persist: PersistTarget::default(),
            table_row_limit: default_table_row_limit(),
        }
    }
}

impl DashboardConfig {
    /// Read a JSON config file; absent fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let file = File::open(path).map_err(|source| ConfigError::IoError {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|source| {
            ConfigError::JsonParseError {
                path: path.to_path_buf(),
                source,
            }
        })
    }
}
