//! CSV Data Loader Module
//! Handles observation file loading and cleaned-copy persistence using Polars.

use crate::data::schema;
use polars::prelude::*;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Cannot read observation file {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },
    #[error("Observation file not found: {path}")]
    NotFound { path: PathBuf },
    #[error("Observation file {path} is missing mandatory column '{column}'")]
    MissingColumn { path: PathBuf, column: String },
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },
    #[error("Failed to create {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Reads and writes observation CSV files.
pub struct DataLoader;

impl DataLoader {
    /// Load a CSV file and verify the mandatory columns exist.
    pub fn load_csv(file_path: &Path) -> Result<DataFrame, LoaderError> {
        if !file_path.is_file() {
            return Err(LoaderError::NotFound {
                path: file_path.to_path_buf(),
            });
        }

        let df = LazyCsvReader::new(file_path)
            .with_has_header(true)
            .with_infer_schema_length(Some(10000))
            .with_ignore_errors(true)
            .finish()
            .and_then(|lazy| lazy.collect())
            .map_err(|source| LoaderError::Unreadable {
                path: file_path.to_path_buf(),
                source,
            })?;

        if let Some(column) = schema::missing_mandatory(&df).first() {
            return Err(LoaderError::MissingColumn {
                path: file_path.to_path_buf(),
                column: column.to_string(),
            });
        }

        log::debug!(
            "Read {} rows, {} columns from {}",
            df.height(),
            df.width(),
            file_path.display()
        );
        Ok(df)
    }

    /// Write a DataFrame as a headered CSV without an index column.
    pub fn write_csv(df: &DataFrame, file_path: &Path) -> Result<(), LoaderError> {
        if let Some(parent) = file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| LoaderError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let mut file = File::create(file_path).map_err(|source| LoaderError::Io {
            path: file_path.to_path_buf(),
            source,
        })?;

        // CsvWriter needs a mutable frame
        let mut out = df.clone();
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut out)
            .map_err(|source| LoaderError::Write {
                path: file_path.to_path_buf(),
                source,
            })?;

        log::debug!("Wrote {} rows to {}", df.height(), file_path.display());
        Ok(())
    }

    /// Distinct non-null values of a column as text, in first-seen order.
    ///
    /// An absent column has no values.
    pub fn get_unique_values(df: &DataFrame, column: &str) -> PolarsResult<Vec<String>> {
        if !schema::has_column(df, column) {
            return Ok(Vec::new());
        }
        let unique = df
            .column(column)?
            .drop_nulls()
            .unique_stable()?
            .cast(&DataType::String)?;
        Ok(unique
            .str()?
            .into_iter()
            .flatten()
            .map(str::to_string)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "bird_dashboard_loader_{}_{}",
            name,
            std::process::id()
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_file(path: &Path, contents: &str) {
        let mut f = File::create(path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
    }

    #[test]
    fn loads_file_with_mandatory_columns() {
        let dir = scratch_dir("ok");
        let path = dir.join("forest.csv");
        write_file(
            &path,
            "Date,Location_Type,Plot_Name,Observer\n2023-04-15,Forest,P1,Ann\n2023-05-01,Forest,P2,\n",
        );

        let df = DataLoader::load_csv(&path).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 4);
        assert!(df.column("Observer").unwrap().get(1).unwrap().is_null());
    }

    #[test]
    fn unique_values_keep_first_seen_order_and_skip_nulls() {
        let df = df! {
            "Location_Type" => [Some("Grassland"), None, Some("Forest"), Some("Grassland")],
            "Year" => [2024i32, 2023, 2024, 2022],
        }
        .unwrap();

        assert_eq!(
            DataLoader::get_unique_values(&df, "Location_Type").unwrap(),
            vec!["Grassland", "Forest"]
        );
        assert_eq!(
            DataLoader::get_unique_values(&df, "Year").unwrap(),
            vec!["2024", "2023", "2022"]
        );
        assert!(DataLoader::get_unique_values(&df, "Season").unwrap().is_empty());
    }

    #[test]
    fn missing_mandatory_column_names_file_and_column() {
        let dir = scratch_dir("missing");
        let path = dir.join("grass.csv");
        write_file(&path, "Date,Location_Type\n2023-04-15,Grassland\n");

        match DataLoader::load_csv(&path) {
            Err(LoaderError::MissingColumn { path: p, column }) => {
                assert_eq!(p, path);
                assert_eq!(column, "Plot_Name");
            }
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn nonexistent_file_is_reported() {
        let path = scratch_dir("absent").join("nope.csv");
        assert!(matches!(
            DataLoader::load_csv(&path),
            Err(LoaderError::NotFound { .. })
        ));
    }

    #[test]
    fn write_creates_parent_directories() {
        let dir = scratch_dir("write");
        let path = dir.join("nested").join("out.csv");
        let df = df! {
            "Date" => ["2023-04-15"],
            "Location_Type" => ["Forest"],
            "Plot_Name" => ["P1"],
        }
        .unwrap();

        DataLoader::write_csv(&df, &path).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("Date,Location_Type,Plot_Name\n"));
        assert!(text.contains("2023-04-15,Forest,P1"));
    }
}
