//! Data module - observation loading, cleaning, merging and filtering

pub mod cleaner;
pub mod filter;
pub mod loader;
pub mod merger;
pub mod pipeline;
pub mod schema;

pub use cleaner::{CleanError, CleanReport, Cleaner, Season};
pub use filter::{Choice, FilterOptions, FilterSelection};
pub use loader::{DataLoader, LoaderError};
pub use merger::MergeError;
pub use pipeline::{CleanedDataset, Dashboard, Pipeline, PipelineError};
pub use schema::{Habitat, SchemaCapabilities};
