//! Bird Monitoring Dashboard
//!
//! Cleans forest and grassland bird observation files, merges them into one
//! table, and draws filterable charts over it.

pub mod charts;
pub mod config;
pub mod data;
pub mod gui;
