//! Dataset Merger Module
//! Restricts both cleaned datasets to their shared columns and stacks them.

use polars::prelude::*;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MergeError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Column names present in both frames, in `first`'s column order.
pub fn common_columns(first: &DataFrame, second: &DataFrame) -> Vec<String> {
    let other: HashSet<&str> = second
        .get_column_names()
        .iter()
        .map(|c| c.as_str())
        .collect();

    first
        .get_column_names()
        .iter()
        .filter(|c| other.contains(c.as_str()))
        .map(|c| c.to_string())
        .collect()
}

/// Stack `first` then `second`, keeping only the columns both carry.
///
/// A shared column whose dtypes differ is widened to their common
/// supertype (i64 + f64 gives f64); when none exists both sides become text.
/// Disjoint schemas produce an empty frame.
pub fn merge(first: &DataFrame, second: &DataFrame) -> Result<DataFrame, MergeError> {
    let shared = common_columns(first, second);
    if shared.is_empty() {
        log::warn!("Datasets share no columns; unified table is empty");
        return Ok(DataFrame::empty());
    }

    let selection: Vec<Expr> = shared.iter().map(|name| col(name.as_str())).collect();
    let top = first.clone().lazy().select(selection.clone());
    let bottom = second.clone().lazy().select(selection);

    let widened = concat(
        [top.clone(), bottom.clone()],
        UnionArgs {
            to_supertypes: true,
            ..Default::default()
        },
    )
    .and_then(|lf| lf.collect());

    match widened {
        Ok(df) => Ok(df),
        Err(e) => {
            log::debug!("No common supertype for shared columns ({}); stacking mismatches as text", e);
            let as_text: Vec<Expr> = shared
                .iter()
                .map(|name| {
                    let mismatched = first.column(name).map(|c| c.dtype().clone()).ok()
                        != second.column(name).map(|c| c.dtype().clone()).ok();
                    if mismatched {
                        col(name.as_str()).cast(DataType::String)
                    } else {
                        col(name.as_str())
                    }
                })
                .collect();
            let stacked = concat(
                [top.select(as_text.clone()), bottom.select(as_text)],
                UnionArgs::default(),
            )?
            .collect()?;
            Ok(stacked)
        }
    }
}
