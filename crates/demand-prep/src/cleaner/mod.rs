//! Data cleaning module.
//!
//! This module provides functionality for:
//! - Dropping rows where every value is missing
//! - Removing exact duplicate rows
//! - Imputing the remaining missing values (median / mode)
//! - Label-encoding a categorical column

mod encoding;

pub use encoding::{encode_labels, encoded_column_name};

use crate::error::{PrepError, Result, ResultExt};
use crate::imputers::StatisticalImputer;
use crate::types::{DatasetSchema, MissingValueReport, NullCounts};
use polars::prelude::*;
use std::fmt;
use tracing::{debug, info, warn};

/// Null count of every column, in column order.
pub fn null_counts(df: &DataFrame) -> NullCounts {
    df.get_columns()
        .iter()
        .map(|col| (col.name().to_string(), col.null_count()))
        .collect()
}

/// Data cleaner for the missing-value stage.
pub struct DataCleaner;

impl DataCleaner {
    /// Drop rows in which every column is null.
    ///
    /// Returns the filtered frame and the number of rows removed.
    pub fn drop_empty_rows(df: DataFrame) -> Result<(DataFrame, usize)> {
        if df.width() == 0 || df.height() == 0 {
            return Ok((df, 0));
        }

        // Count nulls per row by accumulating column null masks
        let mut null_counts = vec![0usize; df.height()];
        for col in df.get_columns() {
            let mask = col.as_materialized_series().is_null();
            for (count, is_null) in null_counts.iter_mut().zip(mask.into_iter()) {
                if is_null.unwrap_or(false) {
                    *count += 1;
                }
            }
        }

        let width = df.width();
        let keep: Vec<bool> = null_counts.iter().map(|&n| n < width).collect();
        let mask = BooleanChunked::new("keep".into(), &keep);

        let before = df.height();
        let df = df.filter(&mask).context("Dropping empty rows")?;
        let removed = before - df.height();

        if removed > 0 {
            debug!("Removed {} fully empty rows", removed);
        }
        Ok((df, removed))
    }

    /// Drop exact duplicate rows, keeping the first occurrence in row order.
    ///
    /// Returns the deduplicated frame and the number of rows removed.
    pub fn drop_duplicate_rows(df: DataFrame) -> Result<(DataFrame, usize)> {
        if df.width() == 0 || df.height() == 0 {
            return Ok((df, 0));
        }

        let before = df.height();
        let df = df
            .lazy()
            .unique_stable(None, UniqueKeepStrategy::First)
            .collect()
            .context("Removing duplicate rows")?;
        let removed = before - df.height();

        if removed > 0 {
            let pct = (removed as f64 / before as f64) * 100.0;
            debug!("Removed {} duplicate rows ({:.1}%)", removed, pct);
        }
        Ok((df, removed))
    }

    /// Run the full missing-value stage.
    ///
    /// 1. Drop rows that are entirely empty
    /// 2. Drop duplicate rows
    /// 3. Fill every column that still has nulls (median / mode)
    ///
    /// Afterwards no column contains nulls. Columns without any observed
    /// value cannot be filled and are dropped.
    pub fn handle_missing(
        df: DataFrame,
        schema: &DatasetSchema,
    ) -> Result<(DataFrame, MissingValueReport)> {
        let mut report = MissingValueReport {
            nulls_before: null_counts(&df),
            ..Default::default()
        };

        info!("Handling missing values...");

        let (df, empty_rows) = Self::drop_empty_rows(df)?;
        report.empty_rows_dropped = empty_rows;

        let (mut df, duplicates) = Self::drop_duplicate_rows(df)?;
        report.duplicate_rows_dropped = duplicates;

        for col_schema in &schema.columns {
            let name = col_schema.name.as_str();
            let series = df.column(name)?.as_materialized_series().clone();
            if series.null_count() == 0 {
                continue;
            }

            let imputed = StatisticalImputer::impute_column(&series, col_schema.kind).map_err(
                |e| PrepError::ImputationFailed {
                    column: name.to_string(),
                    reason: e.to_string(),
                },
            )?;
            match imputed {
                Some((filled, fill)) => {
                    debug!(
                        "Filled {} nulls in '{}' with {} '{}'",
                        fill.filled, name, fill.strategy, fill.value
                    );
                    df.replace(name, filled)?;
                    report.fills.push(fill);
                }
                None => {
                    warn!("Column '{}' has no values to impute from; dropping it", name);
                    df = df.drop(name)?;
                    report.dropped_columns.push(name.to_string());
                }
            }
        }

        report.nulls_after = null_counts(&df);
        info!(
            "Missing values handled: {} empty rows, {} duplicates removed, {} columns filled",
            report.empty_rows_dropped,
            report.duplicate_rows_dropped,
            report.fills.len()
        );

        Ok((df, report))
    }
}

fn write_counts(f: &mut fmt::Formatter<'_>, counts: &NullCounts) -> fmt::Result {
    for (name, count) in counts {
        writeln!(f, "{:<28} {}", name, count)?;
    }
    Ok(())
}

impl fmt::Display for MissingValueReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\n=== Missing Values Before ===")?;
        write_counts(f, &self.nulls_before)?;
        writeln!(f, "\n=== Missing Values After ===")?;
        write_counts(f, &self.nulls_after)
    }
}
