//! Plot rendering.
//!
//! Every plot is drawn onto an in-memory RGB buffer and written as PNG.
//! Plots carry shapes only; column names are encoded in the file names.
//!
//! - [`render_distributions`]: one box (or strip) plot per numeric column
//! - [`render_histogram_grid`]: all numeric histograms in one image
//! - [`render_top_values`]: bar chart of the most frequent values of a column
//! - [`render_scatter`]: one numeric column against another

mod bar;
mod canvas;
mod color;
mod distribution;
mod histogram;
mod scatter;

use crate::error::{PrepError, Result};
use crate::types::{DatasetSchema, PlotPhase};
use crate::utils::{non_null_f64, sanitize_file_stem, series_to_f64, series_to_strings};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const HISTOGRAM_FILE: &str = "histograms.png";
pub const TOP_VALUES_FILE: &str = "top20_products.png";
pub const SCATTER_FILE: &str = "scatter_Product_vs_Demand.png";

/// File name of the distribution plot of `column`.
pub fn distribution_file_name(column: &str, phase: PlotPhase) -> String {
    format!("{}_{}_boxplot.png", sanitize_file_stem(column), phase.as_str())
}

fn series<'a>(df: &'a DataFrame, column: &str) -> Result<&'a Series> {
    df.column(column)
        .map(|c| c.as_materialized_series())
        .map_err(|_| PrepError::ColumnNotFound(column.to_string()))
}

/// Render one distribution plot per numeric column into `out_dir`.
///
/// Returns the written paths in column order.
pub fn render_distributions(
    df: &DataFrame,
    schema: &DatasetSchema,
    phase: PlotPhase,
    out_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    for name in schema.numeric_columns() {
        let values = non_null_f64(series(df, name)?)?;
        let path = out_dir.join(distribution_file_name(name, phase));
        distribution::render_distribution(name, &values, &path)?;
        debug!("Saved {}", path.display());
        written.push(path);
    }

    info!(
        "Rendered {} distribution plots ({})",
        written.len(),
        phase.as_str()
    );
    Ok(written)
}

/// Render a histogram of every numeric column into one grid image.
pub fn render_histogram_grid(
    df: &DataFrame,
    schema: &DatasetSchema,
    bins: usize,
    path: &Path,
) -> Result<()> {
    let columns = schema
        .numeric_columns()
        .into_iter()
        .map(|name| -> Result<(String, Vec<f64>)> {
            Ok((name.to_string(), non_null_f64(series(df, name)?)?))
        })
        .collect::<Result<Vec<_>>>()?;

    histogram::render_histograms(&columns, bins, path)?;
    info!("Saved histogram grid ({} columns): {}", columns.len(), path.display());
    Ok(())
}

/// Render a bar chart of the `top_n` most frequent values of `column`.
///
/// Returns the ranking that was drawn.
pub fn render_top_values(
    df: &DataFrame,
    column: &str,
    top_n: usize,
    path: &Path,
) -> Result<Vec<(String, usize)>> {
    let values = series_to_strings(series(df, column)?)?;
    let ranked = bar::top_values(&values, top_n);

    bar::render_bars(&ranked, path)?;
    info!("Saved top {} '{}' values: {}", ranked.len(), column, path.display());
    Ok(ranked)
}

/// Render `y_column` against `x_column`. Rows missing either value are skipped.
pub fn render_scatter(df: &DataFrame, x_column: &str, y_column: &str, path: &Path) -> Result<()> {
    let xs = series_to_f64(series(df, x_column)?)?;
    let ys = series_to_f64(series(df, y_column)?)?;
    let points = scatter::paired_points(&xs, &ys);

    scatter::render_points(&points, path)?;
    info!(
        "Saved scatter '{}' vs '{}' ({} points): {}",
        x_column,
        y_column,
        points.len(),
        path.display()
    );
    Ok(())
}
