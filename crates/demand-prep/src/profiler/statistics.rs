//! Statistical functions shared by profiling, imputation, outlier removal
//! and plotting.

use crate::error::Result;
use crate::types::ColumnStatistics;
use crate::utils::{non_null_f64, series_to_strings, value_counts_ordered};
use polars::prelude::*;

/// Conventional Tukey fence multiplier.
pub const TUKEY_MULTIPLIER: f64 = 1.5;

/// Sort a copy of the values ascending. NaN sorts last.
pub(crate) fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

/// Quantile of already-sorted values using linear interpolation between
/// the two nearest order statistics.
///
/// Returns `None` for an empty slice.
pub(crate) fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }

    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Quantile of unsorted values.
pub(crate) fn quantile(values: &[f64], q: f64) -> Option<f64> {
    quantile_sorted(&sorted(values), q)
}

/// Median of the values.
pub(crate) fn median(values: &[f64]) -> Option<f64> {
    quantile(values, 0.5)
}

pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1 denominator).
pub(crate) fn std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mean = mean(values)?;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
        / (values.len() - 1) as f64;
    Some(variance.sqrt())
}

/// First and third quartile.
pub(crate) fn quartiles(values: &[f64]) -> Option<(f64, f64)> {
    let sorted = sorted(values);
    Some((quantile_sorted(&sorted, 0.25)?, quantile_sorted(&sorted, 0.75)?))
}

/// Tukey fences `(lower, upper)` from quartiles.
pub(crate) fn tukey_fences(q1: f64, q3: f64) -> (f64, f64) {
    let iqr = q3 - q1;
    (q1 - TUKEY_MULTIPLIER * iqr, q3 + TUKEY_MULTIPLIER * iqr)
}

/// Count/mean/std/min/quartiles/max of a numeric series.
pub(crate) fn describe_numeric(series: &Series) -> Result<ColumnStatistics> {
    let values = non_null_f64(series)?;
    let sorted = sorted(&values);

    Ok(ColumnStatistics::Numeric {
        count: values.len(),
        mean: mean(&values),
        std: std_dev(&values),
        min: sorted.first().copied(),
        q25: quantile_sorted(&sorted, 0.25),
        median: quantile_sorted(&sorted, 0.5),
        q75: quantile_sorted(&sorted, 0.75),
        max: sorted.last().copied(),
    })
}

/// Count/unique/top/freq of a categorical series.
pub(crate) fn describe_categorical(series: &Series) -> Result<ColumnStatistics> {
    let values = series_to_strings(series)?;
    let counts = value_counts_ordered(values.iter().flatten().map(|s| s.as_str()));
    let count = counts.iter().map(|(_, c)| c).sum();
    let (top, freq) = counts
        .first()
        .map(|(v, c)| (Some(v.clone()), *c))
        .unwrap_or((None, 0));

    Ok(ColumnStatistics::Categorical {
        count,
        unique: counts.len(),
        top,
        freq,
    })
}
