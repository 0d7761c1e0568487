//! Statistical imputation methods.
//!
//! Numeric columns are filled with their median, categorical columns with
//! their mode.

use crate::error::Result;
use crate::profiler::statistics::median;
use crate::types::{ColumnFill, ColumnKind, FillStrategy};
use crate::utils::{fill_numeric_nulls, fill_string_nulls, non_null_f64, string_mode};
use polars::prelude::*;

/// Statistical imputation methods for filling missing values.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Fill the nulls of one column according to its kind.
    ///
    /// Returns `None` when the column has no observed value to derive a
    /// fill from. A column without nulls is returned unchanged, with a
    /// fill record of zero.
    pub fn impute_column(series: &Series, kind: ColumnKind) -> Result<Option<(Series, ColumnFill)>> {
        match kind {
            ColumnKind::Numeric => Self::apply_numeric_median(series),
            ColumnKind::Categorical => Self::apply_mode_imputation(series),
        }
    }

    /// Median imputation for numeric columns.
    pub fn apply_numeric_median(series: &Series) -> Result<Option<(Series, ColumnFill)>> {
        let values = non_null_f64(series)?;
        let Some(median_val) = median(&values) else {
            return Ok(None);
        };

        let filled = if series.null_count() > 0 {
            fill_numeric_nulls(series, median_val)?
        } else {
            series.clone()
        };

        Ok(Some((
            filled,
            ColumnFill {
                column: series.name().to_string(),
                strategy: FillStrategy::Median,
                value: median_val.to_string(),
                filled: series.null_count(),
            },
        )))
    }

    /// Mode imputation for categorical columns.
    pub fn apply_mode_imputation(series: &Series) -> Result<Option<(Series, ColumnFill)>> {
        let Some(mode_val) = string_mode(series) else {
            return Ok(None);
        };

        let filled = if series.null_count() > 0 {
            fill_string_nulls(series, &mode_val)?
        } else {
            series.clone()
        };

        Ok(Some((
            filled,
            ColumnFill {
                column: series.name().to_string(),
                strategy: FillStrategy::Mode,
                value: mode_val,
                filled: series.null_count(),
            },
        )))
    }
}
