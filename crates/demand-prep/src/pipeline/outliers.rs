//! Outlier handling module.
//!
//! Rows outside the Tukey fences of any numeric column are removed. Columns
//! are processed one after another in schema order, and each column's
//! quartiles are computed on the rows that survived the previous columns.

use crate::error::{Result, ResultExt};
use crate::profiler::statistics::{quartiles, tukey_fences};
use crate::types::{DatasetSchema, OutlierFence};
use crate::utils::series_to_f64;
use polars::prelude::*;
use tracing::{debug, info, warn};

/// Handles outlier detection and removal.
pub struct OutlierHandler;

impl OutlierHandler {
    /// Remove rows outside `[Q1 - 1.5 * IQR, Q3 + 1.5 * IQR]` for every
    /// numeric column of `schema`.
    ///
    /// Returns the filtered frame and one fence per column that was
    /// processed. A row whose value in the processed column is null is
    /// removed as well. Numeric columns without any value are skipped.
    pub fn remove_outliers(
        mut df: DataFrame,
        schema: &DatasetSchema,
    ) -> Result<(DataFrame, Vec<OutlierFence>)> {
        let original_rows = df.height();
        let mut fences = Vec::new();

        for name in schema.numeric_columns() {
            let Ok(column) = df.column(name) else {
                warn!("Column '{}' not present, skipping outlier check", name);
                continue;
            };
            let values = series_to_f64(column.as_materialized_series())?;

            let observed: Vec<f64> = values.iter().flatten().copied().collect();
            let Some((q1, q3)) = quartiles(&observed) else {
                debug!("Column '{}' has no values, skipping outlier check", name);
                continue;
            };
            let (lower, upper) = tukey_fences(q1, q3);

            let mut fence = OutlierFence {
                column: name.to_string(),
                q1,
                q3,
                iqr: q3 - q1,
                lower,
                upper,
                rows_before: df.height(),
                rows_removed: 0,
            };

            let keep: Vec<bool> = values
                .iter()
                .map(|v| v.is_some_and(|v| fence.admits(v)))
                .collect();
            let mask = BooleanChunked::new("keep".into(), &keep);

            df = df
                .filter(&mask)
                .context(format!("Filtering outliers in '{}'", name))?;
            fence.rows_removed = fence.rows_before - df.height();

            if fence.rows_removed > 0 {
                debug!(
                    "Removed {} rows outside [{:.4}, {:.4}] in '{}'",
                    fence.rows_removed, lower, upper, name
                );
            }
            fences.push(fence);
        }

        info!(
            "Outlier removal: {} rows -> {} rows",
            original_rows,
            df.height()
        );
        Ok((df, fences))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiler::infer_schema;
    use pretty_assertions::assert_eq;

    fn f64_values(df: &DataFrame, name: &str) -> Vec<f64> {
        df.column(name)
            .unwrap()
            .as_materialized_series()
            .cast(&DataType::Float64)
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .flatten()
            .collect()
    }

    #[test]
    fn test_removes_single_outlier() {
        let df = df! {
            "num_orders" => [1i64, 2, 3, 4, 100],
        }
        .unwrap();
        let schema = infer_schema(&df);

        let (df, fences) = OutlierHandler::remove_outliers(df, &schema).unwrap();

        assert_eq!(f64_values(&df, "num_orders"), vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(fences.len(), 1);
        let fence = &fences[0];
        assert_eq!(fence.q1, 2.0);
        assert_eq!(fence.q3, 4.0);
        assert_eq!(fence.iqr, 2.0);
        assert_eq!(fence.lower, -1.0);
        assert_eq!(fence.upper, 7.0);
        assert_eq!(fence.rows_before, 5);
        assert_eq!(fence.rows_removed, 1);
    }

    #[test]
    fn test_fence_is_inclusive() {
        // q1 = 2, q3 = 4, fences [-1, 7]; 7 sits exactly on the upper fence
        let df = df! {
            "x" => [2.0f64, 3.0, 4.0, 2.0, 7.0],
        }
        .unwrap();
        let schema = infer_schema(&df);
        let (df, fences) = OutlierHandler::remove_outliers(df, &schema).unwrap();

        assert_eq!(fences[0].upper, 7.0);
        assert_eq!(df.height(), 5);
    }

    #[test]
    fn test_columns_are_filtered_sequentially() {
        // The outlier row in `a` also carries the extreme value of `b`.
        // Once it is gone, `b` is fenced on the remaining five rows only.
        let df = df! {
            "a" => [1.0f64, 2.0, 3.0, 4.0, 5.0, 1000.0],
            "b" => [10.0f64, 11.0, 12.0, 13.0, 14.0, 15.0],
        }
        .unwrap();
        let schema = infer_schema(&df);

        let (df, fences) = OutlierHandler::remove_outliers(df, &schema).unwrap();

        assert_eq!(df.height(), 5);
        assert_eq!(fences[0].column, "a");
        assert_eq!(fences[0].rows_removed, 1);
        assert_eq!(fences[1].column, "b");
        assert_eq!(fences[1].rows_before, 5);
        assert_eq!(fences[1].q1, 11.0);
        assert_eq!(fences[1].q3, 13.0);
    }

    #[test]
    fn test_earlier_filter_tightens_later_fence() {
        // Fenced on all seven rows, `b` would get [-4.25, 37.75] and keep 30.
        // Dropping the `a` outlier first leaves [10..14, 30]: q1 = 11.25,
        // q3 = 13.75, fence [7.5, 17.5], so 30 goes too.
        let df = df! {
            "a" => [1.0f64, 1.0, 1.0, 1.0, 1.0, 1.0, 100.0],
            "b" => [10.0f64, 11.0, 12.0, 13.0, 14.0, 30.0, 1000.0],
        }
        .unwrap();
        let schema = infer_schema(&df);

        let (df, fences) = OutlierHandler::remove_outliers(df, &schema).unwrap();

        assert_eq!(fences[0].rows_removed, 1);
        assert_eq!(fences[1].rows_before, 6);
        assert_eq!(fences[1].q1, 11.25);
        assert_eq!(fences[1].q3, 13.75);
        assert_eq!(fences[1].upper, 17.5);
        assert_eq!(fences[1].rows_removed, 1);
        assert_eq!(f64_values(&df, "b"), vec![10.0, 11.0, 12.0, 13.0, 14.0]);
        assert_eq!(f64_values(&df, "a"), vec![1.0; 5]);
    }

    #[test]
    fn test_surviving_values_inside_their_fence() {
        let df = df! {
            "a" => [5.0f64, 6.0, 7.0, 6.0, 5.0, -40.0, 6.5, 90.0],
            "b" => [1.0f64, 1.0, 2.0, 1.5, 30.0, 1.0, 1.2, 1.1],
        }
        .unwrap();
        let schema = infer_schema(&df);

        let (df, fences) = OutlierHandler::remove_outliers(df, &schema).unwrap();

        let b = f64_values(&df, "b");
        assert!(b.iter().all(|v| fences[1].admits(*v)));
        assert!(df.height() <= 8 - 2);
    }

    #[test]
    fn test_null_rows_are_dropped() {
        let df = df! {
            "x" => [Some(1.0f64), None, Some(2.0), Some(3.0)],
        }
        .unwrap();
        let schema = infer_schema(&df);
        let (df, fences) = OutlierHandler::remove_outliers(df, &schema).unwrap();

        assert_eq!(df.height(), 3);
        assert_eq!(fences[0].rows_removed, 1);
    }

    #[test]
    fn test_categorical_columns_untouched() {
        let df = df! {
            "category" => ["a", "b", "c"],
        }
        .unwrap();
        let schema = infer_schema(&df);
        let (df, fences) = OutlierHandler::remove_outliers(df, &schema).unwrap();

        assert_eq!(df.height(), 3);
        assert!(fences.is_empty());
    }

    #[test]
    fn test_all_null_numeric_column_skipped() {
        let df = DataFrame::new(vec![
            Series::new("x".into(), &[1.0f64, 2.0]).into(),
            Series::full_null("empty".into(), 2, &DataType::Float64).into(),
        ])
        .unwrap();
        let schema = infer_schema(&df);
        let (df, fences) = OutlierHandler::remove_outliers(df, &schema).unwrap();

        assert_eq!(df.height(), 2);
        assert_eq!(fences.len(), 1);
    }
}
