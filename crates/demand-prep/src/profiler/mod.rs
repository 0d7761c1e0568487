//! Data profiling module for dataset analysis.
//!
//! This module provides functionality for profiling datasets, including:
//! - Type inference for columns (numeric vs categorical)
//! - Structural summary (shape, non-null counts, memory footprint)
//! - Descriptive statistics per column

pub(crate) mod statistics;
mod type_inference;

pub use statistics::TUKEY_MULTIPLIER;
pub use type_inference::infer_schema;

use crate::error::Result;
use crate::types::{
    ColumnInfo, ColumnKind, ColumnStatistics, ColumnSummary, DatasetProfile, DatasetSchema,
};
use polars::prelude::*;
use statistics::{describe_categorical, describe_numeric};
use std::fmt;

/// Data profiler for analyzing dataset structure and characteristics.
pub struct DataProfiler;

impl DataProfiler {
    /// Profile an entire dataset.
    ///
    /// Pure and read-only: nothing about `df` changes.
    pub fn profile_dataset(
        df: &DataFrame,
        schema: &DatasetSchema,
        head_rows: usize,
    ) -> Result<DatasetProfile> {
        let mut columns = Vec::with_capacity(schema.len());
        let mut summaries = Vec::with_capacity(schema.len());

        for col_schema in &schema.columns {
            let series = df.column(&col_schema.name)?.as_materialized_series();

            columns.push(ColumnInfo {
                name: col_schema.name.clone(),
                dtype: col_schema.dtype.clone(),
                kind: col_schema.kind,
                non_null_count: series.len() - series.null_count(),
            });

            let statistics = match col_schema.kind {
                ColumnKind::Numeric => describe_numeric(series)?,
                ColumnKind::Categorical => describe_categorical(series)?,
            };
            summaries.push(ColumnSummary {
                name: col_schema.name.clone(),
                statistics,
            });
        }

        Ok(DatasetProfile {
            shape: df.shape(),
            memory_bytes: df.estimated_size(),
            columns,
            head: format!("{}", df.head(Some(head_rows))),
            summaries,
        })
    }
}

fn fmt_stat(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.4}", v))
        .unwrap_or_else(|| "NaN".to_string())
}

impl fmt::Display for DatasetProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\n=== Data Types ===")?;
        for col in &self.columns {
            writeln!(f, "{:<28} {:<10} ({})", col.name, col.dtype, col.kind)?;
        }

        writeln!(f, "\n=== First Few Rows ===")?;
        writeln!(f, "{}", self.head)?;

        writeln!(f, "\n=== Basic Info ===")?;
        writeln!(f, "Rows: {}, Columns: {}", self.shape.0, self.shape.1)?;
        writeln!(f, "{:<4} {:<28} {:<16} {:<10}", "#", "Column", "Non-Null Count", "Dtype")?;
        for (i, col) in self.columns.iter().enumerate() {
            writeln!(
                f,
                "{:<4} {:<28} {:<16} {:<10}",
                i,
                col.name,
                format!("{} non-null", col.non_null_count),
                col.dtype
            )?;
        }
        writeln!(f, "memory usage: {} bytes", self.memory_bytes)?;

        writeln!(f, "\n=== Statistical Summary ===")?;
        for summary in &self.summaries {
            match &summary.statistics {
                ColumnStatistics::Numeric {
                    count,
                    mean,
                    std,
                    min,
                    q25,
                    median,
                    q75,
                    max,
                } => writeln!(
                    f,
                    "{:<28} count={} mean={} std={} min={} 25%={} 50%={} 75%={} max={}",
                    summary.name,
                    count,
                    fmt_stat(*mean),
                    fmt_stat(*std),
                    fmt_stat(*min),
                    fmt_stat(*q25),
                    fmt_stat(*median),
                    fmt_stat(*q75),
                    fmt_stat(*max)
                )?,
                ColumnStatistics::Categorical {
                    count,
                    unique,
                    top,
                    freq,
                } => writeln!(
                    f,
                    "{:<28} count={} unique={} top={} freq={}",
                    summary.name,
                    count,
                    unique,
                    top.as_deref().unwrap_or("NaN"),
                    freq
                )?,
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_df() -> DataFrame {
        df! {
            "meal_id" => [Some(1885i64), Some(1993), None, Some(1885)],
            "category" => [Some("Beverages"), None, Some("Pizza"), Some("Beverages")],
            "num_orders" => [177.0f64, 270.0, 189.0, 54.0],
        }
        .unwrap()
    }

    #[test]
    fn test_profile_shape_and_non_null_counts() {
        let df = sample_df();
        let schema = infer_schema(&df);
        let profile = DataProfiler::profile_dataset(&df, &schema, 5).unwrap();

        assert_eq!(profile.shape, (4, 3));
        assert_eq!(profile.columns[0].non_null_count, 3);
        assert_eq!(profile.columns[1].non_null_count, 3);
        assert_eq!(profile.columns[2].non_null_count, 4);
        assert!(profile.memory_bytes > 0);
    }

    #[test]
    fn test_profile_does_not_mutate() {
        let df = sample_df();
        let before = df.clone();
        let schema = infer_schema(&df);
        DataProfiler::profile_dataset(&df, &schema, 2).unwrap();
        assert!(df.equals_missing(&before));
    }

    #[test]
    fn test_profile_statistics_per_kind() {
        let df = sample_df();
        let schema = infer_schema(&df);
        let profile = DataProfiler::profile_dataset(&df, &schema, 5).unwrap();

        match &profile.summaries[1].statistics {
            ColumnStatistics::Categorical { top, freq, .. } => {
                assert_eq!(top.as_deref(), Some("Beverages"));
                assert_eq!(*freq, 2);
            }
            other => panic!("expected categorical stats, got {:?}", other),
        }
        match &profile.summaries[2].statistics {
            ColumnStatistics::Numeric { count, max, .. } => {
                assert_eq!(*count, 4);
                assert_eq!(*max, Some(270.0));
            }
            other => panic!("expected numeric stats, got {:?}", other),
        }
    }

    #[test]
    fn test_profile_display_sections() {
        let df = sample_df();
        let schema = infer_schema(&df);
        let rendered = DataProfiler::profile_dataset(&df, &schema, 5)
            .unwrap()
            .to_string();

        assert!(rendered.contains("=== Data Types ==="));
        assert!(rendered.contains("=== First Few Rows ==="));
        assert!(rendered.contains("=== Basic Info ==="));
        assert!(rendered.contains("=== Statistical Summary ==="));
        assert!(rendered.contains("3 non-null"));
    }
}
