//! Shared utilities for the cleaning pipeline.
//!
//! This module contains common helper functions used across multiple modules
//! to reduce code duplication and ensure consistency.

use crate::types::ColumnKind;
use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;
use std::collections::HashMap;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Semantic kind of a DataType.
///
/// Anything that is not an integer or float is treated as categorical,
/// including booleans and columns that were entirely null at read time.
pub fn column_kind(dtype: &DataType) -> ColumnKind {
    if is_numeric_dtype(dtype) {
        ColumnKind::Numeric
    } else {
        ColumnKind::Categorical
    }
}

// =============================================================================
// Series Extraction Utilities
// =============================================================================

/// Values of a Series as `f64`, nulls kept in place.
pub fn series_to_f64(series: &Series) -> PolarsResult<Vec<Option<f64>>> {
    let cast = series.cast(&DataType::Float64)?;
    Ok(cast.f64()?.into_iter().collect())
}

/// Non-null values of a Series as `f64`, in row order.
pub fn non_null_f64(series: &Series) -> PolarsResult<Vec<f64>> {
    let cast = series.cast(&DataType::Float64)?;
    Ok(cast.f64()?.into_iter().flatten().collect())
}

/// Values of a Series as strings, nulls kept in place.
pub fn series_to_strings(series: &Series) -> PolarsResult<Vec<Option<String>>> {
    let cast = series.cast(&DataType::String)?;
    Ok(cast
        .str()?
        .into_iter()
        .map(|v| v.map(|s| s.to_string()))
        .collect())
}

// =============================================================================
// Frequency Utilities
// =============================================================================

/// Count occurrences, ordered by count descending.
///
/// Values with equal counts keep the order of their first appearance.
pub fn value_counts_ordered<'a, I>(values: I) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut counts: Vec<(&'a str, usize)> = Vec::new();

    for value in values {
        match index.get(value) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(value, counts.len());
                counts.push((value, 1));
            }
        }
    }

    // sort_by is stable, so first-appearance order survives among ties
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .map(|(v, c)| (v.to_string(), c))
        .collect()
}

/// Calculate the mode (most frequent non-null value) of a Series as a string.
///
/// Ties are broken by first occurrence in row order.
pub fn string_mode(series: &Series) -> Option<String> {
    let values = series_to_strings(series).ok()?;
    value_counts_ordered(values.iter().flatten().map(|s| s.as_str()))
        .into_iter()
        .next()
        .map(|(value, _)| value)
}

/// Integer code per distinct value, in order of first appearance.
///
/// Nulls stay null.
pub fn encode_first_appearance(values: &[Option<String>]) -> Vec<Option<u32>> {
    let mut codes: HashMap<&str, u32> = HashMap::new();
    values
        .iter()
        .map(|value| {
            value.as_deref().map(|v| {
                let next = codes.len() as u32;
                *codes.entry(v).or_insert(next)
            })
        })
        .collect()
}

// =============================================================================
// Series Transformation Utilities
// =============================================================================

/// Fill null values in a numeric Series with a specific value.
///
/// The result is always Float64.
pub fn fill_numeric_nulls(series: &Series, fill_value: f64) -> PolarsResult<Series> {
    let values: Vec<f64> = series_to_f64(series)?
        .into_iter()
        .map(|v| v.unwrap_or(fill_value))
        .collect();
    Ok(Series::new(series.name().clone(), values))
}

/// Fill null values in a Series with a string value.
///
/// The result is always String.
pub fn fill_string_nulls(series: &Series, fill_value: &str) -> PolarsResult<Series> {
    let values: Vec<String> = series_to_strings(series)?
        .into_iter()
        .map(|v| v.unwrap_or_else(|| fill_value.to_string()))
        .collect();
    Ok(Series::new(series.name().clone(), values))
}

// =============================================================================
// File Name Utilities
// =============================================================================

static UNSAFE_FILE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[/\\:*?"<>|\s]+"#).expect("Invalid regex: unsafe file chars"));

/// Make a column name safe to embed in a file name.
pub fn sanitize_file_stem(name: &str) -> String {
    let cleaned = UNSAFE_FILE_CHARS.replace_all(name.trim(), "_");
    if cleaned.is_empty() {
        "column".to_string()
    } else {
        cleaned.into_owned()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_numeric_dtype() {
        assert!(is_numeric_dtype(&DataType::Int64));
        assert!(is_numeric_dtype(&DataType::Float64));
        assert!(!is_numeric_dtype(&DataType::String));
        assert!(!is_numeric_dtype(&DataType::Boolean));
    }

    #[test]
    fn test_column_kind() {
        assert_eq!(column_kind(&DataType::UInt32), ColumnKind::Numeric);
        assert_eq!(column_kind(&DataType::String), ColumnKind::Categorical);
        assert_eq!(column_kind(&DataType::Boolean), ColumnKind::Categorical);
    }

    #[test]
    fn test_value_counts_ties_keep_first_appearance() {
        let counts = value_counts_ordered(["b", "a", "c", "a", "b", "d"]);
        assert_eq!(
            counts,
            vec![
                ("b".to_string(), 2),
                ("a".to_string(), 2),
                ("c".to_string(), 1),
                ("d".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_string_mode() {
        let series = Series::new("test".into(), &["a", "b", "a", "c", "a"]);
        assert_eq!(string_mode(&series), Some("a".to_string()));
    }

    #[test]
    fn test_string_mode_tie_uses_first_encountered() {
        let series = Series::new("test".into(), &[Some("y"), None, Some("x"), Some("x"), Some("y")]);
        assert_eq!(string_mode(&series), Some("y".to_string()));
    }

    #[test]
    fn test_string_mode_all_null() {
        let series = Series::new("test".into(), &[None::<&str>, None]);
        assert_eq!(string_mode(&series), None);
    }

    #[test]
    fn test_encode_first_appearance() {
        let values = vec![
            Some("Pizza".to_string()),
            Some("Beverages".to_string()),
            None,
            Some("Pizza".to_string()),
            Some("Salad".to_string()),
        ];
        assert_eq!(
            encode_first_appearance(&values),
            vec![Some(0), Some(1), None, Some(0), Some(2)]
        );
    }

    #[test]
    fn test_fill_numeric_nulls() {
        let series = Series::new("test".into(), &[Some(1i64), None, Some(3)]);
        let filled = fill_numeric_nulls(&series, 2.0).unwrap();

        assert_eq!(filled.dtype(), &DataType::Float64);
        assert_eq!(filled.null_count(), 0);
        assert_eq!(filled.get(1).unwrap().try_extract::<f64>().unwrap(), 2.0);
    }

    #[test]
    fn test_fill_string_nulls() {
        let series = Series::new("test".into(), &[Some("a"), None]);
        let filled = fill_string_nulls(&series, "a").unwrap();
        let values: Vec<Option<&str>> = filled.str().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some("a"), Some("a")]);
    }

    #[test]
    fn test_sanitize_file_stem() {
        assert_eq!(sanitize_file_stem("num_orders"), "num_orders");
        assert_eq!(sanitize_file_stem("price / unit"), "price_unit");
        assert_eq!(sanitize_file_stem("a:b"), "a_b");
        assert_eq!(sanitize_file_stem("   "), "column");
    }
}
