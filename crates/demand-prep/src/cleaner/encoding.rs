//! Label encoding of categorical columns.

use crate::error::{PrepError, Result};
use crate::utils::{encode_first_appearance, series_to_strings};
use polars::prelude::*;
use tracing::debug;

/// Name of the derived column holding the codes of `column`.
pub fn encoded_column_name(column: &str) -> String {
    format!("{}_encoded", column)
}

/// Add `<column>_encoded`: one `UInt32` code per distinct value of `column`,
/// assigned in order of first appearance. Nulls stay null.
///
/// An existing column of that name is replaced.
pub fn encode_labels(mut df: DataFrame, column: &str) -> Result<(DataFrame, String)> {
    let values = {
        let source = df
            .column(column)
            .map_err(|_| PrepError::ColumnNotFound(column.to_string()))?;
        series_to_strings(source.as_materialized_series())?
    };

    let codes = encode_first_appearance(&values);
    let distinct = codes.iter().flatten().max().map_or(0, |max| max + 1);

    let name = encoded_column_name(column);
    df.with_column(Series::new(name.as_str().into(), codes))?;

    debug!("Encoded '{}' into '{}' ({} labels)", column, name, distinct);
    Ok((df, name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_codes_follow_first_appearance() {
        let df = df! {
            "category" => [Some("Soup"), Some("Beverages"), None, Some("Soup"), Some("Pizza")],
        }
        .unwrap();

        let (df, name) = encode_labels(df, "category").unwrap();
        assert_eq!(name, "category_encoded");

        let column = df.column(&name).unwrap();
        assert_eq!(column.dtype(), &DataType::UInt32);
        let codes: Vec<Option<u32>> = column
            .as_materialized_series()
            .u32()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(codes, vec![Some(0), Some(1), None, Some(0), Some(2)]);
    }

    #[test]
    fn test_missing_column() {
        let df = df! { "x" => [1i64] }.unwrap();
        let err = encode_labels(df, "category").unwrap_err();
        assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");
    }

    #[test]
    fn test_reencoding_replaces_column() {
        let df = df! { "category" => ["a", "b"] }.unwrap();
        let (df, _) = encode_labels(df, "category").unwrap();
        let (df, _) = encode_labels(df, "category").unwrap();
        assert_eq!(df.width(), 2);
    }
}
