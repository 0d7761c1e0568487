//! Type inference: classify every column as numeric or categorical.

use crate::types::{ColumnSchema, DatasetSchema};
use crate::utils::column_kind;
use polars::prelude::*;

/// Build the typed schema of a DataFrame from its column dtypes.
///
/// The CSV reader already decides integer/float/string per column, so
/// classification is a pure function of the dtype. Callers re-run this
/// after any stage that can change dtypes (median fill widens integers).
pub fn infer_schema(df: &DataFrame) -> DatasetSchema {
    let columns = df
        .get_columns()
        .iter()
        .map(|col| ColumnSchema {
            name: col.name().to_string(),
            dtype: format!("{:?}", col.dtype()),
            kind: column_kind(col.dtype()),
        })
        .collect();

    DatasetSchema { columns }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ColumnKind;

    #[test]
    fn test_infer_schema_kinds() {
        let df = df! {
            "id" => [1i64, 2, 3],
            "checkout_price" => [10.5f64, 20.0, 15.25],
            "category" => ["Pizza", "Soup", "Pizza"],
            "emailer" => [true, false, true],
        }
        .unwrap();

        let schema = infer_schema(&df);

        assert_eq!(schema.len(), 4);
        assert_eq!(schema.numeric_columns(), vec!["id", "checkout_price"]);
        assert_eq!(schema.categorical_columns(), vec!["category", "emailer"]);
        assert_eq!(schema.columns[0].dtype, "Int64");
    }

    #[test]
    fn test_infer_schema_all_null_column_is_categorical() {
        let df = DataFrame::new(vec![
            Series::new("x".into(), &[Some(1i64), Some(2)]).into(),
            Series::full_null("empty".into(), 2, &DataType::String).into(),
        ])
        .unwrap();

        let schema = infer_schema(&df);
        assert_eq!(schema.kind_of("empty"), Some(ColumnKind::Categorical));
        assert_eq!(schema.kind_of("x"), Some(ColumnKind::Numeric));
    }
}
