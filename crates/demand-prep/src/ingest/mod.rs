//! Ingestion: discover CSV sources and merge them into one table.
//!
//! Sources are passed explicitly to [`merge_sources`]; [`discover_sources`]
//! only produces such a list from a directory listing.

use crate::error::{PrepError, Result, ResultExt};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Rows sampled by the CSV reader to infer column dtypes.
const INFER_SCHEMA_ROWS: usize = 10_000;

/// Cell values read as missing, in addition to empty cells.
const NULL_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// List files in `dir` whose extension matches `extension`.
///
/// Matching is case-insensitive. Files named in `exclude` (typically the
/// cleaned output of an earlier run) are skipped. The result is sorted by
/// file name.
pub fn discover_sources(dir: &Path, extension: &str, exclude: &[&str]) -> Result<Vec<PathBuf>> {
    let wanted = extension.trim_start_matches('.');
    let mut sources = Vec::new();

    for entry in std::fs::read_dir(dir).context(format!("Reading {}", dir.display()))? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }

        let matches_ext = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(wanted));
        if !matches_ext {
            continue;
        }

        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        if exclude.iter().any(|ex| ex.eq_ignore_ascii_case(file_name)) {
            debug!("Skipping previous output: {}", path.display());
            continue;
        }

        sources.push(path);
    }

    sources.sort();
    debug!("Discovered {} source(s) in {}", sources.len(), dir.display());
    Ok(sources)
}

/// Load one delimited file with a header row.
///
/// The usual spreadsheet spellings of a missing value (`NA`, `N/A`, `NaN`,
/// `null`, `#N/A`, ...) are read as null. A column with no value at all is
/// typed [`DataType::Null`] so it never decides the dtype of a merge.
pub fn load_table(path: &Path) -> Result<DataFrame> {
    let null_values = NullValues::AllColumns(NULL_TOKENS.iter().map(|t| (*t).into()).collect());

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
        .with_parse_options(CsvParseOptions::default().with_null_values(Some(null_values)))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .context(format!("Opening {}", path.display()))?
        .finish()
        .context(format!("Parsing {}", path.display()))?;

    let blank = |c: &Column| !c.is_empty() && c.null_count() == c.len();
    let df = retype_columns(df, blank, &DataType::Null)?;

    debug!("Loaded {}: {:?}", path.display(), df.shape());
    Ok(df)
}

/// Replace every column matching `pred` by an all-null column of `dtype`.
fn retype_columns(
    mut df: DataFrame,
    pred: impl Fn(&Column) -> bool,
    dtype: &DataType,
) -> Result<DataFrame> {
    let height = df.height();
    let targets: Vec<String> = df
        .get_columns()
        .iter()
        .filter(|c| pred(c))
        .map(|c| c.name().to_string())
        .collect();

    for name in targets {
        debug!("Column '{}' has no values, typing it {}", name, dtype);
        df.replace(&name, Series::full_null(name.as_str().into(), height, dtype))
            .context(format!("Retyping column '{}'", name))?;
    }
    Ok(df)
}

/// Load every source and concatenate them into one table.
///
/// Columns are unioned in order of first appearance; a column missing from
/// a file is null for that file's rows. Numeric columns that differ in
/// width across files are widened to a common type. A column that is
/// blank in one file takes its type from the files that hold values; one
/// that is blank everywhere ends up as `Float64`.
pub fn merge_sources(paths: &[PathBuf]) -> Result<DataFrame> {
    let Some(first) = paths.first() else {
        return Err(PrepError::NoInputFiles(PathBuf::from(".")));
    };

    if paths.len() == 1 {
        let df = float_null_columns(load_table(first)?)?;
        info!("Loaded 1 file: {:?}", df.shape());
        return Ok(df);
    }

    let frames = paths
        .iter()
        .map(|path| load_table(path).map(DataFrame::lazy))
        .collect::<Result<Vec<LazyFrame>>>()?;

    let merged = concat_lf_diagonal(
        frames,
        UnionArgs {
            rechunk: true,
            to_supertypes: true,
            ..Default::default()
        },
    )
    .context("Concatenating sources")?
    .collect()
    .context("Concatenating sources")?;
    let merged = float_null_columns(merged)?;

    info!("Merged {} files: {:?}", paths.len(), merged.shape());
    Ok(merged)
}

fn float_null_columns(df: DataFrame) -> Result<DataFrame> {
    retype_columns(df, |c| c.dtype() == &DataType::Null, &DataType::Float64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiler::infer_schema;
    use crate::types::ColumnKind;
    use crate::{DataCleaner, OutlierHandler};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_discover_sources_filters_and_sorts() {
        let dir = TempDir::new().unwrap();
        write_file(&dir, "b.csv", "x\n1\n");
        write_file(&dir, "a.CSV", "x\n2\n");
        write_file(&dir, "notes.txt", "not a table");
        write_file(&dir, "CleanedDataset.csv", "x\n3\n");
        std::fs::create_dir(dir.path().join("nested.csv")).unwrap();

        let sources = discover_sources(dir.path(), "csv", &["CleanedDataset.csv"]).unwrap();
        let names: Vec<_> = sources
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();

        assert_eq!(names, vec!["a.CSV", "b.csv"]);
    }

    #[test]
    fn test_merge_no_sources_is_error() {
        let err = merge_sources(&[]).unwrap_err();
        assert!(err.is_no_input());
    }

    #[test]
    fn test_merge_unions_columns() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a.csv", "id,meal_id,num_orders\n1,10,100\n2,11,150\n");
        let b = write_file(&dir, "b.csv", "id,category\n3,Pizza\n");

        let df = merge_sources(&[a, b]).unwrap();

        assert_eq!(df.shape(), (3, 4));
        let names: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
        assert_eq!(names, vec!["id", "meal_id", "num_orders", "category"]);
        assert_eq!(df.column("meal_id").unwrap().null_count(), 1);
        assert_eq!(df.column("category").unwrap().null_count(), 2);
    }

    #[test]
    fn test_merge_widens_numeric_types() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a.csv", "price\n1\n2\n");
        let b = write_file(&dir, "b.csv", "price\n2.5\n");

        let df = merge_sources(&[a, b]).unwrap();
        assert_eq!(df.column("price").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.height(), 3);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let result = load_table(&dir.path().join("nope.csv"));
        assert!(result.is_err());
    }

    #[test]
    fn test_blank_column_in_one_file_keeps_numeric_type() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a.csv", "id,price\n1,10.5\n2,11.0\n3,12.0\n4,500.0\n");
        let b = write_file(&dir, "b.csv", "id,price\n5,\n6,\n");

        let df = merge_sources(&[a, b]).unwrap();

        assert_eq!(df.column("price").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("price").unwrap().null_count(), 2);
        let schema = infer_schema(&df);
        assert_eq!(schema.kind_of("price"), Some(ColumnKind::Numeric));

        // Median fill then a fence on price drops the 500.0 row
        let (df, _) = DataCleaner::handle_missing(df, &schema).unwrap();
        let schema = infer_schema(&df);
        let (df, fences) = OutlierHandler::remove_outliers(df, &schema).unwrap();
        assert!(fences.iter().any(|f| f.column == "price"));
        let prices =
            crate::utils::non_null_f64(df.column("price").unwrap().as_materialized_series())
                .unwrap();
        assert!(!prices.contains(&500.0));
    }

    #[test]
    fn test_column_blank_everywhere_is_float() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a.csv", "id,note\n1,\n2,\n");
        let b = write_file(&dir, "b.csv", "id,note\n3,\n");

        let merged = merge_sources(&[a.clone(), b]).unwrap();
        assert_eq!(merged.column("note").unwrap().dtype(), &DataType::Float64);
        assert_eq!(merged.column("note").unwrap().null_count(), 3);

        let single = merge_sources(&[a]).unwrap();
        assert_eq!(single.column("note").unwrap().dtype(), &DataType::Float64);
    }

    #[test]
    fn test_null_tokens_are_missing() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "orders.csv",
            "num_orders,category\n1,Pizza\n2,N/A\n3,Pizza\nNA,Soup\n4,null\n1000,Soup\n",
        );

        let df = load_table(&path).unwrap();
        let orders = df.column("num_orders").unwrap();
        assert!(crate::utils::is_numeric_dtype(orders.dtype()));
        assert_eq!(orders.null_count(), 1);
        assert_eq!(df.column("category").unwrap().null_count(), 2);

        let schema = infer_schema(&df);
        assert_eq!(schema.kind_of("num_orders"), Some(ColumnKind::Numeric));

        // Median 3 fills the gap; fence [0.0, 6.0] then removes 1000
        let (df, _) = DataCleaner::handle_missing(df, &schema).unwrap();
        let schema = infer_schema(&df);
        let (df, fences) = OutlierHandler::remove_outliers(df, &schema).unwrap();
        assert_eq!(fences.len(), 1);
        assert_eq!(fences[0].upper, 6.0);
        assert_eq!(df.height(), 5);
    }
}
