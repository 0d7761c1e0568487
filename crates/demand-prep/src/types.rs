use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

// ============================================================================
// Schema Types
// ============================================================================

/// Semantic kind of a column, decided once per stage by schema inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Integer or floating point values.
    Numeric,
    /// Text, categorical or boolean values.
    Categorical,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric => write!(f, "numeric"),
            Self::Categorical => write!(f, "categorical"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    pub dtype: String,
    pub kind: ColumnKind,
}

/// Typed schema of a dataset, in column order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DatasetSchema {
    pub columns: Vec<ColumnSchema>,
}

impl DatasetSchema {
    /// Names of numeric columns, in column order.
    pub fn numeric_columns(&self) -> Vec<&str> {
        self.columns_of(ColumnKind::Numeric)
    }

    /// Names of categorical columns, in column order.
    pub fn categorical_columns(&self) -> Vec<&str> {
        self.columns_of(ColumnKind::Categorical)
    }

    fn columns_of(&self, kind: ColumnKind) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.kind == kind)
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Kind of the named column, if present.
    pub fn kind_of(&self, name: &str) -> Option<ColumnKind> {
        self.columns.iter().find(|c| c.name == name).map(|c| c.kind)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

// ============================================================================
// Profiling Types
// ============================================================================

/// Structural information about one column (the "info" view).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub dtype: String,
    pub kind: ColumnKind,
    pub non_null_count: usize,
}

/// Descriptive statistics for one column (the "describe" view).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnStatistics {
    Numeric {
        count: usize,
        mean: Option<f64>,
        std: Option<f64>,
        min: Option<f64>,
        q25: Option<f64>,
        median: Option<f64>,
        q75: Option<f64>,
        max: Option<f64>,
    },
    Categorical {
        count: usize,
        unique: usize,
        top: Option<String>,
        freq: usize,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub name: String,
    pub statistics: ColumnStatistics,
}

/// Read-only profile of a dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetProfile {
    pub shape: (usize, usize),
    pub memory_bytes: usize,
    pub columns: Vec<ColumnInfo>,
    /// Pre-rendered table of the first rows.
    pub head: String,
    pub summaries: Vec<ColumnSummary>,
}

// ============================================================================
// Cleaning Types
// ============================================================================

/// How a column's missing values were filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillStrategy {
    /// Most frequent value, ties broken by first occurrence.
    Mode,
    /// Median of the non-null values.
    Median,
}

impl fmt::Display for FillStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mode => write!(f, "mode"),
            Self::Median => write!(f, "median"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnFill {
    pub column: String,
    pub strategy: FillStrategy,
    pub value: String,
    pub filled: usize,
}

/// Null counts per column, in column order.
pub type NullCounts = Vec<(String, usize)>;

/// Everything the missing-value stage did.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MissingValueReport {
    pub nulls_before: NullCounts,
    pub nulls_after: NullCounts,
    pub empty_rows_dropped: usize,
    pub duplicate_rows_dropped: usize,
    pub fills: Vec<ColumnFill>,
    /// Columns with no observed value at all, dropped because they
    /// have neither a mode nor a median.
    pub dropped_columns: Vec<String>,
}

/// Tukey fence applied to one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierFence {
    pub column: String,
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub lower: f64,
    pub upper: f64,
    pub rows_before: usize,
    pub rows_removed: usize,
}

impl OutlierFence {
    /// Whether `value` is inside the fence (inclusive).
    pub fn admits(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

// ============================================================================
// Plot Types
// ============================================================================

/// Whether a distribution plot is drawn before or after outlier removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlotPhase {
    Before,
    After,
}

impl PlotPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Before => "before",
            Self::After => "after",
        }
    }
}

// ============================================================================
// Result Types
// ============================================================================

/// Summary of one full pipeline run.
///
/// Serialized for `--json` output and for the written report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    /// The cleaned dataset, including any derived column.
    #[serde(skip)]
    pub dataframe: DataFrame,
    pub generated_at: String,
    pub input_files: Vec<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_file: Option<PathBuf>,
    pub duration_ms: u64,
    pub shape_before: (usize, usize),
    pub shape_after: (usize, usize),
    /// Profile of the merged input, before any cleaning.
    pub profile: DatasetProfile,
    pub missing: MissingValueReport,
    pub outlier_fences: Vec<OutlierFence>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoded_column: Option<String>,
    pub plots: Vec<PathBuf>,
    pub warnings: Vec<String>,
}

impl PipelineResult {
    pub fn rows_removed(&self) -> usize {
        self.shape_before.0.saturating_sub(self.shape_after.0)
    }

    pub fn outlier_rows_removed(&self) -> usize {
        self.outlier_fences.iter().map(|f| f.rows_removed).sum()
    }
}
