//! Custom error types for the demand cleaning pipeline.
//!
//! This module provides the error hierarchy using `thiserror`
//! for consistent error handling and context throughout the pipeline.
//!
//! Errors are serializable: under `--json` a failed run prints
//! [`PrepError::to_json_report`] instead of a cleaning report.

use serde::Serialize;
use serde::ser::SerializeStruct;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the cleaning pipeline.
#[derive(Error, Debug)]
pub enum PrepError {
    /// No input files were given or discovered.
    #[error("No CSV files found in '{}'", .0.display())]
    NoInputFiles(PathBuf),

    /// A column required by a stage is absent from the merged table.
    #[error("Column '{0}' not found in merged table")]
    ColumnNotFound(String),

    /// Configuration rejected by validation.
    #[error("Invalid pipeline configuration: {0}")]
    InvalidConfig(String),

    /// Imputation failed.
    #[error("Cannot fill nulls in column '{column}': {reason}")]
    ImputationFailed { column: String, reason: String },

    /// Rendering or writing a plot failed.
    #[error("Failed to render plot '{}': {reason}", .path.display())]
    PlotFailed { path: PathBuf, reason: String },

    /// Writing the cleaned dataset failed.
    #[error("Failed to export dataset: {0}")]
    ExportFailed(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Dataframe error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Config or report JSON could not be read or written.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<PrepError>,
    },
}

impl PrepError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        PrepError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get a stable error code, used in JSON output.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NoInputFiles(_) => "NO_INPUT_FILES",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::ImputationFailed { .. } => "IMPUTATION_FAILED",
            Self::PlotFailed { .. } => "PLOT_FAILED",
            Self::ExportFailed(_) => "EXPORT_FAILED",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// JSON document printed in place of the cleaning report when a run fails.
    pub fn to_json_report(&self) -> serde_json::Value {
        serde_json::json!({
            "success": false,
            "error": self,
        })
    }

    /// Check if this error means there was nothing to process.
    pub fn is_no_input(&self) -> bool {
        match self {
            Self::NoInputFiles(_) => true,
            Self::WithContext { source, .. } => source.is_no_input(),
            _ => false,
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for PrepError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("PrepError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PrepError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| PrepError::Polars(e).with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| PrepError::Io(e).with_context(context))
    }
}
