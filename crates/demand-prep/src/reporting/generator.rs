use crate::error::{PrepError, Result, ResultExt};
use crate::types::{ColumnSummary, MissingValueReport, OutlierFence, PipelineResult};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

// ============================================================================
// Cleaning Report Types
// ============================================================================

/// Report of one cleaning run, for JSON output and `--emit-report`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningReport {
    // Metadata
    /// Timestamp when the run finished
    pub generated_at: String,
    /// Files that were merged
    pub input_files: Vec<String>,
    /// Path to the cleaned dataset (if written)
    pub output_file: Option<String>,

    /// Row and column accounting
    pub processing_summary: ProcessingSummaryReport,

    /// Per-column null counts and fill values
    pub missing_values: MissingValueReport,
    /// Fence applied to each numeric column, in filtering order
    pub outlier_fences: Vec<OutlierFence>,
    /// Derived label-encoded column, if one was added
    pub encoded_column: Option<String>,

    /// Statistics of the merged input before cleaning
    pub column_summaries: Vec<ColumnSummary>,

    /// Every PNG written during the run
    pub plots: Vec<String>,
}

/// Summary of processing for the cleaning report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingSummaryReport {
    pub duration_ms: u64,
    pub rows_before: usize,
    pub rows_after: usize,
    pub rows_removed: usize,
    /// Formatted to one decimal
    pub rows_removed_percent: String,
    pub columns_before: usize,
    pub columns_after: usize,
    pub empty_rows_dropped: usize,
    pub duplicate_rows_dropped: usize,
    pub outlier_rows_removed: usize,
    pub warnings: Vec<String>,
}

fn path_string(path: &Path) -> String {
    path.display().to_string()
}

/// Write `df` as comma-separated text with a header row and no index.
///
/// The parent directory is created when missing.
pub fn export_dataset(df: &mut DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).context(format!("Creating {}", parent.display()))?;
    }

    let mut file = File::create(path)
        .map_err(|e| PrepError::ExportFailed(format!("{}: {}", path.display(), e)))?;

    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(b',')
        .with_quote_char(b'"')
        .finish(df)
        .map_err(|e| PrepError::ExportFailed(format!("{}: {}", path.display(), e)))?;

    info!("Dataset saved: {} ({} rows)", path.display(), df.height());
    Ok(())
}

/// Builds and writes cleaning reports.
pub struct ReportGenerator {
    output_dir: PathBuf,
    output_name: String,
}

impl ReportGenerator {
    pub fn new(output_dir: PathBuf, output_name: impl Into<String>) -> Self {
        Self {
            output_dir,
            output_name: output_name.into(),
        }
    }

    /// Build a report from a finished run.
    pub fn build_cleaning_report(result: &PipelineResult) -> CleaningReport {
        let (rows_before, columns_before) = result.shape_before;
        let (rows_after, columns_after) = result.shape_after;
        let rows_removed = result.rows_removed();
        let pct = if rows_before > 0 {
            rows_removed as f64 / rows_before as f64 * 100.0
        } else {
            0.0
        };

        let processing_summary = ProcessingSummaryReport {
            duration_ms: result.duration_ms,
            rows_before,
            rows_after,
            rows_removed,
            rows_removed_percent: format!("{:.1}", pct),
            columns_before,
            columns_after,
            empty_rows_dropped: result.missing.empty_rows_dropped,
            duplicate_rows_dropped: result.missing.duplicate_rows_dropped,
            outlier_rows_removed: result.outlier_rows_removed(),
            warnings: result.warnings.clone(),
        };

        CleaningReport {
            generated_at: result.generated_at.clone(),
            input_files: result.input_files.iter().map(|p| path_string(p)).collect(),
            output_file: result.output_file.as_deref().map(path_string),
            processing_summary,
            missing_values: result.missing.clone(),
            outlier_fences: result.outlier_fences.clone(),
            encoded_column: result.encoded_column.clone(),
            column_summaries: result.profile.summaries.clone(),
            plots: result.plots.iter().map(|p| path_string(p)).collect(),
        }
    }

    /// Write a report to `<output_dir>/<output_name>_report.json`.
    pub fn write_report_to_file(&self, report: &CleaningReport) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;

        let report_path = self
            .output_dir
            .join(format!("{}_report.json", self.output_name));
        let mut file = File::create(&report_path)?;
        file.write_all(serde_json::to_string_pretty(report)?.as_bytes())?;

        info!("Report saved: {}", report_path.display());

        Ok(report_path)
    }
}
