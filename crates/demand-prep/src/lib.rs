//! Food Demand Cleaning Pipeline Library
//!
//! A one-shot data-cleaning pipeline for tabular food-demand data, built
//! with Rust and Polars.
//!
//! # Overview
//!
//! The pipeline runs a fixed sequence of stages over one in-memory table:
//!
//! - **Ingestion**: Discover CSV files and merge them into one table (column union)
//! - **Profiling**: Types, head rows, non-null counts and descriptive statistics
//! - **Distribution Plots**: One box (or strip) plot per numeric column, before and after cleaning
//! - **Missing Values**: Drop empty and duplicate rows, fill with median / mode
//! - **Outlier Removal**: Sequential Tukey-fence filtering per numeric column
//! - **Summary Plots**: Histogram grid, top-item bar chart, category-vs-orders scatter
//! - **Export**: Write the cleaned table as CSV
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use demand_prep::{Pipeline, PipelineConfig};
//!
//! let config = PipelineConfig::builder()
//!     .input_dir("data")
//!     .output_dir("output")
//!     .histogram_bins(30)
//!     .build()?;
//!
//! let pipeline = Pipeline::builder()
//!     .config(config)
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?;
//!
//! let sources = pipeline.discover_inputs()?;
//! let result = pipeline.run(&sources)?;
//!
//! println!("{}", result.profile);
//! println!("{}", result.missing);
//! println!("Rows: {} -> {}", result.shape_before.0, result.shape_after.0);
//! ```
//!
//! # Individual Stages
//!
//! Every stage is also usable on its own DataFrame:
//!
//! ```rust,ignore
//! use demand_prep::{DataCleaner, OutlierHandler, infer_schema, merge_sources};
//!
//! let df = merge_sources(&paths)?;
//! let schema = infer_schema(&df);
//! let (df, missing) = DataCleaner::handle_missing(df, &schema)?;
//! let (df, fences) = OutlierHandler::remove_outliers(df, &infer_schema(&df))?;
//! ```

pub mod cleaner;
pub mod config;
pub mod error;
pub mod imputers;
pub mod ingest;
pub mod pipeline;
pub mod plots;
pub mod profiler;
pub mod reporting;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::{DataCleaner, encode_labels};
pub use config::{ConfigValidationError, PipelineConfig, PipelineConfigBuilder};
pub use error::{PrepError, Result as PrepResult, ResultExt};
pub use imputers::StatisticalImputer;
pub use ingest::{discover_sources, load_table, merge_sources};
pub use pipeline::{
    ClosureProgressReporter, OutlierHandler, Pipeline, PipelineBuilder, PipelineStage,
    ProgressReporter, ProgressUpdate,
};
pub use plots::{render_distributions, render_histogram_grid, render_scatter, render_top_values};
pub use profiler::{DataProfiler, infer_schema};
pub use reporting::{CleaningReport, ProcessingSummaryReport, ReportGenerator, export_dataset};
pub use types::{
    ColumnKind, ColumnSchema, ColumnStatistics, ColumnSummary, DatasetProfile, DatasetSchema,
    MissingValueReport, OutlierFence, PipelineResult, PlotPhase,
};
