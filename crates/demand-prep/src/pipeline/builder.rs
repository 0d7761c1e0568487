//! Main cleaning pipeline module.
//!
//! This module provides the core `Pipeline` struct and builder for
//! orchestrating the ingest, profile, clean, plot and export workflow.

use crate::cleaner::{DataCleaner, encode_labels};
use crate::config::PipelineConfig;
use crate::error::{PrepError, Result, ResultExt};
use crate::ingest::{discover_sources, merge_sources};
use crate::pipeline::OutlierHandler;
use crate::pipeline::progress::{
    ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate,
};
use crate::plots::{
    self, HISTOGRAM_FILE, SCATTER_FILE, TOP_VALUES_FILE, render_distributions,
};
use crate::profiler::{DataProfiler, infer_schema};
use crate::reporting::export_dataset;
use crate::types::{DatasetProfile, PipelineResult, PlotPhase};
use chrono::Local;
use polars::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// The main cleaning pipeline.
///
/// Use [`Pipeline::builder()`] to create a new pipeline with custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// use demand_prep::{Pipeline, PipelineConfig};
///
/// let pipeline = Pipeline::builder()
///     .config(PipelineConfig::builder().output_dir("out").build()?)
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?;
///
/// let sources = pipeline.discover_inputs()?;
/// let result = pipeline.run(&sources)?;
/// println!("{} rows kept", result.shape_after.0);
/// ```
pub struct Pipeline {
    config: PipelineConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

// Ensure Pipeline is Send (can be moved to a worker thread)
static_assertions::assert_impl_all!(Pipeline: Send);

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// List the input files of the configured input directory.
    ///
    /// The cleaned output of an earlier run is never picked up as input.
    pub fn discover_inputs(&self) -> Result<Vec<PathBuf>> {
        let exclude = self.config.output_file_name();
        let sources = discover_sources(
            &self.config.input_dir,
            &self.config.input_extension,
            &[exclude.as_str()],
        )?;

        if sources.is_empty() {
            return Err(PrepError::NoInputFiles(self.config.input_dir.clone()));
        }
        Ok(sources)
    }

    /// Merge and profile the sources without cleaning or writing anything.
    pub fn inspect(&self, sources: &[PathBuf]) -> Result<DatasetProfile> {
        let df = self.ingest(sources)?;
        let schema = infer_schema(&df);
        DataProfiler::profile_dataset(&df, &schema, self.config.head_rows)
    }

    /// Run every stage on `sources`, in order.
    ///
    /// Any stage failure aborts the run. Files written before the failure
    /// are left in place.
    pub fn run(&self, sources: &[PathBuf]) -> Result<PipelineResult> {
        match self.run_internal(sources) {
            Ok(result) => {
                self.report_progress(ProgressUpdate::complete("Pipeline completed successfully"));
                Ok(result)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Pipeline error: {}", e);
                Err(e)
            }
        }
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn ingest(&self, sources: &[PathBuf]) -> Result<DataFrame> {
        if sources.is_empty() {
            return Err(PrepError::NoInputFiles(self.config.input_dir.clone()));
        }
        merge_sources(sources).context("Ingestion")
    }

    fn plot_dir(&self) -> Result<&std::path::Path> {
        let dir = self.config.output_dir.as_path();
        std::fs::create_dir_all(dir).context(format!("Creating {}", dir.display()))?;
        Ok(dir)
    }

    fn run_internal(&self, sources: &[PathBuf]) -> Result<PipelineResult> {
        let start_time = Instant::now();
        let config = &self.config;
        let mut plots: Vec<PathBuf> = Vec::new();
        let mut warnings: Vec<String> = Vec::new();

        // Step 1: Ingestion
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Ingestion,
            0.0,
            format!("Loading {} file(s)...", sources.len()),
        ));
        info!("Step 1: Loading {} file(s)...", sources.len());

        let df = self.ingest(sources)?;
        let shape_before = df.shape();

        // Step 2: Profiling
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Profiling,
            0.0,
            "Profiling dataset...",
        ));
        info!("Step 2: Profiling dataset...");

        let schema = infer_schema(&df);
        let profile = DataProfiler::profile_dataset(&df, &schema, config.head_rows)
            .context("Profiling")?;
        debug!("Shape: {:?}", profile.shape);
        self.report_progress(ProgressUpdate::with_detail(
            PipelineStage::Profiling,
            1.0,
            "Profile ready",
            profile.to_string(),
        ));

        // Step 3: Distribution plots of the raw data
        if config.render_plots {
            self.report_progress(ProgressUpdate::new(
                PipelineStage::VisualizeBefore,
                0.0,
                "Plotting distributions before cleaning...",
            ));
            info!("Step 3: Plotting distributions before cleaning...");
            plots.extend(render_distributions(
                &df,
                &schema,
                PlotPhase::Before,
                self.plot_dir()?,
            )?);
        } else {
            info!("Step 3: Skipping plots (disabled)");
        }

        // Step 4: Missing values
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Cleaning,
            0.0,
            "Handling missing values...",
        ));
        info!("Step 4: Handling missing values...");

        let (df, missing) = DataCleaner::handle_missing(df, &schema).context("Cleaning")?;
        for column in &missing.dropped_columns {
            warnings.push(format!("Dropped column '{}': no values to impute from", column));
        }
        self.report_progress(ProgressUpdate::with_detail(
            PipelineStage::Cleaning,
            1.0,
            format!(
                "Dropped {} empty and {} duplicate row(s)",
                missing.empty_rows_dropped, missing.duplicate_rows_dropped
            ),
            missing.to_string(),
        ));

        // Median fill widens integers to floats and empty columns are gone
        let schema = infer_schema(&df);

        // Step 5: Outliers
        self.report_progress(ProgressUpdate::new(
            PipelineStage::OutlierRemoval,
            0.0,
            "Removing outliers...",
        ));
        info!("Step 5: Removing outliers...");

        let (df, outlier_fences) =
            OutlierHandler::remove_outliers(df, &schema).context("Outlier removal")?;

        // Step 6: Distribution plots of the filtered data
        if config.render_plots {
            self.report_progress(ProgressUpdate::new(
                PipelineStage::VisualizeAfter,
                0.0,
                "Plotting distributions after outlier removal...",
            ));
            info!("Step 6: Plotting distributions after outlier removal...");
            plots.extend(render_distributions(
                &df,
                &schema,
                PlotPhase::After,
                self.plot_dir()?,
            )?);
        }

        // Step 7: Derived plots and the encoded category column
        self.report_progress(ProgressUpdate::new(
            PipelineStage::DerivedPlots,
            0.0,
            "Rendering summary plots...",
        ));
        info!("Step 7: Rendering summary plots...");

        if config.render_plots {
            let path = self.plot_dir()?.join(HISTOGRAM_FILE);
            plots::render_histogram_grid(&df, &schema, config.histogram_bins, &path)?;
            plots.push(path);

            if schema.contains(&config.item_column) {
                let path = self.plot_dir()?.join(TOP_VALUES_FILE);
                plots::render_top_values(&df, &config.item_column, config.top_n, &path)?;
                plots.push(path);
            } else {
                let message = format!(
                    "Column '{}' not found, skipping top values plot",
                    config.item_column
                );
                warn!("{}", message);
                warnings.push(message);
            }
        }

        let (mut df, encoded_column) = if schema.contains(&config.category_column)
            && schema.contains(&config.orders_column)
        {
            let (df, encoded) = encode_labels(df, &config.category_column)?;
            if config.render_plots {
                let path = self.plot_dir()?.join(SCATTER_FILE);
                plots::render_scatter(&df, &encoded, &config.orders_column, &path)?;
                plots.push(path);
            }
            (df, Some(encoded))
        } else {
            let message = format!(
                "Columns '{}' and '{}' not both present, skipping category encoding",
                config.category_column, config.orders_column
            );
            warn!("{}", message);
            warnings.push(message);
            (df, None)
        };

        // Step 8: Export
        let output_file = if config.save_to_disk {
            self.report_progress(ProgressUpdate::new(
                PipelineStage::Export,
                0.0,
                "Exporting cleaned dataset...",
            ));
            info!("Step 8: Exporting cleaned dataset...");
            let path = config.output_csv_path();
            export_dataset(&mut df, &path)?;
            Some(path)
        } else {
            info!("Step 8: Skipping export (save_to_disk disabled)");
            None
        };

        let duration_ms = start_time.elapsed().as_millis() as u64;
        info!(
            "Pipeline finished in {} ms: {:?} -> {:?}",
            duration_ms,
            shape_before,
            df.shape()
        );

        Ok(PipelineResult {
            shape_after: df.shape(),
            dataframe: df,
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            input_files: sources.to_vec(),
            output_file,
            duration_ms,
            shape_before,
            profile,
            missing,
            outlier_fences,
            encoded_column,
            plots,
            warnings,
        })
    }
}

/// Builder for creating a [`Pipeline`] instance.
///
/// Use [`Pipeline::builder()`] to get started.
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<PipelineConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

// Ensure PipelineBuilder is Send (can be moved to another thread during construction)
static_assertions::assert_impl_all!(PipelineBuilder: Send);

impl PipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a progress reporter for receiving updates during processing.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use demand_prep::{ProgressReporter, ProgressUpdate};
    /// use std::sync::Arc;
    ///
    /// struct MyReporter;
    ///
    /// impl ProgressReporter for MyReporter {
    ///     fn report(&self, update: ProgressUpdate) {
    ///         println!("{}: {}", update.stage.display_name(), update.message);
    ///     }
    /// }
    ///
    /// let pipeline = Pipeline::builder()
    ///     .progress_reporter(Arc::new(MyReporter))
    ///     .build()?;
    /// ```
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    ///
    /// This is a convenience method for simple progress handling.
    /// For more complex scenarios, use [`progress_reporter`](Self::progress_reporter).
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<Pipeline, crate::config::ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(Pipeline {
            config,
            progress_reporter: self.progress_reporter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    const ORDERS_A: &str = "\
id,week,meal_id,category,num_orders
1,1,1885,Beverages,177
2,1,1993,Pizza,270
3,1,2290,Soup,
4,2,1885,Beverages,54
4,2,1885,Beverages,54
5,2,1993,,189
6,3,2290,Soup,40
7,3,1885,Beverages,9000
";

    const ORDERS_B: &str = "\
id,week,meal_id,category,num_orders,emailer_for_promotion
8,3,1993,Pizza,120,0
9,4,1885,Beverages,160,1
10,4,2290,Soup,95,0
";

    fn config_for(dir: &TempDir) -> PipelineConfig {
        PipelineConfig::builder()
            .input_dir(dir.path())
            .output_dir(dir.path().join("out"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_pipeline_builder_default() {
        let pipeline = Pipeline::builder().build().unwrap();
        assert!(pipeline.progress_reporter.is_none());
        assert_eq!(pipeline.config().histogram_bins, 30);
    }

    #[test]
    fn test_pipeline_builder_with_progress_callback() {
        let call_count = Arc::new(AtomicUsize::new(0));
        let call_count_clone = call_count.clone();

        let pipeline = Pipeline::builder()
            .on_progress(move |_update| {
                call_count_clone.fetch_add(1, Ordering::SeqCst);
            })
            .build()
            .unwrap();

        pipeline.report_progress(ProgressUpdate::new(PipelineStage::Profiling, 0.5, "Test"));

        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_discover_inputs_empty_dir() {
        let dir = TempDir::new().unwrap();
        let pipeline = Pipeline::builder().config(config_for(&dir)).build().unwrap();

        let err = pipeline.discover_inputs().unwrap_err();
        assert!(err.is_no_input());
    }

    #[test]
    fn test_run_writes_all_outputs() {
        let dir = TempDir::new().unwrap();
        write_file(&dir, "orders_a.csv", ORDERS_A);
        write_file(&dir, "orders_b.csv", ORDERS_B);

        let stages = Arc::new(Mutex::new(Vec::new()));
        let stages_clone = stages.clone();
        let pipeline = Pipeline::builder()
            .config(config_for(&dir))
            .on_progress(move |update| {
                stages_clone.lock().unwrap().push(update.stage);
            })
            .build()
            .unwrap();

        let sources = pipeline.discover_inputs().unwrap();
        let result = pipeline.run(&sources).unwrap();
        let out = dir.path().join("out");

        assert_eq!(result.shape_before, (11, 6));
        assert_eq!(result.missing.duplicate_rows_dropped, 1);
        assert!(result.dataframe.get_columns().iter().all(|c| c.null_count() == 0));
        assert_eq!(result.encoded_column.as_deref(), Some("category_encoded"));
        assert!(result.outlier_rows_removed() >= 1);

        assert!(out.join("CleanedDataset.csv").exists());
        assert!(out.join("num_orders_before_boxplot.png").exists());
        assert!(out.join("num_orders_after_boxplot.png").exists());
        assert!(out.join(HISTOGRAM_FILE).exists());
        assert!(out.join(TOP_VALUES_FILE).exists());
        assert!(out.join(SCATTER_FILE).exists());

        let stages = stages.lock().unwrap();
        assert_eq!(stages.first(), Some(&PipelineStage::Ingestion));
        assert_eq!(stages.last(), Some(&PipelineStage::Complete));
    }

    #[test]
    fn test_stage_reports_arrive_as_stages_finish() {
        let dir = TempDir::new().unwrap();
        write_file(&dir, "orders.csv", ORDERS_A);

        let details = Arc::new(Mutex::new(Vec::new()));
        let details_clone = details.clone();
        let config = PipelineConfig::builder()
            .base(config_for(&dir))
            .render_plots(false)
            .save_to_disk(false)
            .build()
            .unwrap();
        let pipeline = Pipeline::builder()
            .config(config)
            .on_progress(move |update| {
                if let Some(detail) = update.detail {
                    details_clone.lock().unwrap().push((update.stage, detail));
                }
            })
            .build()
            .unwrap();

        pipeline.run(&pipeline.discover_inputs().unwrap()).unwrap();

        let details = details.lock().unwrap();
        assert_eq!(details.len(), 2);
        assert_eq!(details[0].0, PipelineStage::Profiling);
        assert!(details[0].1.contains("=== Data Types ==="));
        assert_eq!(details[1].0, PipelineStage::Cleaning);
        assert!(details[1].1.contains("=== Missing Values Before ==="));
    }

    #[test]
    fn test_run_without_plots_or_export() {
        let dir = TempDir::new().unwrap();
        write_file(&dir, "orders.csv", ORDERS_A);

        let config = PipelineConfig::builder()
            .base(config_for(&dir))
            .render_plots(false)
            .save_to_disk(false)
            .build()
            .unwrap();
        let pipeline = Pipeline::builder().config(config).build().unwrap();

        let sources = pipeline.discover_inputs().unwrap();
        let result = pipeline.run(&sources).unwrap();

        assert!(result.plots.is_empty());
        assert!(result.output_file.is_none());
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn test_missing_demand_columns_are_warnings() {
        let dir = TempDir::new().unwrap();
        write_file(&dir, "prices.csv", "id,checkout_price\n1,10.5\n2,11.0\n3,12.5\n");

        let config = PipelineConfig::builder()
            .base(config_for(&dir))
            .render_plots(false)
            .build()
            .unwrap();
        let pipeline = Pipeline::builder().config(config).build().unwrap();

        let sources = pipeline.discover_inputs().unwrap();
        let result = pipeline.run(&sources).unwrap();

        assert!(result.encoded_column.is_none());
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.shape_after, (3, 2));
    }

    #[test]
    fn test_run_with_no_sources_fails() {
        let failed = Arc::new(AtomicUsize::new(0));
        let failed_clone = failed.clone();
        let pipeline = Pipeline::builder()
            .on_progress(move |update| {
                if update.stage == PipelineStage::Failed {
                    failed_clone.fetch_add(1, Ordering::SeqCst);
                }
            })
            .build()
            .unwrap();

        let err = pipeline.run(&[]).unwrap_err();
        assert!(err.is_no_input());
        assert_eq!(failed.load(Ordering::SeqCst), 1);
    }
}
