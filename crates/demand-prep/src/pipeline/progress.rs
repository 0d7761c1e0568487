//! Progress reporting for the cleaning pipeline.
//!
//! # Example
//!
//! ```rust,ignore
//! use demand_prep::Pipeline;
//!
//! let result = Pipeline::builder()
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .run(&sources)?;
//! ```

use serde::{Deserialize, Serialize};

/// Stages of the cleaning pipeline, in run order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Discovering and merging the input files
    Ingestion,
    /// Schema inference and descriptive statistics
    Profiling,
    /// Distribution plots of the raw data
    VisualizeBefore,
    /// Dropping empty and duplicate rows, imputing missing values
    Cleaning,
    /// Tukey-fence row filtering
    OutlierRemoval,
    /// Distribution plots of the filtered data
    VisualizeAfter,
    /// Histogram grid, top-value bar chart, scatter plot
    DerivedPlots,
    /// Writing the cleaned dataset
    Export,
    /// Pipeline completed successfully
    Complete,
    /// Pipeline failed with an error
    Failed,
}

impl PipelineStage {
    /// Returns a human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Ingestion => "Loading Data",
            Self::Profiling => "Profiling Dataset",
            Self::VisualizeBefore => "Plotting Raw Distributions",
            Self::Cleaning => "Handling Missing Values",
            Self::OutlierRemoval => "Removing Outliers",
            Self::VisualizeAfter => "Plotting Cleaned Distributions",
            Self::DerivedPlots => "Rendering Summary Plots",
            Self::Export => "Exporting Dataset",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }

    /// Returns the typical weight of this stage in the overall pipeline (0.0 - 1.0).
    ///
    /// The weights of the working stages sum to 1.0.
    pub fn weight(&self) -> f32 {
        match self {
            Self::Ingestion => 0.10,
            Self::Profiling => 0.05,
            Self::VisualizeBefore => 0.15,
            Self::Cleaning => 0.15,
            Self::OutlierRemoval => 0.10,
            Self::VisualizeAfter => 0.15,
            Self::DerivedPlots => 0.20,
            Self::Export => 0.10,
            Self::Complete => 0.0,
            Self::Failed => 0.0,
        }
    }

    /// Returns the cumulative progress at the start of this stage.
    pub fn base_progress(&self) -> f32 {
        match self {
            Self::Ingestion => 0.0,
            Self::Profiling => 0.10,
            Self::VisualizeBefore => 0.15,
            Self::Cleaning => 0.30,
            Self::OutlierRemoval => 0.45,
            Self::VisualizeAfter => 0.55,
            Self::DerivedPlots => 0.70,
            Self::Export => 0.90,
            Self::Complete => 1.0,
            Self::Failed => 0.0,
        }
    }
}

/// Progress update sent to a [`ProgressReporter`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Current pipeline stage
    pub stage: PipelineStage,

    /// Overall progress (0.0 - 1.0)
    pub progress: f32,

    /// Progress within current stage (0.0 - 1.0)
    pub stage_progress: f32,

    /// Human-readable message describing current activity
    pub message: String,

    /// Console report produced by the stage (profile, missing-value counts)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ProgressUpdate {
    /// Creates a new progress update for a stage.
    pub fn new(stage: PipelineStage, stage_progress: f32, message: impl Into<String>) -> Self {
        let progress = stage.base_progress() + (stage.weight() * stage_progress);
        Self {
            stage,
            progress: progress.clamp(0.0, 1.0),
            stage_progress: stage_progress.clamp(0.0, 1.0),
            message: message.into(),
            detail: None,
        }
    }

    /// Creates a progress update carrying the report a stage just produced.
    pub fn with_detail(
        stage: PipelineStage,
        stage_progress: f32,
        message: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            detail: Some(detail.into()),
            ..Self::new(stage, stage_progress, message)
        }
    }

    /// Creates a completion progress update.
    pub fn complete(message: impl Into<String>) -> Self {
        Self::new(PipelineStage::Complete, 1.0, message)
    }

    /// Creates a failed progress update.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            stage: PipelineStage::Failed,
            progress: 0.0,
            stage_progress: 0.0,
            message: message.into(),
            detail: None,
        }
    }
}

/// Trait for receiving progress updates during a run.
///
/// Implementations must be `Send + Sync` so a pipeline holding one can be
/// moved to a worker thread.
pub trait ProgressReporter: Send + Sync {
    /// Called at every stage boundary and when a stage's report is ready.
    fn report(&self, update: ProgressUpdate);
}

/// Wrapper that implements [`ProgressReporter`] using a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    /// Creates a new closure-based progress reporter.
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}

static_assertions::assert_impl_all!(ProgressUpdate: Send, Sync);
