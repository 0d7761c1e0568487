//! Configuration types for the cleaning pipeline.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic pipeline setup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default base name of the cleaned output file.
pub const DEFAULT_OUTPUT_NAME: &str = "CleanedDataset";

/// Configuration for the cleaning pipeline.
///
/// Use [`PipelineConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use demand_prep::config::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .output_dir("out")
///     .histogram_bins(50)
///     .render_plots(false)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory scanned for input files when no explicit list is given.
    /// Default: "."
    pub input_dir: PathBuf,

    /// File extension recognised as tabular input.
    /// Default: "csv"
    pub input_extension: String,

    /// Directory where plots and the cleaned dataset are written.
    /// Default: "."
    pub output_dir: PathBuf,

    /// Base name of the cleaned dataset (without extension).
    /// Default: "CleanedDataset"
    pub output_name: String,

    /// Number of rows shown in the profiling head.
    /// Default: 5
    pub head_rows: usize,

    /// Bin count for every subplot of the histogram grid.
    /// Default: 30
    pub histogram_bins: usize,

    /// Number of most frequent items shown in the bar chart.
    /// Default: 20
    pub top_n: usize,

    /// Column identifying the ordered item.
    /// Default: "meal_id"
    pub item_column: String,

    /// Categorical column plotted against the orders column.
    /// Default: "category"
    pub category_column: String,

    /// Numeric demand column.
    /// Default: "num_orders"
    pub orders_column: String,

    /// Whether to render PNG plots at all.
    /// Default: true
    pub render_plots: bool,

    /// Whether to write the cleaned dataset to disk.
    /// When false, the result is kept in memory only.
    /// Default: true
    pub save_to_disk: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("."),
            input_extension: "csv".to_string(),
            output_dir: PathBuf::from("."),
            output_name: DEFAULT_OUTPUT_NAME.to_string(),
            head_rows: 5,
            histogram_bins: 30,
            top_n: 20,
            item_column: "meal_id".to_string(),
            category_column: "category".to_string(),
            orders_column: "num_orders".to_string(),
            render_plots: true,
            save_to_disk: true,
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Load a configuration from a JSON file.
    ///
    /// Missing fields take their default values.
    pub fn from_json_file(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: PipelineConfig = serde_json::from_str(&content)?;
        config
            .validate()
            .map_err(|e| crate::error::PrepError::InvalidConfig(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.histogram_bins == 0 {
            return Err(ConfigValidationError::ZeroCount("histogram_bins"));
        }

        if self.top_n == 0 {
            return Err(ConfigValidationError::ZeroCount("top_n"));
        }

        if self.input_extension.trim().is_empty() {
            return Err(ConfigValidationError::EmptyName("input_extension"));
        }

        if self.output_name.trim().is_empty() {
            return Err(ConfigValidationError::EmptyName("output_name"));
        }

        for (field, value) in [
            ("item_column", &self.item_column),
            ("category_column", &self.category_column),
            ("orders_column", &self.orders_column),
        ] {
            if value.is_empty() {
                return Err(ConfigValidationError::EmptyName(field));
            }
        }

        Ok(())
    }

    /// Path of the cleaned CSV file.
    pub fn output_csv_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.csv", self.output_name))
    }

    /// Path of the JSON report written next to the cleaned file.
    pub fn report_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}_report.json", self.output_name))
    }

    /// File name of the cleaned CSV, used to keep it out of ingestion.
    pub fn output_file_name(&self) -> String {
        format!("{}.csv", self.output_name)
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid value for '{0}': must be at least 1")]
    ZeroCount(&'static str),

    #[error("Invalid value for '{0}': must not be empty")]
    EmptyName(&'static str),
}

impl From<ConfigValidationError> for crate::error::PrepError {
    fn from(e: ConfigValidationError) -> Self {
        crate::error::PrepError::InvalidConfig(e.to_string())
    }
}

/// Builder for [`PipelineConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    base: Option<PipelineConfig>,
    input_dir: Option<PathBuf>,
    input_extension: Option<String>,
    output_dir: Option<PathBuf>,
    output_name: Option<String>,
    head_rows: Option<usize>,
    histogram_bins: Option<usize>,
    top_n: Option<usize>,
    item_column: Option<String>,
    category_column: Option<String>,
    orders_column: Option<String>,
    render_plots: Option<bool>,
    save_to_disk: Option<bool>,
}

impl PipelineConfigBuilder {
    /// Start from an existing configuration (e.g. one loaded from JSON)
    /// instead of the defaults. Values set on the builder still win.
    pub fn base(mut self, config: PipelineConfig) -> Self {
        self.base = Some(config);
        self
    }

    /// Set the directory scanned for input files.
    pub fn input_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_dir = Some(path.into());
        self
    }

    /// Set the recognised input extension (without the dot).
    pub fn input_extension(mut self, ext: impl Into<String>) -> Self {
        self.input_extension = Some(ext.into());
        self
    }

    /// Set the output directory for plots and the cleaned dataset.
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Set the output file base name (without extension).
    pub fn output_name(mut self, name: impl Into<String>) -> Self {
        self.output_name = Some(name.into());
        self
    }

    /// Set how many rows the profile head shows.
    pub fn head_rows(mut self, rows: usize) -> Self {
        self.head_rows = Some(rows);
        self
    }

    /// Set the histogram bin count.
    pub fn histogram_bins(mut self, bins: usize) -> Self {
        self.histogram_bins = Some(bins);
        self
    }

    /// Set how many items the top-values bar chart shows.
    pub fn top_n(mut self, n: usize) -> Self {
        self.top_n = Some(n);
        self
    }

    /// Set the item identifier column.
    pub fn item_column(mut self, column: impl Into<String>) -> Self {
        self.item_column = Some(column.into());
        self
    }

    /// Set the category column.
    pub fn category_column(mut self, column: impl Into<String>) -> Self {
        self.category_column = Some(column.into());
        self
    }

    /// Set the orders column.
    pub fn orders_column(mut self, column: impl Into<String>) -> Self {
        self.orders_column = Some(column.into());
        self
    }

    /// Enable or disable plot rendering.
    pub fn render_plots(mut self, render: bool) -> Self {
        self.render_plots = Some(render);
        self
    }

    /// Enable or disable writing the cleaned dataset to disk.
    pub fn save_to_disk(mut self, save: bool) -> Self {
        self.save_to_disk = Some(save);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PipelineConfig` or an error if validation fails.
    pub fn build(self) -> Result<PipelineConfig, ConfigValidationError> {
        let base = self.base.unwrap_or_default();
        let config = PipelineConfig {
            input_dir: self.input_dir.unwrap_or(base.input_dir),
            input_extension: self.input_extension.unwrap_or(base.input_extension),
            output_dir: self.output_dir.unwrap_or(base.output_dir),
            output_name: self.output_name.unwrap_or(base.output_name),
            head_rows: self.head_rows.unwrap_or(base.head_rows),
            histogram_bins: self.histogram_bins.unwrap_or(base.histogram_bins),
            top_n: self.top_n.unwrap_or(base.top_n),
            item_column: self.item_column.unwrap_or(base.item_column),
            category_column: self.category_column.unwrap_or(base.category_column),
            orders_column: self.orders_column.unwrap_or(base.orders_column),
            render_plots: self.render_plots.unwrap_or(base.render_plots),
            save_to_disk: self.save_to_disk.unwrap_or(base.save_to_disk),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.histogram_bins, 30);
        assert_eq!(config.top_n, 20);
        assert_eq!(config.head_rows, 5);
        assert_eq!(config.item_column, "meal_id");
        assert_eq!(config.category_column, "category");
        assert_eq!(config.orders_column, "num_orders");
        assert!(config.render_plots);
        assert_eq!(config.output_csv_path(), PathBuf::from("./CleanedDataset.csv"));
    }

    #[test]
    fn test_builder_custom_values() {
        let config = PipelineConfig::builder()
            .output_dir("out")
            .output_name("clean")
            .histogram_bins(10)
            .top_n(5)
            .render_plots(false)
            .build()
            .unwrap();

        assert_eq!(config.histogram_bins, 10);
        assert_eq!(config.top_n, 5);
        assert!(!config.render_plots);
        assert_eq!(config.output_csv_path(), PathBuf::from("out/clean.csv"));
        assert_eq!(config.report_path(), PathBuf::from("out/clean_report.json"));
        assert_eq!(config.output_file_name(), "clean.csv");
    }

    #[test]
    fn test_builder_overrides_base() {
        let base = PipelineConfig::builder().top_n(7).histogram_bins(12).build().unwrap();
        let config = PipelineConfig::builder()
            .base(base)
            .histogram_bins(40)
            .build()
            .unwrap();

        assert_eq!(config.top_n, 7);
        assert_eq!(config.histogram_bins, 40);
    }

    #[test]
    fn test_validation_zero_bins() {
        let result = PipelineConfig::builder().histogram_bins(0).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::ZeroCount("histogram_bins")
        ));
    }

    #[test]
    fn test_validation_zero_top_n() {
        let result = PipelineConfig::builder().top_n(0).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::ZeroCount("top_n")
        ));
    }

    #[test]
    fn test_validation_empty_column_name() {
        let result = PipelineConfig::builder().orders_column("").build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::EmptyName("orders_column")
        ));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{
            "output_dir": "cleaned",
            "histogram_bins": 15,
            "orders_column": "orders"
        }"#;

        let config: PipelineConfig = serde_json::from_str(json).expect("partial config");

        assert_eq!(config.output_dir, PathBuf::from("cleaned"));
        assert_eq!(config.histogram_bins, 15);
        assert_eq!(config.orders_column, "orders");
        assert_eq!(config.top_n, 20);
        assert_eq!(config.output_name, DEFAULT_OUTPUT_NAME);
    }

    #[test]
    fn test_config_serialization() {
        let config = PipelineConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: PipelineConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(config.histogram_bins, deserialized.histogram_bins);
        assert_eq!(config.item_column, deserialized.item_column);
    }
}
