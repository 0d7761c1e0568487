//! Report generation module.
//!
//! This module provides functionality for writing the cleaned dataset and
//! generating run reports.
//!
//! Use [`CleaningReport`] for:
//! - JSON output to stdout (`--json` CLI flag)
//! - JSON file output (`--emit-report` CLI flag)
//! - Programmatic access in library mode
//!
//! # Example
//!
//! ```rust,ignore
//! use demand_prep::reporting::ReportGenerator;
//!
//! let report = ReportGenerator::build_cleaning_report(&pipeline_result);
//! println!("{}", serde_json::to_string_pretty(&report)?);
//!
//! let generator = ReportGenerator::new(PathBuf::from("output"), "CleanedDataset");
//! generator.write_report_to_file(&report)?;
//! ```

mod generator;

pub use generator::{CleaningReport, ProcessingSummaryReport, ReportGenerator, export_dataset};
