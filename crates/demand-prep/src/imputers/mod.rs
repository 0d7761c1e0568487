//! Imputation module.
//!
//! Fills missing values column by column: median for numeric columns,
//! mode for categorical columns.

mod statistical;

pub use statistical::StatisticalImputer;
