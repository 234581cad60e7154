//! Data quality analysis module.
//!
//! This module scores missing data: null counts per column and an overall
//! completeness percentage.

mod analyzer;

pub use analyzer::{DataQualityAnalyzer, MissingDataReport};
