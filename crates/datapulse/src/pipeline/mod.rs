//! Pipeline module.
//!
//! This module provides the analysis orchestrator and the snapshot cache
//! that keeps the previous dataset for drift comparison.

mod builder;
mod cache;

pub use builder::{Analyzer, AnalyzerBuilder};
pub use cache::SnapshotCache;
