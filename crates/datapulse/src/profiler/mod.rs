//! Schema and summary extraction.
//!
//! This module turns a [`Dataset`] into:
//! - a schema map (column name to kind label)
//! - one [`ColumnDescriptor`] per column (nulls, uniques, dtype)
//! - one [`ColumnSummary`] per column, shaped like pandas `describe(include="all")`

mod statistics;

use crate::dataset::Dataset;
use crate::error::{Result, ResultExt};
use crate::types::{ColumnDescriptor, ColumnKind, ColumnSummary};
use indexmap::IndexMap;
use polars::prelude::*;
use tracing::debug;

/// Schema, descriptors and summaries of one dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetProfile {
    pub schema: IndexMap<String, ColumnKind>,
    pub columns: Vec<ColumnDescriptor>,
    pub summary: IndexMap<String, ColumnSummary>,
}

/// Data profiler for analyzing dataset structure and characteristics.
pub struct DataProfiler;

impl DataProfiler {
    /// Profile every column of a dataset.
    ///
    /// A dataset without columns yields empty maps.
    pub fn profile_dataset(dataset: &Dataset) -> Result<DatasetProfile> {
        let mut schema = IndexMap::with_capacity(dataset.width());
        let mut columns = Vec::with_capacity(dataset.width());
        let mut summary = IndexMap::with_capacity(dataset.width());

        for (col, kind) in dataset.columns() {
            let name = col.name().to_string();
            let series = col.as_materialized_series();

            let descriptor = Self::describe_column(series, kind)
                .context(format!("Profiling column '{name}'"))?;
            let column_summary = statistics::summarize_column(series, kind)
                .context(format!("Summarizing column '{name}'"))?;

            debug!(
                "Profiled '{}': kind={}, nulls={}, unique={}",
                name, kind, descriptor.null_count, descriptor.unique_count
            );

            schema.insert(name.clone(), kind);
            summary.insert(name, column_summary);
            columns.push(descriptor);
        }

        Ok(DatasetProfile {
            schema,
            columns,
            summary,
        })
    }

    fn describe_column(series: &Series, kind: ColumnKind) -> Result<ColumnDescriptor> {
        let null_count = series.null_count();
        let non_null = series.drop_nulls();
        let unique_count = if non_null.is_empty() {
            0
        } else {
            non_null.n_unique()?
        };

        Ok(ColumnDescriptor {
            name: series.name().to_string(),
            kind,
            dtype: series.dtype().to_string(),
            null_count,
            non_null_count: series.len() - null_count,
            unique_count,
        })
    }
}
