//! Typed tabular input for the analysis engine.
//!
//! A [`Dataset`] wraps a Polars [`DataFrame`] and fixes the [`ColumnKind`] of
//! every column once, at construction. Every detector reads kinds from here
//! instead of re-inspecting dtypes.
//!
//! Cloning a dataset is cheap: Polars columns are reference counted, so the
//! snapshot cache can keep one without copying the data.

use crate::error::{AnalysisError, Result, ResultExt};
use crate::types::ColumnKind;
use crate::utils::{column_kind, numeric_cells, numeric_values};
use polars::io::csv::read::{CsvParseOptions, CsvReadOptions, NullValues};
use polars::prelude::*;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Rows scanned by the CSV reader when inferring column dtypes.
const SCHEMA_INFERENCE_ROWS: usize = 100;

/// Field values read as null, in addition to empty fields.
/// Same set pandas treats as missing by default.
const NULL_MARKERS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn csv_read_options() -> CsvReadOptions {
    let null_values = NullValues::AllColumns(NULL_MARKERS.iter().map(|m| (*m).into()).collect());
    CsvReadOptions::default()
        .with_infer_schema_length(Some(SCHEMA_INFERENCE_ROWS))
        .with_has_header(true)
        .with_parse_options(
            CsvParseOptions::default()
                .with_quote_char(Some(b'"'))
                .with_null_values(Some(null_values)),
        )
}

/// Kind of a column as read. A column with no values at all is numeric,
/// since the reader cannot infer anything better than text for it.
fn classify(col: &Column) -> ColumnKind {
    let all_null = col.len() > 0 && col.null_count() == col.len();
    if all_null && matches!(col.dtype(), DataType::String | DataType::Null) {
        ColumnKind::Numeric
    } else {
        column_kind(col.dtype())
    }
}

/// Copy of a float column with NaN and infinities replaced by null, or
/// `None` when nothing needs replacing.
fn without_non_finite(col: &Column) -> PolarsResult<Option<Column>> {
    let series = col.as_materialized_series();
    let cleaned = match series.dtype() {
        DataType::Float64 => {
            let ca = series.f64()?;
            if ca.into_iter().flatten().all(f64::is_finite) {
                return Ok(None);
            }
            ca.into_iter()
                .map(|v| v.filter(|x| x.is_finite()))
                .collect::<Float64Chunked>()
                .into_series()
        }
        DataType::Float32 => {
            let ca = series.f32()?;
            if ca.into_iter().flatten().all(f32::is_finite) {
                return Ok(None);
            }
            ca.into_iter()
                .map(|v| v.filter(|x| x.is_finite()))
                .collect::<Float32Chunked>()
                .into_series()
        }
        _ => return Ok(None),
    };
    Ok(Some(Column::from(cleaned.with_name(col.name().clone()))))
}

/// An immutable dataset with a fixed kind per column.
#[derive(Debug, Clone)]
pub struct Dataset {
    frame: DataFrame,
    kinds: Vec<ColumnKind>,
}

impl Dataset {
    /// Wrap a DataFrame, classifying every column by its dtype.
    ///
    /// NaN and infinite floats become null, so every component sees them as
    /// missing.
    pub fn new(mut frame: DataFrame) -> Self {
        let replacements: Vec<Column> = frame
            .get_columns()
            .iter()
            .filter_map(|col| without_non_finite(col).transpose())
            .filter_map(|res| {
                res.inspect_err(|e| warn!("Could not normalize float column: {}", e))
                    .ok()
            })
            .collect();
        for col in replacements {
            let name = col.name().clone();
            if let Err(e) = frame.with_column(col) {
                warn!("Could not replace non-finite values in '{}': {}", name, e);
            }
        }

        let kinds = frame.get_columns().iter().map(classify).collect();
        Self { frame, kinds }
    }

    /// A dataset with no columns and no rows.
    pub fn empty() -> Self {
        Self::new(DataFrame::empty())
    }

    /// Parse a CSV file with a header row.
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(AnalysisError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Input file not found: {}", path.display()),
            )));
        }

        let frame = csv_read_options()
            .try_into_reader_with_file_path(Some(PathBuf::from(path)))
            .context(format!("Opening {}", path.display()))?
            .finish()
            .map_err(|e| AnalysisError::MalformedInput(e.to_string()))?;

        debug!("Loaded {} with shape {:?}", path.display(), frame.shape());
        Ok(Self::new(frame))
    }

    /// Parse CSV content held in memory (e.g. an uploaded file body).
    pub fn from_csv_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.iter().all(|b| b.is_ascii_whitespace()) {
            return Err(AnalysisError::MalformedInput(
                "CSV input is empty".to_string(),
            ));
        }

        let frame = csv_read_options()
            .into_reader_with_file_handle(Cursor::new(bytes.to_vec()))
            .finish()
            .map_err(|e| AnalysisError::MalformedInput(e.to_string()))?;

        Ok(Self::new(frame))
    }

    /// Parse CSV text.
    pub fn from_csv_str(content: &str) -> Result<Self> {
        Self::from_csv_bytes(content.as_bytes())
    }

    /// Parse CSV from any reader, e.g. stdin or a request body.
    pub fn from_csv_reader(mut reader: impl Read) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::from_csv_bytes(&bytes)
    }

    /// The underlying DataFrame.
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.frame.width()
    }

    /// `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.height(), self.width())
    }

    /// Total cells, `rows * columns`.
    pub fn total_cells(&self) -> usize {
        self.height() * self.width()
    }

    /// Iterate over `(column, kind)` pairs in column order.
    pub fn columns(&self) -> impl Iterator<Item = (&Column, ColumnKind)> {
        self.frame
            .get_columns()
            .iter()
            .zip(self.kinds.iter().copied())
    }

    /// Iterate over the numeric columns only.
    pub fn numeric_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns()
            .filter(|(_, kind)| kind.is_numeric())
            .map(|(col, _)| col)
    }

    /// Kind of a column, if it exists.
    pub fn kind(&self, name: &str) -> Option<ColumnKind> {
        self.columns()
            .find(|(col, _)| col.name().as_str() == name)
            .map(|(_, kind)| kind)
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.frame
            .column(name)
            .map_err(|_| AnalysisError::ColumnNotFound(name.to_string()))
    }

    /// Non-null values of a numeric column.
    ///
    /// Returns `Ok(None)` when the column exists but is not numeric.
    pub fn numeric_sample(&self, name: &str) -> Result<Option<Vec<f64>>> {
        let kind = self
            .kind(name)
            .ok_or_else(|| AnalysisError::ColumnNotFound(name.to_string()))?;
        if !kind.is_numeric() {
            return Ok(None);
        }
        let series = self.column(name)?.as_materialized_series();
        Ok(Some(numeric_values(series)?))
    }

    /// Rows with no null in any numeric column, one `Vec<f64>` per row.
    ///
    /// Features follow the order of [`numeric_columns`](Self::numeric_columns).
    pub fn complete_numeric_rows(&self) -> Result<Vec<Vec<f64>>> {
        let cells: Vec<Vec<Option<f64>>> = self
            .numeric_columns()
            .map(|col| numeric_cells(col.as_materialized_series()))
            .collect::<PolarsResult<_>>()?;

        if cells.is_empty() {
            return Ok(Vec::new());
        }

        let rows = (0..self.height())
            .filter_map(|row| cells.iter().map(|col| col[row]).collect::<Option<Vec<f64>>>())
            .collect();
        Ok(rows)
    }

    /// Null cells across the whole dataset.
    pub fn total_nulls(&self) -> usize {
        self.frame
            .get_columns()
            .iter()
            .map(|col| col.null_count())
            .sum()
    }
}

impl From<DataFrame> for Dataset {
    fn from(frame: DataFrame) -> Self {
        Self::new(frame)
    }
}
