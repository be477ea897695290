//! Polars-backed CSV reading for large survey exports.
//!
//! Small files go through the `csv` crate reader; files at or above
//! [`DEFAULT_STREAMING_THRESHOLD_BYTES`] are parsed by Polars with every
//! column read as a string, then converted into the same [`CsvTable`] shape
//! under the same rules: the first non-blank row is the header and cells are
//! trimmed of whitespace and byte-order marks.

use std::path::{Path, PathBuf};

use polars::prelude::*;

use anemia_model::normalize_header;

use crate::csv_table::{
    CsvTable, normalize_cell, read_csv_table, validate_encoding, validate_headers,
};
use crate::error::{IngestError, Result};
use crate::polars_utils::any_to_string;

/// Default file size threshold (in bytes) above which Polars is used.
/// Default: 10 MB
pub const DEFAULT_STREAMING_THRESHOLD_BYTES: u64 = 10 * 1024 * 1024;

/// Polars CSV reader producing a [`CsvTable`].
pub struct StreamingCsvReader {
    path: PathBuf,
    low_memory: bool,
}

impl StreamingCsvReader {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(IngestError::FileNotFound { path });
        }
        Ok(Self {
            path,
            low_memory: false,
        })
    }

    #[must_use]
    pub fn with_low_memory(mut self, enabled: bool) -> Self {
        self.low_memory = enabled;
        self
    }

    /// Read the whole file with every column typed as a string.
    ///
    /// The header row comes back as data so blank leading lines can be
    /// skipped before it.
    pub fn read_all(&self) -> Result<DataFrame> {
        validate_encoding(&self.path)?;
        let df = CsvReadOptions::default()
            .with_has_header(false)
            .with_infer_schema_length(Some(0))
            .with_low_memory(self.low_memory)
            .try_into_reader_with_file_path(Some(self.path.clone()))
            .map_err(|e| IngestError::CsvParse {
                path: self.path.clone(),
                message: e.to_string(),
            })?
            .finish()
            .map_err(|e| IngestError::CsvParse {
                path: self.path.clone(),
                message: e.to_string(),
            })?;
        Ok(df)
    }

    pub fn read_as_csv_table(&self) -> Result<CsvTable> {
        let df = self.read_all()?;
        let Some(table) = dataframe_to_csv_table(&df)? else {
            return Err(IngestError::EmptyCsv {
                path: self.path.clone(),
            });
        };
        validate_headers(&table.headers, &self.path)?;
        Ok(table)
    }
}

/// Convert a headerless Polars DataFrame to CsvTable format.
///
/// The first non-blank row becomes the header; later all-blank rows are
/// dropped. `None` when every row is blank.
fn dataframe_to_csv_table(df: &DataFrame) -> Result<Option<CsvTable>> {
    let mut headers: Option<Vec<String>> = None;
    let mut rows = Vec::with_capacity(df.height());
    for row_idx in 0..df.height() {
        let mut raw = Vec::with_capacity(df.width());
        for col in df.get_columns() {
            raw.push(any_to_string(col.get(row_idx)?));
        }
        if raw.iter().all(|value| value.trim().is_empty()) {
            continue;
        }
        match &headers {
            None => headers = Some(raw.iter().map(|value| normalize_header(value)).collect()),
            Some(_) => rows.push(raw.iter().map(|value| normalize_cell(value)).collect()),
        }
    }

    Ok(headers.map(|headers| CsvTable { headers, rows }))
}

/// Check if a file should be read with Polars based on a size threshold.
pub fn should_use_streaming_with_threshold(path: impl AsRef<Path>, threshold_bytes: u64) -> bool {
    std::fs::metadata(path.as_ref())
        .map(|m| m.len() >= threshold_bytes)
        .unwrap_or(false)
}

/// Read a CSV file, using Polars for files at or above the threshold.
pub fn read_csv_table_auto(path: impl AsRef<Path>, threshold_bytes: u64) -> Result<CsvTable> {
    let path = path.as_ref();
    if should_use_streaming_with_threshold(path, threshold_bytes) {
        tracing::debug!(path = %path.display(), "using Polars for large file");
        StreamingCsvReader::new(path)?.read_as_csv_table()
    } else {
        read_csv_table(path)
    }
}
