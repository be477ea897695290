//! Raw CSV reading with the `csv` crate.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;

use anemia_model::normalize_header;

use crate::error::{IngestError, Result};

/// Header row plus string cells, before any renaming.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Trim a data cell and drop any stray byte-order mark.
pub(crate) fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

/// Reject UTF-16 files up front; the readers only handle UTF-8.
pub fn validate_encoding(path: &Path) -> Result<()> {
    let mut file = File::open(path).map_err(|e| IngestError::from_io(path, e))?;
    let mut buffer = [0u8; 2];
    let bytes_read = file
        .read(&mut buffer)
        .map_err(|e| IngestError::from_io(path, e))?;
    if bytes_read == 2 {
        if buffer == [0xFF, 0xFE] {
            return Err(IngestError::UnsupportedEncoding {
                path: path.to_path_buf(),
                encoding: "UTF-16 LE",
            });
        }
        if buffer == [0xFE, 0xFF] {
            return Err(IngestError::UnsupportedEncoding {
                path: path.to_path_buf(),
                encoding: "UTF-16 BE",
            });
        }
    }
    Ok(())
}

/// Check that no header is blank once normalized.
pub(crate) fn validate_headers(headers: &[String], path: &Path) -> Result<()> {
    if headers.is_empty() {
        return Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        });
    }
    if let Some(position) = headers.iter().position(String::is_empty) {
        return Err(IngestError::EmptyColumnName {
            path: path.to_path_buf(),
            position: position + 1,
        });
    }
    Ok(())
}

/// Read a CSV file: first non-blank row is the header, blank rows are skipped,
/// short rows are padded with empty cells.
pub fn read_csv_table(path: &Path) -> Result<CsvTable> {
    validate_encoding(path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| csv_error(path, &e))?;

    let mut headers: Option<Vec<String>> = None;
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| csv_error(path, &e))?;
        if record.iter().all(|value| value.trim().is_empty()) {
            continue;
        }
        match &headers {
            None => {
                headers = Some(record.iter().map(normalize_header).collect());
            }
            Some(header_row) => {
                let mut row = Vec::with_capacity(header_row.len());
                for idx in 0..header_row.len() {
                    row.push(normalize_cell(record.get(idx).unwrap_or("")));
                }
                rows.push(row);
            }
        }
    }

    let Some(headers) = headers else {
        return Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        });
    };
    validate_headers(&headers, path)?;
    Ok(CsvTable { headers, rows })
}

fn csv_error(path: &Path, error: &csv::Error) -> IngestError {
    if let csv::ErrorKind::Io(io) = error.kind() {
        if io.kind() == std::io::ErrorKind::NotFound {
            return IngestError::FileNotFound {
                path: path.to_path_buf(),
            };
        }
    }
    IngestError::CsvParse {
        path: path.to_path_buf(),
        message: error.to_string(),
    }
}
