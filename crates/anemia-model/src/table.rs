#![deny(unsafe_code)]

use serde::{Deserialize, Serialize};

/// Tokens read as a missing cell, compared case-insensitively.
const MISSING_TOKENS: &[&str] = &["na", "n/a", "nan", "null"];

static MISSING: CellValue = CellValue::Missing;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum CellValue {
    Text(String),
    Missing,
}

impl CellValue {
    /// Build a cell from raw CSV text; blanks and NA-like tokens become `Missing`.
    pub fn from_raw(raw: &str) -> Self {
        let trimmed = raw.trim().trim_matches('\u{feff}').trim();
        if trimmed.is_empty()
            || MISSING_TOKENS
                .iter()
                .any(|token| token.eq_ignore_ascii_case(trimmed))
        {
            CellValue::Missing
        } else {
            CellValue::Text(trimmed.to_string())
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(value) => Some(value.as_str()),
            CellValue::Missing => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.as_str()
            .and_then(|value| value.parse::<f64>().ok())
            .filter(|value| value.is_finite())
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }
}

/// One surveyed child.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// 1-based data row in the source file.
    pub source_row: usize,
    pub cells: Vec<CellValue>,
}

impl Record {
    pub fn new(source_row: usize, cells: Vec<CellValue>) -> Self {
        Self { source_row, cells }
    }

    pub fn cell(&self, index: usize) -> &CellValue {
        self.cells.get(index).unwrap_or(&MISSING)
    }
}

/// Loaded, read-only survey table keyed by canonical column names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub columns: Vec<String>,
    pub records: Vec<Record>,
}

impl Dataset {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            records: Vec::new(),
        }
    }

    pub fn push_record(&mut self, record: Record) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Index of a column, matched exactly first and then case-insensitively.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.columns
            .iter()
            .position(|column| column == name)
            .or_else(|| {
                self.columns
                    .iter()
                    .position(|column| column.eq_ignore_ascii_case(name))
            })
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Cells of one column in record order.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &CellValue> + '_ {
        self.records.iter().map(move |record| record.cell(index))
    }

    /// Same columns, a chosen subset of records (cloned, order kept).
    pub fn with_records(&self, records: Vec<Record>) -> Dataset {
        Dataset {
            columns: self.columns.clone(),
            records,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_from_raw_handles_missing_tokens() {
        assert_eq!(CellValue::from_raw("  "), CellValue::Missing);
        assert_eq!(CellValue::from_raw("NaN"), CellValue::Missing);
        assert_eq!(CellValue::from_raw("n/a"), CellValue::Missing);
        assert_eq!(
            CellValue::from_raw(" Mild "),
            CellValue::Text("Mild".to_string())
        );
    }

    #[test]
    fn cell_as_f64_rejects_text_and_infinity() {
        assert_eq!(CellValue::from_raw("11.4").as_f64(), Some(11.4));
        assert_eq!(CellValue::from_raw("inf").as_f64(), None);
        assert_eq!(CellValue::from_raw("Urban").as_f64(), None);
        assert_eq!(CellValue::Missing.as_f64(), None);
    }

    #[test]
    fn column_index_falls_back_to_case_insensitive() {
        let dataset = Dataset::new(vec!["Residence".to_string(), "Wealth".to_string()]);
        assert_eq!(dataset.column_index("Wealth"), Some(1));
        assert_eq!(dataset.column_index("residence"), Some(0));
        assert_eq!(dataset.column_index("Education"), None);
    }

    #[test]
    fn record_cell_out_of_range_is_missing() {
        let record = Record::new(1, vec![CellValue::Text("x".to_string())]);
        assert!(record.cell(5).is_missing());
    }
}
