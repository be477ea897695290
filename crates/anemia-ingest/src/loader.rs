//! Survey dataset loading: read, rename, check required columns, drop rows.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;

use tracing::{debug, info, info_span, warn};

use anemia_model::{CellValue, Dataset, Field, Record, ReportDefinition};

use crate::csv_table::CsvTable;
use crate::error::{IngestError, Result};
use crate::schema::{ColumnMapping, ColumnRename};
use crate::streaming::{DEFAULT_STREAMING_THRESHOLD_BYTES, read_csv_table_auto};

/// What the loader must guarantee about the dataset.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Columns that must exist after renaming.
    pub required_columns: Vec<String>,
    /// Columns whose cells must be present; rows missing any are dropped.
    pub non_null_columns: Vec<String>,
    /// Extra raw header → canonical aliases.
    pub aliases: BTreeMap<String, String>,
    /// Files at or above this size are parsed by Polars.
    pub streaming_threshold_bytes: u64,
}

impl Default for LoadOptions {
    fn default() -> Self {
        let anemia = Field::AnemiaLevel.canonical().to_string();
        Self {
            required_columns: vec![anemia.clone()],
            non_null_columns: vec![anemia],
            aliases: BTreeMap::new(),
            streaming_threshold_bytes: DEFAULT_STREAMING_THRESHOLD_BYTES,
        }
    }
}

impl LoadOptions {
    /// Requirements implied by a report: every referenced column must exist,
    /// the anemia level must be present, and coordinates must be present when
    /// a map chart is used.
    pub fn for_report(report: &ReportDefinition) -> Self {
        let mut options = Self::default().with_aliases(report.aliases.clone());
        for field in report.referenced_fields() {
            options.require_column(&field);
        }
        if report.uses_geo() {
            options.require_non_null(Field::Latitude.canonical());
            options.require_non_null(Field::Longitude.canonical());
        }
        options
    }

    #[must_use]
    pub fn with_aliases(mut self, aliases: BTreeMap<String, String>) -> Self {
        self.aliases = aliases;
        self
    }

    #[must_use]
    pub fn with_streaming_threshold(mut self, bytes: u64) -> Self {
        self.streaming_threshold_bytes = bytes;
        self
    }

    pub fn require_column(&mut self, column: &str) {
        if !contains_ignore_case(&self.required_columns, column) {
            self.required_columns.push(column.to_string());
        }
    }

    /// Require the column to exist and every kept row to have a value in it.
    pub fn require_non_null(&mut self, column: &str) {
        self.require_column(column);
        if !contains_ignore_case(&self.non_null_columns, column) {
            self.non_null_columns.push(column.to_string());
        }
    }
}

fn contains_ignore_case(values: &[String], needle: &str) -> bool {
    values.iter().any(|value| value.eq_ignore_ascii_case(needle))
}

/// Loaded dataset plus what happened on the way in.
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    pub dataset: Dataset,
    pub renames: Vec<ColumnRename>,
    pub rows_read: usize,
    /// Rows dropped, keyed by the first required column found missing.
    pub dropped: BTreeMap<String, usize>,
}

impl LoadedDataset {
    pub fn dropped_total(&self) -> usize {
        self.dropped.values().sum()
    }
}

/// Load a survey CSV file.
pub fn load_dataset(path: &Path, options: &LoadOptions) -> Result<LoadedDataset> {
    let span = info_span!("load", path = %path.display());
    let _guard = span.enter();
    let start = Instant::now();

    let table = read_csv_table_auto(path, options.streaming_threshold_bytes)?;
    let loaded = dataset_from_table(table, path, options)?;

    info!(
        rows_read = loaded.rows_read,
        rows_kept = loaded.dataset.len(),
        rows_dropped = loaded.dropped_total(),
        columns = loaded.dataset.columns.len(),
        duration_ms = start.elapsed().as_millis(),
        "dataset loaded"
    );
    Ok(loaded)
}

/// Rename columns, check required columns, and drop rows with missing
/// required cells. `path` is only used in error messages.
pub fn dataset_from_table(
    table: CsvTable,
    path: &Path,
    options: &LoadOptions,
) -> Result<LoadedDataset> {
    let mapping = ColumnMapping::new().with_aliases(&options.aliases);
    let renames = mapping.resolve_all(&table.headers);
    for rename in &renames {
        if rename.raw != rename.canonical {
            debug!(raw = %rename.raw, canonical = %rename.canonical, "renamed column");
        }
    }
    let columns: Vec<String> = renames.iter().map(|r| r.canonical.clone()).collect();
    let mut dataset = Dataset::new(columns);

    for column in &options.required_columns {
        if !dataset.has_column(column) {
            return Err(IngestError::MissingColumn {
                column: column.clone(),
                path: path.to_path_buf(),
                available: dataset.columns.join(", "),
            });
        }
    }
    let non_null: Vec<(String, usize)> = options
        .non_null_columns
        .iter()
        .filter_map(|column| {
            dataset
                .column_index(column)
                .map(|index| (dataset.columns[index].clone(), index))
        })
        .collect();

    let rows_read = table.rows.len();
    let mut dropped: BTreeMap<String, usize> = BTreeMap::new();
    let mut records = Vec::with_capacity(rows_read);
    for (idx, row) in table.rows.into_iter().enumerate() {
        let cells: Vec<CellValue> = row.iter().map(|value| CellValue::from_raw(value)).collect();
        let record = Record::new(idx + 1, cells);
        let missing = non_null
            .iter()
            .find(|(_, index)| record.cell(*index).is_missing());
        if let Some((column, _)) = missing {
            *dropped.entry(column.clone()).or_insert(0) += 1;
            continue;
        }
        records.push(record);
    }
    dataset.records = records;

    for (column, count) in &dropped {
        warn!(column = %column, rows = count, "dropped rows with missing required value");
    }

    Ok(LoadedDataset {
        dataset,
        renames,
        rows_read,
        dropped,
    })
}
