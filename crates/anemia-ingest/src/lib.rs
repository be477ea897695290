//! Survey data ingestion: CSV reading, column renaming, and load checks.

pub mod config;
pub mod csv_table;
pub mod error;
pub mod loader;
pub mod polars_utils;
pub mod profile;
pub mod schema;
pub mod streaming;

pub use config::{load_report_definition, parse_report_definition, report_definition_to_toml};
pub use csv_table::{CsvTable, read_csv_table, validate_encoding};
pub use error::{IngestError, Result};
pub use loader::{LoadOptions, LoadedDataset, dataset_from_table, load_dataset};
pub use polars_utils::{any_to_string, format_numeric};
pub use profile::{ColumnProfile, profile_columns};
pub use schema::{ColumnMapping, ColumnRename};
pub use streaming::{
    DEFAULT_STREAMING_THRESHOLD_BYTES, StreamingCsvReader, read_csv_table_auto,
    should_use_streaming_with_threshold,
};
