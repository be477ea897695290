//! Data model for the childhood anemia dashboard.
//!
//! - [`Field`]: canonical survey fields and raw header recognition
//! - [`Dataset`]: loaded records with canonical column names
//! - [`FilterSelection`]: conjunctive equality filters
//! - [`ReportDefinition`]: declarative chart list driving the renderer

pub mod error;
pub mod field;
pub mod report;
pub mod selection;
pub mod table;

pub use error::{ModelError, Result};
pub use field::{Field, FieldKind, header_key, level_rank, normalize_header, ordinal_levels};
pub use report::{ChartKind, ChartSpec, ReportDefinition};
pub use selection::{FieldFilter, FilterSelection};
pub use table::{CellValue, Dataset, Record};
