//! Report definition files (TOML).

use std::fs;
use std::path::Path;

use anemia_model::ReportDefinition;

use crate::error::{IngestError, Result};

/// Load and validate a report definition from a TOML file.
pub fn load_report_definition(path: &Path) -> Result<ReportDefinition> {
    let content = fs::read_to_string(path).map_err(|e| IngestError::from_io(path, e))?;
    let report = parse_report_definition(&content, path)?;
    tracing::info!(
        path = %path.display(),
        charts = report.charts.len(),
        "loaded report definition"
    );
    Ok(report)
}

/// Parse and validate report TOML; `path` is only used in error messages.
pub fn parse_report_definition(content: &str, path: &Path) -> Result<ReportDefinition> {
    let report: ReportDefinition =
        toml::from_str(content).map_err(|e| IngestError::ReportParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    report.validate().map_err(|source| IngestError::ReportInvalid {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(report)
}

/// Serialize a report definition as TOML.
pub fn report_definition_to_toml(report: &ReportDefinition) -> Result<String> {
    toml::to_string_pretty(report).map_err(|e| IngestError::ReportParse {
        path: Path::new("<generated>").to_path_buf(),
        message: e.to_string(),
    })
}
