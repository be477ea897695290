//! Load and select steps shared by every subcommand.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, trace};

use anemia_ingest::{LoadOptions, LoadedDataset, load_dataset, load_report_definition};
use anemia_model::{Dataset, FieldFilter, FilterSelection, ReportDefinition};
use anemia_transform::{filter, validate_selection};

use crate::logging::redact_value;
use crate::types::DashboardFormat;

/// The report definition at `path`, or the built-in dashboard.
pub fn load_report(path: Option<&Path>) -> Result<ReportDefinition> {
    match path {
        Some(path) => load_report_definition(path)
            .with_context(|| format!("load report definition {}", path.display())),
        None => Ok(ReportDefinition::default()),
    }
}

/// Load options for commands that only inspect columns: the anemia level
/// must be present, plus any `extra` columns the command reads.
pub fn inspection_options(report: &ReportDefinition, extra: &[&str]) -> LoadOptions {
    let mut options = LoadOptions::default().with_aliases(report.aliases.clone());
    for column in extra {
        options.require_column(column);
    }
    options
}

pub fn load_survey(path: &Path, options: &LoadOptions) -> Result<LoadedDataset> {
    let loaded = load_dataset(path, options).with_context(|| format!("load {}", path.display()))?;
    let renamed = loaded
        .renames
        .iter()
        .filter(|rename| rename.raw != rename.canonical)
        .count();
    debug!(renamed, "columns renamed to canonical fields");
    Ok(loaded)
}

/// Validate `filters` against the dataset's observed values.
///
/// Returns the selection in the dataset's own spelling.
pub fn validated_selection(
    dataset: &Dataset,
    filters: &[FieldFilter],
) -> Result<FilterSelection> {
    let requested = FilterSelection::from_filters(filters.iter().cloned());
    let selection = validate_selection(dataset, &requested).context("invalid filter")?;
    for filter in selection.iter() {
        trace!(field = %filter.field, value = %redact_value(&filter.value), "filter");
    }
    Ok(selection)
}

/// Validate `filters` and apply them.
///
/// Returns the canonical selection together with the matching subset.
pub fn select(dataset: &Dataset, filters: &[FieldFilter]) -> Result<(FilterSelection, Dataset)> {
    let selection = validated_selection(dataset, filters)?;
    let subset = filter(dataset, &selection).context("apply filters")?;
    info!(
        filters = selection.len(),
        records = dataset.len(),
        matched = subset.len(),
        "selection applied"
    );
    Ok((selection, subset))
}

/// `<CSV stem>-dashboard.<ext>` next to the input file.
pub fn default_output_path(csv: &Path, format: DashboardFormat) -> PathBuf {
    let stem = csv
        .file_stem()
        .map_or_else(|| "survey".into(), std::ffi::OsStr::to_string_lossy);
    csv.with_file_name(format!("{stem}-dashboard.{}", format.extension()))
}

#[cfg(test)]
mod tests {
    use super::*;

    use anemia_model::{CellValue, Record};

    fn survey() -> Dataset {
        let mut dataset = Dataset::new(vec![
            "Residence".to_string(),
            "Wealth".to_string(),
            "Anemia_Level".to_string(),
        ]);
        let rows = [
            ["Urban", "Poor", "Mild"],
            ["Urban", "Poor", "Not anemic"],
            ["Rural", "Rich", "Severe"],
        ];
        for (idx, row) in rows.iter().enumerate() {
            let cells = row.iter().map(|v| CellValue::from_raw(v)).collect();
            dataset.push_record(Record::new(idx + 1, cells));
        }
        dataset
    }

    #[test]
    fn default_output_sits_next_to_the_csv() {
        let path = default_output_path(Path::new("data/survey.csv"), DashboardFormat::Html);
        assert_eq!(path, PathBuf::from("data/survey-dashboard.html"));
        let path = default_output_path(Path::new("survey.csv"), DashboardFormat::Json);
        assert_eq!(path, PathBuf::from("survey-dashboard.json"));
    }

    #[test]
    fn select_canonicalizes_filter_spelling() {
        let filters: Vec<FieldFilter> = vec![
            "residence=urban".parse().unwrap(),
            "Wealth=Poor".parse().unwrap(),
        ];
        let (selection, subset) = select(&survey(), &filters).unwrap();
        assert_eq!(selection.get("Residence"), Some("Urban"));
        assert_eq!(subset.len(), 2);
    }

    #[test]
    fn select_reports_choices_for_unknown_values() {
        let filters: Vec<FieldFilter> = vec!["Wealth=Middle".parse().unwrap()];
        let error = select(&survey(), &filters).unwrap_err();
        let message = format!("{error:#}");
        assert!(message.contains("invalid filter"), "{message}");
        assert!(message.contains("Poor, Rich"), "{message}");
    }

    #[test]
    fn validated_selection_does_not_need_a_subset() {
        let filters: Vec<FieldFilter> = vec![
            "Residence=rural".parse().unwrap(),
            "Wealth=*".parse().unwrap(),
        ];
        let selection = validated_selection(&survey(), &filters).unwrap();
        assert_eq!(selection.to_string(), "Residence=Rural");

        let bad: Vec<FieldFilter> = vec!["Province=North".parse().unwrap()];
        let message = format!("{:#}", validated_selection(&survey(), &bad).unwrap_err());
        assert!(message.contains("invalid filter"), "{message}");
    }

    #[test]
    fn builtin_report_when_no_path_given() {
        let report = load_report(None).unwrap();
        assert_eq!(report.charts.len(), 6);
    }
}
