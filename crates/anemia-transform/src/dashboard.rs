//! A whole dashboard: selection, sidebar choices, and every chart panel.

use std::time::Instant;

use serde::Serialize;
use tracing::{info, info_span};

use anemia_model::{Dataset, FilterSelection, ReportDefinition};

use crate::chart_data::{ChartPanel, build_chart};
use crate::error::Result;
use crate::filter::{domain_of, filter, resolve_column, validate_selection};

/// Sidebar entry for one filter field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterChoices {
    pub field: String,
    /// Observed values of the unfiltered dataset.
    pub choices: Vec<String>,
    pub selected: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub title: String,
    pub columns: usize,
    pub selection: FilterSelection,
    pub total_records: usize,
    pub filtered_records: usize,
    pub filters: Vec<FilterChoices>,
    pub panels: Vec<ChartPanel>,
}

impl Dashboard {
    /// True when the selection matched no records.
    pub fn is_empty_selection(&self) -> bool {
        self.filtered_records == 0
    }
}

/// Validate the selection, filter, and derive every chart of `report`.
///
/// An empty filtered subset is not an error: every panel comes back as
/// no-data.
pub fn build_dashboard(
    dataset: &Dataset,
    report: &ReportDefinition,
    selection: &FilterSelection,
) -> Result<Dashboard> {
    let span = info_span!("filter", filters = selection.len(), charts = report.charts.len());
    let _guard = span.enter();
    let start = Instant::now();

    let selection = validate_selection(dataset, selection)?;
    let filtered = filter(dataset, &selection)?;

    let mut filters = Vec::with_capacity(report.filters.len());
    for field in &report.filters {
        let index = resolve_column(dataset, field)?;
        let column = dataset.columns[index].clone();
        filters.push(FilterChoices {
            choices: domain_of(dataset, index),
            selected: selection.get(&column).map(str::to_string),
            field: column,
        });
    }

    let panels = report
        .charts
        .iter()
        .map(|spec| build_chart(&filtered, spec))
        .collect::<Result<Vec<_>>>()?;

    info!(
        total_records = dataset.len(),
        filtered_records = filtered.len(),
        panels_with_data = panels.iter().filter(|p| p.has_data()).count(),
        duration_ms = start.elapsed().as_millis(),
        "dashboard data ready"
    );

    Ok(Dashboard {
        title: report.title.clone(),
        columns: report.columns,
        total_records: dataset.len(),
        filtered_records: filtered.len(),
        selection,
        filters,
        panels,
    })
}
