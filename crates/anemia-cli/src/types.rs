use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anemia_model::{ChartKind, FilterSelection};
use anemia_transform::Dashboard;

/// Dashboard output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardFormat {
    Html,
    Json,
}

impl DashboardFormat {
    pub fn extension(self) -> &'static str {
        match self {
            DashboardFormat::Html => "html",
            DashboardFormat::Json => "json",
        }
    }
}

#[derive(Debug)]
pub struct RenderResult {
    pub source: PathBuf,
    pub output: PathBuf,
    pub format: DashboardFormat,
    pub rows_read: usize,
    pub dropped: BTreeMap<String, usize>,
    pub total_records: usize,
    pub filtered_records: usize,
    pub selection: FilterSelection,
    pub panels: Vec<PanelSummary>,
}

#[derive(Debug)]
pub struct PanelSummary {
    pub title: String,
    pub kind: ChartKind,
    pub has_data: bool,
}

impl RenderResult {
    pub fn new(
        source: &Path,
        output: PathBuf,
        format: DashboardFormat,
        rows_read: usize,
        dropped: BTreeMap<String, usize>,
        dashboard: &Dashboard,
    ) -> Self {
        let panels = dashboard
            .panels
            .iter()
            .map(|panel| PanelSummary {
                title: panel.spec.title.clone(),
                kind: panel.spec.kind,
                has_data: panel.has_data(),
            })
            .collect();
        Self {
            source: source.to_path_buf(),
            output,
            format,
            rows_read,
            dropped,
            total_records: dashboard.total_records,
            filtered_records: dashboard.filtered_records,
            selection: dashboard.selection.clone(),
            panels,
        }
    }

    pub fn dropped_total(&self) -> usize {
        self.dropped.values().sum()
    }
}
