//! Declarative dashboard definitions.
//!
//! A report is an ordered list of chart entries plus the fields offered as
//! sidebar filters. One definition drives the generic render loop; there is
//! no per-dashboard chart code.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::field::Field;

pub const DEFAULT_TITLE: &str = "Childhood Anemia Risk Factors Dashboard";
pub const DEFAULT_GRID_COLUMNS: usize = 3;
pub const DEFAULT_HISTOGRAM_BINS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    Box,
    Violin,
    Pie,
    Histogram,
    Scatter,
    #[serde(alias = "scatter-map", alias = "map")]
    ScatterMap,
    Choropleth,
}

impl ChartKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::Bar => "bar",
            ChartKind::Box => "box",
            ChartKind::Violin => "violin",
            ChartKind::Pie => "pie",
            ChartKind::Histogram => "histogram",
            ChartKind::Scatter => "scatter",
            ChartKind::ScatterMap => "scatter_map",
            ChartKind::Choropleth => "choropleth",
        }
    }

    pub fn is_geo(&self) -> bool {
        matches!(self, ChartKind::ScatterMap | ChartKind::Choropleth)
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartKind {
    type Err = ModelError;

    fn from_str(input: &str) -> Result<Self> {
        match input.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "bar" => Ok(ChartKind::Bar),
            "box" => Ok(ChartKind::Box),
            "violin" => Ok(ChartKind::Violin),
            "pie" => Ok(ChartKind::Pie),
            "histogram" => Ok(ChartKind::Histogram),
            "scatter" => Ok(ChartKind::Scatter),
            "scatter_map" | "map" => Ok(ChartKind::ScatterMap),
            "choropleth" => Ok(ChartKind::Choropleth),
            _ => Err(ModelError::UnknownChartKind(input.to_string())),
        }
    }
}

/// One chart widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Keep only rows whose `x` value is among the N most frequent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_n: Option<usize>,
    /// Bin count for numeric histograms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bins: Option<usize>,
}

impl ChartSpec {
    pub fn new(kind: ChartKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            x: None,
            y: None,
            color: None,
            top_n: None,
            bins: None,
        }
    }

    #[must_use]
    pub fn x(mut self, field: impl Into<String>) -> Self {
        self.x = Some(field.into());
        self
    }

    #[must_use]
    pub fn y(mut self, field: impl Into<String>) -> Self {
        self.y = Some(field.into());
        self
    }

    #[must_use]
    pub fn color(mut self, field: impl Into<String>) -> Self {
        self.color = Some(field.into());
        self
    }

    #[must_use]
    pub fn top_n(mut self, n: usize) -> Self {
        self.top_n = Some(n);
        self
    }

    #[must_use]
    pub fn bins(mut self, bins: usize) -> Self {
        self.bins = Some(bins);
        self
    }

    /// Horizontal field, with map charts defaulting to longitude.
    pub fn x_field(&self) -> Option<&str> {
        match (&self.x, self.kind) {
            (Some(x), _) => Some(x.as_str()),
            (None, ChartKind::ScatterMap) => Some(Field::Longitude.canonical()),
            (None, _) => None,
        }
    }

    /// Vertical field, with map charts defaulting to latitude.
    pub fn y_field(&self) -> Option<&str> {
        match (&self.y, self.kind) {
            (Some(y), _) => Some(y.as_str()),
            (None, ChartKind::ScatterMap) => Some(Field::Latitude.canonical()),
            (None, _) => None,
        }
    }

    /// Color field, with choropleths defaulting to the anemia level.
    pub fn color_field(&self) -> Option<&str> {
        match (&self.color, self.kind) {
            (Some(color), _) => Some(color.as_str()),
            (None, ChartKind::Choropleth) => Some(Field::AnemiaLevel.canonical()),
            (None, _) => None,
        }
    }

    pub fn histogram_bins(&self) -> usize {
        self.bins.unwrap_or(DEFAULT_HISTOGRAM_BINS).max(1)
    }

    /// Every column this chart reads.
    pub fn referenced_fields(&self) -> Vec<&str> {
        let mut fields = Vec::new();
        for field in [self.x_field(), self.y_field(), self.color_field()]
            .into_iter()
            .flatten()
        {
            if !fields.contains(&field) {
                fields.push(field);
            }
        }
        if self.kind == ChartKind::Choropleth {
            for geo in [Field::Latitude.canonical(), Field::Longitude.canonical()] {
                if !fields.contains(&geo) {
                    fields.push(geo);
                }
            }
        }
        fields
    }

    pub fn validate(&self) -> Result<()> {
        let missing = |role: &'static str| ModelError::MissingChartField {
            chart: self.title.clone(),
            kind: self.kind.to_string(),
            role,
        };
        match self.kind {
            ChartKind::Bar | ChartKind::Pie | ChartKind::Histogram | ChartKind::Choropleth => {
                if self.x.is_none() {
                    return Err(missing("x"));
                }
            }
            ChartKind::Box | ChartKind::Violin => {
                if self.y.is_none() {
                    return Err(missing("y"));
                }
            }
            ChartKind::Scatter => {
                if self.x.is_none() {
                    return Err(missing("x"));
                }
                if self.y.is_none() {
                    return Err(missing("y"));
                }
            }
            ChartKind::ScatterMap => {}
        }
        if self.top_n == Some(0) {
            return Err(ModelError::InvalidReport(format!(
                "chart '{}' has top_n = 0",
                self.title
            )));
        }
        Ok(())
    }
}

/// A full dashboard definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportDefinition {
    #[serde(default = "default_title")]
    pub title: String,
    /// Charts per grid row.
    #[serde(default = "default_columns")]
    pub columns: usize,
    /// Fields offered as sidebar filters.
    #[serde(default)]
    pub filters: Vec<String>,
    /// Extra raw header → canonical field mappings.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub aliases: BTreeMap<String, String>,
    #[serde(default)]
    pub charts: Vec<ChartSpec>,
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

fn default_columns() -> usize {
    DEFAULT_GRID_COLUMNS
}

impl Default for ReportDefinition {
    /// The six-widget risk-factor dashboard.
    fn default() -> Self {
        let anemia = Field::AnemiaLevel.canonical();
        Self {
            title: default_title(),
            columns: DEFAULT_GRID_COLUMNS,
            filters: vec![
                Field::Residence.canonical().to_string(),
                Field::Wealth.canonical().to_string(),
                Field::Education.canonical().to_string(),
                Field::IronIntake.canonical().to_string(),
            ],
            aliases: BTreeMap::new(),
            charts: vec![
                ChartSpec::new(ChartKind::Pie, "Education Distribution of Mothers")
                    .x(Field::Education.canonical()),
                ChartSpec::new(ChartKind::Box, "Hemoglobin Levels by Wealth")
                    .x(Field::Wealth.canonical())
                    .y(Field::Hemoglobin.canonical())
                    .color(anemia),
                ChartSpec::new(ChartKind::Violin, "Hemoglobin by Residence")
                    .x(Field::Residence.canonical())
                    .y(Field::Hemoglobin.canonical())
                    .color(anemia),
                ChartSpec::new(ChartKind::Histogram, "Anemia by Iron Supplement Intake")
                    .x(Field::IronIntake.canonical())
                    .color(anemia),
                ChartSpec::new(ChartKind::Bar, "Anemia by Breastfeeding Timing")
                    .x(Field::BreastfeedTiming.canonical())
                    .color(anemia)
                    .top_n(5),
                ChartSpec::new(ChartKind::Scatter, "Hemoglobin vs Age Group by Anemia Level")
                    .x(Field::Hemoglobin.canonical())
                    .y(Field::AgeGroup.canonical())
                    .color(anemia),
            ],
        }
    }
}

impl ReportDefinition {
    pub fn validate(&self) -> Result<()> {
        if self.charts.is_empty() {
            return Err(ModelError::InvalidReport("no charts defined".to_string()));
        }
        if self.columns == 0 {
            return Err(ModelError::InvalidReport(
                "columns must be at least 1".to_string(),
            ));
        }
        for chart in &self.charts {
            chart.validate()?;
        }
        Ok(())
    }

    /// True when any chart needs coordinates.
    pub fn uses_geo(&self) -> bool {
        self.charts.iter().any(|chart| chart.kind.is_geo())
    }

    /// Every column read by a chart or offered as a filter, in first-use order.
    pub fn referenced_fields(&self) -> Vec<String> {
        let mut fields: Vec<String> = Vec::new();
        let chart_fields = self
            .charts
            .iter()
            .flat_map(ChartSpec::referenced_fields)
            .map(str::to_string);
        for field in self.filters.iter().cloned().chain(chart_fields) {
            if !fields.iter().any(|existing| existing.eq_ignore_ascii_case(&field)) {
                fields.push(field);
            }
        }
        fields
    }
}
