//! Per-chart data derivation.
//!
//! Each [`ChartSpec`] turns into a [`ChartPanel`]: either the data its
//! renderer needs, or a no-data marker when nothing in the current subset
//! can be plotted. Records missing a cell the chart needs are skipped for
//! that chart only.

use serde::Serialize;
use tracing::debug;

use anemia_model::{CellValue, ChartKind, ChartSpec, Dataset, Field, FieldKind, Record};

use crate::aggregate::top_n;
use crate::error::{Result, TransformError};
use crate::filter::{domain_of, resolve_column};
use crate::levels::order_levels;
use crate::stats::{BoxStats, KDE_POINTS, KernelDensity, bin_counts, bin_edges};

/// Series name used when a chart has no color field.
pub const SINGLE_SERIES: &str = "count";

/// Counts of one color level across the categories of a chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub counts: Vec<usize>,
}

/// Counts per category, optionally split by a color field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoricalData {
    pub field: String,
    pub color_field: Option<String>,
    pub categories: Vec<String>,
    pub series: Vec<Series>,
}

impl CategoricalData {
    /// Count per category summed across series.
    pub fn totals(&self) -> Vec<usize> {
        (0..self.categories.len())
            .map(|idx| self.series.iter().map(|s| s.counts[idx]).sum())
            .collect()
    }

    pub fn total(&self) -> usize {
        self.totals().iter().sum()
    }

    /// Share of each category in the total.
    pub fn shares(&self) -> Vec<f64> {
        let total = self.total();
        self.totals()
            .into_iter()
            .map(|count| {
                if total == 0 {
                    0.0
                } else {
                    count as f64 / total as f64
                }
            })
            .collect()
    }

    pub fn max_total(&self) -> usize {
        self.totals().into_iter().max().unwrap_or(0)
    }
}

/// Equal-width bins over a numeric field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramData {
    pub field: String,
    pub color_field: Option<String>,
    /// `bins + 1` edges shared by every series.
    pub edges: Vec<f64>,
    pub series: Vec<Series>,
}

impl HistogramData {
    pub fn max_count(&self) -> usize {
        self.series
            .iter()
            .flat_map(|s| s.counts.iter().copied())
            .max()
            .unwrap_or(0)
    }
}

/// Distribution of a numeric field within one category/color cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionGroup {
    pub category: String,
    pub color: Option<String>,
    pub stats: BoxStats,
    /// Present for violin charts.
    pub density: Option<KernelDensity>,
    /// Raw values, kept for violin charts.
    pub points: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionData {
    pub x_field: Option<String>,
    pub y_field: String,
    pub color_field: Option<String>,
    pub categories: Vec<String>,
    pub colors: Vec<String>,
    pub groups: Vec<DistributionGroup>,
}

impl DistributionData {
    /// Smallest and largest plotted value over every group.
    pub fn value_range(&self) -> (f64, f64) {
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for group in &self.groups {
            lo = lo.min(group.stats.min);
            hi = hi.max(group.stats.max);
            if let Some(density) = &group.density {
                if let (Some(first), Some(last)) = (density.points.first(), density.points.last())
                {
                    lo = lo.min(first.0);
                    hi = hi.max(last.0);
                }
            }
        }
        (lo, hi)
    }
}

/// How an axis maps values to positions.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "scale", rename_all = "snake_case")]
pub enum AxisScale {
    Numeric { min: f64, max: f64 },
    /// Points sit at the level index.
    Categorical { levels: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub field: String,
    #[serde(flatten)]
    pub scale: AxisScale,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    pub color: Option<String>,
    pub source_row: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterData {
    pub x: Axis,
    pub y: Axis,
    pub color_field: Option<String>,
    pub colors: Vec<String>,
    pub points: Vec<ScatterPoint>,
    /// Longitude/latitude plot.
    pub geographic: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionSummary {
    pub region: String,
    pub count: usize,
    pub latitude: f64,
    pub longitude: f64,
    /// Share of records whose outcome differs from the baseline level.
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionData {
    pub region_field: String,
    pub outcome_field: String,
    pub baseline: String,
    pub regions: Vec<RegionSummary>,
}

/// Derived data for one chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChartData {
    Categorical(CategoricalData),
    Histogram(HistogramData),
    Distribution(DistributionData),
    Scatter(ScatterData),
    Regions(RegionData),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum PanelBody {
    NoData,
    Data(ChartData),
}

/// One dashboard slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPanel {
    pub spec: ChartSpec,
    pub body: PanelBody,
}

impl ChartPanel {
    fn no_data(spec: &ChartSpec) -> Self {
        Self {
            spec: spec.clone(),
            body: PanelBody::NoData,
        }
    }

    pub fn data(&self) -> Option<&ChartData> {
        match &self.body {
            PanelBody::Data(data) => Some(data),
            PanelBody::NoData => None,
        }
    }

    pub fn has_data(&self) -> bool {
        self.data().is_some()
    }
}

/// Derive the data for one chart from the (already filtered) dataset.
pub fn build_chart(dataset: &Dataset, spec: &ChartSpec) -> Result<ChartPanel> {
    spec.validate()?;
    let resolved = ResolvedFields::resolve(dataset, spec)?;

    let scoped;
    let dataset = match (spec.top_n, resolved.x) {
        (Some(n), Some(x)) => {
            scoped = top_n(dataset, &dataset.columns[x], n)?;
            &scoped
        }
        _ => dataset,
    };

    if dataset.is_empty() {
        return Ok(ChartPanel::no_data(spec));
    }

    let data = match spec.kind {
        ChartKind::Bar | ChartKind::Pie => {
            let x = resolved.require_x(spec)?;
            let color = if spec.kind == ChartKind::Pie {
                None
            } else {
                resolved.color
            };
            categorical(dataset, x, color).map(ChartData::Categorical)
        }
        ChartKind::Histogram => {
            let x = resolved.require_x(spec)?;
            if is_numeric_column(dataset, x) {
                histogram(dataset, x, resolved.color, spec.histogram_bins())
                    .map(ChartData::Histogram)
            } else {
                categorical(dataset, x, resolved.color).map(ChartData::Categorical)
            }
        }
        ChartKind::Box | ChartKind::Violin => {
            let y = resolved.require_y(spec)?;
            ensure_numeric(dataset, spec, "y", y)?;
            distribution(
                dataset,
                resolved.x,
                y,
                resolved.color,
                spec.kind == ChartKind::Violin,
            )
            .map(ChartData::Distribution)
        }
        ChartKind::Scatter => {
            let x = resolved.require_x(spec)?;
            let y = resolved.require_y(spec)?;
            scatter(dataset, x, y, resolved.color, false).map(ChartData::Scatter)
        }
        ChartKind::ScatterMap => {
            let x = resolved.require_x(spec)?;
            let y = resolved.require_y(spec)?;
            ensure_numeric(dataset, spec, "x", x)?;
            ensure_numeric(dataset, spec, "y", y)?;
            scatter(dataset, x, y, resolved.color, true).map(ChartData::Scatter)
        }
        ChartKind::Choropleth => {
            let x = resolved.require_x(spec)?;
            let outcome = resolved.require_color(spec)?;
            let lat = resolve_column(dataset, Field::Latitude.canonical())?;
            let lon = resolve_column(dataset, Field::Longitude.canonical())?;
            regions(dataset, x, outcome, lat, lon).map(ChartData::Regions)
        }
    };

    let panel = match data {
        Some(data) => ChartPanel {
            spec: spec.clone(),
            body: PanelBody::Data(data),
        },
        None => ChartPanel::no_data(spec),
    };
    debug!(
        chart = %spec.title,
        kind = %spec.kind,
        rows = dataset.len(),
        has_data = panel.has_data(),
        "derived chart data"
    );
    Ok(panel)
}

struct ResolvedFields {
    x: Option<usize>,
    y: Option<usize>,
    color: Option<usize>,
}

impl ResolvedFields {
    fn resolve(dataset: &Dataset, spec: &ChartSpec) -> Result<Self> {
        let lookup = |field: Option<&str>| field.map(|f| resolve_column(dataset, f)).transpose();
        Ok(Self {
            x: lookup(spec.x_field())?,
            y: lookup(spec.y_field())?,
            color: lookup(spec.color_field())?,
        })
    }

    fn require_x(&self, spec: &ChartSpec) -> Result<usize> {
        self.x.ok_or_else(|| missing(spec, "x"))
    }

    fn require_y(&self, spec: &ChartSpec) -> Result<usize> {
        self.y.ok_or_else(|| missing(spec, "y"))
    }

    fn require_color(&self, spec: &ChartSpec) -> Result<usize> {
        self.color.ok_or_else(|| missing(spec, "color"))
    }
}

fn missing(spec: &ChartSpec, role: &'static str) -> TransformError {
    anemia_model::ModelError::MissingChartField {
        chart: spec.title.clone(),
        kind: spec.kind.to_string(),
        role,
    }
    .into()
}

/// Known categorical fields cannot drive a numeric axis.
fn ensure_numeric(
    dataset: &Dataset,
    spec: &ChartSpec,
    role: &'static str,
    index: usize,
) -> Result<()> {
    let column = &dataset.columns[index];
    match Field::from_canonical(column).map(|field| field.kind()) {
        Some(FieldKind::Categorical) => Err(TransformError::NotNumeric {
            chart: spec.title.clone(),
            role,
            field: column.clone(),
        }),
        _ => Ok(()),
    }
}

/// Known fields use their declared kind; other columns are numeric when
/// every non-missing value parses.
fn is_numeric_column(dataset: &Dataset, index: usize) -> bool {
    if let Some(field) = Field::from_canonical(&dataset.columns[index]) {
        return field.kind() == FieldKind::Numeric;
    }
    all_values_parse(dataset, index)
}

fn all_values_parse(dataset: &Dataset, index: usize) -> bool {
    let mut present = dataset
        .column_values(index)
        .filter(|cell| !cell.is_missing())
        .peekable();
    present.peek().is_some() && present.all(|cell| cell.as_f64().is_some())
}

/// Records where every listed column has a value.
fn complete_rows(dataset: &Dataset, columns: &[Option<usize>]) -> Dataset {
    let records = dataset
        .records
        .iter()
        .filter(|record| {
            columns
                .iter()
                .flatten()
                .all(|&idx| !record.cell(idx).is_missing())
        })
        .cloned()
        .collect();
    dataset.with_records(records)
}

fn level_position(levels: &[String], record: &Record, index: usize) -> Option<usize> {
    let value = record.cell(index).as_str()?;
    levels.iter().position(|level| level == value)
}

fn series_names(dataset: &Dataset, color: Option<usize>) -> Vec<String> {
    match color {
        Some(color) => domain_of(dataset, color),
        None => vec![SINGLE_SERIES.to_string()],
    }
}

fn categorical(dataset: &Dataset, x: usize, color: Option<usize>) -> Option<CategoricalData> {
    let usable = complete_rows(dataset, &[Some(x), color]);
    if usable.is_empty() {
        return None;
    }
    let categories = domain_of(&usable, x);
    let names = series_names(&usable, color);
    let mut counts = vec![vec![0usize; categories.len()]; names.len()];
    for record in &usable.records {
        let Some(category) = level_position(&categories, record, x) else {
            continue;
        };
        let slot = match color {
            Some(color) => match level_position(&names, record, color) {
                Some(slot) => slot,
                None => continue,
            },
            None => 0,
        };
        counts[slot][category] += 1;
    }

    Some(CategoricalData {
        field: dataset.columns[x].clone(),
        color_field: color.map(|idx| dataset.columns[idx].clone()),
        categories,
        series: names
            .into_iter()
            .zip(counts)
            .map(|(name, counts)| Series { name, counts })
            .collect(),
    })
}

fn histogram(
    dataset: &Dataset,
    x: usize,
    color: Option<usize>,
    bins: usize,
) -> Option<HistogramData> {
    let colored = complete_rows(dataset, &[color]);
    let usable = numeric_rows(&colored, x);
    let all: Vec<f64> = usable.iter().map(|(value, _)| *value).collect();
    let edges = bin_edges(&all, bins)?;
    let names = series_names(dataset, color);

    let series = names
        .into_iter()
        .filter_map(|name| {
            let values: Vec<f64> = usable
                .iter()
                .filter(|(_, record)| match color {
                    Some(color) => record.cell(color).as_str() == Some(name.as_str()),
                    None => true,
                })
                .map(|(value, _)| *value)
                .collect();
            (!values.is_empty()).then(|| Series {
                counts: bin_counts(&edges, &values),
                name,
            })
        })
        .collect();

    Some(HistogramData {
        field: dataset.columns[x].clone(),
        color_field: color.map(|idx| dataset.columns[idx].clone()),
        edges,
        series,
    })
}

/// Parsed values of a numeric column paired with their records.
fn numeric_rows(dataset: &Dataset, index: usize) -> Vec<(f64, &Record)> {
    dataset
        .records
        .iter()
        .filter_map(|record| record.cell(index).as_f64().map(|value| (value, record)))
        .collect()
}

const ALL_CATEGORY: &str = "All";

fn distribution(
    dataset: &Dataset,
    x: Option<usize>,
    y: usize,
    color: Option<usize>,
    with_density: bool,
) -> Option<DistributionData> {
    let usable = complete_rows(dataset, &[x, color]);
    let rows = numeric_rows(&usable, y);
    if rows.is_empty() {
        return None;
    }
    let categories = match x {
        Some(x) => domain_of(&usable, x),
        None => vec![ALL_CATEGORY.to_string()],
    };
    let colors = color.map(|c| domain_of(&usable, c)).unwrap_or_default();
    let color_slots: Vec<Option<&str>> = if color.is_some() {
        colors.iter().map(|c| Some(c.as_str())).collect()
    } else {
        vec![None]
    };

    let mut groups = Vec::new();
    for category in &categories {
        for color_value in &color_slots {
            let values: Vec<f64> = rows
                .iter()
                .filter(|(_, record)| {
                    x.is_none_or(|x| record.cell(x).as_str() == Some(category.as_str()))
                        && color.is_none_or(|c| record.cell(c).as_str() == *color_value)
                })
                .map(|(value, _)| *value)
                .collect();
            let Some(stats) = BoxStats::from_values(&values) else {
                continue;
            };
            let (density, points) = if with_density {
                (KernelDensity::estimate(&values, KDE_POINTS), values)
            } else {
                (None, Vec::new())
            };
            groups.push(DistributionGroup {
                category: category.clone(),
                color: color_value.map(str::to_string),
                stats,
                density,
                points,
            });
        }
    }

    Some(DistributionData {
        x_field: x.map(|idx| dataset.columns[idx].clone()),
        y_field: dataset.columns[y].clone(),
        color_field: color.map(|idx| dataset.columns[idx].clone()),
        categories,
        colors,
        groups,
    })
}

fn axis_for(dataset: &Dataset, index: usize, force_numeric: bool) -> Axis {
    let field = dataset.columns[index].clone();
    if force_numeric || all_values_parse(dataset, index) {
        let values: Vec<f64> = dataset
            .column_values(index)
            .filter_map(CellValue::as_f64)
            .collect();
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Axis {
            field,
            scale: AxisScale::Numeric { min, max },
        }
    } else {
        Axis {
            field,
            scale: AxisScale::Categorical {
                levels: domain_of(dataset, index),
            },
        }
    }
}

fn axis_position(axis: &Axis, record: &Record, index: usize) -> Option<f64> {
    match &axis.scale {
        AxisScale::Numeric { .. } => record.cell(index).as_f64(),
        AxisScale::Categorical { levels } => {
            level_position(levels, record, index).map(|pos| pos as f64)
        }
    }
}

fn scatter(
    dataset: &Dataset,
    x: usize,
    y: usize,
    color: Option<usize>,
    geographic: bool,
) -> Option<ScatterData> {
    let usable = complete_rows(dataset, &[Some(x), Some(y), color]);
    let x_axis = axis_for(&usable, x, geographic);
    let y_axis = axis_for(&usable, y, geographic);
    let points: Vec<ScatterPoint> = usable
        .records
        .iter()
        .filter_map(|record| {
            Some(ScatterPoint {
                x: axis_position(&x_axis, record, x)?,
                y: axis_position(&y_axis, record, y)?,
                color: color.and_then(|c| record.cell(c).as_str().map(str::to_string)),
                source_row: record.source_row,
            })
        })
        .collect();
    if points.is_empty() {
        return None;
    }
    let colors = color.map(|c| domain_of(&usable, c)).unwrap_or_default();
    Some(ScatterData {
        x: x_axis,
        y: y_axis,
        color_field: color.map(|idx| dataset.columns[idx].clone()),
        colors,
        points,
        geographic,
    })
}

fn regions(
    dataset: &Dataset,
    region: usize,
    outcome: usize,
    lat: usize,
    lon: usize,
) -> Option<RegionData> {
    let usable = complete_rows(dataset, &[Some(region), Some(outcome)]);
    let baseline = domain_of(&usable, outcome).into_iter().next()?;

    struct Accumulator {
        count: usize,
        flagged: usize,
        lat_sum: f64,
        lon_sum: f64,
    }

    let mut order: Vec<String> = Vec::new();
    let mut totals: Vec<Accumulator> = Vec::new();
    for record in &usable.records {
        let (Some(name), Some(value), Some(latitude), Some(longitude)) = (
            record.cell(region).as_str(),
            record.cell(outcome).as_str(),
            record.cell(lat).as_f64(),
            record.cell(lon).as_f64(),
        ) else {
            continue;
        };
        let slot = match order.iter().position(|known| known == name) {
            Some(slot) => slot,
            None => {
                order.push(name.to_string());
                totals.push(Accumulator {
                    count: 0,
                    flagged: 0,
                    lat_sum: 0.0,
                    lon_sum: 0.0,
                });
                order.len() - 1
            }
        };
        let acc = &mut totals[slot];
        acc.count += 1;
        acc.lat_sum += latitude;
        acc.lon_sum += longitude;
        if value != baseline {
            acc.flagged += 1;
        }
    }
    if order.is_empty() {
        return None;
    }

    let column = &dataset.columns[region];
    let regions = order_levels(column, order.clone())
        .into_iter()
        .filter_map(|name| {
            let slot = order.iter().position(|known| *known == name)?;
            let acc = &totals[slot];
            let count = acc.count as f64;
            Some(RegionSummary {
                region: name,
                count: acc.count,
                latitude: acc.lat_sum / count,
                longitude: acc.lon_sum / count,
                share: acc.flagged as f64 / count,
            })
        })
        .collect();

    Some(RegionData {
        region_field: column.clone(),
        outcome_field: dataset.columns[outcome].clone(),
        baseline,
        regions,
    })
}
