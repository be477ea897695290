//! Chart panels rendered as standalone SVG.

use std::io::Write;

use anyhow::{Context, Result};
use quick_xml::Writer;

use anemia_model::ChartKind;
use anemia_transform::{
    AxisScale, CategoricalData, ChartData, ChartPanel, DistributionData, HistogramData,
    PanelBody, RegionData, ScatterData,
};

use crate::common::{CHART_HEIGHT, NO_DATA_NOTICE, fmt_num, fmt_percent};
use crate::palette::{ColorScale, SINGLE, sequential};
use crate::svg::{LinearScale, PlotArea, SvgCanvas};

/// How multiple series share a category band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BarLayout {
    Stacked,
    Grouped,
}

/// Render one panel to an SVG string.
pub fn render_panel_svg(panel: &ChartPanel) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    write_panel_svg(&mut writer, panel)?;
    String::from_utf8(writer.into_inner()).context("svg output is not UTF-8")
}

/// Write one panel as an `<svg>` element.
pub fn write_panel_svg<W: Write>(xml: &mut Writer<W>, panel: &ChartPanel) -> Result<()> {
    let mut canvas = SvgCanvas::new(xml);
    let class = format!("chart chart-{}", panel.spec.kind.as_str().replace('_', "-"));
    canvas.begin(&class, &panel.spec.title)?;
    canvas.title(&panel.spec.title)?;
    match &panel.body {
        PanelBody::NoData => canvas.notice(NO_DATA_NOTICE)?,
        PanelBody::Data(data) => match (panel.spec.kind, data) {
            (ChartKind::Pie, ChartData::Categorical(data)) => draw_pie(&mut canvas, data)?,
            (ChartKind::Histogram, ChartData::Categorical(data)) => {
                draw_bars(&mut canvas, data, BarLayout::Grouped)?;
            }
            (_, ChartData::Categorical(data)) => {
                draw_bars(&mut canvas, data, BarLayout::Stacked)?;
            }
            (_, ChartData::Histogram(data)) => draw_histogram(&mut canvas, data)?,
            (_, ChartData::Distribution(data)) => draw_distribution(&mut canvas, data)?,
            (_, ChartData::Scatter(data)) => draw_scatter(&mut canvas, data)?,
            (_, ChartData::Regions(data)) => draw_regions(&mut canvas, data)?,
        },
    }
    canvas.end()
}

fn series_colors(color_field: Option<&str>, names: &[String]) -> ColorScale {
    ColorScale::for_levels(color_field, names)
}

fn draw_bars<W: Write>(
    canvas: &mut SvgCanvas<'_, W>,
    data: &CategoricalData,
    layout: BarLayout,
) -> Result<()> {
    let names: Vec<String> = data.series.iter().map(|s| s.name.clone()).collect();
    let colors = series_colors(data.color_field.as_deref(), &names);
    let area = PlotArea::standard(data.color_field.is_some());

    let max = match layout {
        BarLayout::Stacked => data.max_total(),
        BarLayout::Grouped => data
            .series
            .iter()
            .flat_map(|s| s.counts.iter().copied())
            .max()
            .unwrap_or(0),
    };
    let y = LinearScale::new(0.0, max.max(1) as f64, area.bottom(), area.top);
    canvas.y_axis(&area, &y, "Count")?;

    let band = area.width / data.categories.len().max(1) as f64;
    let bar_width = band * 0.7;
    canvas.begin_group("marks")?;
    for (idx, category) in data.categories.iter().enumerate() {
        let band_left = area.left + band * idx as f64 + (band - bar_width) / 2.0;
        let mut stacked = 0usize;
        for (slot, series) in data.series.iter().enumerate() {
            let count = series.counts[idx];
            if count == 0 {
                continue;
            }
            let fill = if data.color_field.is_some() {
                colors.color(&series.name)
            } else {
                SINGLE
            };
            let tooltip = match &data.color_field {
                Some(_) => format!("{category}, {}: {count}", series.name),
                None => format!("{category}: {count}"),
            };
            let (x, width, top, bottom) = match layout {
                BarLayout::Stacked => {
                    let bottom = y.map(stacked as f64);
                    stacked += count;
                    (band_left, bar_width, y.map(stacked as f64), bottom)
                }
                BarLayout::Grouped => {
                    let width = bar_width / data.series.len() as f64;
                    let x = band_left + width * slot as f64;
                    (x, width, y.map(count as f64), y.map(0.0))
                }
            };
            canvas.rect(x, top, width, bottom - top, fill, Some(&tooltip))?;
        }
    }
    canvas.end_group()?;
    canvas.x_axis_bands(&area, &data.categories, &data.field)?;
    if let Some(field) = &data.color_field {
        canvas.legend(&area, field, &colors)?;
    }
    Ok(())
}

fn draw_pie<W: Write>(canvas: &mut SvgCanvas<'_, W>, data: &CategoricalData) -> Result<()> {
    let colors = series_colors(Some(&data.field), &data.categories);
    let area = PlotArea::standard(true);
    let radius = area.height.min(area.width) / 2.0;
    let (cx, cy) = (area.left + area.width / 2.0, area.top + area.height / 2.0 + 8.0);
    let totals = data.totals();
    let shares = data.shares();

    canvas.begin_group("marks")?;
    let mut angle = -std::f64::consts::FRAC_PI_2;
    for ((category, count), share) in data.categories.iter().zip(&totals).zip(&shares) {
        if *count == 0 {
            continue;
        }
        let tooltip = format!("{category}: {count} ({})", fmt_percent(*share));
        let fill = colors.color(category);
        if *share >= 1.0 - 1e-12 {
            canvas.circle(cx, cy, radius, fill, Some(&tooltip))?;
            continue;
        }
        let sweep = share * std::f64::consts::TAU;
        let (x1, y1) = (cx + radius * angle.cos(), cy + radius * angle.sin());
        let end = angle + sweep;
        let (x2, y2) = (cx + radius * end.cos(), cy + radius * end.sin());
        let large_arc = if sweep > std::f64::consts::PI { 1 } else { 0 };
        let d = format!(
            "M {} {} L {} {} A {r} {r} 0 {large_arc} 1 {} {} Z",
            fmt_num(cx),
            fmt_num(cy),
            fmt_num(x1),
            fmt_num(y1),
            fmt_num(x2),
            fmt_num(y2),
            r = fmt_num(radius),
        );
        canvas.path(&d, fill, Some(&tooltip))?;
        angle = end;
    }
    canvas.end_group()?;

    let labelled: Vec<String> = data
        .categories
        .iter()
        .zip(&shares)
        .map(|(category, share)| format!("{category} ({})", fmt_percent(*share)))
        .collect();
    canvas.legend(&area, &data.field, &colors.relabeled(&labelled))
}

fn draw_histogram<W: Write>(canvas: &mut SvgCanvas<'_, W>, data: &HistogramData) -> Result<()> {
    let names: Vec<String> = data.series.iter().map(|s| s.name.clone()).collect();
    let colors = series_colors(data.color_field.as_deref(), &names);
    let area = PlotArea::standard(data.color_field.is_some());
    let (Some(first), Some(last)) = (data.edges.first(), data.edges.last()) else {
        canvas.notice(NO_DATA_NOTICE)?;
        return Ok(());
    };
    let x = LinearScale::new(*first, *last, area.left, area.right());
    let y = LinearScale::new(0.0, data.max_count().max(1) as f64, area.bottom(), area.top);
    canvas.y_axis(&area, &y, "Count")?;

    canvas.begin_group("marks")?;
    let slots = data.series.len().max(1) as f64;
    for (bin, edge) in data.edges.windows(2).enumerate() {
        let left = x.map(edge[0]);
        let width = (x.map(edge[1]) - left) / slots;
        for (slot, series) in data.series.iter().enumerate() {
            let count = series.counts[bin];
            if count == 0 {
                continue;
            }
            let fill = if data.color_field.is_some() {
                colors.color(&series.name)
            } else {
                SINGLE
            };
            let tooltip = format!(
                "{} to {}: {count}",
                fmt_num(edge[0]),
                fmt_num(edge[1])
            );
            let top = y.map(count as f64);
            canvas.rect(
                left + width * slot as f64,
                top,
                (width - 1.0).max(0.5),
                y.map(0.0) - top,
                fill,
                Some(&tooltip),
            )?;
        }
    }
    canvas.end_group()?;
    canvas.x_axis_numeric(&area, &x, &data.field)?;
    if let Some(field) = &data.color_field {
        canvas.legend(&area, field, &colors)?;
    }
    Ok(())
}

fn draw_distribution<W: Write>(
    canvas: &mut SvgCanvas<'_, W>,
    data: &DistributionData,
) -> Result<()> {
    let colors = series_colors(data.color_field.as_deref(), &data.colors);
    let area = PlotArea::standard(data.color_field.is_some());
    let (lo, hi) = data.value_range();
    let pad = (hi - lo).abs() * 0.05;
    let y = LinearScale::new(lo - pad, hi + pad, area.bottom(), area.top);
    canvas.y_axis(&area, &y, &data.y_field)?;

    let band = area.width / data.categories.len().max(1) as f64;
    let slots = data.colors.len().max(1);
    let slot_width = band * 0.8 / slots as f64;
    let max_density = data
        .groups
        .iter()
        .filter_map(|g| g.density.as_ref().map(anemia_transform::KernelDensity::max_density))
        .fold(0.0, f64::max);

    canvas.begin_group("marks")?;
    for group in &data.groups {
        let Some(category_idx) = data.categories.iter().position(|c| *c == group.category) else {
            continue;
        };
        let slot = group
            .color
            .as_ref()
            .and_then(|c| data.colors.iter().position(|known| known == c))
            .unwrap_or(0);
        let center =
            area.left + band * category_idx as f64 + band * 0.1 + slot_width * (slot as f64 + 0.5);
        let fill = match &group.color {
            Some(color) => colors.color(color),
            None => SINGLE,
        };
        let stats = &group.stats;
        let half = slot_width * 0.35;

        if let Some(density) = &group.density {
            if max_density > 0.0 && !density.points.is_empty() {
                let scale = slot_width * 0.45 / max_density;
                let mut d = String::new();
                for (idx, (value, dens)) in density.points.iter().enumerate() {
                    let cmd = if idx == 0 { "M" } else { "L" };
                    d.push_str(&format!(
                        "{cmd} {} {} ",
                        fmt_num(center + dens * scale),
                        fmt_num(y.map(*value))
                    ));
                }
                for (value, dens) in density.points.iter().rev() {
                    d.push_str(&format!(
                        "L {} {} ",
                        fmt_num(center - dens * scale),
                        fmt_num(y.map(*value))
                    ));
                }
                d.push('Z');
                canvas.area(&d, fill)?;
            }
            for (idx, value) in group.points.iter().enumerate() {
                let jitter = ((idx % 7) as f64 - 3.0) / 3.0 * half * 0.5;
                canvas.circle(center + jitter, y.map(*value), 1.5, "#333333", None)?;
            }
        }

        let box_half = if group.density.is_some() { half * 0.3 } else { half };
        canvas.line(
            center,
            y.map(stats.lower_whisker),
            center,
            y.map(stats.upper_whisker),
            "#333333",
        )?;
        canvas.outlined_rect(
            center - box_half,
            y.map(stats.q3),
            box_half * 2.0,
            y.map(stats.q1) - y.map(stats.q3),
            fill,
            "#333333",
        )?;
        canvas.line(
            center - box_half,
            y.map(stats.median),
            center + box_half,
            y.map(stats.median),
            "#111111",
        )?;
        let tooltip = format!(
            "{}{}: n={}, median {}, Q1 {}, Q3 {}",
            group.category,
            group
                .color
                .as_ref()
                .map(|c| format!(" / {c}"))
                .unwrap_or_default(),
            stats.n,
            fmt_num(stats.median),
            fmt_num(stats.q1),
            fmt_num(stats.q3)
        );
        canvas.circle(center, y.map(stats.mean), 2.0, "#111111", Some(&tooltip))?;
        for outlier in &stats.outliers {
            canvas.circle(center, y.map(*outlier), 2.5, fill, None)?;
        }
    }
    canvas.end_group()?;

    let x_title = data.x_field.as_deref().unwrap_or("");
    canvas.x_axis_bands(&area, &data.categories, x_title)?;
    if let Some(field) = &data.color_field {
        canvas.legend(&area, field, &colors)?;
    }
    Ok(())
}

/// Data extent and pixel scale for one scatter axis.
fn scatter_scale(scale: &AxisScale, start: f64, end: f64) -> LinearScale {
    match scale {
        AxisScale::Numeric { min, max } => {
            let pad = (max - min).abs() * 0.05;
            LinearScale::new(min - pad, max + pad, start, end)
        }
        AxisScale::Categorical { levels } => {
            LinearScale::new(-0.5, levels.len() as f64 - 0.5, start, end)
        }
    }
}

fn draw_scatter<W: Write>(canvas: &mut SvgCanvas<'_, W>, data: &ScatterData) -> Result<()> {
    let colors = series_colors(data.color_field.as_deref(), &data.colors);
    let area = PlotArea::standard(data.color_field.is_some());
    let x = scatter_scale(&data.x.scale, area.left, area.right());
    let y = scatter_scale(&data.y.scale, area.bottom(), area.top);

    match &data.y.scale {
        AxisScale::Numeric { .. } => canvas.y_axis(&area, &y, &data.y.field)?,
        AxisScale::Categorical { levels } => {
            canvas.begin_group("axis y-axis")?;
            canvas.line(area.left, area.top, area.left, area.bottom(), "#333333")?;
            for (idx, level) in levels.iter().enumerate() {
                let pos = y.map(idx as f64);
                canvas.line(area.left, pos, area.right(), pos, "#e5e5e5")?;
                canvas.text(area.left - 6.0, pos + 4.0, "end", "tick", level)?;
            }
            canvas.rotated_text(
                12.0,
                area.top + area.height / 2.0,
                -90.0,
                "middle",
                "axis-label",
                &data.y.field,
            )?;
            canvas.end_group()?;
        }
    }

    canvas.begin_group("marks")?;
    for point in &data.points {
        let fill = match &point.color {
            Some(color) => colors.color(color),
            None => SINGLE,
        };
        let tooltip = format!(
            "row {}: {} = {}, {} = {}",
            point.source_row,
            data.x.field,
            axis_label(&data.x.scale, point.x),
            data.y.field,
            axis_label(&data.y.scale, point.y)
        );
        canvas.circle(x.map(point.x), y.map(point.y), 3.0, fill, Some(&tooltip))?;
    }
    canvas.end_group()?;

    match &data.x.scale {
        AxisScale::Numeric { .. } => canvas.x_axis_numeric(&area, &x, &data.x.field)?,
        AxisScale::Categorical { levels } => {
            canvas.x_axis_bands(&area, levels, &data.x.field)?;
        }
    }
    if let Some(field) = &data.color_field {
        canvas.legend(&area, field, &colors)?;
    }
    Ok(())
}

fn axis_label(scale: &AxisScale, position: f64) -> String {
    match scale {
        AxisScale::Numeric { .. } => fmt_num(position),
        AxisScale::Categorical { levels } => levels
            .get(position.round() as usize)
            .cloned()
            .unwrap_or_default(),
    }
}

/// Proportional symbols at region centroids, shaded by share.
fn draw_regions<W: Write>(canvas: &mut SvgCanvas<'_, W>, data: &RegionData) -> Result<()> {
    let area = PlotArea::standard(true);
    let lon_min = data.regions.iter().map(|r| r.longitude).fold(f64::INFINITY, f64::min);
    let lon_max = data.regions.iter().map(|r| r.longitude).fold(f64::NEG_INFINITY, f64::max);
    let lat_min = data.regions.iter().map(|r| r.latitude).fold(f64::INFINITY, f64::min);
    let lat_max = data.regions.iter().map(|r| r.latitude).fold(f64::NEG_INFINITY, f64::max);
    let pad = 24.0;
    let x = LinearScale::new(lon_min, lon_max, area.left + pad, area.right() - pad);
    let y = LinearScale::new(lat_min, lat_max, area.bottom() - pad, area.top + pad);
    let max_count = data.regions.iter().map(|r| r.count).max().unwrap_or(1).max(1);

    canvas.outlined_rect(area.left, area.top, area.width, area.height, "#f7f7f7", "#cccccc")?;
    canvas.begin_group("marks")?;
    for region in &data.regions {
        let radius = 6.0 + 18.0 * (region.count as f64 / max_count as f64).sqrt();
        let (cx, cy) = (x.map(region.longitude), y.map(region.latitude));
        let tooltip = format!(
            "{}: {} records, {} not {}",
            region.region,
            region.count,
            fmt_percent(region.share),
            data.baseline
        );
        canvas.symbol(cx, cy, radius, &sequential(region.share), Some(&tooltip))?;
        canvas.text(cx, cy + radius + 11.0, "middle", "region-label", &region.region)?;
    }
    canvas.end_group()?;

    canvas.begin_group("legend")?;
    let lx = area.right() + 12.0;
    let heading = format!("% not {}", data.baseline);
    canvas.text(lx, area.top, "start", "legend-title", &heading)?;
    for (idx, share) in [0.0, 0.25, 0.5, 0.75, 1.0].into_iter().enumerate() {
        let ly = area.top + 14.0 + idx as f64 * 16.0;
        canvas.outlined_rect(lx, ly - 9.0, 10.0, 10.0, &sequential(share), "#999999")?;
        canvas.text(lx + 14.0, ly, "start", "legend-item", &fmt_percent(share))?;
    }
    canvas.end_group()?;
    canvas.text(
        area.left + area.width / 2.0,
        CHART_HEIGHT - 12.0,
        "middle",
        "axis-label",
        &data.region_field,
    )
}
