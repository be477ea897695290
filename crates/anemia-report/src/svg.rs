//! Low-level SVG drawing on top of a quick-xml writer.

use std::io::Write;

use anyhow::Result;
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use crate::common::{CHART_HEIGHT, CHART_WIDTH, SVG_NS, fmt_num, write_text_element};
use crate::palette::ColorScale;

/// Inner rectangle where marks are drawn.
#[derive(Debug, Clone, Copy)]
pub struct PlotArea {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl PlotArea {
    /// Default plot area, leaving room for the title, axis labels and a
    /// legend column on the right when `with_legend` is set.
    pub fn standard(with_legend: bool) -> Self {
        let right = if with_legend { 124.0 } else { 16.0 };
        let left = 56.0;
        let top = 40.0;
        Self {
            left,
            top,
            width: CHART_WIDTH - left - right,
            height: CHART_HEIGHT - top - 64.0,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Linear map from a data interval onto a pixel interval.
#[derive(Debug, Clone, Copy)]
pub struct LinearScale {
    pub min: f64,
    pub max: f64,
    start: f64,
    end: f64,
}

impl LinearScale {
    /// A degenerate domain is widened by one unit on each side.
    pub fn new(min: f64, max: f64, start: f64, end: f64) -> Self {
        let (min, max) = if !min.is_finite() || !max.is_finite() {
            (0.0, 1.0)
        } else if max <= min {
            (min - 1.0, max + 1.0)
        } else {
            (min, max)
        };
        Self {
            min,
            max,
            start,
            end,
        }
    }

    pub fn map(&self, value: f64) -> f64 {
        self.start + (value - self.min) / (self.max - self.min) * (self.end - self.start)
    }
}

/// Roughly `count` round tick values covering `[min, max]`.
pub fn nice_ticks(min: f64, max: f64, count: usize) -> Vec<f64> {
    if !min.is_finite() || !max.is_finite() || max <= min || count == 0 {
        return vec![min];
    }
    let raw = (max - min) / count as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let step = [1.0, 2.0, 5.0, 10.0]
        .into_iter()
        .map(|m| m * magnitude)
        .find(|step| *step >= raw)
        .unwrap_or(10.0 * magnitude);
    let first = (min / step).ceil() * step;
    // Steps below the values' float resolution cannot advance.
    if first + step == first {
        return vec![min, max];
    }
    let limit = count * 2 + 2;
    (0..limit)
        .map(|i| first + i as f64 * step)
        .take_while(|value| *value <= max + step * 1e-9)
        .collect()
}

/// SVG element writer with the drawing primitives charts need.
pub struct SvgCanvas<'w, W: Write> {
    xml: &'w mut Writer<W>,
}

impl<'w, W: Write> SvgCanvas<'w, W> {
    pub fn new(xml: &'w mut Writer<W>) -> Self {
        Self { xml }
    }

    /// Open the root `<svg>` element.
    pub fn begin(&mut self, class: &str, label: &str) -> Result<()> {
        let view_box = format!("0 0 {} {}", fmt_num(CHART_WIDTH), fmt_num(CHART_HEIGHT));
        let mut svg = BytesStart::new("svg");
        svg.push_attribute(("xmlns", SVG_NS));
        svg.push_attribute(("viewBox", view_box.as_str()));
        svg.push_attribute(("class", class));
        svg.push_attribute(("role", "img"));
        svg.push_attribute(("aria-label", label));
        self.xml.write_event(Event::Start(svg))?;
        Ok(())
    }

    pub fn end(&mut self) -> Result<()> {
        self.xml.write_event(Event::End(BytesEnd::new("svg")))?;
        Ok(())
    }

    pub fn begin_group(&mut self, class: &str) -> Result<()> {
        let mut group = BytesStart::new("g");
        group.push_attribute(("class", class));
        self.xml.write_event(Event::Start(group))?;
        Ok(())
    }

    pub fn end_group(&mut self) -> Result<()> {
        self.xml.write_event(Event::End(BytesEnd::new("g")))?;
        Ok(())
    }

    /// Write `name` with attributes; a non-empty `tooltip` becomes a
    /// `<title>` child.
    fn shape(&mut self, name: &str, attrs: &[(&str, &str)], tooltip: Option<&str>) -> Result<()> {
        let mut start = BytesStart::new(name);
        for attr in attrs {
            start.push_attribute(*attr);
        }
        match tooltip {
            Some(tip) => {
                self.xml.write_event(Event::Start(start))?;
                write_text_element(&mut *self.xml, "title", tip)?;
                self.xml.write_event(Event::End(BytesEnd::new(name)))?;
            }
            None => self.xml.write_event(Event::Empty(start))?,
        }
        Ok(())
    }

    pub fn rect(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: &str,
        tooltip: Option<&str>,
    ) -> Result<()> {
        let (x, y, w, h) = (
            fmt_num(x),
            fmt_num(y),
            fmt_num(width.max(0.0)),
            fmt_num(height.max(0.0)),
        );
        self.shape(
            "rect",
            &[
                ("x", x.as_str()),
                ("y", y.as_str()),
                ("width", w.as_str()),
                ("height", h.as_str()),
                ("fill", fill),
            ],
            tooltip,
        )
    }

    pub fn outlined_rect(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: &str,
        stroke: &str,
    ) -> Result<()> {
        let (x, y, w, h) = (
            fmt_num(x),
            fmt_num(y),
            fmt_num(width.max(0.0)),
            fmt_num(height.max(0.0)),
        );
        self.shape(
            "rect",
            &[
                ("x", x.as_str()),
                ("y", y.as_str()),
                ("width", w.as_str()),
                ("height", h.as_str()),
                ("fill", fill),
                ("fill-opacity", "0.6"),
                ("stroke", stroke),
            ],
            None,
        )
    }

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, stroke: &str) -> Result<()> {
        let (a, b, c, d) = (fmt_num(x1), fmt_num(y1), fmt_num(x2), fmt_num(y2));
        self.shape(
            "line",
            &[
                ("x1", a.as_str()),
                ("y1", b.as_str()),
                ("x2", c.as_str()),
                ("y2", d.as_str()),
                ("stroke", stroke),
            ],
            None,
        )
    }

    pub fn circle(
        &mut self,
        cx: f64,
        cy: f64,
        r: f64,
        fill: &str,
        tooltip: Option<&str>,
    ) -> Result<()> {
        let (x, y, radius) = (fmt_num(cx), fmt_num(cy), fmt_num(r));
        self.shape(
            "circle",
            &[("cx", x.as_str()), ("cy", y.as_str()), ("r", radius.as_str()), ("fill", fill)],
            tooltip,
        )
    }

    /// Circle with an outline, for proportional symbols.
    pub fn symbol(
        &mut self,
        cx: f64,
        cy: f64,
        r: f64,
        fill: &str,
        tooltip: Option<&str>,
    ) -> Result<()> {
        let (x, y, radius) = (fmt_num(cx), fmt_num(cy), fmt_num(r));
        self.shape(
            "circle",
            &[
                ("cx", x.as_str()),
                ("cy", y.as_str()),
                ("r", radius.as_str()),
                ("fill", fill),
                ("stroke", "#555555"),
            ],
            tooltip,
        )
    }

    pub fn path(&mut self, d: &str, fill: &str, tooltip: Option<&str>) -> Result<()> {
        self.shape(
            "path",
            &[("d", d), ("fill", fill), ("stroke", "#ffffff")],
            tooltip,
        )
    }

    /// Translucent filled path with a same-colored outline.
    pub fn area(&mut self, d: &str, color: &str) -> Result<()> {
        self.shape(
            "path",
            &[
                ("d", d),
                ("fill", color),
                ("fill-opacity", "0.5"),
                ("stroke", color),
            ],
            None,
        )
    }

    pub fn text(&mut self, x: f64, y: f64, anchor: &str, class: &str, content: &str) -> Result<()> {
        let (x, y) = (fmt_num(x), fmt_num(y));
        let mut start = BytesStart::new("text");
        start.push_attribute(("x", x.as_str()));
        start.push_attribute(("y", y.as_str()));
        start.push_attribute(("text-anchor", anchor));
        start.push_attribute(("class", class));
        self.xml.write_event(Event::Start(start))?;
        self.xml.write_event(Event::Text(BytesText::new(content)))?;
        self.xml.write_event(Event::End(BytesEnd::new("text")))?;
        Ok(())
    }

    /// Text rotated about its anchor point.
    pub fn rotated_text(
        &mut self,
        x: f64,
        y: f64,
        angle: f64,
        anchor: &str,
        class: &str,
        content: &str,
    ) -> Result<()> {
        let (xs, ys) = (fmt_num(x), fmt_num(y));
        let transform = format!("rotate({} {xs} {ys})", fmt_num(angle));
        let mut start = BytesStart::new("text");
        start.push_attribute(("x", xs.as_str()));
        start.push_attribute(("y", ys.as_str()));
        start.push_attribute(("text-anchor", anchor));
        start.push_attribute(("class", class));
        start.push_attribute(("transform", transform.as_str()));
        self.xml.write_event(Event::Start(start))?;
        self.xml.write_event(Event::Text(BytesText::new(content)))?;
        self.xml.write_event(Event::End(BytesEnd::new("text")))?;
        Ok(())
    }

    pub fn title(&mut self, title: &str) -> Result<()> {
        self.text(CHART_WIDTH / 2.0, 22.0, "middle", "chart-title", title)
    }

    /// Left axis with numeric ticks and gridlines.
    pub fn y_axis(&mut self, area: &PlotArea, scale: &LinearScale, label: &str) -> Result<()> {
        self.begin_group("axis y-axis")?;
        self.line(area.left, area.top, area.left, area.bottom(), "#333333")?;
        for tick in nice_ticks(scale.min, scale.max, 5) {
            let y = scale.map(tick);
            self.line(area.left, y, area.right(), y, "#e5e5e5")?;
            self.text(area.left - 6.0, y + 4.0, "end", "tick", &fmt_num(tick))?;
        }
        self.rotated_text(
            14.0,
            area.top + area.height / 2.0,
            -90.0,
            "middle",
            "axis-label",
            label,
        )?;
        self.end_group()
    }

    /// Bottom axis with numeric ticks.
    pub fn x_axis_numeric(
        &mut self,
        area: &PlotArea,
        scale: &LinearScale,
        label: &str,
    ) -> Result<()> {
        self.begin_group("axis x-axis")?;
        self.line(area.left, area.bottom(), area.right(), area.bottom(), "#333333")?;
        for tick in nice_ticks(scale.min, scale.max, 6) {
            let x = scale.map(tick);
            self.line(x, area.bottom(), x, area.bottom() + 4.0, "#333333")?;
            self.text(x, area.bottom() + 16.0, "middle", "tick", &fmt_num(tick))?;
        }
        self.text(
            area.left + area.width / 2.0,
            area.bottom() + 40.0,
            "middle",
            "axis-label",
            label,
        )?;
        self.end_group()
    }

    /// Bottom axis with one label per band; labels tilt when crowded.
    pub fn x_axis_bands(&mut self, area: &PlotArea, labels: &[String], title: &str) -> Result<()> {
        self.begin_group("axis x-axis")?;
        self.line(area.left, area.bottom(), area.right(), area.bottom(), "#333333")?;
        let band = area.width / labels.len().max(1) as f64;
        let crowded = labels.len() > 4;
        for (idx, label) in labels.iter().enumerate() {
            let x = area.left + band * (idx as f64 + 0.5);
            if crowded {
                self.rotated_text(x, area.bottom() + 14.0, -30.0, "end", "tick", label)?;
            } else {
                self.text(x, area.bottom() + 16.0, "middle", "tick", label)?;
            }
        }
        self.text(
            area.left + area.width / 2.0,
            area.bottom() + 52.0,
            "middle",
            "axis-label",
            title,
        )?;
        self.end_group()
    }

    /// Legend column to the right of the plot area.
    pub fn legend(&mut self, area: &PlotArea, heading: &str, colors: &ColorScale) -> Result<()> {
        if colors.is_empty() {
            return Ok(());
        }
        self.begin_group("legend")?;
        let x = area.right() + 12.0;
        self.text(x, area.top, "start", "legend-title", heading)?;
        for (idx, (name, color)) in colors.entries().enumerate() {
            let y = area.top + 14.0 + idx as f64 * 16.0;
            self.rect(x, y - 9.0, 10.0, 10.0, color, None)?;
            self.text(x + 14.0, y, "start", "legend-item", name)?;
        }
        self.end_group()
    }

    /// Centered notice in place of chart marks.
    pub fn notice(&mut self, message: &str) -> Result<()> {
        self.text(
            CHART_WIDTH / 2.0,
            CHART_HEIGHT / 2.0,
            "middle",
            "notice",
            message,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_use_round_steps() {
        assert_eq!(nice_ticks(0.0, 10.0, 5), vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
        assert_eq!(nice_ticks(7.3, 12.1, 5), vec![8.0, 9.0, 10.0, 11.0, 12.0]);
        assert_eq!(nice_ticks(3.0, 3.0, 5), vec![3.0]);
    }

    #[test]
    fn ticks_stay_bounded_beyond_float_resolution() {
        let ticks = nice_ticks(1e16, 1e16 + 4.0, 6);
        assert_eq!(ticks, vec![1e16, 1e16 + 4.0]);

        let ticks = nice_ticks(1e15, 1e15 + 4.0, 6);
        assert!(!ticks.is_empty() && ticks.len() <= 14, "{ticks:?}");
        assert!(ticks.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn scale_maps_and_widens_degenerate_domains() {
        let scale = LinearScale::new(0.0, 10.0, 100.0, 0.0);
        assert_eq!(scale.map(0.0), 100.0);
        assert_eq!(scale.map(5.0), 50.0);

        let flat = LinearScale::new(4.0, 4.0, 0.0, 100.0);
        assert_eq!(flat.map(4.0), 50.0);
    }

    #[test]
    fn shapes_with_tooltips_get_title_children() {
        let mut writer = Writer::new(Vec::new());
        let mut canvas = SvgCanvas::new(&mut writer);
        canvas.rect(1.0, 2.0, 3.0, 4.0, "#000000", Some("Mild: 3")).unwrap();
        canvas.circle(1.0, 1.0, 2.5, "#ffffff", None).unwrap();
        let out = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(
            out,
            "<rect x=\"1\" y=\"2\" width=\"3\" height=\"4\" fill=\"#000000\"><title>Mild: 3</title></rect>\
<circle cx=\"1\" cy=\"1\" r=\"2.5\" fill=\"#ffffff\"/>"
        );
    }
}
