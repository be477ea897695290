//! Static HTML dashboard page.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use tracing::{info, info_span};

use anemia_transform::{Dashboard, FilterChoices};

use crate::charts::write_panel_svg;
use crate::common::{NO_DATA_NOTICE, ensure_parent_dir, write_classed_text, write_text_element};

const STYLE: &str = "
body { font-family: system-ui, sans-serif; margin: 0; color: #222; background: #fafafa; }
header { padding: 16px 24px; background: #8b1e2d; color: #fff; }
header h1 { margin: 0; font-size: 1.5rem; }
header .generated { margin: 4px 0 0; font-size: 0.8rem; opacity: 0.8; }
.layout { display: flex; align-items: flex-start; }
.sidebar { width: 240px; flex-shrink: 0; padding: 16px; border-right: 1px solid #ddd; background: #fff; min-height: 100vh; box-sizing: border-box; }
.sidebar h2 { font-size: 1.1rem; margin-top: 0; }
.sidebar h3 { font-size: 0.9rem; margin: 12px 0 4px; }
.sidebar ul { list-style: none; margin: 0; padding: 0; font-size: 0.85rem; }
.sidebar li { padding: 2px 6px; border-radius: 3px; }
.sidebar li.selected { background: #8b1e2d; color: #fff; }
.counts { font-size: 0.85rem; color: #555; }
.grid { flex: 1; display: grid; gap: 16px; padding: 16px; }
.panel { margin: 0; background: #fff; border: 1px solid #ddd; border-radius: 4px; padding: 4px; }
.panel svg { width: 100%; height: auto; display: block; }
.banner { grid-column: 1 / -1; padding: 12px; background: #fff4e5; border: 1px solid #f0c36d; border-radius: 4px; }
.chart-title { font-size: 14px; font-weight: 600; }
.tick, .legend-item, .region-label { font-size: 10px; fill: #444; }
.axis-label, .legend-title { font-size: 11px; fill: #222; }
.notice { font-size: 14px; fill: #888; }
";

/// Page-level settings that do not come from the dashboard itself.
#[derive(Debug, Clone, Default)]
pub struct HtmlOptions {
    /// Input file name shown under the title.
    pub source: Option<String>,
    /// Fixed generation timestamp; the current time when unset.
    pub generated_at: Option<String>,
}

impl HtmlOptions {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
            generated_at: None,
        }
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.generated_at = Some(timestamp.into());
        self
    }
}

/// Write the dashboard as a single self-contained HTML file.
pub fn write_dashboard_html(
    output_path: &Path,
    dashboard: &Dashboard,
    options: &HtmlOptions,
) -> Result<()> {
    let span = info_span!("render", path = %output_path.display(), format = "html");
    let _guard = span.enter();
    let start = Instant::now();

    ensure_parent_dir(output_path)?;
    let file =
        File::create(output_path).with_context(|| format!("create {}", output_path.display()))?;
    let mut writer = BufWriter::new(file);
    write_page(&mut writer, dashboard, options)?;
    writer
        .flush()
        .with_context(|| format!("write {}", output_path.display()))?;

    info!(
        panels = dashboard.panels.len(),
        filtered_records = dashboard.filtered_records,
        duration_ms = start.elapsed().as_millis(),
        "wrote dashboard"
    );
    Ok(())
}

/// Render the dashboard page to a string.
pub fn render_dashboard_html(dashboard: &Dashboard, options: &HtmlOptions) -> Result<String> {
    let mut buffer = Vec::new();
    write_page(&mut buffer, dashboard, options)?;
    String::from_utf8(buffer).context("html output is not UTF-8")
}

fn write_page<W: Write>(out: W, dashboard: &Dashboard, options: &HtmlOptions) -> Result<()> {
    let mut xml = Writer::new_with_indent(out, b' ', 2);
    xml.write_event(Event::DocType(BytesText::from_escaped("html")))?;

    let mut html = BytesStart::new("html");
    html.push_attribute(("lang", "en"));
    xml.write_event(Event::Start(html))?;

    xml.write_event(Event::Start(BytesStart::new("head")))?;
    let mut charset = BytesStart::new("meta");
    charset.push_attribute(("charset", "utf-8"));
    xml.write_event(Event::Empty(charset))?;
    let mut viewport = BytesStart::new("meta");
    viewport.push_attribute(("name", "viewport"));
    viewport.push_attribute(("content", "width=device-width, initial-scale=1"));
    xml.write_event(Event::Empty(viewport))?;
    write_text_element(&mut xml, "title", &dashboard.title)?;
    xml.write_event(Event::Start(BytesStart::new("style")))?;
    xml.write_event(Event::Text(BytesText::from_escaped(STYLE)))?;
    xml.write_event(Event::End(BytesEnd::new("style")))?;
    xml.write_event(Event::End(BytesEnd::new("head")))?;

    xml.write_event(Event::Start(BytesStart::new("body")))?;
    write_header(&mut xml, dashboard, options)?;

    let mut layout = BytesStart::new("div");
    layout.push_attribute(("class", "layout"));
    xml.write_event(Event::Start(layout))?;
    write_sidebar(&mut xml, dashboard)?;
    write_grid(&mut xml, dashboard)?;
    xml.write_event(Event::End(BytesEnd::new("div")))?;

    xml.write_event(Event::End(BytesEnd::new("body")))?;
    xml.write_event(Event::End(BytesEnd::new("html")))?;
    xml.get_mut().write_all(b"\n")?;
    Ok(())
}

fn write_header<W: Write>(
    xml: &mut Writer<W>,
    dashboard: &Dashboard,
    options: &HtmlOptions,
) -> Result<()> {
    xml.write_event(Event::Start(BytesStart::new("header")))?;
    write_text_element(xml, "h1", &dashboard.title)?;
    let timestamp = options
        .generated_at
        .clone()
        .unwrap_or_else(|| Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));
    let generated = match &options.source {
        Some(source) => format!("Generated {timestamp} from {source}"),
        None => format!("Generated {timestamp}"),
    };
    write_classed_text(xml, "p", "generated", &generated)?;
    xml.write_event(Event::End(BytesEnd::new("header")))?;
    Ok(())
}

fn write_sidebar<W: Write>(xml: &mut Writer<W>, dashboard: &Dashboard) -> Result<()> {
    let mut aside = BytesStart::new("aside");
    aside.push_attribute(("class", "sidebar"));
    xml.write_event(Event::Start(aside))?;
    write_text_element(xml, "h2", "Filters")?;

    let counts = format!(
        "Showing {} of {} records",
        dashboard.filtered_records, dashboard.total_records
    );
    write_classed_text(xml, "p", "counts", &counts)?;

    for choices in &dashboard.filters {
        write_filter(xml, choices)?;
    }
    xml.write_event(Event::End(BytesEnd::new("aside")))?;
    Ok(())
}

/// One filter field: an "All" entry followed by every observed value, with
/// the active choice highlighted.
fn write_filter<W: Write>(xml: &mut Writer<W>, choices: &FilterChoices) -> Result<()> {
    let mut section = BytesStart::new("section");
    section.push_attribute(("class", "filter"));
    section.push_attribute(("data-field", choices.field.as_str()));
    xml.write_event(Event::Start(section))?;
    write_text_element(xml, "h3", &choices.field)?;
    xml.write_event(Event::Start(BytesStart::new("ul")))?;

    let all_selected = choices.selected.is_none();
    write_choice(xml, "All", all_selected)?;
    for value in &choices.choices {
        let selected = choices.selected.as_deref() == Some(value.as_str());
        write_choice(xml, value, selected)?;
    }

    xml.write_event(Event::End(BytesEnd::new("ul")))?;
    xml.write_event(Event::End(BytesEnd::new("section")))?;
    Ok(())
}

fn write_choice<W: Write>(xml: &mut Writer<W>, value: &str, selected: bool) -> Result<()> {
    if selected {
        write_classed_text(xml, "li", "selected", value)
    } else {
        write_text_element(xml, "li", value)
    }
}

fn write_grid<W: Write>(xml: &mut Writer<W>, dashboard: &Dashboard) -> Result<()> {
    let style = format!(
        "grid-template-columns: repeat({}, minmax(0, 1fr));",
        dashboard.columns.max(1)
    );
    let mut main = BytesStart::new("main");
    main.push_attribute(("class", "grid"));
    main.push_attribute(("style", style.as_str()));
    xml.write_event(Event::Start(main))?;

    if dashboard.is_empty_selection() {
        write_classed_text(xml, "p", "banner", NO_DATA_NOTICE)?;
    }
    for panel in &dashboard.panels {
        let mut figure = BytesStart::new("figure");
        figure.push_attribute(("class", "panel"));
        xml.write_event(Event::Start(figure))?;
        write_panel_svg(xml, panel)?;
        xml.write_event(Event::End(BytesEnd::new("figure")))?;
    }

    xml.write_event(Event::End(BytesEnd::new("main")))?;
    Ok(())
}
