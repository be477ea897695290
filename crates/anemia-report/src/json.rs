//! JSON export of computed chart data.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tracing::{info, info_span};

use anemia_transform::Dashboard;

use crate::common::ensure_parent_dir;

#[derive(Serialize)]
struct Export<'a> {
    generated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<&'a str>,
    #[serde(flatten)]
    dashboard: &'a Dashboard,
}

/// Serialize the dashboard (selection, counts, and every panel's data).
pub fn dashboard_to_json(dashboard: &Dashboard, source: Option<&str>) -> Result<String> {
    let export = Export {
        generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        source,
        dashboard,
    };
    serde_json::to_string_pretty(&export).context("serialize dashboard")
}

pub fn write_dashboard_json(
    output_path: &Path,
    dashboard: &Dashboard,
    source: Option<&str>,
) -> Result<()> {
    let span = info_span!("render", path = %output_path.display(), format = "json");
    let _guard = span.enter();

    ensure_parent_dir(output_path)?;
    let json = dashboard_to_json(dashboard, source)?;
    let file =
        File::create(output_path).with_context(|| format!("create {}", output_path.display()))?;
    let mut writer = BufWriter::new(file);
    writeln!(writer, "{json}").with_context(|| format!("write {}", output_path.display()))?;
    writer
        .flush()
        .with_context(|| format!("write {}", output_path.display()))?;
    info!(bytes = json.len(), panels = dashboard.panels.len(), "wrote chart data");
    Ok(())
}
