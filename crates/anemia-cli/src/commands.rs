use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, info_span};

use anemia_ingest::{LoadOptions, profile_columns, report_definition_to_toml};
use anemia_model::ReportDefinition;
use anemia_report::{HtmlOptions, write_dashboard_html, write_dashboard_json};
use anemia_transform::{build_dashboard, grouped_proportions, observed_domain, value_counts};

use anemia_cli::pipeline::{
    default_output_path, inspection_options, load_report, load_survey, select, validated_selection,
};
use anemia_cli::summary::{fields_table, proportions_table, values_table};
use anemia_cli::types::{DashboardFormat, RenderResult};

use crate::cli::{OutputFormatArg, ProportionsArgs, RenderArgs, SourceArgs, ValuesArgs};

pub fn run_render(args: &RenderArgs) -> Result<RenderResult> {
    let csv = &args.source.csv;
    let span = info_span!("dashboard", source = %csv.display());
    let _guard = span.enter();

    let mut report = load_report(args.source.report.as_deref())?;
    if let Some(columns) = args.columns {
        report.columns = usize::from(columns);
    }
    if let Some(title) = &args.title {
        report.title.clone_from(title);
    }

    let loaded = load_survey(csv, &LoadOptions::for_report(&report))?;
    let selection = validated_selection(&loaded.dataset, &args.filters)?;
    let dashboard = build_dashboard(&loaded.dataset, &report, &selection)
        .context("build dashboard")?;

    let format = match args.format {
        OutputFormatArg::Html => DashboardFormat::Html,
        OutputFormatArg::Json => DashboardFormat::Json,
    };
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(csv, format));
    let source_name = source_name(csv);
    match format {
        DashboardFormat::Html => {
            write_dashboard_html(&output, &dashboard, &HtmlOptions::new(source_name))?;
        }
        DashboardFormat::Json => {
            write_dashboard_json(&output, &dashboard, Some(&source_name))?;
        }
    }
    info!(output = %output.display(), "dashboard written");

    Ok(RenderResult::new(
        csv,
        output,
        format,
        loaded.rows_read,
        loaded.dropped,
        &dashboard,
    ))
}

pub fn run_fields(args: &SourceArgs) -> Result<()> {
    let report = load_report(args.report.as_deref())?;
    let loaded = load_survey(&args.csv, &inspection_options(&report, &[]))?;
    let profiles = profile_columns(&loaded.dataset);
    println!(
        "{}: {} records, {} columns",
        args.csv.display(),
        loaded.dataset.len(),
        profiles.len()
    );
    println!("{}", fields_table(&profiles, &loaded.renames));
    Ok(())
}

pub fn run_values(args: &ValuesArgs) -> Result<()> {
    let report = load_report(args.source.report.as_deref())?;
    let loaded = load_survey(
        &args.source.csv,
        &inspection_options(&report, &[args.field.as_str()]),
    )?;
    let (selection, subset) = select(&loaded.dataset, &args.filters)?;

    // Values follow level order; counts come from the selected subset.
    let domain = observed_domain(&subset, &args.field)?;
    let counts = value_counts(&subset, &args.field)?;
    let ordered: Vec<(String, usize)> = domain
        .into_iter()
        .map(|value| {
            let count = counts
                .iter()
                .find(|(counted, _)| *counted == value)
                .map_or(0, |(_, count)| *count);
            (value, count)
        })
        .collect();

    if !selection.is_empty() {
        println!("Filters: {selection}");
    }
    println!("{}", values_table(&args.field, &ordered));
    Ok(())
}

pub fn run_proportions(args: &ProportionsArgs) -> Result<()> {
    let report = load_report(args.source.report.as_deref())?;
    let options = inspection_options(&report, &[args.by.as_str(), args.outcome.as_str()]);
    let loaded = load_survey(&args.source.csv, &options)?;
    let (_, subset) = select(&loaded.dataset, &args.filters)?;
    let table = grouped_proportions(&subset, &args.by, &args.outcome)?;

    if args.json {
        let json = serde_json::to_string_pretty(&table).context("serialize proportions")?;
        println!("{json}");
    } else if table.is_empty() {
        println!("No records match the selection.");
    } else {
        println!("{}", proportions_table(&table));
    }
    Ok(())
}

pub fn run_report_template() -> Result<()> {
    let toml = report_definition_to_toml(&ReportDefinition::default())
        .context("serialize built-in report")?;
    print!("{toml}");
    Ok(())
}

fn source_name(csv: &Path) -> String {
    csv.file_name().map_or_else(
        || csv.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}
