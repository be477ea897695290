//! Dashboard page and export tests over a small survey.

use anemia_model::{
    CellValue, ChartKind, ChartSpec, Dataset, FilterSelection, Record, ReportDefinition,
};
use anemia_report::{
    HtmlOptions, NO_DATA_NOTICE, dashboard_to_json, render_dashboard_html, render_panel_svg,
    write_dashboard_html, write_dashboard_json,
};
use anemia_transform::{Dashboard, build_dashboard};

const COLUMNS: &[&str] = &[
    "Age_Group",
    "Residence",
    "Education",
    "Wealth",
    "Hemoglobin",
    "Anemia_Level",
    "Iron_Intake",
    "Breastfeed_Timing",
    "Region",
    "Latitude",
    "Longitude",
];

fn survey() -> Dataset {
    let rows: &[[&str; 11]] = &[
        [
            "20-24", "Urban", "Secondary", "Richest", "11.4", "Not anemic", "Yes", "Immediately",
            "Lagos", "6.5", "3.4",
        ],
        [
            "25-29", "Rural", "No education", "Poorest", "9.2", "Moderate", "No", "Hours: 1",
            "Kano", "12.0", "8.5",
        ],
        [
            "15-19", "Urban", "Higher", "Middle", "10.6", "Mild", "Don't know", "Immediately",
            "Lagos", "6.6", "3.3",
        ],
        [
            "30-34", "Rural", "Primary", "Poorest", "10.1", "Mild", "No", "Days: 1", "Kano",
            "11.9", "8.6",
        ],
        [
            "20-24", "Rural", "Primary", "Poorer", "7.9", "Severe", "Yes", "Hours: 1", "Abuja",
            "9.1", "7.4",
        ],
    ];
    let mut dataset = Dataset::new(COLUMNS.iter().map(|c| (*c).to_string()).collect());
    for (idx, row) in rows.iter().enumerate() {
        let cells = row.iter().map(|v| CellValue::from_raw(v)).collect();
        dataset.push_record(Record::new(idx + 1, cells));
    }
    dataset
}

fn full_report() -> ReportDefinition {
    let mut report = ReportDefinition::default();
    report
        .charts
        .push(ChartSpec::new(ChartKind::ScatterMap, "Survey locations").color("Anemia_Level"));
    report
        .charts
        .push(ChartSpec::new(ChartKind::Choropleth, "Anemia by region").x("Region"));
    report.charts.push(
        ChartSpec::new(ChartKind::Histogram, "Hemoglobin distribution")
            .x("Hemoglobin")
            .bins(5),
    );
    report
}

fn dashboard(selection: &FilterSelection) -> Dashboard {
    build_dashboard(&survey(), &full_report(), selection).expect("dashboard")
}

fn fixed_options() -> HtmlOptions {
    HtmlOptions::new("survey.csv").with_timestamp("2026-01-01T00:00:00Z")
}

#[test]
fn page_contains_sidebar_and_every_chart() {
    let dashboard = dashboard(&FilterSelection::new().with("Residence", "Rural"));
    let html = render_dashboard_html(&dashboard, &fixed_options()).unwrap();

    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<title>Childhood Anemia Risk Factors Dashboard</title>"));
    assert!(html.contains("Generated 2026-01-01T00:00:00Z from survey.csv"));
    assert!(html.contains("Showing 3 of 5 records"));
    assert!(html.contains("<li class=\"selected\">Rural</li>"));
    assert!(html.contains("repeat(3, minmax(0, 1fr))"));
    assert_eq!(html.matches("<svg").count(), 9);
    assert_eq!(html.matches("<figure").count(), 9);
    assert!(!html.contains(NO_DATA_NOTICE));
}

#[test]
fn empty_selection_renders_notices_instead_of_charts() {
    let selection = FilterSelection::new()
        .with("Residence", "Urban")
        .with("Wealth", "Poorest");
    let dashboard = dashboard(&selection);
    let html = render_dashboard_html(&dashboard, &fixed_options()).unwrap();

    // One banner plus one notice per panel.
    assert_eq!(html.matches(NO_DATA_NOTICE).count(), 10);
    assert!(html.contains("Showing 0 of 5 records"));
    assert!(!html.contains("class=\"marks\""));
}

#[test]
fn map_charts_use_coordinates() {
    let dashboard = dashboard(&FilterSelection::new());
    let map = render_panel_svg(&dashboard.panels[6]).unwrap();
    assert!(map.contains("chart-scatter-map"));
    assert!(map.contains("Longitude"));
    assert_eq!(map.matches("<circle").count(), 5);

    let regions = render_panel_svg(&dashboard.panels[7]).unwrap();
    assert!(regions.contains("Kano: 2 records, 100.0% not Not anemic"));
    assert!(regions.contains("Lagos: 2 records, 50.0% not Not anemic"));
}

#[test]
fn files_are_written_to_nested_directories() {
    let dir = tempfile::tempdir().unwrap();
    let dashboard = dashboard(&FilterSelection::new());

    let html_path = dir.path().join("out").join("dashboard.html");
    write_dashboard_html(&html_path, &dashboard, &fixed_options()).unwrap();
    let html = std::fs::read_to_string(&html_path).unwrap();
    assert!(html.trim_end().ends_with("</html>"));

    let json_path = dir.path().join("out").join("dashboard.json");
    write_dashboard_json(&json_path, &dashboard, Some("survey.csv")).unwrap();
    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(value["source"], "survey.csv");
    assert_eq!(value["total_records"], 5);
    assert_eq!(value["panels"].as_array().unwrap().len(), 9);
}

#[test]
fn json_export_carries_selection_and_chart_data() {
    let dashboard = dashboard(&FilterSelection::new().with("Wealth", "poorest"));
    let json = dashboard_to_json(&dashboard, None).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert!(value.get("source").is_none());
    assert_eq!(value["selection"]["filters"][0]["field"], "Wealth");
    assert_eq!(value["selection"]["filters"][0]["value"], "Poorest");
    let histogram = &value["panels"][8]["body"]["data"];
    assert_eq!(histogram["type"], "histogram");
    assert_eq!(histogram["edges"].as_array().unwrap().len(), 6);
}
