//! Dashboard assembly over the built-in report.

use anemia_model::{CellValue, Dataset, FilterSelection, Record, ReportDefinition};
use anemia_transform::{ChartData, PanelBody, build_dashboard};

const COLUMNS: &[&str] = &[
    "Age_Group",
    "Residence",
    "Education",
    "Wealth",
    "Hemoglobin",
    "Anemia_Level",
    "Iron_Intake",
    "Breastfeed_Timing",
];

fn survey() -> Dataset {
    let rows: &[[&str; 8]] = &[
        ["20-24", "Urban", "Secondary", "Richest", "11.4", "Not anemic", "Yes", "Immediately"],
        ["25-29", "Rural", "No education", "Poorest", "9.2", "Moderate", "No", "Hours: 1"],
        ["15-19", "Urban", "Higher", "Middle", "10.6", "Mild", "Don't know", "Immediately"],
        ["30-34", "Rural", "Primary", "Poorest", "10.1", "Mild", "No", "Days: 1"],
        ["20-24", "Rural", "Primary", "Poorer", "7.9", "Severe", "Yes", "Hours: 1"],
    ];
    let mut dataset = Dataset::new(COLUMNS.iter().map(|c| (*c).to_string()).collect());
    for (idx, row) in rows.iter().enumerate() {
        let cells = row.iter().map(|v| CellValue::from_raw(v)).collect();
        dataset.push_record(Record::new(idx + 1, cells));
    }
    dataset
}

#[test]
fn unfiltered_dashboard_has_data_in_every_panel() {
    let report = ReportDefinition::default();
    let dashboard = build_dashboard(&survey(), &report, &FilterSelection::new()).unwrap();

    assert_eq!(dashboard.total_records, 5);
    assert_eq!(dashboard.filtered_records, 5);
    assert_eq!(dashboard.panels.len(), 6);
    assert!(dashboard.panels.iter().all(|p| p.has_data()));

    let wealth = &dashboard.filters[1];
    assert_eq!(wealth.field, "Wealth");
    assert_eq!(wealth.choices, vec!["Poorest", "Poorer", "Middle", "Richest"]);
    assert!(wealth.selected.is_none());

    let Some(ChartData::Categorical(iron)) = dashboard.panels[3].data() else {
        panic!("iron histogram should count categories");
    };
    assert_eq!(iron.categories, vec!["Yes", "No", "Don't know"]);
}

#[test]
fn empty_selection_marks_every_panel() {
    let report = ReportDefinition::default();
    let selection = FilterSelection::new()
        .with("Residence", "urban")
        .with("Wealth", "Poorest");
    let dashboard = build_dashboard(&survey(), &report, &selection).unwrap();

    assert!(dashboard.is_empty_selection());
    assert_eq!(dashboard.selection.get("Residence"), Some("Urban"));
    assert!(dashboard.panels.iter().all(|p| p.body == PanelBody::NoData));
    // Choices still come from the full dataset.
    assert_eq!(dashboard.filters[0].choices, vec!["Urban", "Rural"]);
    assert_eq!(dashboard.filters[0].selected.as_deref(), Some("Urban"));
}

#[test]
fn dashboard_serializes_with_status_tags() {
    let report = ReportDefinition::default();
    let selection = FilterSelection::new().with("Residence", "Rural");
    let dashboard = build_dashboard(&survey(), &report, &selection).unwrap();
    let json = serde_json::to_value(&dashboard).unwrap();

    assert_eq!(json["filtered_records"], 3);
    assert_eq!(json["selection"]["filters"][0]["value"], "Rural");
    assert_eq!(json["panels"][0]["body"]["status"], "data");
    assert_eq!(json["panels"][0]["body"]["data"]["type"], "categorical");
    assert_eq!(json["panels"][2]["body"]["data"]["type"], "distribution");
}
