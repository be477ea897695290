//! End-to-end loading tests over real files.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use anemia_ingest::{
    IngestError, LoadOptions, StreamingCsvReader, load_dataset, load_report_definition,
    read_csv_table, read_csv_table_auto,
};
use anemia_model::{CellValue, ReportDefinition};

fn survey_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    // The iron header contains commas, so it is quoted in the real export.
    let header = "Age in 5-year groups,Type of place of residence,Highest educational level,\
Wealth index combined,Hemoglobin level adjusted for altitude and smoking (g/dl - 1 decimal),\
Anemia level,\"Taking iron pills, sprinkles or syrup\",When child put to breast\n";
    let rows = "\
20-24,Urban,Secondary,Richest,11.4,Not anemic,Yes,Immediately\n\
25-29,Rural,No education,Poorest,9.2,Moderate,No,Hours: 1\n\
30-34,Rural,Primary,Poorer,,,No,Days: 1\n\
15-19,Urban,Higher,Middle,10.6,Mild,Don't know,Immediately\n";
    file.write_all(header.as_bytes()).expect("write header");
    file.write_all(rows.as_bytes()).expect("write rows");
    file
}

#[test]
fn loads_survey_export_with_default_report() {
    let file = survey_file();
    let options = LoadOptions::for_report(&ReportDefinition::default());
    let loaded = load_dataset(file.path(), &options).expect("load survey");

    assert_eq!(
        loaded.dataset.columns,
        vec![
            "Age_Group",
            "Residence",
            "Education",
            "Wealth",
            "Hemoglobin",
            "Anemia_Level",
            "Iron_Intake",
            "Breastfeed_Timing"
        ]
    );
    assert_eq!(loaded.rows_read, 4);
    assert_eq!(loaded.dataset.len(), 3);
    assert_eq!(loaded.dropped_total(), 1);
    let anemia = loaded.dataset.column_index("Anemia_Level").unwrap();
    let levels: Vec<&CellValue> = loaded.dataset.column_values(anemia).collect();
    assert_eq!(levels[2], &CellValue::Text("Mild".to_string()));
}

#[test]
fn missing_report_column_fails_at_load() {
    let file = survey_file();
    let mut report = ReportDefinition::default();
    report.filters.push("Marital_Status".to_string());
    let options = LoadOptions::for_report(&report);
    let err = load_dataset(file.path(), &options).unwrap_err();
    assert!(matches!(err, IngestError::MissingColumn { ref column, .. } if column == "Marital_Status"));
}

#[test]
fn polars_reader_matches_csv_reader() {
    let file = survey_file();
    let by_csv = read_csv_table(file.path()).expect("csv crate");
    let by_polars = StreamingCsvReader::new(file.path())
        .expect("reader")
        .read_as_csv_table()
        .expect("polars");
    assert_eq!(by_polars.headers, by_csv.headers);
    assert_eq!(by_polars.rows, by_csv.rows);

    let auto = read_csv_table_auto(file.path(), 0).expect("auto");
    assert_eq!(auto, by_polars);
}

#[test]
fn report_definition_file_loads() {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(
        b"title = \"Iron\"\n[[charts]]\nkind = \"histogram\"\ntitle = \"Iron\"\nx = \"Iron_Intake\"\ncolor = \"Anemia_Level\"\n",
    )
    .expect("write");
    let report = load_report_definition(file.path()).expect("load report");
    assert_eq!(report.title, "Iron");
    assert_eq!(report.charts.len(), 1);

    let err = load_report_definition(Path::new("/no/such/report.toml")).unwrap_err();
    assert!(matches!(err, IngestError::FileNotFound { .. }));
}
