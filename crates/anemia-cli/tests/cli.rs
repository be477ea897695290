//! End-to-end runs of the `anemia-dash` binary.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

const SURVEY: &str = r#"Age in 5-year groups,Type of place of residence,Highest educational level,Wealth index combined,Hemoglobin level adjusted for altitude and smoking (g/dl - 1 decimal),Anemia level,"Taking iron pills, sprinkles or syrup",When child put to breast
20-24,Urban,Secondary,Richest,11.4,Not anemic,Yes,Immediately
25-29,Rural,No education,Poorest,9.2,Moderate,No,Hours: 1
15-19,Urban,Higher,Middle,10.6,Mild,Don't know,Immediately
30-34,Rural,Primary,Poorest,10.1,Mild,No,Days: 1
20-24,Rural,Primary,Poorer,7.9,Severe,Yes,Hours: 1
35-39,Urban,Primary,Richer,12.2,,Yes,Immediately
"#;

fn write_survey(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("survey.csv");
    fs::write(&path, SURVEY).unwrap();
    path
}

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_anemia-dash"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("run anemia-dash")
}

#[test]
fn render_writes_dashboard_next_to_csv() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_survey(dir.path());
    let output = run(&["render", csv.to_str().unwrap(), "--filter", "Residence=rural"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let html = fs::read_to_string(dir.path().join("survey-dashboard.html")).unwrap();
    assert!(html.contains("Showing 3 of 5 records"));
    assert!(html.contains("<li class=\"selected\">Rural</li>"));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("3 of 5 match"), "{stdout}");
    assert!(stdout.contains("1 dropped"), "{stdout}");
}

#[test]
fn render_json_to_explicit_path() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_survey(dir.path());
    let target = dir.path().join("out").join("charts.json");
    let output = run(&[
        "render",
        csv.to_str().unwrap(),
        "--format",
        "json",
        "--output",
        target.to_str().unwrap(),
        "--title",
        "Survey check",
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&target).unwrap()).unwrap();
    assert_eq!(value["title"], "Survey check");
    assert_eq!(value["source"], "survey.csv");
    assert_eq!(value["panels"].as_array().unwrap().len(), 6);
}

#[test]
fn unknown_filter_value_fails_with_choices() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_survey(dir.path());
    let output = run(&["values", csv.to_str().unwrap(), "Wealth", "--filter", "Residence=Suburban"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("error: "), "{stderr}");
    assert!(stderr.contains("Urban, Rural"), "{stderr}");
}

#[test]
fn missing_column_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("partial.csv");
    fs::write(&csv, "Wealth index combined,Anemia level\nPoorest,Mild\n").unwrap();
    let output = run(&["render", csv.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("required column"), "{stderr}");
    assert!(!dir.path().join("partial-dashboard.html").exists());
}

#[test]
fn values_and_proportions_print_tables() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_survey(dir.path());

    let output = run(&["--color", "never", "values", csv.to_str().unwrap(), "Wealth"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let poorest = stdout.find("Poorest").unwrap();
    let richest = stdout.find("Richest").unwrap();
    assert!(poorest < richest);

    let output = run(&[
        "proportions",
        csv.to_str().unwrap(),
        "--by",
        "Residence",
        "--json",
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["group_by"], "Residence");
    for group in value["groups"].as_array().unwrap() {
        let sum: f64 = group["entries"]
            .as_array()
            .unwrap()
            .iter()
            .map(|entry| entry["proportion"].as_f64().unwrap())
            .sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }
}

#[test]
fn report_template_round_trips_through_the_loader() {
    let output = run(&["report-template"]);
    assert!(output.status.success());
    let toml = String::from_utf8(output.stdout).unwrap();
    assert!(toml.contains("[[charts]]"));
    let report =
        anemia_ingest::parse_report_definition(&toml, Path::new("template.toml")).unwrap();
    assert_eq!(report.charts.len(), 6);
}
