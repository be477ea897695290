//! Property and scenario tests for filtering and grouped proportions.

use std::collections::BTreeSet;

use proptest::prelude::*;

use anemia_model::{CellValue, Dataset, FilterSelection, Record};
use anemia_transform::{
    TransformError, distinct_tuples, filter, grouped_proportions, observed_domain,
    selection_for_tuple, validate_selection,
};

// Includes values that look like wildcards or differ only in case.
const RESIDENCES: &[&str] = &["Urban", "Rural", "All", "urban"];
const WEALTH: &[&str] = &["Poorest", "Poorer", "Middle", "Richest", "*"];
const ANEMIA: &[&str] = &["Not anemic", "Mild", "Moderate", "Severe"];
const COLUMNS: &[&str] = &["Residence", "Wealth", "Anemia_Level"];

fn build(rows: &[(usize, usize, Option<usize>)]) -> Dataset {
    let mut dataset = Dataset::new(COLUMNS.iter().map(|c| (*c).to_string()).collect());
    for (idx, (residence, wealth, anemia)) in rows.iter().enumerate() {
        let cells = vec![
            CellValue::Text(RESIDENCES[*residence].to_string()),
            CellValue::Text(WEALTH[*wealth].to_string()),
            anemia.map_or(CellValue::Missing, |a| CellValue::Text(ANEMIA[a].to_string())),
        ];
        dataset.push_record(Record::new(idx + 1, cells));
    }
    dataset
}

fn rows_strategy() -> impl Strategy<Value = Vec<(usize, usize, Option<usize>)>> {
    prop::collection::vec(
        (
            0..RESIDENCES.len(),
            0..WEALTH.len(),
            prop::option::weighted(0.9, 0..ANEMIA.len()),
        ),
        0..60,
    )
}

fn source_rows(dataset: &Dataset) -> Vec<usize> {
    dataset.records.iter().map(|r| r.source_row).collect()
}

proptest! {
    #[test]
    fn filtered_subset_matches_every_constraint(rows in rows_strategy()) {
        let dataset = build(&rows);
        let residences = observed_domain(&dataset, "Residence").unwrap();
        let wealth = observed_domain(&dataset, "Wealth").unwrap();
        let all_rows: Vec<usize> = source_rows(&dataset);

        for residence in &residences {
            for level in &wealth {
                let selection = FilterSelection::new()
                    .with("Residence", residence.as_str())
                    .with("Wealth", level.as_str());
                let validated = validate_selection(&dataset, &selection).unwrap();
                prop_assert_eq!(&validated, &selection);
                let subset = filter(&dataset, &validated).unwrap();

                let kept = source_rows(&subset);
                prop_assert!(kept.windows(2).all(|w| w[0] < w[1]));
                prop_assert!(kept.iter().all(|row| all_rows.contains(row)));
                for record in &subset.records {
                    prop_assert_eq!(record.cell(0).as_str(), Some(residence.as_str()));
                    prop_assert_eq!(record.cell(1).as_str(), Some(level.as_str()));
                }
            }
        }
    }

    #[test]
    fn distinct_tuples_partition_non_null_records(rows in rows_strategy()) {
        let dataset = build(&rows);
        let expected: Vec<usize> = dataset
            .records
            .iter()
            .filter(|r| !r.cell(2).is_missing())
            .map(|r| r.source_row)
            .collect();

        let mut covered = Vec::new();
        for tuple in distinct_tuples(&dataset, COLUMNS).unwrap() {
            let Some(selection) = selection_for_tuple(COLUMNS, &tuple) else {
                continue;
            };
            covered.extend(source_rows(&filter(&dataset, &selection).unwrap()));
        }
        let unique: BTreeSet<usize> = covered.iter().copied().collect();
        prop_assert_eq!(unique.len(), covered.len());
        prop_assert_eq!(unique.into_iter().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn group_proportions_sum_to_one(rows in rows_strategy()) {
        let dataset = build(&rows);
        let table = grouped_proportions(&dataset, "Wealth", "Anemia_Level").unwrap();
        for group in &table.groups {
            let sum: f64 = group.entries.iter().map(|e| e.proportion).sum();
            prop_assert!((sum - 1.0).abs() < 1e-9, "group {} sums to {}", group.group, sum);
            let counted: usize = group.entries.iter().map(|e| e.count).sum();
            prop_assert_eq!(counted, group.group_size);
        }
    }
}

fn scenario() -> Dataset {
    let mut dataset = Dataset::new(COLUMNS.iter().map(|c| (*c).to_string()).collect());
    for (idx, row) in [
        ["Urban", "Poor", "Mild"],
        ["Urban", "Poor", "Not anemic"],
        ["Rural", "Rich", "Severe"],
    ]
    .iter()
    .enumerate()
    {
        let cells = row.iter().map(|v| CellValue::from_raw(v)).collect();
        dataset.push_record(Record::new(idx + 1, cells));
    }
    dataset
}

#[test]
fn urban_poor_subset_splits_evenly() {
    let dataset = scenario();
    let selection = FilterSelection::new()
        .with("Residence", "Urban")
        .with("Wealth", "Poor");
    let subset = filter(&dataset, &selection).unwrap();
    assert_eq!(source_rows(&subset), vec![1, 2]);

    let table = grouped_proportions(&subset, "Residence", "Anemia_Level").unwrap();
    let urban = table.group("Urban").unwrap();
    assert_eq!(urban.group_size, 2);
    assert!((urban.proportion_of("Mild") - 0.5).abs() < 1e-12);
    assert!((urban.proportion_of("Not anemic") - 0.5).abs() < 1e-12);
    assert_eq!(urban.entries.len(), 2);
}

#[test]
fn absent_combination_yields_empty_subset() {
    let dataset = scenario();
    let selection = FilterSelection::new()
        .with("Residence", "Rural")
        .with("Wealth", "Poor");
    let validated = validate_selection(&dataset, &selection).unwrap();
    let subset = filter(&dataset, &validated).unwrap();
    assert!(subset.is_empty());

    let table = grouped_proportions(&subset, "Wealth", "Anemia_Level").unwrap();
    assert!(table.is_empty());
}

#[test]
fn unobserved_value_is_rejected_with_choices() {
    let dataset = scenario();
    let selection = FilterSelection::new().with("Wealth", "Middle");
    let err = validate_selection(&dataset, &selection).unwrap_err();
    match err {
        TransformError::UnknownValue { field, choices, .. } => {
            assert_eq!(field, "Wealth");
            assert_eq!(choices, "Poor, Rich");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn value_spelled_all_is_its_own_category() {
    let mut dataset = Dataset::new(COLUMNS.iter().map(|c| (*c).to_string()).collect());
    for (idx, row) in [["All", "Poor", "Mild"], ["Urban", "Poor", "Mild"]].iter().enumerate() {
        let cells = row.iter().map(|v| CellValue::from_raw(v)).collect();
        dataset.push_record(Record::new(idx + 1, cells));
    }

    let mut covered = Vec::new();
    for tuple in distinct_tuples(&dataset, COLUMNS).unwrap() {
        let selection = selection_for_tuple(COLUMNS, &tuple).unwrap();
        assert_eq!(selection.len(), COLUMNS.len());
        covered.extend(source_rows(&filter(&dataset, &selection).unwrap()));
    }
    covered.sort_unstable();
    assert_eq!(covered, vec![1, 2]);
}
