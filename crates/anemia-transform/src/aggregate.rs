//! Conditional distributions and frequency counts.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use anemia_model::Dataset;

use crate::error::Result;
use crate::filter::resolve_column;
use crate::levels::order_levels;

/// One outcome value within a group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutcomeShare {
    pub value: String,
    pub count: usize,
    pub proportion: f64,
}

/// The outcome distribution of a single group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupProportions {
    pub group: String,
    pub group_size: usize,
    pub entries: Vec<OutcomeShare>,
}

impl GroupProportions {
    pub fn proportion_of(&self, value: &str) -> f64 {
        self.entries
            .iter()
            .find(|entry| entry.value == value)
            .map_or(0.0, |entry| entry.proportion)
    }
}

/// P(outcome | group) for every observed group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProportionTable {
    pub group_by: String,
    pub outcome: String,
    /// Every outcome value seen in any group, in display order.
    pub outcome_levels: Vec<String>,
    pub groups: Vec<GroupProportions>,
}

impl ProportionTable {
    pub fn group(&self, value: &str) -> Option<&GroupProportions> {
        self.groups.iter().find(|group| group.group == value)
    }

    /// Records that took part (both cells present).
    pub fn total(&self) -> usize {
        self.groups.iter().map(|group| group.group_size).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Relative frequency of each outcome value within each group.
///
/// Records with a missing group or outcome cell are left out of both the
/// counts and the group sizes.
pub fn grouped_proportions(
    dataset: &Dataset,
    group_by: &str,
    outcome: &str,
) -> Result<ProportionTable> {
    let group_idx = resolve_column(dataset, group_by)?;
    let outcome_idx = resolve_column(dataset, outcome)?;
    let group_column = &dataset.columns[group_idx];
    let outcome_column = &dataset.columns[outcome_idx];

    let mut group_order: Vec<String> = Vec::new();
    let mut outcome_order: Vec<String> = Vec::new();
    let mut counts: HashMap<(&str, &str), usize> = HashMap::new();
    let mut sizes: HashMap<&str, usize> = HashMap::new();

    for record in &dataset.records {
        let (Some(group), Some(value)) = (
            record.cell(group_idx).as_str(),
            record.cell(outcome_idx).as_str(),
        ) else {
            continue;
        };
        let size = sizes.entry(group).or_insert(0);
        if *size == 0 {
            group_order.push(group.to_string());
        }
        *size += 1;
        if !outcome_order.iter().any(|known| known == value) {
            outcome_order.push(value.to_string());
        }
        *counts.entry((group, value)).or_insert(0) += 1;
    }

    let outcome_levels = order_levels(outcome_column, outcome_order);
    let groups = order_levels(group_column, group_order)
        .into_iter()
        .map(|group| {
            let group_size = sizes.get(group.as_str()).copied().unwrap_or(0);
            let entries = outcome_levels
                .iter()
                .filter_map(|value| {
                    let count = counts
                        .get(&(group.as_str(), value.as_str()))
                        .copied()
                        .unwrap_or(0);
                    (count > 0).then(|| OutcomeShare {
                        value: value.clone(),
                        count,
                        proportion: count as f64 / group_size as f64,
                    })
                })
                .collect();
            GroupProportions {
                group,
                group_size,
                entries,
            }
        })
        .collect();

    Ok(ProportionTable {
        group_by: group_column.clone(),
        outcome: outcome_column.clone(),
        outcome_levels,
        groups,
    })
}

/// Counts of each non-missing value, most frequent first.
///
/// Ties keep level order (ordinal rank, else first appearance).
pub fn value_counts(dataset: &Dataset, field: &str) -> Result<Vec<(String, usize)>> {
    let index = resolve_column(dataset, field)?;
    Ok(counts_of(dataset, index))
}

pub(crate) fn counts_of(dataset: &Dataset, index: usize) -> Vec<(String, usize)> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for cell in dataset.column_values(index) {
        if let Some(value) = cell.as_str() {
            let count = counts.entry(value).or_insert(0);
            if *count == 0 {
                order.push(value.to_string());
            }
            *count += 1;
        }
    }
    let mut ranked: Vec<(String, usize)> = order_levels(&dataset.columns[index], order)
        .into_iter()
        .map(|value| {
            let count = counts.get(value.as_str()).copied().unwrap_or(0);
            (value, count)
        })
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

/// Keep only records whose `field` value is among the `n` most frequent.
pub fn top_n(dataset: &Dataset, field: &str, n: usize) -> Result<Dataset> {
    let index = resolve_column(dataset, field)?;
    let keep: HashSet<String> = counts_of(dataset, index)
        .into_iter()
        .take(n)
        .map(|(value, _)| value)
        .collect();
    let records = dataset
        .records
        .iter()
        .filter(|record| {
            record
                .cell(index)
                .as_str()
                .is_some_and(|value| keep.contains(value))
        })
        .cloned()
        .collect();
    Ok(dataset.with_records(records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anemia_model::{CellValue, Record};

    fn dataset(columns: &[&str], rows: &[&[&str]]) -> Dataset {
        let mut dataset = Dataset::new(columns.iter().map(|c| (*c).to_string()).collect());
        for (idx, row) in rows.iter().enumerate() {
            let cells = row.iter().map(|v| CellValue::from_raw(v)).collect();
            dataset.push_record(Record::new(idx + 1, cells));
        }
        dataset
    }

    #[test]
    fn missing_cells_are_excluded_from_group_size() {
        let data = dataset(
            &["Residence", "Anemia_Level"],
            &[
                &["Urban", "Mild"],
                &["Urban", ""],
                &["", "Severe"],
                &["Urban", "Not anemic"],
            ],
        );
        let table = grouped_proportions(&data, "Residence", "Anemia_Level").unwrap();
        assert_eq!(table.groups.len(), 1);
        let urban = table.group("Urban").unwrap();
        assert_eq!(urban.group_size, 2);
        assert_eq!(table.outcome_levels, vec!["Not anemic", "Mild"]);
        assert!((urban.proportion_of("Mild") - 0.5).abs() < 1e-12);
        assert_eq!(urban.proportion_of("Severe"), 0.0);
    }

    #[test]
    fn groups_follow_ordinal_levels() {
        let data = dataset(
            &["Wealth", "Anemia_Level"],
            &[&["Richest", "Mild"], &["Poorest", "Mild"], &["Middle", "Severe"]],
        );
        let table = grouped_proportions(&data, "Wealth", "Anemia_Level").unwrap();
        let groups: Vec<&str> = table.groups.iter().map(|g| g.group.as_str()).collect();
        assert_eq!(groups, vec!["Poorest", "Middle", "Richest"]);
    }

    #[test]
    fn value_counts_break_ties_by_level() {
        let data = dataset(
            &["Anemia_Level"],
            &[&["Severe"], &["Mild"], &["Mild"], &["Not anemic"], &[""]],
        );
        let counts = value_counts(&data, "Anemia_Level").unwrap();
        assert_eq!(
            counts,
            vec![
                ("Mild".to_string(), 2),
                ("Not anemic".to_string(), 1),
                ("Severe".to_string(), 1)
            ]
        );
    }

    #[test]
    fn top_n_keeps_most_frequent_values() {
        let data = dataset(
            &["Breastfeed_Timing"],
            &[
                &["Immediately"],
                &["Hours: 1"],
                &["Immediately"],
                &["Days: 1"],
                &["Hours: 1"],
                &[""],
            ],
        );
        let top = top_n(&data, "Breastfeed_Timing", 2).unwrap();
        assert_eq!(top.len(), 4);
        let rows: Vec<usize> = top.records.iter().map(|r| r.source_row).collect();
        assert_eq!(rows, vec![1, 2, 3, 5]);
    }
}
