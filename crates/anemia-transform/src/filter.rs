//! Conjunctive equality filtering and observed domains.

use std::collections::HashSet;

use tracing::debug;

use anemia_model::{CellValue, Dataset, FilterSelection};

use crate::error::{Result, TransformError};
use crate::levels::order_levels;

/// Column index for `field`, or `UnknownField`.
pub fn resolve_column(dataset: &Dataset, field: &str) -> Result<usize> {
    dataset
        .column_index(field)
        .ok_or_else(|| TransformError::UnknownField {
            field: field.to_string(),
            available: dataset.columns.join(", "),
        })
}

/// Indices of records matching every constraint, in record order.
///
/// Missing cells never match. An empty selection keeps every record.
pub fn filter_indices(dataset: &Dataset, selection: &FilterSelection) -> Result<Vec<usize>> {
    let constraints: Vec<(usize, &str)> = selection
        .iter()
        .map(|filter| Ok((resolve_column(dataset, &filter.field)?, filter.value.as_str())))
        .collect::<Result<_>>()?;

    Ok(dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, record)| {
            constraints
                .iter()
                .all(|(index, value)| record.cell(*index).as_str() == Some(*value))
        })
        .map(|(idx, _)| idx)
        .collect())
}

/// Records matching every constraint, order preserved.
pub fn filter(dataset: &Dataset, selection: &FilterSelection) -> Result<Dataset> {
    let indices = filter_indices(dataset, selection)?;
    let records = indices
        .iter()
        .map(|&idx| dataset.records[idx].clone())
        .collect();
    let filtered = dataset.with_records(records);
    debug!(
        filters = selection.len(),
        rows_in = dataset.len(),
        rows_out = filtered.len(),
        "applied filter"
    );
    Ok(filtered)
}

/// Distinct non-missing values of a field, ordinal-sorted where known.
pub fn observed_domain(dataset: &Dataset, field: &str) -> Result<Vec<String>> {
    let index = resolve_column(dataset, field)?;
    Ok(domain_of(dataset, index))
}

pub(crate) fn domain_of(dataset: &Dataset, index: usize) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut values = Vec::new();
    for cell in dataset.column_values(index) {
        if let Some(value) = cell.as_str() {
            if seen.insert(value) {
                values.push(value.to_string());
            }
        }
    }
    order_levels(&dataset.columns[index], values)
}

/// Check a selection against the dataset's own choices.
///
/// Field names resolve case-insensitively. A value that is observed as
/// written is kept; otherwise it may match one observed value ignoring case.
/// The returned selection uses the dataset's spelling of both, so it filters
/// exactly.
pub fn validate_selection(
    dataset: &Dataset,
    selection: &FilterSelection,
) -> Result<FilterSelection> {
    let mut validated = FilterSelection::new();
    for filter in selection.iter() {
        let index = resolve_column(dataset, &filter.field)?;
        let column = &dataset.columns[index];
        let choices = domain_of(dataset, index);
        let value = resolve_value(column, &choices, &filter.value)?;
        validated.set(column.clone(), value);
    }
    Ok(validated)
}

fn resolve_value(column: &str, choices: &[String], requested: &str) -> Result<String> {
    let requested = requested.trim();
    if let Some(exact) = choices.iter().find(|choice| choice.as_str() == requested) {
        return Ok(exact.clone());
    }
    let folded: Vec<&String> = choices
        .iter()
        .filter(|choice| choice.eq_ignore_ascii_case(requested))
        .collect();
    match folded.as_slice() {
        [only] => Ok((*only).clone()),
        [] => Err(TransformError::UnknownValue {
            field: column.to_string(),
            value: requested.to_string(),
            choices: choices.join(", "),
        }),
        several => Err(TransformError::AmbiguousValue {
            field: column.to_string(),
            value: requested.to_string(),
            matches: several
                .iter()
                .map(|choice| choice.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        }),
    }
}

/// Every observed combination of values over `fields`, in first-appearance
/// order. Missing cells take part as `CellValue::Missing`.
pub fn distinct_tuples(dataset: &Dataset, fields: &[&str]) -> Result<Vec<Vec<CellValue>>> {
    let indices: Vec<usize> = fields
        .iter()
        .map(|field| resolve_column(dataset, field))
        .collect::<Result<_>>()?;
    let mut seen: HashSet<Vec<CellValue>> = HashSet::new();
    let mut tuples = Vec::new();
    for record in &dataset.records {
        let tuple: Vec<CellValue> = indices.iter().map(|&idx| record.cell(idx).clone()).collect();
        if seen.insert(tuple.clone()) {
            tuples.push(tuple);
        }
    }
    Ok(tuples)
}

/// Selection that picks exactly one tuple returned by [`distinct_tuples`].
///
/// Returns `None` when the tuple has a missing cell, since equality filters
/// cannot select missing values.
pub fn selection_for_tuple(fields: &[&str], tuple: &[CellValue]) -> Option<FilterSelection> {
    let mut selection = FilterSelection::new();
    for (field, cell) in fields.iter().zip(tuple) {
        selection.set(*field, cell.as_str()?);
    }
    Some(selection)
}
