use std::collections::BTreeSet;

use anemia_model::{Dataset, Field, FieldKind};

/// Per-column summary of a loaded dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnProfile {
    pub name: String,
    pub field: Option<Field>,
    /// Declared kind for known fields, otherwise inferred from the values.
    pub kind: FieldKind,
    pub non_missing: usize,
    pub distinct: usize,
    pub missing_ratio: f64,
}

pub fn profile_columns(dataset: &Dataset) -> Vec<ColumnProfile> {
    let row_count = dataset.len();
    dataset
        .columns
        .iter()
        .enumerate()
        .map(|(index, name)| {
            let mut non_missing = 0usize;
            let mut numeric = 0usize;
            let mut uniques = BTreeSet::new();
            for cell in dataset.column_values(index) {
                let Some(value) = cell.as_str() else {
                    continue;
                };
                non_missing += 1;
                uniques.insert(value);
                if cell.as_f64().is_some() {
                    numeric += 1;
                }
            }
            let field = Field::from_canonical(name);
            let kind = match field {
                Some(field) => field.kind(),
                None if non_missing > 0 && numeric == non_missing => FieldKind::Numeric,
                None => FieldKind::Categorical,
            };
            let missing_ratio = if row_count == 0 {
                0.0
            } else {
                (row_count - non_missing) as f64 / row_count as f64
            };
            ColumnProfile {
                name: name.clone(),
                field,
                kind,
                non_missing,
                distinct: uniques.len(),
                missing_ratio,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anemia_model::{CellValue, Record};

    #[test]
    fn profiles_known_and_unknown_columns() {
        let mut dataset = Dataset::new(vec![
            "Residence".to_string(),
            "Score".to_string(),
            "Hemoglobin".to_string(),
        ]);
        for (row, values) in [["Urban", "1", "11.2"], ["Rural", "2", ""], ["Urban", "", "9.8"]]
            .iter()
            .enumerate()
        {
            let cells = values.iter().map(|v| CellValue::from_raw(v)).collect();
            dataset.push_record(Record::new(row + 1, cells));
        }

        let profiles = profile_columns(&dataset);
        assert_eq!(profiles[0].kind, FieldKind::Categorical);
        assert_eq!(profiles[0].distinct, 2);
        assert_eq!(profiles[1].field, None);
        assert_eq!(profiles[1].kind, FieldKind::Numeric);
        assert_eq!(profiles[2].field, Some(Field::Hemoglobin));
        assert_eq!(profiles[2].non_missing, 2);
        assert!((profiles[2].missing_ratio - 1.0 / 3.0).abs() < 1e-9);
    }
}
