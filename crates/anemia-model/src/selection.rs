//! Equality filter selections (one value per field).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Command-line values that clear a field's constraint instead of selecting
/// a level.
const ANY_VALUE_TOKENS: &[&str] = &["all", "*"];

/// One `FIELD=VALUE` constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldFilter {
    pub field: String,
    pub value: String,
}

impl FromStr for FieldFilter {
    type Err = ModelError;

    fn from_str(input: &str) -> Result<Self> {
        let Some((field, value)) = input.split_once('=') else {
            return Err(ModelError::InvalidFilter {
                input: input.to_string(),
            });
        };
        let field = field.trim();
        let value = value.trim();
        if field.is_empty() || value.is_empty() {
            return Err(ModelError::InvalidFilter {
                input: input.to_string(),
            });
        }
        Ok(Self {
            field: field.to_string(),
            value: value.to_string(),
        })
    }
}

impl FieldFilter {
    /// True for the command-line tokens that mean "no constraint".
    pub fn is_any_value(&self) -> bool {
        let value = self.value.trim();
        ANY_VALUE_TOKENS
            .iter()
            .any(|token| token.eq_ignore_ascii_case(value))
    }
}

impl fmt::Display for FieldFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.field, self.value)
    }
}

/// Active filter set. Field order follows insertion; a field appears once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    filters: Vec<FieldFilter>,
}

impl FilterSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (or replace) the value required for `field`. Every value is a
    /// literal, including `All`.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        let field = field.into();
        self.clear(&field);
        self.filters.push(FieldFilter {
            field,
            value: value.into(),
        });
    }

    /// Drop the constraint on `field`, if any.
    pub fn clear(&mut self, field: &str) {
        self.filters
            .retain(|existing| !existing.field.eq_ignore_ascii_case(field));
    }

    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.filters
            .iter()
            .find(|filter| filter.field.eq_ignore_ascii_case(field))
            .map(|filter| filter.value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldFilter> {
        self.filters.iter()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Build a selection from command-line filters; later entries win.
    ///
    /// `FIELD=All` and `FIELD=*` clear the field instead of selecting a value.
    pub fn from_filters(filters: impl IntoIterator<Item = FieldFilter>) -> Self {
        let mut selection = Self::new();
        for filter in filters {
            if filter.is_any_value() {
                selection.clear(&filter.field);
            } else {
                selection.set(filter.field, filter.value);
            }
        }
        selection
    }
}

impl fmt::Display for FilterSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.filters.is_empty() {
            return f.write_str("(none)");
        }
        let parts: Vec<String> = self.filters.iter().map(ToString::to_string).collect();
        f.write_str(&parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_field_filter() {
        let filter: FieldFilter = "Residence = Urban".parse().unwrap();
        assert_eq!(filter.field, "Residence");
        assert_eq!(filter.value, "Urban");
        assert_eq!(filter.to_string(), "Residence=Urban");
    }

    #[test]
    fn value_may_contain_equals_sign() {
        let filter: FieldFilter = "Note=a=b".parse().unwrap();
        assert_eq!(filter.value, "a=b");
    }

    #[test]
    fn rejects_malformed_filters() {
        assert!("Residence".parse::<FieldFilter>().is_err());
        assert!("=Urban".parse::<FieldFilter>().is_err());
        assert!("Residence=".parse::<FieldFilter>().is_err());
    }

    #[test]
    fn later_value_replaces_earlier() {
        let selection = FilterSelection::new()
            .with("Residence", "Urban")
            .with("Wealth", "Poorer")
            .with("residence", "Rural");
        assert_eq!(selection.len(), 2);
        assert_eq!(selection.get("Residence"), Some("Rural"));
        assert_eq!(selection.to_string(), "Wealth=Poorer, residence=Rural");
    }

    #[test]
    fn all_on_the_command_line_clears_constraint() {
        let filters: Vec<FieldFilter> = ["Residence=Urban", "Wealth=Poorer", "residence=All"]
            .iter()
            .map(|input| input.parse().unwrap())
            .collect();
        let selection = FilterSelection::from_filters(filters);
        assert_eq!(selection.to_string(), "Wealth=Poorer");

        let star: FieldFilter = "Wealth=*".parse().unwrap();
        assert!(FilterSelection::from_filters([star]).is_empty());
    }

    #[test]
    fn all_is_a_literal_value_in_code() {
        let selection = FilterSelection::new().with("Residence", "All");
        assert_eq!(selection.get("Residence"), Some("All"));
        assert_eq!(selection.to_string(), "Residence=All");
    }
}
