//! Canonical survey fields and raw header recognition.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Value kind of a field, used to pick axis types and validate charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Categorical,
    Numeric,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Categorical => "categorical",
            FieldKind::Numeric => "numeric",
        }
    }
}

/// Known survey fields.
///
/// Every raw CSV column that matches one of these (by canonical name or a
/// recognised survey header) is renamed to the canonical name at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Field {
    AgeGroup,
    Residence,
    Education,
    Wealth,
    BirthsLastFiveYears,
    AgeFirstBirth,
    Hemoglobin,
    AnemiaLevel,
    BedNet,
    Smoking,
    MaritalStatus,
    LivingWithPartner,
    BreastfeedTiming,
    Fever,
    IronIntake,
    Region,
    Latitude,
    Longitude,
}

pub const ANEMIA_LEVELS: &[&str] = &["Not anemic", "Mild", "Moderate", "Severe"];
pub const WEALTH_LEVELS: &[&str] = &["Poorest", "Poorer", "Middle", "Richer", "Richest"];
pub const EDUCATION_LEVELS: &[&str] = &["No education", "Primary", "Secondary", "Higher"];

impl Field {
    pub const ALL: [Field; 18] = [
        Field::AgeGroup,
        Field::Residence,
        Field::Education,
        Field::Wealth,
        Field::BirthsLastFiveYears,
        Field::AgeFirstBirth,
        Field::Hemoglobin,
        Field::AnemiaLevel,
        Field::BedNet,
        Field::Smoking,
        Field::MaritalStatus,
        Field::LivingWithPartner,
        Field::BreastfeedTiming,
        Field::Fever,
        Field::IronIntake,
        Field::Region,
        Field::Latitude,
        Field::Longitude,
    ];

    /// Column name used after load.
    pub fn canonical(&self) -> &'static str {
        match self {
            Field::AgeGroup => "Age_Group",
            Field::Residence => "Residence",
            Field::Education => "Education",
            Field::Wealth => "Wealth",
            Field::BirthsLastFiveYears => "Births_Last_5_Years",
            Field::AgeFirstBirth => "Age_First_Birth",
            Field::Hemoglobin => "Hemoglobin",
            Field::AnemiaLevel => "Anemia_Level",
            Field::BedNet => "Bed_Net",
            Field::Smoking => "Smoking",
            Field::MaritalStatus => "Marital_Status",
            Field::LivingWithPartner => "Living_With_Partner",
            Field::BreastfeedTiming => "Breastfeed_Timing",
            Field::Fever => "Fever",
            Field::IronIntake => "Iron_Intake",
            Field::Region => "Region",
            Field::Latitude => "Latitude",
            Field::Longitude => "Longitude",
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            Field::BirthsLastFiveYears
            | Field::AgeFirstBirth
            | Field::Hemoglobin
            | Field::Latitude
            | Field::Longitude => FieldKind::Numeric,
            _ => FieldKind::Categorical,
        }
    }

    /// Raw survey headers recognised for this field, besides the canonical name.
    pub fn survey_headers(&self) -> &'static [&'static str] {
        match self {
            Field::AgeGroup => &["Age in 5-year groups"],
            Field::Residence => &["Type of place of residence"],
            Field::Education => &["Highest educational level"],
            Field::Wealth => &["Wealth index combined"],
            Field::BirthsLastFiveYears => &["Births in last five years"],
            Field::AgeFirstBirth => &["Age of respondent at 1st birth"],
            Field::Hemoglobin => {
                &["Hemoglobin level adjusted for altitude and smoking (g/dl - 1 decimal)"]
            }
            Field::AnemiaLevel => &["Anemia level"],
            Field::BedNet => &["Have mosquito bed net for sleeping (from household questionnaire)"],
            Field::Smoking => &["Smokes cigarettes"],
            Field::MaritalStatus => &["Current marital status"],
            Field::LivingWithPartner => &["Currently residing with husband/partner"],
            Field::BreastfeedTiming => &["When child put to breast"],
            Field::Fever => &["Had fever in last two weeks"],
            Field::IronIntake => &["Taking iron pills, sprinkles or syrup"],
            Field::Region => &["City"],
            Field::Latitude => &["lat"],
            Field::Longitude => &["lon", "lng"],
        }
    }

    /// Preferred level order for ordinal fields.
    pub fn levels(&self) -> Option<&'static [&'static str]> {
        match self {
            Field::AnemiaLevel => Some(ANEMIA_LEVELS),
            Field::Wealth => Some(WEALTH_LEVELS),
            Field::Education => Some(EDUCATION_LEVELS),
            _ => None,
        }
    }

    pub fn is_geo(&self) -> bool {
        matches!(self, Field::Latitude | Field::Longitude)
    }

    /// Look up a field by its canonical name (case-insensitive).
    pub fn from_canonical(name: &str) -> Option<Field> {
        let key = header_key(name);
        Field::ALL
            .into_iter()
            .find(|field| header_key(field.canonical()) == key)
    }

    /// Resolve a raw CSV header to a known field.
    pub fn from_header(raw: &str) -> Option<Field> {
        let key = header_key(raw);
        Field::ALL.into_iter().find(|field| {
            header_key(field.canonical()) == key
                || field
                    .survey_headers()
                    .iter()
                    .any(|header| header_key(header) == key)
        })
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical())
    }
}

/// Trim, strip a BOM, and collapse internal whitespace runs.
pub fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}').trim();
    let mut parts = trimmed.split_whitespace();
    let mut normalized = String::new();
    if let Some(first) = parts.next() {
        normalized.push_str(first);
        for part in parts {
            normalized.push(' ');
            normalized.push_str(part);
        }
    }
    normalized
}

/// Case-folded header used for matching.
pub fn header_key(raw: &str) -> String {
    normalize_header(raw).to_lowercase()
}

/// Preferred level order for a column name, if it is a known ordinal field.
pub fn ordinal_levels(column: &str) -> Option<&'static [&'static str]> {
    Field::from_canonical(column).and_then(|field| field.levels())
}

/// Position of `value` in the column's ordinal levels (case-insensitive).
pub fn level_rank(column: &str, value: &str) -> Option<usize> {
    let levels = ordinal_levels(column)?;
    let value = value.trim();
    levels
        .iter()
        .position(|level| level.eq_ignore_ascii_case(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_survey_headers() {
        assert_eq!(
            Field::from_header("Type of place of residence"),
            Some(Field::Residence)
        );
        assert_eq!(
            Field::from_header("  \u{feff}Anemia   level "),
            Some(Field::AnemiaLevel)
        );
        assert_eq!(Field::from_header("anemia_level"), Some(Field::AnemiaLevel));
        assert_eq!(Field::from_header("LNG"), Some(Field::Longitude));
        assert_eq!(Field::from_header("Anemia level.1"), None);
    }

    #[test]
    fn canonical_names_round_trip() {
        for field in Field::ALL {
            assert_eq!(Field::from_canonical(field.canonical()), Some(field));
        }
    }

    #[test]
    fn level_rank_is_case_insensitive() {
        assert_eq!(level_rank("Anemia_Level", "not anemic"), Some(0));
        assert_eq!(level_rank("Anemia_Level", "Severe"), Some(3));
        assert_eq!(level_rank("Wealth", "Middle"), Some(2));
        assert_eq!(level_rank("Residence", "Urban"), None);
    }

    #[test]
    fn normalize_header_collapses_whitespace() {
        assert_eq!(normalize_header("  Wealth \t index  combined "), "Wealth index combined");
        assert_eq!(normalize_header(""), "");
    }
}
