//! Color assignment for chart series.

use anemia_model::{Field, level_rank};

/// Severity colors for anemia levels, least to most severe.
pub const SEVERITY: [&str; 4] = ["#2ca02c", "#f2c744", "#ff7f0e", "#d62728"];

/// Cycled for categories without a fixed palette.
pub const QUALITATIVE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// Fill for a chart without a color field.
pub const SINGLE: &str = "#4c78a8";

/// Fill for values outside a fixed palette.
pub const NEUTRAL: &str = "#9e9e9e";

const SEQUENTIAL_LOW: (u8, u8, u8) = (0xff, 0xff, 0xff);
const SEQUENTIAL_HIGH: (u8, u8, u8) = (0xb2, 0x18, 0x2b);

/// Maps the levels of one field to fill colors.
#[derive(Debug, Clone)]
pub struct ColorScale {
    entries: Vec<(String, String)>,
}

impl ColorScale {
    /// Anemia levels get the severity palette; everything else cycles the
    /// qualitative palette in level order.
    pub fn for_levels(field: Option<&str>, levels: &[String]) -> Self {
        let severity = field
            .and_then(Field::from_canonical)
            .is_some_and(|f| f == Field::AnemiaLevel);
        let entries = levels
            .iter()
            .enumerate()
            .map(|(idx, level)| {
                let color = if severity {
                    field
                        .and_then(|f| level_rank(f, level))
                        .and_then(|rank| SEVERITY.get(rank))
                        .copied()
                        .unwrap_or(NEUTRAL)
                } else {
                    QUALITATIVE[idx % QUALITATIVE.len()]
                };
                (level.clone(), color.to_string())
            })
            .collect();
        Self { entries }
    }

    pub fn color(&self, level: &str) -> &str {
        self.entries
            .iter()
            .find(|(name, _)| name == level)
            .map_or(NEUTRAL, |(_, color)| color.as_str())
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, color)| (name.as_str(), color.as_str()))
    }

    /// Same colors in the same order under new display labels.
    pub fn relabeled(&self, labels: &[String]) -> Self {
        let entries = self
            .entries
            .iter()
            .zip(labels)
            .map(|((_, color), label)| (label.clone(), color.clone()))
            .collect();
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// White-to-red color for a share in `[0, 1]`.
pub fn sequential(share: f64) -> String {
    let t = if share.is_finite() {
        share.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let mix = |low: u8, high: u8| -> u8 {
        (f64::from(low) + (f64::from(high) - f64::from(low)) * t).round() as u8
    };
    format!(
        "#{:02x}{:02x}{:02x}",
        mix(SEQUENTIAL_LOW.0, SEQUENTIAL_HIGH.0),
        mix(SEQUENTIAL_LOW.1, SEQUENTIAL_HIGH.1),
        mix(SEQUENTIAL_LOW.2, SEQUENTIAL_HIGH.2)
    )
}
