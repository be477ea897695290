//! Category ordering.

use anemia_model::level_rank;

/// Order distinct category values for display.
///
/// Known ordinal columns (anemia level, wealth, education) sort by severity or
/// rank; unranked values follow in their incoming order. Other columns keep
/// the incoming (first-appearance) order.
pub fn order_levels(column: &str, values: Vec<String>) -> Vec<String> {
    let mut keyed: Vec<(usize, usize, String)> = values
        .into_iter()
        .enumerate()
        .map(|(position, value)| {
            let rank = level_rank(column, &value).unwrap_or(usize::MAX);
            (rank, position, value)
        })
        .collect();
    keyed.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));
    keyed.into_iter().map(|(_, _, value)| value).collect()
}
