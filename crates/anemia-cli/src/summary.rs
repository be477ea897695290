use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use anemia_ingest::{ColumnProfile, ColumnRename};
use anemia_transform::ProportionTable;

use crate::types::RenderResult;

pub fn print_render_summary(result: &RenderResult) {
    println!("Source: {}", result.source.display());
    println!("Output: {}", result.output.display());
    println!(
        "Records: {} of {} match the selection ({} rows read, {} dropped)",
        result.filtered_records,
        result.total_records,
        result.rows_read,
        result.dropped_total()
    );
    if !result.selection.is_empty() {
        println!("Filters: {}", result.selection);
    }
    println!("{}", panels_table(result));
}

/// One row per rendered chart.
pub fn panels_table(result: &RenderResult) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Chart"),
        header_cell("Kind"),
        header_cell("Data"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Center);
    for (index, panel) in result.panels.iter().enumerate() {
        let status = if panel.has_data {
            Cell::new("✓").fg(Color::Green).add_attribute(Attribute::Bold)
        } else {
            Cell::new("no data").fg(Color::Yellow)
        };
        table.add_row(vec![
            Cell::new(index + 1),
            Cell::new(&panel.title),
            dim_cell(panel.kind.as_str()),
            status,
        ]);
    }
    table
}

/// Column overview of a loaded dataset, with the raw header each column came from.
pub fn fields_table(profiles: &[ColumnProfile], renames: &[ColumnRename]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Column"),
        header_cell("Source header"),
        header_cell("Kind"),
        header_cell("Non-missing"),
        header_cell("Distinct"),
        header_cell("Missing"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);
    align_column(&mut table, 5, CellAlignment::Right);
    for (index, profile) in profiles.iter().enumerate() {
        let column = if profile.field.is_some() {
            Cell::new(&profile.name)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold)
        } else {
            Cell::new(&profile.name)
        };
        let source = match renames.get(index) {
            Some(rename) if rename.raw != rename.canonical => Cell::new(&rename.raw),
            _ => dim_cell("-"),
        };
        table.add_row(vec![
            column,
            source,
            Cell::new(profile.kind.as_str()),
            Cell::new(profile.non_missing),
            Cell::new(profile.distinct),
            missing_cell(profile.missing_ratio),
        ]);
    }
    table
}

/// Observed values of one field with counts and shares of the counted records.
pub fn values_table(field: &str, counts: &[(String, usize)]) -> Table {
    let total: usize = counts.iter().map(|(_, count)| count).sum();
    let mut table = Table::new();
    table.set_header(vec![
        header_cell(field),
        header_cell("Count"),
        header_cell("Share"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    for (value, count) in counts {
        table.add_row(vec![
            Cell::new(value),
            Cell::new(count),
            Cell::new(percent(*count as f64 / total as f64)),
        ]);
    }
    table
}

/// Group rows by outcome columns; each cell is the outcome's share of the group.
pub fn proportions_table(proportions: &ProportionTable) -> Table {
    let mut header = vec![header_cell(&proportions.group_by), header_cell("N")];
    header.extend(proportions.outcome_levels.iter().map(|level| header_cell(level)));

    let mut table = Table::new();
    table.set_header(header);
    apply_table_style(&mut table);
    for index in 1..=proportions.outcome_levels.len() + 1 {
        align_column(&mut table, index, CellAlignment::Right);
    }

    for group in &proportions.groups {
        let mut row = vec![
            Cell::new(&group.group)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(group.group_size),
        ];
        for level in &proportions.outcome_levels {
            let share = group.proportion_of(level);
            if share > 0.0 {
                row.push(Cell::new(percent(share)));
            } else {
                row.push(dim_cell("-"));
            }
        }
        table.add_row(row);
    }
    table
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn percent(share: f64) -> String {
    if share.is_finite() {
        format!("{:.1}%", share * 100.0)
    } else {
        "-".to_string()
    }
}

fn missing_cell(ratio: f64) -> Cell {
    if ratio > 0.0 {
        Cell::new(percent(ratio)).fg(Color::Yellow)
    } else {
        dim_cell("0.0%")
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
