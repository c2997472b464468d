//! Table output for clip listings and sampled poses

use prettytable::format::{Alignment, consts::FORMAT_NO_LINESEP_WITH_TITLE};
use prettytable::{Cell, Row, Table};
use std::fmt::Display;

/// Create a table with bold headers
pub fn create_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_format(*FORMAT_NO_LINESEP_WITH_TITLE);
    table.set_titles(Row::new(
        headers
            .iter()
            .map(|header| Cell::new(header).style_spec("b"))
            .collect(),
    ));
    table
}

/// Append a row; cells that read as numbers are right-aligned
pub fn add_table_row<I, T>(table: &mut Table, cells: I)
where
    I: IntoIterator<Item = T>,
    T: Display,
{
    let row = cells
        .into_iter()
        .map(|cell| {
            let text = cell.to_string();
            let align = if text.parse::<f64>().is_ok() {
                Alignment::RIGHT
            } else {
                Alignment::LEFT
            };
            Cell::new_align(&text, align)
        })
        .collect();
    table.add_row(Row::new(row));
}

/// Vector or quaternion components as `x, y, z[, w]` with three decimals
pub fn format_components(values: &[f32]) -> String {
    values
        .iter()
        .map(|v| format!("{v:.3}"))
        .collect::<Vec<_>>()
        .join(", ")
}
