use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color as TableColor, ContentArrangement, Table};

use crate::jenkins::StatusView;

/// Table and cell creation helpers
pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn header(labels: &[&str]) -> Vec<Cell> {
    labels
        .iter()
        .map(|label| Cell::new(*label).fg(TableColor::Cyan))
        .collect()
}

/// Status title colored like its web color class.
pub fn status_cell(status: &StatusView) -> Cell {
    let cell = Cell::new(&status.title);
    match status.color_class.as_str() {
        "text-success" => cell.fg(TableColor::Green),
        "text-danger" => cell.fg(TableColor::Red),
        "text-warning" => cell.fg(TableColor::Yellow),
        _ => cell.fg(TableColor::DarkGrey),
    }
}
