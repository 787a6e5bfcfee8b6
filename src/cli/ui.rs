use crate::core::warning::DataWarning;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    TotalLabel,
    TotalValue,
    Warning,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::TotalLabel => style(text).bold(),
        StyleType::TotalValue => style(text).green().bold(),
        StyleType::Warning => style(text).yellow(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

/// Formats an `Option<T>` into a `Cell`. `None` is displayed as "N/A".
pub fn format_optional_cell<T>(value: Option<T>, format_fn: impl Fn(T) -> String) -> Cell {
    value.map_or(na_cell(), |v| {
        Cell::new(format_fn(v)).set_alignment(CellAlignment::Right)
    })
}

/// Right aligned cell for a plain number.
pub fn amount_cell(value: f64) -> Cell {
    Cell::new(format!("{value:.2}")).set_alignment(CellAlignment::Right)
}

/// Creates a cell for displaying a fractional change as a percentage with color coding.
pub fn change_cell(change: Option<f64>) -> Cell {
    let Some(change) = change else {
        return na_cell();
    };
    let text = format_percent(change);
    let color = if change >= 0.0 {
        Color::Green
    } else {
        Color::Red
    };
    Cell::new(text)
        .fg(color)
        .set_alignment(CellAlignment::Right)
}

/// Formats a fraction (0.0123) as a percentage ("1.23%").
pub fn format_percent(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

pub fn na_cell() -> Cell {
    Cell::new("N/A")
        .fg(Color::DarkGrey)
        .set_alignment(CellAlignment::Right)
}

/// Spinner shown while series are downloaded.
pub fn new_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed_precise}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Renders warnings as a bulleted block, or an empty string when there are none.
pub fn render_warnings(warnings: &[DataWarning]) -> String {
    warnings
        .iter()
        .map(|w| format!("{} {w}\n", style_text("warning:", StyleType::Warning)))
        .collect()
}

pub fn print_warnings(warnings: &[DataWarning]) {
    let rendered = render_warnings(warnings);
    if !rendered.is_empty() {
        eprint!("{rendered}");
    }
}
