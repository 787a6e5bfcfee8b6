use super::ui;
use crate::core::catalog::{CATALOG, DEFAULT_SELECTION};
use comfy_table::Cell;

pub fn render() -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Ticker"), ui::header_cell("Description")]);

    for etf in CATALOG {
        let ticker = if DEFAULT_SELECTION.contains(&etf.ticker) {
            format!("{} *", etf.ticker)
        } else {
            etf.ticker.to_string()
        };
        table.add_row(vec![Cell::new(ticker), Cell::new(etf.description)]);
    }

    format!(
        "{}\n{}",
        table,
        ui::style_text("* selected by default", ui::StyleType::Subtle)
    )
}

pub fn run() {
    println!("{}", render());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_lists_every_etf() {
        let output = render();
        for etf in CATALOG {
            assert!(output.contains(etf.ticker), "missing {}", etf.ticker);
        }
        assert!(output.contains("SPY *"));
        assert!(output.contains("FXI *"));
    }
}
