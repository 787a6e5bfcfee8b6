use super::{App, Selection, merge_warnings, ui};
use crate::core::indicators::simple_moving_average;
use crate::core::series::{PriceSeries, check};
use anyhow::Result;
use comfy_table::Cell;

/// Close and moving average for the most recent `rows` observations.
pub fn render_sma(series: &PriceSeries, window: usize, rows: usize) -> Result<String> {
    let averages = simple_moving_average(series, window)?;

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Date"),
        ui::header_cell("Close"),
        ui::header_cell(&format!("SMA ({window})")),
    ]);

    let skip = averages.len().saturating_sub(rows);
    for (point, (_, sma)) in series.points().iter().zip(&averages).skip(skip) {
        table.add_row(vec![
            Cell::new(point.timestamp.format("%Y-%m-%d")),
            ui::format_optional_cell(point.close, |c| format!("{c:.2}")),
            ui::format_optional_cell(*sma, |v| format!("{v:.2}")),
        ]);
    }
    Ok(table.to_string())
}

pub async fn run(app: &App, selection: &Selection, window: usize, rows: usize) -> Result<()> {
    let batch = app.fetch(selection).await?;
    let mut warnings = batch.warnings;

    for ticker in &batch.tickers {
        let Some(series) = batch.series.get(ticker) else {
            continue;
        };
        if let Some(warning) = check(ticker, series) {
            merge_warnings(&mut warnings, vec![warning]);
            continue;
        }
        println!(
            "\n{} ({})\n{}",
            ui::style_text(ticker, ui::StyleType::Title),
            batch.window,
            render_sma(series, window, rows)?
        );
    }

    ui::print_warnings(&warnings);
    Ok(())
}
