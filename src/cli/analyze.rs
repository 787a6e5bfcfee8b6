use super::{App, Selection, merge_warnings, ui};
use crate::core::catalog;
use crate::core::correlation::{CorrelationMatrix, build_correlation_matrix, comparative_plot_data};
use crate::core::metrics::{annualized_return, compute_metrics};
use crate::core::price::SeriesMap;
use crate::core::series::{PriceSeries, validate};
use crate::core::warning::Outcome;
use anyhow::Result;
use comfy_table::Cell;
use std::collections::BTreeMap;
use tracing::info;

fn render_overview(tickers: &[String], plot_data: &BTreeMap<String, PriceSeries>) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Ticker"),
        ui::header_cell("Description"),
        ui::header_cell("From"),
        ui::header_cell("To"),
        ui::header_cell("Days"),
        ui::header_cell("First Close"),
        ui::header_cell("Last Close"),
    ]);

    for ticker in tickers {
        let Some(series) = plot_data.get(ticker) else {
            continue;
        };
        let description = catalog::lookup(ticker).map_or("", |etf| etf.description);
        let (first, last) = (series.first(), series.last());
        table.add_row(vec![
            Cell::new(ticker),
            Cell::new(description),
            ui::format_optional_cell(first, |p| p.timestamp.format("%Y-%m-%d").to_string()),
            ui::format_optional_cell(last, |p| p.timestamp.format("%Y-%m-%d").to_string()),
            Cell::new(series.len()),
            ui::format_optional_cell(first.and_then(|p| p.close), |c| format!("{c:.2}")),
            ui::format_optional_cell(last.and_then(|p| p.close), |c| format!("{c:.2}")),
        ]);
    }
    table.to_string()
}

fn render_metrics(tickers: &[String], series: &SeriesMap) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Ticker"),
        ui::header_cell("Avg Daily Return"),
        ui::header_cell("Volatility"),
        ui::header_cell("Cumulative"),
        ui::header_cell("Annualized"),
    ]);

    let empty = PriceSeries::empty();
    for ticker in tickers {
        let s = series.get(ticker).unwrap_or(&empty);
        if !validate(ticker, s) {
            table.add_row(vec![
                Cell::new(ticker),
                ui::na_cell(),
                ui::na_cell(),
                ui::na_cell(),
                ui::na_cell(),
            ]);
            continue;
        }
        let metrics = compute_metrics(s);
        table.add_row(vec![
            Cell::new(ticker),
            ui::format_optional_cell(metrics.average_return, |r| format!("{:.4}%", r * 100.0)),
            ui::format_optional_cell(metrics.volatility, |v| format!("{:.4}%", v * 100.0)),
            ui::change_cell(metrics.cumulative_return),
            ui::change_cell(annualized_return(s)),
        ]);
    }
    table.to_string()
}

fn render_correlation(matrix: &CorrelationMatrix) -> String {
    let mut table = ui::new_styled_table();
    let mut header = vec![ui::header_cell("")];
    header.extend(matrix.tickers().iter().map(|t| ui::header_cell(t)));
    table.set_header(header);

    for (ticker, row) in matrix.tickers().iter().zip(matrix.rows()) {
        let mut cells = vec![ui::header_cell(ticker)];
        cells.extend(
            row.iter()
                .map(|v| ui::format_optional_cell(*v, |c| format!("{c:.2}"))),
        );
        table.add_row(cells);
    }
    table.to_string()
}

/// Overview, return metrics and correlation for the fetched tickers.
pub fn render(tickers: &[String], series: &SeriesMap) -> Outcome<String> {
    let mut warnings = Vec::new();
    let plot = comparative_plot_data(series, tickers);
    merge_warnings(&mut warnings, plot.warnings);

    let mut output = String::new();
    if plot.value.is_empty() {
        let correlation = build_correlation_matrix(series, tickers);
        merge_warnings(&mut warnings, correlation.warnings);
        return Outcome::with_warnings(output, warnings);
    }

    output.push_str(&format!(
        "{}\n{}\n",
        ui::style_text("Overview", ui::StyleType::Title),
        render_overview(tickers, &plot.value)
    ));
    output.push_str(&format!(
        "\n{}\n{}\n",
        ui::style_text("Returns", ui::StyleType::Title),
        render_metrics(tickers, series)
    ));

    let correlation = build_correlation_matrix(series, tickers);
    merge_warnings(&mut warnings, correlation.warnings);
    if let Some(matrix) = correlation.value {
        output.push_str(&format!(
            "\n{}\n{}\n",
            ui::style_text("Correlation of daily returns", ui::StyleType::Title),
            render_correlation(&matrix)
        ));
    }

    Outcome::with_warnings(output, warnings)
}

pub async fn run(app: &App, selection: &Selection) -> Result<()> {
    let batch = app.fetch(selection).await?;
    info!(
        "Analyzing {} over {}",
        batch.tickers.join(", "),
        batch.window
    );

    let report = render(&batch.tickers, &batch.series);
    let mut warnings = batch.warnings;
    merge_warnings(&mut warnings, report.warnings);

    if !report.value.is_empty() {
        println!("{}", report.value);
    }
    ui::print_warnings(&warnings);
    Ok(())
}
