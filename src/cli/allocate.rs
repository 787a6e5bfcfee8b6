use super::{App, Selection, merge_warnings, normalize_tickers, ui};
use crate::core::allocation::{Allocation, allocate, return_shares};
use crate::core::metrics::{MetricsResult, compute_metrics};
use crate::core::price::{SeriesMap, Window};
use crate::core::series::validate;
use crate::core::warning::Outcome;
use anyhow::{Context, Result, anyhow, bail};
use comfy_table::Cell;
use std::collections::HashMap;
use tracing::info;

/// Parses a single `TICKER=PERCENT` pair, e.g. `SPY=60`.
pub fn parse_weight(s: &str) -> Result<(String, f64)> {
    let (ticker, pct) = s
        .split_once('=')
        .ok_or_else(|| anyhow!("Expected TICKER=PERCENT, got '{s}'"))?;
    let pct: f64 = pct
        .trim()
        .trim_end_matches('%')
        .parse()
        .with_context(|| format!("Invalid percentage for {}: '{pct}'", ticker.trim()))?;
    Ok((ticker.trim().to_uppercase(), pct))
}

fn render_allocations(allocations: &[Allocation]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Ticker"),
        ui::header_cell("Weight"),
        ui::header_cell("Invested"),
        ui::header_cell("Final Value"),
        ui::header_cell("Gain"),
    ]);
    for a in allocations {
        table.add_row(vec![
            Cell::new(&a.ticker),
            ui::format_optional_cell(Some(a.percentage), |p| format!("{p:.2}%")),
            ui::amount_cell(a.invested),
            ui::format_optional_cell(a.final_value, |v| format!("{v:.2}")),
            ui::format_optional_cell(a.gain, |g| format!("{g:.2}")),
        ]);
    }
    table.to_string()
}

fn render_shares(shares: &[(String, f64)]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Ticker"),
        ui::header_cell("Return Share"),
    ]);
    for (ticker, share) in shares {
        table.add_row(vec![
            Cell::new(ticker),
            ui::format_optional_cell(Some(*share), |s| format!("{s:.2}%")),
        ]);
    }
    table.to_string()
}

/// Allocation table followed by the share of returns per ticker.
pub fn render(
    total: f64,
    weights: &[(String, f64)],
    series: &SeriesMap,
) -> Result<Outcome<String>> {
    let metrics: HashMap<String, MetricsResult> = series
        .iter()
        .filter(|(ticker, s)| validate(ticker, s))
        .map(|(ticker, s)| (ticker.clone(), compute_metrics(s)))
        .collect();

    let allocations = allocate(total, weights, &metrics)?;
    let shares = return_shares(&allocations.value);

    let mut warnings = allocations.warnings;
    let mut output = format!(
        "{}\n{}\n",
        ui::style_text("Allocation", ui::StyleType::Title),
        render_allocations(&allocations.value)
    );

    let invested: f64 = allocations.value.iter().map(|a| a.invested).sum();
    let final_total: Option<f64> = allocations.value.iter().map(|a| a.final_value).sum();
    output.push_str(&format!(
        "\n{} {:.2}  {} {}\n",
        ui::style_text("Invested:", ui::StyleType::TotalLabel),
        invested,
        ui::style_text("Final value:", ui::StyleType::TotalLabel),
        ui::style_text(
            &final_total.map_or("N/A".to_string(), |v| format!("{v:.2}")),
            ui::StyleType::TotalValue
        ),
    ));

    if shares.value.is_empty() {
        output.push_str(&format!(
            "\n{}\n",
            ui::style_text("No positive returns to break down", ui::StyleType::Subtle)
        ));
    } else {
        output.push_str(&format!(
            "\n{}\n{}\n",
            ui::style_text("Share of returns", ui::StyleType::Title),
            render_shares(&shares.value)
        ));
    }
    merge_warnings(&mut warnings, shares.warnings);

    Ok(Outcome::with_warnings(output, warnings))
}

pub async fn run(
    app: &App,
    total: Option<f64>,
    weights: &[(String, f64)],
    window: Option<Window>,
    refresh: bool,
) -> Result<()> {
    let raw: Vec<String> = weights.iter().map(|(t, _)| t.clone()).collect();
    let tickers = normalize_tickers(&raw)?;
    if tickers.len() != weights.len() {
        bail!("Each ticker can only be allocated once");
    }
    let weights: Vec<(String, f64)> = tickers
        .into_iter()
        .zip(weights.iter().map(|(_, pct)| *pct))
        .collect();
    let total = total.unwrap_or(app.config.simulation.amount);

    let selection = Selection {
        tickers: weights.iter().map(|(t, _)| t.clone()).collect(),
        window,
        refresh,
    };
    let batch = app.fetch(&selection).await?;
    info!("Allocating {total} across {} ETFs", weights.len());

    let report = render(total, &weights, &batch.series)?;
    let mut warnings = batch.warnings;
    merge_warnings(&mut warnings, report.warnings);

    println!("{}", report.value);
    ui::print_warnings(&warnings);
    Ok(())
}
