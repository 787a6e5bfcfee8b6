use super::{App, Selection, merge_warnings, ui};
use crate::core::growth::{SimulationConfig, project_lump_sum};
use crate::core::metrics::{annualized_return, compute_metrics};
use crate::core::price::SeriesMap;
use crate::core::series::{PriceSeries, check};
use crate::core::warning::{DataWarning, Outcome};
use anyhow::Result;
use comfy_table::Cell;
use tracing::{debug, info};

/// What `amount` invested at the start of the window is worth at its end.
pub fn render_lump_sum(amount: f64, tickers: &[String], series: &SeriesMap) -> Outcome<String> {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Ticker"),
        ui::header_cell("Invested"),
        ui::header_cell("Cumulative Return"),
        ui::header_cell("Final Value"),
        ui::header_cell("Gain"),
    ]);

    let mut warnings = Vec::new();
    let empty = PriceSeries::empty();
    for ticker in tickers {
        let s = series.get(ticker).unwrap_or(&empty);
        let cumulative = match check(ticker, s) {
            Some(warning) => {
                warnings.push(warning);
                None
            }
            None => compute_metrics(s).cumulative_return,
        };
        let final_value = cumulative.map(|r| project_lump_sum(amount, r));
        table.add_row(vec![
            Cell::new(ticker),
            ui::amount_cell(amount),
            ui::change_cell(cumulative),
            ui::format_optional_cell(final_value, |v| format!("{v:.2}")),
            ui::format_optional_cell(final_value.map(|v| v - amount), |g| format!("{g:.2}")),
        ]);
    }

    Outcome::with_warnings(table.to_string(), warnings)
}

/// Balance after each year for every ticker, compounding at the given rates.
pub fn render_projection(config: &SimulationConfig, rates: &[(String, Option<f64>)]) -> String {
    let mut table = ui::new_styled_table();
    let mut header = vec![ui::header_cell("Year")];
    header.extend(rates.iter().map(|(ticker, rate)| {
        let label = match rate {
            Some(r) => format!("{ticker} ({})", ui::format_percent(*r)),
            None => ticker.clone(),
        };
        ui::header_cell(&label)
    }));
    table.set_header(header);

    let trajectories: Vec<Option<Vec<f64>>> = rates
        .iter()
        .map(|(_, rate)| rate.map(|r| config.simulate(r)))
        .collect();

    for year in 0..=config.horizon_years as usize {
        let mut row = vec![Cell::new(year)];
        row.extend(trajectories.iter().map(|trajectory| {
            ui::format_optional_cell(trajectory.as_ref().map(|t| t[year]), |v| format!("{v:.2}"))
        }));
        table.add_row(row);
    }
    table.to_string()
}

/// Annual growth rate used for a ticker's projection: the override when
/// given, otherwise the ticker's historical annualized return.
pub fn projection_rates(
    tickers: &[String],
    series: &SeriesMap,
    rate_override: Option<f64>,
) -> Outcome<Vec<(String, Option<f64>)>> {
    let mut warnings = Vec::new();
    let empty = PriceSeries::empty();
    let rates = tickers
        .iter()
        .map(|ticker| {
            if rate_override.is_some() {
                return (ticker.clone(), rate_override);
            }
            let s = series.get(ticker).unwrap_or(&empty);
            let rate = match check(ticker, s) {
                Some(warning) => {
                    warnings.push(warning);
                    None
                }
                None => {
                    let rate = annualized_return(s);
                    if rate.is_none() {
                        warnings.push(DataWarning::ShortHistory(ticker.clone()));
                    }
                    rate
                }
            };
            debug!("Projection rate for {ticker}: {rate:?}");
            (ticker.clone(), rate)
        })
        .collect();
    Outcome::with_warnings(rates, warnings)
}

pub async fn run_lump_sum(app: &App, selection: &Selection, amount: Option<f64>) -> Result<()> {
    let config = SimulationConfig::new(
        amount.unwrap_or(app.config.simulation.amount),
        0.0,
        0,
    )?;
    let batch = app.fetch(selection).await?;
    info!(
        "Simulating {} invested over {}",
        config.amount, batch.window
    );

    let report = render_lump_sum(config.amount, &batch.tickers, &batch.series);
    let mut warnings = batch.warnings;
    merge_warnings(&mut warnings, report.warnings);

    println!(
        "{} ({})\n{}",
        ui::style_text("Lump-sum investment", ui::StyleType::Title),
        batch.window,
        report.value
    );
    ui::print_warnings(&warnings);
    Ok(())
}

pub struct ProjectionArgs {
    pub amount: Option<f64>,
    pub contribution: Option<f64>,
    pub years: Option<u32>,
    pub rate: Option<f64>,
}

pub async fn run_projection(app: &App, selection: &Selection, args: &ProjectionArgs) -> Result<()> {
    let defaults = &app.config.simulation;
    let config = SimulationConfig::new(
        args.amount.unwrap_or(defaults.amount),
        args.contribution.unwrap_or(defaults.contribution),
        args.years.unwrap_or(defaults.horizon_years),
    )?;

    let (tickers, window, mut warnings, series) = if args.rate.is_some() {
        let (tickers, window) = app.resolve(selection)?;
        (tickers, window, Vec::new(), SeriesMap::new())
    } else {
        let batch = app.fetch(selection).await?;
        (batch.tickers, batch.window, batch.warnings, batch.series)
    };
    info!("Projecting {config:?} for {}", tickers.join(", "));

    let rates = projection_rates(&tickers, &series, args.rate);
    merge_warnings(&mut warnings, rates.warnings);

    let source = if args.rate.is_some() {
        "fixed annual rate".to_string()
    } else {
        format!("annualized return over {window}")
    };
    println!(
        "{} ({source}, {:.2} initial, {:.2} per year)\n{}",
        ui::style_text("Projected balance", ui::StyleType::Title),
        config.amount,
        config.contribution,
        render_projection(&config, &rates.value)
    );
    ui::print_warnings(&warnings);
    Ok(())
}
