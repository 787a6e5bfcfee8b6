//! Splitting an investment across tickers and the monetary returns it would have earned.
use crate::core::growth::project_lump_sum;
use crate::core::metrics::MetricsResult;
use crate::core::warning::{DataWarning, Outcome};
use anyhow::{Result, bail};
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    pub ticker: String,
    pub percentage: f64,
    pub invested: f64,
    /// Value at the end of the period, if the ticker has a cumulative return.
    pub final_value: Option<f64>,
    pub gain: Option<f64>,
}

/// Distributes `total` across `weights` (ticker, percentage) and projects
/// each slice through the ticker's historical cumulative return.
pub fn allocate(
    total: f64,
    weights: &[(String, f64)],
    metrics_by_ticker: &HashMap<String, MetricsResult>,
) -> Result<Outcome<Vec<Allocation>>> {
    if !total.is_finite() || total < 0.0 {
        bail!("Investment amount must be a non-negative number, got {total}");
    }
    if let Some((ticker, pct)) = weights
        .iter()
        .find(|(_, pct)| !pct.is_finite() || !(0.0..=100.0).contains(pct))
    {
        bail!("Allocation for {ticker} must be between 0 and 100%, got {pct}");
    }
    let assigned: f64 = weights.iter().map(|(_, pct)| pct).sum();
    if assigned > 100.0 + 1e-9 {
        bail!("Allocations add up to {assigned:.2}%, which exceeds 100%");
    }

    let mut warnings = Vec::new();
    let allocations = weights
        .iter()
        .map(|(ticker, pct)| {
            let invested = total * pct / 100.0;
            let cumulative = metrics_by_ticker
                .get(ticker)
                .and_then(|m| m.cumulative_return);
            if cumulative.is_none() {
                warnings.push(DataWarning::NoData(ticker.clone()));
            }
            let final_value = cumulative.map(|r| project_lump_sum(invested, r));
            debug!("Allocated {invested} to {ticker}, final value {final_value:?}");
            Allocation {
                ticker: ticker.clone(),
                percentage: *pct,
                invested,
                final_value,
                gain: final_value.map(|v| v - invested),
            }
        })
        .collect();

    Ok(Outcome::with_warnings(allocations, warnings))
}

/// Each positive gain as a percentage of the total invested amount.
/// Losses, undefined and non-finite gains are left out.
pub fn return_shares(allocations: &[Allocation]) -> Outcome<Vec<(String, f64)>> {
    let total: f64 = allocations.iter().map(|a| a.invested).sum();
    if total <= 0.0 {
        return Outcome::with_warnings(Vec::new(), vec![DataWarning::NoValidSeries]);
    }

    let shares: Vec<(String, f64)> = allocations
        .iter()
        .filter_map(|a| {
            let share = a.gain? / total * 100.0;
            (share.is_finite() && share > 0.0).then(|| (a.ticker.clone(), share))
        })
        .collect();

    if shares.is_empty() {
        Outcome::with_warnings(shares, vec![DataWarning::NoValidSeries])
    } else {
        Outcome::new(shares)
    }
}
