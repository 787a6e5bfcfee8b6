//! Return statistics derived from a single price series.
use crate::core::series::PriceSeries;
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, prelude::*};
use rust_finprim::rate::cagr;
use tracing::debug;

const SECONDS_PER_YEAR: f64 = 365.25 * 86_400.0;

/// Shortest span that is annualized. A one-year window rarely spans a full
/// 365 days of bars, so this is a little under a year.
pub const MIN_ANNUALIZED_DAYS: i64 = 330;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MetricsResult {
    /// Arithmetic mean of the period-over-period returns.
    pub average_return: Option<f64>,
    /// Population standard deviation of the period-over-period returns.
    pub volatility: Option<f64>,
    /// Last close over first close, minus one.
    pub cumulative_return: Option<f64>,
}

/// Period-over-period percentage changes, each stamped with the later of
/// the two observations. Pairs where either close is missing are dropped,
/// nothing is filled.
pub fn dated_returns(series: &PriceSeries) -> Vec<(DateTime<Utc>, f64)> {
    series
        .points()
        .windows(2)
        .filter_map(|pair| match (pair[0].close, pair[1].close) {
            (Some(prev), Some(curr)) => Some((pair[1].timestamp, curr / prev - 1.0)),
            _ => None,
        })
        .collect()
}

/// Period-over-period percentage changes. Pairs where either close is
/// missing are dropped, nothing is filled.
pub fn period_returns(series: &PriceSeries) -> Vec<f64> {
    dated_returns(series).into_iter().map(|(_, r)| r).collect()
}

pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

pub(crate) fn population_std_dev(values: &[f64]) -> Option<f64> {
    let avg = mean(values)?;
    let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

/// Computes average return, volatility and cumulative return.
///
/// Series with fewer than two observations, or without any closing price,
/// yield a result with every field undefined. The cumulative return is taken
/// from the raw endpoints, so it can differ from compounding the
/// period returns when intermediate closes are missing.
pub fn compute_metrics(series: &PriceSeries) -> MetricsResult {
    if series.len() < 2 || !series.has_close() {
        debug!(
            "Insufficient data for metrics: {} observations",
            series.len()
        );
        return MetricsResult::default();
    }

    let returns = period_returns(series);
    let cumulative_return = match (
        series.first().and_then(|p| p.close),
        series.last().and_then(|p| p.close),
    ) {
        (Some(first), Some(last)) => Some(last / first - 1.0),
        _ => None,
    };

    MetricsResult {
        average_return: mean(&returns),
        volatility: population_std_dev(&returns),
        cumulative_return,
    }
}

/// Compound annual growth rate between the first and last close, over the
/// calendar span of the series.
///
/// `None` for spans shorter than [`MIN_ANNUALIZED_DAYS`] and when the growth
/// factor does not fit a `Decimal`.
pub fn annualized_return(series: &PriceSeries) -> Option<f64> {
    let first = series.first()?;
    let last = series.last()?;
    let (begin, end) = (first.close?, last.close?);

    let span = last.timestamp - first.timestamp;
    if span.num_days() < MIN_ANNUALIZED_DAYS {
        debug!("Span of {} days is too short to annualize", span.num_days());
        return None;
    }
    let years = span.num_seconds() as f64 / SECONDS_PER_YEAR;

    let begin_bal = Decimal::from_f64(begin)?;
    let end_bal = Decimal::from_f64(end)?;
    let n_years = Decimal::from_f64(years)?;
    // cagr panics on overflow, so the growth factor is checked first
    end_bal
        .checked_div(begin_bal)?
        .checked_powd(Decimal::ONE.checked_div(n_years)?)?;
    let rate = cagr(begin_bal, end_bal, n_years);
    debug!("cagr: {begin_bal}, {end_bal}, {n_years} = {rate}");
    rate.to_f64()
}
