//! Price history abstractions: lookback windows, the provider trait and the
//! partial-failure tolerant batch fetch.

use crate::core::series::PriceSeries;
use crate::core::warning::{DataWarning, Outcome};
use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use chrono::NaiveDate;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;
use tracing::{debug, warn};

pub type SeriesMap = HashMap<String, PriceSeries>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "1Y")]
    OneYear,
    #[serde(rename = "3Y")]
    ThreeYears,
    #[serde(rename = "5Y")]
    FiveYears,
    #[serde(rename = "10Y")]
    TenYears,
    #[serde(rename = "YTD")]
    YearToDate,
}

impl Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Period::OneYear => "1Y",
                Period::ThreeYears => "3Y",
                Period::FiveYears => "5Y",
                Period::TenYears => "10Y",
                Period::YearToDate => "YTD",
            }
        )
    }
}

impl FromStr for Period {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "1Y" => Ok(Period::OneYear),
            "3Y" => Ok(Period::ThreeYears),
            "5Y" => Ok(Period::FiveYears),
            "10Y" => Ok(Period::TenYears),
            "YTD" => Ok(Period::YearToDate),
            _ => Err(anyhow!(
                "Invalid period: {}. Expected one of 1Y, 3Y, 5Y, 10Y, YTD",
                s
            )),
        }
    }
}

/// How far back to look: a named period or an explicit, inclusive date range.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Window {
    Period(Period),
    Range { start: NaiveDate, end: NaiveDate },
}

impl Window {
    pub fn range(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            bail!("Date range end {end} is before start {start}");
        }
        Ok(Window::Range { start, end })
    }
}

impl Default for Window {
    fn default() -> Self {
        Window::Period(Period::FiveYears)
    }
}

impl Display for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Window::Period(period) => write!(f, "{period}"),
            Window::Range { start, end } => write!(f, "{start}..{end}"),
        }
    }
}

impl FromStr for Window {
    type Err = anyhow::Error;

    /// Accepts a period (`5Y`) or a date range (`2020-01-01..2021-06-30`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once("..") {
            Some((start, end)) => {
                let start = NaiveDate::parse_from_str(start.trim(), "%Y-%m-%d")
                    .with_context(|| format!("Invalid start date in range: {s}"))?;
                let end = NaiveDate::parse_from_str(end.trim(), "%Y-%m-%d")
                    .with_context(|| format!("Invalid end date in range: {s}"))?;
                Window::range(start, end)
            }
            None => Ok(Window::Period(s.parse()?)),
        }
    }
}

/// Cache key for a batch fetch. Ticker order and duplicates do not matter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeriesKey {
    pub tickers: Vec<String>,
    pub window: Window,
}

impl SeriesKey {
    pub fn new(tickers: &[String], window: Window) -> Self {
        let mut tickers = tickers.to_vec();
        tickers.sort();
        tickers.dedup();
        Self { tickers, window }
    }
}

#[async_trait]
pub trait SeriesProvider: Send + Sync {
    async fn fetch_series(&self, ticker: &str, window: &Window) -> Result<PriceSeries>;
}

/// Fetches every ticker concurrently. A failing ticker gets an empty series
/// and a [`DataWarning::FetchFailed`] instead of failing the batch.
pub async fn fetch_all(
    provider: &dyn SeriesProvider,
    tickers: &[String],
    window: &Window,
) -> Outcome<SeriesMap> {
    let futures = tickers.iter().map(|ticker| async move {
        let result = provider.fetch_series(ticker, window).await;
        (ticker.clone(), result)
    });

    let mut series = HashMap::new();
    let mut warnings = Vec::new();
    for (ticker, result) in join_all(futures).await {
        match result {
            Ok(s) => {
                debug!("Fetched {} observations for {}", s.len(), ticker);
                series.insert(ticker, s);
            }
            Err(e) => {
                warn!("Failed to fetch {ticker}: {e:#}");
                warnings.push(DataWarning::FetchFailed {
                    ticker: ticker.clone(),
                    reason: format!("{e:#}"),
                });
                series.insert(ticker, PriceSeries::empty());
            }
        }
    }

    if !series.values().any(|s| !s.is_empty()) && !tickers.is_empty() {
        warn!("{}", DataWarning::NoValidSeries);
        warnings.push(DataWarning::NoValidSeries);
    }

    Outcome::with_warnings(series, warnings)
}
