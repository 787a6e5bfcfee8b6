pub mod allocate;
pub mod analyze;
pub mod catalog;
pub mod indicator;
pub mod setup;
pub mod simulate;
pub mod ui;

use crate::core::catalog as etf_catalog;
use crate::core::config::AppConfig;
use crate::core::price::{SeriesMap, Window};
use crate::core::warning::DataWarning;
use crate::providers::CachingSeriesFetcher;
use anyhow::{Result, bail};
use tracing::debug;

/// Which tickers and window a command works on. Empty fields fall back to
/// the configured defaults.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub tickers: Vec<String>,
    pub window: Option<Window>,
    /// Drop any cached data for this selection before fetching.
    pub refresh: bool,
}

/// Series fetched for a selection, in the order the user asked for them.
pub struct Batch {
    pub tickers: Vec<String>,
    pub window: Window,
    pub series: SeriesMap,
    pub warnings: Vec<DataWarning>,
}

/// Everything a command handler needs.
pub struct App {
    pub config: AppConfig,
    fetcher: CachingSeriesFetcher,
}

impl App {
    pub fn new(config: AppConfig, fetcher: CachingSeriesFetcher) -> Self {
        Self { config, fetcher }
    }

    pub fn resolve(&self, selection: &Selection) -> Result<(Vec<String>, Window)> {
        let tickers = if selection.tickers.is_empty() {
            normalize_tickers(&self.config.defaults.tickers)?
        } else {
            normalize_tickers(&selection.tickers)?
        };
        let window = selection
            .window
            .clone()
            .unwrap_or(Window::Period(self.config.defaults.period));
        Ok((tickers, window))
    }

    pub async fn fetch(&self, selection: &Selection) -> Result<Batch> {
        let (tickers, window) = self.resolve(selection)?;
        if selection.refresh {
            self.fetcher.invalidate(&tickers, &window).await;
        }

        let pb = ui::new_spinner(&format!(
            "Fetching {} for {window}...",
            tickers.join(", ")
        ));
        let outcome = self.fetcher.fetch(&tickers, &window).await;
        pb.finish_and_clear();

        debug!(
            "Fetched {} series with {} warnings",
            outcome.value.len(),
            outcome.warnings.len()
        );
        Ok(Batch {
            tickers,
            window,
            series: outcome.value,
            warnings: outcome.warnings,
        })
    }
}

/// Appends warnings that are not already present.
pub fn merge_warnings(warnings: &mut Vec<DataWarning>, more: Vec<DataWarning>) {
    for warning in more {
        if !warnings.contains(&warning) {
            warnings.push(warning);
        }
    }
}

/// Upper-cases, trims and de-duplicates tickers, keeping the first
/// occurrence. Tickers outside the catalog are rejected.
pub fn normalize_tickers(raw: &[String]) -> Result<Vec<String>> {
    let mut tickers: Vec<String> = Vec::new();
    for ticker in raw {
        let ticker = ticker.trim().to_uppercase();
        if ticker.is_empty() || tickers.contains(&ticker) {
            continue;
        }
        if !etf_catalog::is_supported(&ticker) {
            bail!("Unsupported ticker: {ticker}. Run `etfscope catalog` to list supported ETFs");
        }
        tickers.push(ticker);
    }
    if tickers.is_empty() {
        bail!("Select at least one ETF");
    }
    Ok(tickers)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalize_tickers() {
        let tickers = normalize_tickers(&strings(&[" spy", "FXI", "Spy", ""])).unwrap();
        assert_eq!(tickers, strings(&["SPY", "FXI"]));
    }

    #[test]
    fn test_normalize_rejects_unknown_and_empty() {
        let err = normalize_tickers(&strings(&["SPY", "AAPL"])).unwrap_err();
        assert!(err.to_string().contains("Unsupported ticker: AAPL"));
        assert!(normalize_tickers(&strings(&[" "])).is_err());
    }
}
