//! Side-by-side comparison of several tickers and their return correlation.
//!
//! Each ticker's returns come from its own consecutive closes, so its
//! calendar never depends on which other tickers are selected. The return
//! columns are then aligned on timestamp; timestamps missing from some
//! tickers stay as gaps and correlations use pairwise-complete observations.

use crate::core::metrics::{dated_returns, mean};
use crate::core::series::{PriceSeries, check, validate};
use crate::core::warning::{DataWarning, Outcome};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, warn};

/// Square, symmetric matrix of Pearson correlations between ticker returns.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    tickers: Vec<String>,
    values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    pub fn rows(&self) -> &[Vec<Option<f64>>] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }

    /// Correlation between two tickers, `None` if either is absent or the
    /// coefficient is undefined.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.tickers.iter().position(|t| t == a)?;
        let j = self.tickers.iter().position(|t| t == b)?;
        self.values[i][j]
    }
}

/// Returns indexed by timestamp, one column per ticker.
pub type AlignedReturns = BTreeMap<DateTime<Utc>, Vec<Option<f64>>>;

fn usable_tickers<'a>(
    series_by_ticker: &'a HashMap<String, PriceSeries>,
    tickers: &'a [String],
) -> Vec<(&'a str, &'a PriceSeries)> {
    let mut seen = HashSet::new();
    tickers
        .iter()
        .filter(|t| seen.insert(t.as_str()))
        .filter_map(|t| {
            let series = series_by_ticker.get(t)?;
            validate(t, series).then_some((t.as_str(), series))
        })
        .collect()
}

/// Outer-joins the per-ticker returns of `columns` on the timestamp of the
/// later observation of each pair.
pub fn align_returns(columns: &[&PriceSeries]) -> AlignedReturns {
    let mut table: AlignedReturns = BTreeMap::new();
    for (col, series) in columns.iter().enumerate() {
        for (timestamp, ret) in dated_returns(series) {
            let row = table
                .entry(timestamp)
                .or_insert_with(|| vec![None; columns.len()]);
            row[col] = Some(ret);
        }
    }
    table
}

fn column(table: &AlignedReturns, col: usize) -> Vec<Option<f64>> {
    table.values().map(|row| row[col]).collect()
}

/// Pearson correlation over the positions where both sides are present.
pub fn pairwise_pearson(x: &[Option<f64>], y: &[Option<f64>]) -> Option<f64> {
    let (xs, ys): (Vec<f64>, Vec<f64>) = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .unzip();
    if xs.len() < 2 {
        return None;
    }

    let mean_x = mean(&xs)?;
    let mean_y = mean(&ys)?;
    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in xs.iter().zip(&ys) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some((cov / (var_x * var_y).sqrt()).clamp(-1.0, 1.0))
}

/// Builds the return correlation matrix for the tickers that have data.
///
/// Returns `None` with a [`DataWarning::NoValidSeries`] warning when no
/// ticker has a usable series.
pub fn build_correlation_matrix(
    series_by_ticker: &HashMap<String, PriceSeries>,
    tickers: &[String],
) -> Outcome<Option<CorrelationMatrix>> {
    let usable = usable_tickers(series_by_ticker, tickers);
    if usable.is_empty() {
        warn!("{}", DataWarning::NoValidSeries);
        return Outcome::with_warnings(None, vec![DataWarning::NoValidSeries]);
    }

    let columns: Vec<&PriceSeries> = usable.iter().map(|(_, s)| *s).collect();
    let table = align_returns(&columns);
    debug!(
        "Aligned {} tickers over {} return timestamps",
        columns.len(),
        table.len()
    );

    let returns: Vec<Vec<Option<f64>>> = (0..columns.len())
        .map(|col| column(&table, col))
        .collect();

    let n = returns.len();
    let mut values = vec![vec![None; n]; n];
    for i in 0..n {
        values[i][i] = pairwise_pearson(&returns[i], &returns[i]).map(|_| 1.0);
        for j in (i + 1)..n {
            let corr = pairwise_pearson(&returns[i], &returns[j]);
            values[i][j] = corr;
            values[j][i] = corr;
        }
    }

    Outcome::new(Some(CorrelationMatrix {
        tickers: usable.iter().map(|(t, _)| t.to_string()).collect(),
        values,
    }))
}

/// Series ready for side-by-side plotting. Tickers without data are left out
/// with a warning each.
pub fn comparative_plot_data(
    series_by_ticker: &HashMap<String, PriceSeries>,
    tickers: &[String],
) -> Outcome<BTreeMap<String, PriceSeries>> {
    let mut plot_data = BTreeMap::new();
    let mut warnings = Vec::new();

    for ticker in tickers {
        let empty = PriceSeries::empty();
        let series = series_by_ticker.get(ticker).unwrap_or(&empty);
        match check(ticker, series) {
            None => {
                plot_data.insert(ticker.clone(), series.clone());
            }
            Some(warning) => {
                warn!("{warning}. It will not be included in the comparison.");
                if !warnings.contains(&warning) {
                    warnings.push(warning);
                }
            }
        }
    }

    Outcome::with_warnings(plot_data, warnings)
}
