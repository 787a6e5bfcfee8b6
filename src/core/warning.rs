//! Non-fatal conditions surfaced to the user next to a partial result.

use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataWarning {
    /// The series for this ticker has no observations.
    NoData(String),
    /// Observations exist but none of them carries a closing price.
    MissingClose(String),
    /// Nothing left to analyze after dropping unusable series.
    NoValidSeries,
    /// The history is too short to annualize its return.
    ShortHistory(String),
    /// The data provider failed for this ticker; an empty series was used instead.
    FetchFailed { ticker: String, reason: String },
}

impl Display for DataWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataWarning::NoData(ticker) => {
                write!(f, "{ticker} has no data for the selected period")
            }
            DataWarning::MissingClose(ticker) => {
                write!(f, "{ticker} has no closing prices in the downloaded data")
            }
            DataWarning::ShortHistory(ticker) => {
                write!(f, "{ticker} has too little history to annualize its return")
            }
            DataWarning::NoValidSeries => {
                write!(f, "No ticker has valid data for the selected period")
            }
            DataWarning::FetchFailed { ticker, reason } => {
                write!(f, "Failed to download data for {ticker}: {reason}")
            }
        }
    }
}

/// A computed value together with the warnings raised while computing it.
#[derive(Debug, Clone)]
pub struct Outcome<T> {
    pub value: T,
    pub warnings: Vec<DataWarning>,
}

impl<T> Outcome<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(value: T, warnings: Vec<DataWarning>) -> Self {
        Self { value, warnings }
    }
}
