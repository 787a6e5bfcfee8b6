//! Price series for a single ticker and the validation gate run before any analysis.

use crate::core::warning::DataWarning;
use anyhow::{Result, bail};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub close: Option<f64>,
}

impl PricePoint {
    pub fn new(timestamp: DateTime<Utc>, close: Option<f64>) -> Self {
        Self { timestamp, close }
    }
}

/// Daily closing prices ordered by strictly increasing timestamp.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Builds a series, rejecting out-of-order timestamps and non-positive closes.
    pub fn new(points: Vec<PricePoint>) -> Result<Self> {
        for pair in points.windows(2) {
            if pair[1].timestamp <= pair[0].timestamp {
                bail!(
                    "Timestamps must be strictly increasing: {} is not after {}",
                    pair[1].timestamp,
                    pair[0].timestamp
                );
            }
        }
        if let Some(point) = points
            .iter()
            .find(|p| p.close.is_some_and(|c| !c.is_finite() || c <= 0.0))
        {
            bail!(
                "Closing price at {} must be a positive number, got {:?}",
                point.timestamp,
                point.close
            );
        }
        Ok(Self { points })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn closes(&self) -> impl Iterator<Item = Option<f64>> + '_ {
        self.points.iter().map(|p| p.close)
    }

    /// True when at least one observation carries a closing price.
    pub fn has_close(&self) -> bool {
        self.points.iter().any(|p| p.close.is_some())
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }
}

/// Returns the reason a series cannot be analyzed, if any.
pub fn check(ticker: &str, series: &PriceSeries) -> Option<DataWarning> {
    if series.is_empty() {
        return Some(DataWarning::NoData(ticker.to_string()));
    }
    if !series.has_close() {
        return Some(DataWarning::MissingClose(ticker.to_string()));
    }
    None
}

/// Gate in front of every computation. Logs a warning and returns false for
/// unusable series; callers must skip the computation entirely.
pub fn validate(ticker: &str, series: &PriceSeries) -> bool {
    match check(ticker, series) {
        Some(warning) => {
            warn!("{warning}");
            false
        }
        None => true,
    }
}

#[cfg(test)]
pub(crate) fn daily_series_from(offset_days: i64, closes: &[Option<f64>]) -> PriceSeries {
    use chrono::{Duration, TimeZone};

    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(offset_days);
    let points = closes
        .iter()
        .enumerate()
        .map(|(i, close)| PricePoint::new(start + Duration::days(i as i64), *close))
        .collect();
    PriceSeries::new(points).unwrap()
}

#[cfg(test)]
pub(crate) fn daily_series(closes: &[f64]) -> PriceSeries {
    let closes: Vec<Option<f64>> = closes.iter().copied().map(Some).collect();
    daily_series_from(0, &closes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_new_rejects_unordered_timestamps() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let points = vec![
            PricePoint::new(t0, Some(10.0)),
            PricePoint::new(t0 - Duration::days(1), Some(11.0)),
        ];
        let err = PriceSeries::new(points).unwrap_err();
        assert!(err.to_string().contains("strictly increasing"));

        let duplicated = vec![PricePoint::new(t0, Some(10.0)), PricePoint::new(t0, None)];
        assert!(PriceSeries::new(duplicated).is_err());
    }

    #[test]
    fn test_new_rejects_non_positive_close() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        assert!(PriceSeries::new(vec![PricePoint::new(t0, Some(0.0))]).is_err());
        assert!(PriceSeries::new(vec![PricePoint::new(t0, Some(-3.0))]).is_err());
        assert!(PriceSeries::new(vec![PricePoint::new(t0, Some(f64::NAN))]).is_err());
        assert!(PriceSeries::new(vec![PricePoint::new(t0, None)]).is_ok());
    }

    #[test]
    fn test_validate_empty_series() {
        let series = PriceSeries::empty();
        assert!(!validate("FXI", &series));
        assert_eq!(
            check("FXI", &series),
            Some(DataWarning::NoData("FXI".to_string()))
        );
    }

    #[test]
    fn test_validate_series_without_closes() {
        let series = daily_series_from(0, &[None, None, None]);
        assert!(!validate("EWT", &series));
        assert_eq!(
            check("EWT", &series),
            Some(DataWarning::MissingClose("EWT".to_string()))
        );
    }

    #[test]
    fn test_validate_usable_series() {
        let series = daily_series_from(0, &[None, Some(10.0), Some(11.0)]);
        assert!(validate("SPY", &series));
        assert!(check("SPY", &series).is_none());
        // Validation never mutates the input
        assert_eq!(series.len(), 3);
    }
}
