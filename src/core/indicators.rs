//! Technical indicators.
use crate::core::series::PriceSeries;
use anyhow::{Result, bail};
use chrono::{DateTime, Utc};

pub const DEFAULT_SMA_WINDOW: usize = 20;

/// Rolling mean of the last `window` closes.
///
/// The value is `None` until `window` observations are available, and for
/// any window that contains a missing close.
pub fn simple_moving_average(
    series: &PriceSeries,
    window: usize,
) -> Result<Vec<(DateTime<Utc>, Option<f64>)>> {
    if window == 0 {
        bail!("Moving average window must be at least 1");
    }

    let points = series.points();
    let averages = points
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let value = if i + 1 < window {
                None
            } else {
                points[i + 1 - window..=i]
                    .iter()
                    .map(|p| p.close)
                    .sum::<Option<f64>>()
                    .map(|total| total / window as f64)
            };
            (point.timestamp, value)
        })
        .collect();
    Ok(averages)
}
