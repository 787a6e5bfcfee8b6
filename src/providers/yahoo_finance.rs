use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{Days, TimeZone, Utc};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::core::price::{Period, SeriesProvider, Window};
use crate::core::series::{PricePoint, PriceSeries};
use crate::providers::util::send_with_retry;

const RETRIES: usize = 3;
const RETRY_DELAY: Duration = Duration::from_millis(500);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

fn range_param(period: Period) -> &'static str {
    match period {
        Period::OneYear => "1y",
        Period::ThreeYears => "3y",
        Period::FiveYears => "5y",
        Period::TenYears => "10y",
        Period::YearToDate => "ytd",
    }
}

fn window_query(window: &Window) -> String {
    match window {
        Window::Period(period) => format!("range={}", range_param(*period)),
        Window::Range { start, end } => {
            let start = start.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc().timestamp());
            // The end date is inclusive, so ask for everything before the next midnight
            let end = end
                .checked_add_days(Days::new(1))
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc().timestamp());
            format!(
                "period1={}&period2={}",
                start.unwrap_or_default(),
                end.unwrap_or_default()
            )
        }
    }
}

/// Fetches daily closing prices from the Yahoo Finance chart API.
pub struct YahooFinanceProvider {
    base_url: String,
}

impl YahooFinanceProvider {
    pub fn new(base_url: &str) -> Self {
        YahooFinanceProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[derive(Deserialize, Debug)]
struct YahooChartResponse {
    chart: ChartResult,
}

#[derive(Deserialize, Debug)]
struct ChartResult {
    result: Option<Vec<ChartItem>>,
    error: Option<ChartError>,
}

#[derive(Deserialize, Debug)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Deserialize, Debug)]
struct ChartItem {
    timestamp: Option<Vec<i64>>,
    indicators: Option<Indicators>,
}

#[derive(Deserialize, Debug)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Deserialize, Debug)]
struct Quote {
    close: Option<Vec<Option<f64>>>,
}

/// Turns the parallel timestamp/close arrays into a series. Bars that do not
/// move time forward are dropped; non-positive closes count as missing.
fn build_series(ticker: &str, item: &ChartItem) -> Result<PriceSeries> {
    let Some(timestamps) = item.timestamp.as_ref() else {
        debug!("No bars returned for {ticker}");
        return Ok(PriceSeries::empty());
    };
    let closes = item
        .indicators
        .as_ref()
        .and_then(|inds| inds.quote.first())
        .and_then(|q| q.close.as_ref());

    let mut points: Vec<PricePoint> = Vec::with_capacity(timestamps.len());
    for (i, ts) in timestamps.iter().enumerate() {
        let Some(timestamp) = Utc.timestamp_opt(*ts, 0).single() else {
            debug!("Skipping invalid timestamp {ts} for {ticker}");
            continue;
        };
        if points.last().is_some_and(|p| p.timestamp >= timestamp) {
            debug!("Skipping out-of-order bar at {timestamp} for {ticker}");
            continue;
        }
        let close = closes
            .and_then(|c| c.get(i).copied().flatten())
            .filter(|c| c.is_finite() && *c > 0.0);
        points.push(PricePoint::new(timestamp, close));
    }

    PriceSeries::new(points).with_context(|| format!("Malformed price history for {ticker}"))
}

#[async_trait]
impl SeriesProvider for YahooFinanceProvider {
    #[instrument(
        name = "YahooSeriesFetch",
        skip_all,
        fields(ticker = %ticker, window = %window)
    )]
    async fn fetch_series(&self, ticker: &str, window: &Window) -> Result<PriceSeries> {
        let url = format!(
            "{}/v8/finance/chart/{}?interval=1d&{}",
            self.base_url,
            ticker,
            window_query(window)
        );
        debug!("Requesting price history from {}", url);

        let client = reqwest::Client::builder()
            .user_agent("etfscope/0.1")
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        let response = send_with_retry(|| client.get(&url).send(), RETRIES, RETRY_DELAY)
            .await
            .with_context(|| format!("Request error for ticker: {ticker}"))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for ticker: {}",
                response.status(),
                ticker
            ));
        }

        let text = response.text().await?;
        let data: YahooChartResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse JSON response for {}: {}", ticker, e))?;

        if let Some(error) = data.chart.error {
            return Err(anyhow!(
                "Yahoo error for {}: {} ({})",
                ticker,
                error.description,
                error.code
            ));
        }

        let item = data
            .chart
            .result
            .and_then(|items| items.into_iter().next())
            .ok_or_else(|| anyhow!("No price data found for ticker: {}", ticker))?;

        let series = build_series(ticker, &item)?;
        debug!(
            "Parsed {} observations for {} ({:?} to {:?})",
            series.len(),
            ticker,
            series.first().map(|p| p.timestamp),
            series.last().map(|p| p.timestamp)
        );
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, NaiveDate};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn midnight(date: NaiveDate) -> DateTime<Utc> {
        date.and_hms_opt(0, 0, 0).unwrap().and_utc()
    }

    async fn create_mock_server(ticker: &str, status: u16, body: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/v8/finance/chart/{ticker}")))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&mock_server)
            .await;
        mock_server
    }

    fn chart_body(timestamps: &[i64], closes: &str) -> String {
        let timestamps = timestamps
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            r#"{{
                "chart": {{
                    "result": [{{
                        "meta": {{ "currency": "USD", "regularMarketPrice": 101.0 }},
                        "timestamp": [{timestamps}],
                        "indicators": {{ "quote": [{{ "close": [{closes}] }}] }}
                    }}],
                    "error": null
                }}
            }}"#
        )
    }

    #[tokio::test]
    async fn test_successful_series_fetch() {
        let body = chart_body(&[1_700_000_000, 1_700_086_400, 1_700_172_800], "100.0, null, 102.5");
        let mock_server = create_mock_server("SPY", 200, &body).await;

        let provider = YahooFinanceProvider::new(&mock_server.uri());
        let series = provider
            .fetch_series("SPY", &Window::Period(Period::OneYear))
            .await
            .unwrap();

        assert_eq!(series.len(), 3);
        let closes: Vec<Option<f64>> = series.closes().collect();
        assert_eq!(closes, vec![Some(100.0), None, Some(102.5)]);
        assert_eq!(series.first().unwrap().timestamp.timestamp(), 1_700_000_000);
    }

    #[tokio::test]
    async fn test_period_is_sent_as_range() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v8/finance/chart/GLD"))
            .and(query_param("interval", "1d"))
            .and(query_param("range", "ytd"))
            .respond_with(ResponseTemplate::new(200).set_body_string(chart_body(&[1], "5.0")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = YahooFinanceProvider::new(&mock_server.uri());
        let series = provider
            .fetch_series("GLD", &Window::Period(Period::YearToDate))
            .await
            .unwrap();
        assert_eq!(series.len(), 1);
    }

    #[test]
    fn test_date_range_query_includes_end_date() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let query = window_query(&Window::range(start, end).unwrap());

        let expected_end = midnight(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()).timestamp();
        assert_eq!(
            query,
            format!(
                "period1={}&period2={}",
                midnight(start).timestamp(),
                expected_end
            )
        );
    }

    #[tokio::test]
    async fn test_out_of_order_and_invalid_bars_are_cleaned() {
        let body = chart_body(
            &[1_700_000_000, 1_700_000_000, 1_699_000_000, 1_700_086_400],
            "100.0, 100.0, 99.0, -1.0",
        );
        let mock_server = create_mock_server("EWZ", 200, &body).await;

        let provider = YahooFinanceProvider::new(&mock_server.uri());
        let series = provider
            .fetch_series("EWZ", &Window::default())
            .await
            .unwrap();
        let closes: Vec<Option<f64>> = series.closes().collect();
        assert_eq!(closes, vec![Some(100.0), None]);
    }

    #[tokio::test]
    async fn test_missing_close_column_yields_no_closes() {
        let body = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1700000000, 1700086400],
                    "indicators": { "quote": [{}] }
                }]
            }
        }"#;
        let mock_server = create_mock_server("EWT", 200, body).await;

        let provider = YahooFinanceProvider::new(&mock_server.uri());
        let series = provider
            .fetch_series("EWT", &Window::default())
            .await
            .unwrap();
        assert_eq!(series.len(), 2);
        assert!(!series.has_close());
    }

    #[tokio::test]
    async fn test_empty_history_is_an_empty_series() {
        let body = r#"{"chart": {"result": [{"indicators": {"quote": [{}]}}], "error": null}}"#;
        let mock_server = create_mock_server("ITB", 200, body).await;

        let provider = YahooFinanceProvider::new(&mock_server.uri());
        let series = provider
            .fetch_series("ITB", &Window::default())
            .await
            .unwrap();
        assert!(series.is_empty());
    }

    #[tokio::test]
    async fn test_no_result_data() {
        let mock_server = create_mock_server("INVALID", 200, r#"{"chart": {"result": []}}"#).await;

        let provider = YahooFinanceProvider::new(&mock_server.uri());
        let result = provider.fetch_series("INVALID", &Window::default()).await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "No price data found for ticker: INVALID"
        );
    }

    #[tokio::test]
    async fn test_http_error_response() {
        let body = r#"{"chart": {"result": null, "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}}}"#;
        let mock_server = create_mock_server("BKF", 404, body).await;

        let provider = YahooFinanceProvider::new(&mock_server.uri());
        let result = provider.fetch_series("BKF", &Window::default()).await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "HTTP error: 404 Not Found for ticker: BKF"
        );
    }

    #[tokio::test]
    async fn test_chart_error_payload() {
        let body = r#"{"chart": {"result": null, "error": {"code": "Bad Request", "description": "Invalid range"}}}"#;
        let mock_server = create_mock_server("SPY", 200, body).await;

        let provider = YahooFinanceProvider::new(&mock_server.uri());
        let result = provider.fetch_series("SPY", &Window::default()).await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "Yahoo error for SPY: Invalid range (Bad Request)"
        );
    }

    #[tokio::test]
    async fn test_malformed_response() {
        let mock_server = create_mock_server("SPY", 200, r#"{"charts": {}}"#).await;

        let provider = YahooFinanceProvider::new(&mock_server.uri());
        let result = provider.fetch_series("SPY", &Window::default()).await;
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to parse JSON response for SPY")
        );
    }
}
