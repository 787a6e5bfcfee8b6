use etfscope::AppCommand;
use etfscope::cli::Selection;
use etfscope::cli::simulate::ProjectionArgs;
use std::fs;
use tracing::{error, info};

mod test_utils {
    use chrono::{Duration, Utc};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Chart response with one daily bar per close, ending today.
    pub fn chart_response(closes: &[f64]) -> String {
        let now = Utc::now();
        let timestamps: Vec<String> = (0..closes.len())
            .map(|i| {
                (now - Duration::days((closes.len() - i) as i64))
                    .timestamp()
                    .to_string()
            })
            .collect();
        let closes: Vec<String> = closes.iter().map(|c| c.to_string()).collect();
        format!(
            r#"
    {{
        "chart": {{
            "result": [
                {{
                    "meta": {{ "currency": "USD" }},
                    "timestamp": [{}],
                    "indicators": {{ "quote": [{{ "close": [{}] }}] }}
                }}
            ],
            "error": null
        }}
    }}"#,
            timestamps.join(", "),
            closes.join(", ")
        )
    }

    pub async fn create_mock_server(series: &[(&str, &[f64])]) -> MockServer {
        let mock_server = MockServer::start().await;
        for (ticker, closes) in series {
            Mock::given(method("GET"))
                .and(path(format!("/v8/finance/chart/{ticker}")))
                .respond_with(ResponseTemplate::new(200).set_body_string(chart_response(closes)))
                .mount(&mock_server)
                .await;
        }
        Mock::given(method("GET"))
            .and(path("/v8/finance/chart/EWZ"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;
        mock_server
    }

    pub fn write_config(base_url: &str) -> tempfile::NamedTempFile {
        let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
        let config_content = format!(
            r#"
        providers:
          yahoo:
            base_url: {base_url}
        cache:
          persist: false
        defaults:
          tickers: ["SPY", "FXI"]
          period: "1Y"
        simulation:
          amount: 1000.0
          contribution: 100.0
          horizon_years: 5
    "#
        );
        super::fs::write(config_file.path(), config_content).expect("Failed to write config file");
        config_file
    }
}

const SPY: &[f64] = &[100.0, 101.5, 99.8, 102.3, 104.0, 103.1, 105.6];
const FXI: &[f64] = &[30.0, 29.4, 29.9, 28.7, 29.2, 30.1, 29.5];

async fn run(command: AppCommand) {
    let mock_server = test_utils::create_mock_server(&[("SPY", SPY), ("FXI", FXI)]).await;
    let config_file = test_utils::write_config(&mock_server.uri());

    let result = etfscope::run_command(command, Some(config_file.path().to_str().unwrap())).await;
    assert!(
        result.is_ok(),
        "Command failed with: {:?}",
        result.err()
    );
}

fn selection(tickers: &[&str]) -> Selection {
    Selection {
        tickers: tickers.iter().map(|t| t.to_string()).collect(),
        window: None,
        refresh: false,
    }
}

#[test_log::test(tokio::test)]
async fn test_analyze_with_mock() {
    run(AppCommand::Analyze(Selection::default())).await;
}

#[test_log::test(tokio::test)]
async fn test_analyze_tolerates_failed_ticker() {
    run(AppCommand::Analyze(selection(&["SPY", "EWZ"]))).await;
}

#[test_log::test(tokio::test)]
async fn test_analyze_with_no_data_at_all() {
    run(AppCommand::Analyze(selection(&["EWZ"]))).await;
}

#[test_log::test(tokio::test)]
async fn test_simulate_and_project_with_mock() {
    run(AppCommand::Simulate {
        selection: selection(&["spy", "fxi"]),
        amount: Some(5000.0),
    })
    .await;

    run(AppCommand::Project {
        selection: Selection::default(),
        args: ProjectionArgs {
            amount: None,
            contribution: None,
            years: Some(3),
            rate: None,
        },
    })
    .await;

    run(AppCommand::Project {
        selection: selection(&["SPY"]),
        args: ProjectionArgs {
            amount: Some(1000.0),
            contribution: Some(0.0),
            years: Some(2),
            rate: Some(0.07),
        },
    })
    .await;
}

#[test_log::test(tokio::test)]
async fn test_indicator_and_allocate_with_mock() {
    run(AppCommand::Indicator {
        selection: selection(&["SPY"]),
        window: 3,
        rows: 5,
    })
    .await;

    run(AppCommand::Allocate {
        total: Some(1000.0),
        weights: vec![("SPY".to_string(), 60.0), ("FXI".to_string(), 40.0)],
        window: Some("2024-01-01..2024-12-31".parse().unwrap()),
        refresh: true,
    })
    .await;
}

#[test_log::test(tokio::test)]
async fn test_catalog_without_network() {
    let config_file = test_utils::write_config("http://127.0.0.1:9");
    let result =
        etfscope::run_command(AppCommand::Catalog, Some(config_file.path().to_str().unwrap()))
            .await;
    assert!(result.is_ok());
}

#[test_log::test(tokio::test)]
async fn test_configuration_errors_fail_the_command() {
    let mock_server = test_utils::create_mock_server(&[("SPY", SPY)]).await;
    let config_file = test_utils::write_config(&mock_server.uri());
    let config_path = config_file.path().to_str().unwrap();

    let result =
        etfscope::run_command(AppCommand::Analyze(selection(&["AAPL"])), Some(config_path)).await;
    assert!(result.unwrap_err().to_string().contains("Unsupported ticker"));

    let result = etfscope::run_command(
        AppCommand::Allocate {
            total: Some(1000.0),
            weights: vec![("SPY".to_string(), 80.0), ("FXI".to_string(), 30.0)],
            window: None,
            refresh: false,
        },
        Some(config_path),
    )
    .await;
    assert!(result.unwrap_err().to_string().contains("exceeds 100%"));

    let result = etfscope::run_command(
        AppCommand::Simulate {
            selection: Selection::default(),
            amount: Some(-10.0),
        },
        Some(config_path),
    )
    .await;
    assert!(result.is_err());

    let bad_config = tempfile::NamedTempFile::new().unwrap();
    fs::write(bad_config.path(), "defaults:\n  tickers: [\"NOPE\"]\n").unwrap();
    let result = etfscope::run_command(
        AppCommand::Catalog,
        Some(bad_config.path().to_str().unwrap()),
    )
    .await;
    assert!(result.is_err());
}

#[test_log::test(tokio::test)]
#[ignore = "requires network access"]
async fn test_real_yahoo_finance_api() {
    use etfscope::core::price::{SeriesProvider, Window};
    use etfscope::providers::YahooFinanceProvider;

    let provider = YahooFinanceProvider::new(etfscope::config::DEFAULT_YAHOO_BASE_URL);
    let ticker = "SPY";
    info!(?ticker, "Fetching series from Yahoo Finance");

    match provider
        .fetch_series(ticker, &"1Y".parse::<Window>().unwrap())
        .await
    {
        Ok(series) => {
            info!(len = series.len(), "Received series");
            assert!(series.len() > 200, "A year of daily bars expected");
            assert!(series.has_close());
        }
        Err(e) => {
            error!("API request failed: {e}\n{e:?}");
            panic!("API request failed: {e}");
        }
    }
}
