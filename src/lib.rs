pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

pub use crate::core::config;

use crate::cli::simulate::ProjectionArgs;
use crate::cli::{App, Selection};
use crate::core::price::Window;
use crate::providers::{CachingSeriesFetcher, YahooFinanceProvider};
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub enum AppCommand {
    Catalog,
    Analyze(Selection),
    Simulate {
        selection: Selection,
        amount: Option<f64>,
    },
    Project {
        selection: Selection,
        args: ProjectionArgs,
    },
    Indicator {
        selection: Selection,
        window: usize,
        rows: usize,
    },
    Allocate {
        total: Option<f64>,
        weights: Vec<(String, f64)>,
        window: Option<Window>,
        refresh: bool,
    },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("etfscope starting...");

    let config = match config_path {
        Some(path) => config::AppConfig::load_from_path(path)?,
        None => config::AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    match command {
        AppCommand::Catalog => {
            cli::catalog::run();
            Ok(())
        }
        AppCommand::Analyze(selection) => cli::analyze::run(&build_app(config), &selection).await,
        AppCommand::Simulate { selection, amount } => {
            cli::simulate::run_lump_sum(&build_app(config), &selection, amount).await
        }
        AppCommand::Project { selection, args } => {
            cli::simulate::run_projection(&build_app(config), &selection, &args).await
        }
        AppCommand::Indicator {
            selection,
            window,
            rows,
        } => cli::indicator::run(&build_app(config), &selection, window, rows).await,
        AppCommand::Allocate {
            total,
            weights,
            window,
            refresh,
        } => cli::allocate::run(&build_app(config), total, &weights, window, refresh).await,
    }
}

fn build_app(config: config::AppConfig) -> App {
    let provider = Arc::new(YahooFinanceProvider::new(config.yahoo_base_url()));
    let cache = store::open_series_cache(&config);
    let fetcher = CachingSeriesFetcher::new(
        provider,
        cache,
        Duration::from_secs(config.cache.ttl_seconds),
    );
    App::new(config, fetcher)
}
