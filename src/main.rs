use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use etfscope::cli::Selection;
use etfscope::cli::simulate::ProjectionArgs;
use etfscope::core::indicators::DEFAULT_SMA_WINDOW;
use etfscope::core::log::init_logging;
use etfscope::core::price::Window;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Clone)]
struct SelectionArgs {
    /// Comma separated tickers, e.g. SPY,FXI (defaults from config)
    #[arg(short, long, value_delimiter = ',')]
    tickers: Vec<String>,

    /// Period (1Y, 3Y, 5Y, 10Y, YTD) or date range (2020-01-01..2021-06-30)
    #[arg(short, long, value_parser = parse_window)]
    window: Option<Window>,

    /// Ignore cached data and download again
    #[arg(long)]
    refresh: bool,
}

impl From<SelectionArgs> for Selection {
    fn from(args: SelectionArgs) -> Selection {
        Selection {
            tickers: args.tickers,
            window: args.window,
            refresh: args.refresh,
        }
    }
}

fn parse_window(s: &str) -> Result<Window> {
    s.parse()
}

fn parse_weight(s: &str) -> Result<(String, f64)> {
    etfscope::cli::allocate::parse_weight(s)
}

impl From<Commands> for etfscope::AppCommand {
    fn from(cmd: Commands) -> etfscope::AppCommand {
        match cmd {
            Commands::Catalog => etfscope::AppCommand::Catalog,
            Commands::Analyze { selection } => etfscope::AppCommand::Analyze(selection.into()),
            Commands::Simulate { selection, amount } => etfscope::AppCommand::Simulate {
                selection: selection.into(),
                amount,
            },
            Commands::Project {
                selection,
                amount,
                contribution,
                years,
                rate,
            } => etfscope::AppCommand::Project {
                selection: selection.into(),
                args: ProjectionArgs {
                    amount,
                    contribution,
                    years,
                    rate: rate.map(|r| r / 100.0),
                },
            },
            Commands::Indicator {
                selection,
                sma_window,
                rows,
            } => etfscope::AppCommand::Indicator {
                selection: selection.into(),
                window: sma_window,
                rows,
            },
            Commands::Allocate {
                weights,
                amount,
                window,
                refresh,
            } => etfscope::AppCommand::Allocate {
                total: amount,
                weights,
                window,
                refresh,
            },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// List supported ETFs
    Catalog,
    /// Compare performance, return metrics and correlation
    Analyze {
        #[command(flatten)]
        selection: SelectionArgs,
    },
    /// Value of a lump sum invested at the start of the window
    Simulate {
        #[command(flatten)]
        selection: SelectionArgs,
        /// Amount invested (defaults from config)
        #[arg(short, long)]
        amount: Option<f64>,
    },
    /// Long-term projection with yearly contributions
    Project {
        #[command(flatten)]
        selection: SelectionArgs,
        /// Initial amount (defaults from config)
        #[arg(short, long)]
        amount: Option<f64>,
        /// Contribution added each year (defaults from config)
        #[arg(long)]
        contribution: Option<f64>,
        /// Number of years (defaults from config)
        #[arg(short, long)]
        years: Option<u32>,
        /// Fixed annual return in percent instead of the historical one
        #[arg(short, long, allow_negative_numbers = true)]
        rate: Option<f64>,
    },
    /// Simple moving average of closing prices
    Indicator {
        #[command(flatten)]
        selection: SelectionArgs,
        /// Number of observations averaged
        #[arg(long, default_value_t = DEFAULT_SMA_WINDOW)]
        sma_window: usize,
        /// Number of most recent rows shown
        #[arg(long, default_value_t = 10)]
        rows: usize,
    },
    /// Split an amount across ETFs, e.g. SPY=60,FXI=40
    Allocate {
        /// TICKER=PERCENT pairs, comma separated
        #[arg(required = true, value_delimiter = ',', value_parser = parse_weight)]
        weights: Vec<(String, f64)>,
        /// Total amount to invest (defaults from config)
        #[arg(short, long)]
        amount: Option<f64>,
        /// Period (1Y, 3Y, 5Y, 10Y, YTD) or date range (2020-01-01..2021-06-30)
        #[arg(short, long, value_parser = parse_window)]
        window: Option<Window>,
        /// Ignore cached data and download again
        #[arg(long)]
        refresh: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => etfscope::cli::setup::setup(),
        Some(cmd) => etfscope::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
